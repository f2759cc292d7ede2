//! Grid cells: grass state, resident agents, and incoming agents.
//!
//! A cell's resident list and grass timer are mutated only by the worker
//! that owns the cell in the current phase. Any worker may append to the
//! incoming list (agents moving in), which becomes the resident list at
//! the next [`future_is_now`](Cell::future_is_now). When the cell keeps
//! its lists sorted by [`Agent::sort_key`], the result of every merge is
//! independent of insertion order.
//!
//! # Lifecycle per iteration
//!
//! ```text
//! move phase:   regenerate_grass, move_agents -> neighbours' incoming
//!               ---- blocking barrier ----
//! act phase:    future_is_now, act (eat, reproduce, mark eaten sheep),
//!               sweep_removed, collect_stats
//! ```

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use rand::Rng;
use smallvec::SmallVec;

use pphpc_core::{Agent, AgentKind, IterationStats, ModelParams, SimError};
use pphpc_space::{Neighbourhood, NEIGHBOURHOOD_SIZE};

/// Inline capacity of a cell's agent lists.
pub type AgentList = SmallVec<[Agent; 4]>;

#[derive(Default)]
struct CellState {
    grass_timer: u32,
    agents: AgentList,
    pending_removal: SmallVec<[usize; 2]>,
}

impl CellState {
    fn eat_grass(&mut self, restart: u32) {
        self.grass_timer = restart;
    }
}

/// One grid cell.
pub struct Cell {
    index: usize,
    sorted: bool,
    state: Mutex<CellState>,
    incoming: Mutex<AgentList>,
    neighbourhood: OnceLock<Neighbourhood>,
}

// Compile-time assertion: Cell must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Cell>();
};

fn insert(agents: &mut AgentList, agent: Agent, sorted: bool) {
    if !agent.is_alive() {
        return;
    }
    if sorted {
        let key = agent.sort_key();
        let pos = agents.partition_point(|a| a.sort_key() <= key);
        agents.insert(pos, agent);
    } else {
        agents.push(agent);
    }
}

impl Cell {
    /// An empty cell with live grass.
    ///
    /// `sorted` keeps agent lists ordered by [`Agent::sort_key`].
    pub fn new(index: usize, sorted: bool) -> Self {
        Self {
            index,
            sorted,
            state: Mutex::new(CellState::default()),
            incoming: Mutex::new(AgentList::new()),
            neighbourhood: OnceLock::new(),
        }
    }

    /// Linear index of this cell.
    pub fn index(&self) -> usize {
        self.index
    }

    fn state(&self) -> MutexGuard<'_, CellState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn incoming(&self) -> MutexGuard<'_, AgentList> {
        self.incoming.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Neighbourhood ──────────────────────────────────────────────

    /// Install the neighbourhood. Later calls are ignored.
    pub fn set_neighbourhood(&self, neighbourhood: Neighbourhood) {
        let _ = self.neighbourhood.set(neighbourhood);
    }

    /// The installed neighbourhood.
    pub fn neighbourhood(&self) -> Result<&Neighbourhood, SimError> {
        self.neighbourhood
            .get()
            .ok_or(SimError::NeighbourhoodUnset { cell: self.index })
    }

    // ── Grass ──────────────────────────────────────────────────────

    /// Set the initial regrowth countdown. `0` is live grass.
    pub fn init_grass(&self, timer: u32) {
        self.state().grass_timer = timer;
    }

    /// Remaining regrowth ticks.
    pub fn grass_timer(&self) -> u32 {
        self.state().grass_timer
    }

    /// Whether the grass is edible.
    pub fn is_grass_alive(&self) -> bool {
        self.grass_timer() == 0
    }

    /// Advance regrowth by one tick.
    pub fn regenerate_grass(&self) {
        let mut st = self.state();
        st.grass_timer = st.grass_timer.saturating_sub(1);
    }

    /// Consume the grass, restarting the countdown at `restart`.
    pub fn eat_grass(&self, restart: u32) {
        self.state().eat_grass(restart);
    }

    // ── Agent placement ────────────────────────────────────────────

    /// Place an initial agent among the residents.
    pub fn put_init_agent(&self, agent: Agent) {
        insert(&mut self.state().agents, agent, self.sorted);
    }

    /// Place a newborn among the residents. Dead newborns are dropped.
    pub fn put_new_agent(&self, agent: Agent) {
        insert(&mut self.state().agents, agent, self.sorted);
    }

    /// Queue an agent moving in; it becomes resident at the next
    /// [`future_is_now`](Self::future_is_now).
    pub fn put_existing_agent(&self, agent: Agent) {
        if agent.is_alive() {
            self.incoming().push(agent);
        }
    }

    /// Replace the residents with the queued arrivals and clear the queue.
    pub fn future_is_now(&self) {
        let arrived = std::mem::take(&mut *self.incoming());
        let mut st = self.state();
        st.agents = arrived;
        st.agents.retain(|a| a.is_alive());
        if self.sorted {
            st.agents.sort_unstable_by_key(Agent::sort_key);
        }
        st.pending_removal.clear();
    }

    /// Mark the resident at `position` for removal at the next sweep.
    pub fn mark_removed(&self, position: usize) {
        self.state().pending_removal.push(position);
    }

    /// Drop every resident marked for removal.
    pub fn sweep_removed(&self) {
        let mut st = self.state();
        Self::sweep(&mut st);
    }

    fn sweep(st: &mut CellState) {
        let mut marked = std::mem::take(&mut st.pending_removal);
        marked.sort_unstable();
        marked.dedup();
        for &pos in marked.iter().rev() {
            if pos < st.agents.len() {
                st.agents.remove(pos);
            }
        }
    }

    /// A snapshot of the residents.
    pub fn agents(&self) -> AgentList {
        self.state().agents.clone()
    }

    /// A snapshot of the queued arrivals.
    pub fn incoming_agents(&self) -> AgentList {
        self.incoming().clone()
    }

    // ── Phases ─────────────────────────────────────────────────────

    /// Move every resident to a random cell of the neighbourhood.
    ///
    /// Each move costs one energy; agents left with no energy die in
    /// place. Survivors land in the destination's incoming queue.
    pub fn move_agents<R: Rng>(&self, cells: &[Cell], rng: &mut R) -> Result<(), SimError> {
        let neighbourhood = *self.neighbourhood()?;
        let leaving = std::mem::take(&mut self.state().agents);
        for mut agent in leaving {
            agent.energy -= 1;
            if !agent.is_alive() {
                continue;
            }
            let target = neighbourhood[rng.random_range(0..NEIGHBOURHOOD_SIZE)];
            cells[target].put_existing_agent(agent);
        }
        Ok(())
    }

    /// Let every resident act once, in list order.
    ///
    /// A sheep eats live grass. A wolf eats the first live sheep in the
    /// cell. Any agent whose energy exceeds its threshold then reproduces
    /// with its configured probability. Newborns join the residents after
    /// every existing agent has acted, and eaten sheep are swept. A sorted
    /// cell is re-sorted afterwards, since eating changes energies.
    pub fn act<R: Rng>(&self, params: &ModelParams, rng: &mut R) {
        let mut st = self.state();
        let mut newborns = AgentList::new();
        for i in 0..st.agents.len() {
            let mut agent = st.agents[i];
            if !agent.is_alive() {
                continue;
            }
            match agent.kind {
                AgentKind::Sheep => {
                    if st.grass_timer == 0 {
                        st.eat_grass(params.grass_restart);
                        agent.energy = agent
                            .energy
                            .saturating_add(params.gain_from_food(AgentKind::Sheep));
                    }
                }
                AgentKind::Wolf => {
                    let prey = st
                        .agents
                        .iter()
                        .position(|a| a.kind == AgentKind::Sheep && a.is_alive());
                    if let Some(j) = prey {
                        st.agents[j].energy = 0;
                        st.pending_removal.push(j);
                        agent.energy = agent
                            .energy
                            .saturating_add(params.gain_from_food(AgentKind::Wolf));
                    }
                }
            }
            if i64::from(agent.energy) > params.reproduce_threshold(agent.kind)
                && rng.random_range(0..100u32) < params.reproduce_prob(agent.kind)
            {
                newborns.push(agent.reproduce());
            }
            st.agents[i] = agent;
        }
        Self::sweep(&mut st);
        st.agents.extend(newborns.into_iter().filter(Agent::is_alive));
        if self.sorted {
            st.agents.sort_unstable_by_key(Agent::sort_key);
        }
    }

    /// Add this cell's residents and grass to `acc`.
    pub fn collect_stats(&self, acc: &mut IterationStats) {
        let st = self.state();
        for agent in &st.agents {
            acc.add_agent(agent);
        }
        acc.add_grass(st.grass_timer);
    }
}
