//! Per-iteration statistics accumulator.

use crate::agent::{Agent, AgentKind};

/// Partial or total statistics for one iteration.
///
/// Workers fill a local `IterationStats` while walking their cells and
/// push it into the shared global statistics once per iteration. All
/// fields combine by plain addition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IterationStats {
    /// Live sheep.
    pub sheep: u64,
    /// Live wolves.
    pub wolves: u64,
    /// Cells with live (edible) grass.
    pub grass: u64,
    /// Total energy over live sheep.
    pub sheep_energy: u64,
    /// Total energy over live wolves.
    pub wolves_energy: u64,
    /// Sum of all grass regrowth timers.
    pub grass_countdown: u64,
}

impl IterationStats {
    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Count one agent. Dead agents are ignored.
    pub fn add_agent(&mut self, agent: &Agent) {
        if !agent.is_alive() {
            return;
        }
        let energy = agent.energy as u64;
        match agent.kind {
            AgentKind::Sheep => {
                self.sheep += 1;
                self.sheep_energy += energy;
            }
            AgentKind::Wolf => {
                self.wolves += 1;
                self.wolves_energy += energy;
            }
        }
    }

    /// Count one cell's grass state.
    pub fn add_grass(&mut self, grass_timer: u32) {
        if grass_timer == 0 {
            self.grass += 1;
        }
        self.grass_countdown += u64::from(grass_timer);
    }

    /// Add another accumulator into this one.
    pub fn merge(&mut self, other: &IterationStats) {
        self.sheep += other.sheep;
        self.wolves += other.wolves;
        self.grass += other.grass;
        self.sheep_energy += other.sheep_energy;
        self.wolves_energy += other.wolves_energy;
        self.grass_countdown += other.grass_countdown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_agents_are_not_counted() {
        let mut s = IterationStats::default();
        s.add_agent(&Agent::sheep(0));
        s.add_agent(&Agent::wolf(-3));
        assert_eq!(s, IterationStats::default());
    }

    #[test]
    fn grass_alive_only_at_zero() {
        let mut s = IterationStats::default();
        s.add_grass(0);
        s.add_grass(4);
        assert_eq!(s.grass, 1);
        assert_eq!(s.grass_countdown, 4);
    }

    #[test]
    fn merge_adds_fieldwise() {
        let mut a = IterationStats::default();
        a.add_agent(&Agent::sheep(2));
        let mut b = IterationStats::default();
        b.add_agent(&Agent::sheep(3));
        b.add_agent(&Agent::wolf(10));
        a.merge(&b);
        assert_eq!(a.sheep, 2);
        assert_eq!(a.sheep_energy, 5);
        assert_eq!(a.wolves, 1);
        assert_eq!(a.wolves_energy, 10);
    }
}
