//! Agents: sheep and wolves.

/// The two agent species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentKind {
    /// Grazes on live grass.
    Sheep,
    /// Preys on sheep sharing its cell.
    Wolf,
}

/// A single agent.
///
/// Agents carry no identity beyond their species and energy: two agents
/// with equal `kind` and `energy` are interchangeable. That is what makes
/// [`sort_key`](Agent::sort_key) a total normalisation of a cell's agent
/// list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Agent {
    /// Remaining energy. `<= 0` means dead.
    pub energy: i32,
    /// Species.
    pub kind: AgentKind,
}

impl Agent {
    /// A sheep with the given energy.
    pub fn sheep(energy: i32) -> Self {
        Self {
            energy,
            kind: AgentKind::Sheep,
        }
    }

    /// A wolf with the given energy.
    pub fn wolf(energy: i32) -> Self {
        Self {
            energy,
            kind: AgentKind::Wolf,
        }
    }

    /// Whether the agent still has positive energy.
    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    /// Thread-independent ordering key: `energy << 2 | (wolf ? 1 : 2)`.
    pub fn sort_key(&self) -> i64 {
        let tag = match self.kind {
            AgentKind::Wolf => 1,
            AgentKind::Sheep => 2,
        };
        (i64::from(self.energy) << 2) | tag
    }

    /// Split off an offspring carrying half of this agent's energy.
    ///
    /// The parent keeps `energy - energy / 2`, so no energy is created
    /// or lost.
    pub fn reproduce(&mut self) -> Agent {
        let child = self.energy / 2;
        self.energy -= child;
        Agent {
            energy: child,
            kind: self.kind,
        }
    }
}
