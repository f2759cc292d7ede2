//! Named simulation-control events.

use std::fmt;

/// A phase boundary in the worker lifecycle.
///
/// Each event owns exactly one sync point in the controller. The
/// declaration order is the pipeline order every worker follows:
///
/// ```text
/// BeforeInitCells -> AfterInitCells -> AfterSetNeighbours -> AfterInitAgents
///   -> AfterFirstStats -> { AfterHalfIteration -> AfterEndIteration } x iters
///   -> AfterEndSimulation
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlEvent {
    /// Worker has its context and is about to initialise cells.
    BeforeInitCells,
    /// All owned cells have their initial grass state.
    AfterInitCells,
    /// All owned cells have their neighbourhood installed.
    AfterSetNeighbours,
    /// All initial agents have been placed.
    AfterInitAgents,
    /// Iteration-0 statistics have been pushed.
    AfterFirstStats,
    /// Movement and grass regrowth are complete for this iteration.
    AfterHalfIteration,
    /// Actions and statistics are complete for this iteration.
    AfterEndIteration,
    /// The worker has finished every iteration.
    AfterEndSimulation,
}

impl ControlEvent {
    /// Number of control events.
    pub const COUNT: usize = 8;

    /// Every event in pipeline order.
    pub const ALL: [ControlEvent; Self::COUNT] = [
        Self::BeforeInitCells,
        Self::AfterInitCells,
        Self::AfterSetNeighbours,
        Self::AfterInitAgents,
        Self::AfterFirstStats,
        Self::AfterHalfIteration,
        Self::AfterEndIteration,
        Self::AfterEndSimulation,
    ];

    /// Position of this event in [`ControlEvent::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Kebab-case name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::BeforeInitCells => "before-init-cells",
            Self::AfterInitCells => "after-init-cells",
            Self::AfterSetNeighbours => "after-set-neighbours",
            Self::AfterInitAgents => "after-init-agents",
            Self::AfterFirstStats => "after-first-stats",
            Self::AfterHalfIteration => "after-half-iteration",
            Self::AfterEndIteration => "after-end-iteration",
            Self::AfterEndSimulation => "after-end-simulation",
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, e) in ControlEvent::ALL.iter().enumerate() {
            assert_eq!(e.index(), i);
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = ControlEvent::ALL.iter().map(|e| e.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ControlEvent::COUNT);
    }
}
