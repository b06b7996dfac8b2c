//! Errors returned while constructing an [`crate::instance::Instance`].

/// Why a raw preference table could not be turned into an `Instance`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("agent {agent} on the {side:?} side ranks out-of-range partner {referenced}")]
    OutOfRange { side: Side, agent: usize, referenced: usize },

    #[error("preference tier {tier} for agent {agent} on the {side:?} side is empty")]
    EmptyTier { side: Side, agent: usize, tier: usize },

    #[error("{side:?}-side agent {agent} ranks partner {referenced} more than once")]
    DuplicateRanking { side: Side, agent: usize, referenced: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    L,
    R,
}
