use crate::simulation_engine::vehicles::AgentHandle;
use thiserror::Error;

/// Errors reported synchronously by the simulation core.
///
/// Red-light violations and illegal turns are not errors; they are ordinary
/// outcomes carrying a negative reward.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("agent {0:?} is not registered with this environment")]
    InvalidAgentReference(AgentHandle),

    #[error("invalid action '{0}', expected one of none/forward/left/right")]
    InvalidAction(String),

    #[error(
        "a {width}x{height} grid has no start/destination pair at distance >= {min_distance}"
    )]
    UnsatisfiableEpisodeSetup {
        width: i32,
        height: i32,
        min_distance: i32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
