use thiserror::Error;

use super::config::ConfigError;
use crate::core::eigen::EigenError;
use crate::core::momentum::MomentumPoint;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Diagonalization failed at k = ({:.4}, {:.4}) in iteration {iteration}: {source}", .momentum.kx, .momentum.ky)]
    Diagonalization {
        momentum: MomentumPoint,
        iteration: usize,
        #[source]
        source: EigenError,
    },

    #[error("Work distribution failed: {0}")]
    Distribution(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
