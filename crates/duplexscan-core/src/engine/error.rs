use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::chain::ChainType;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Chain '{0}' not found in system")]
    ChainNotFound(char),

    #[error("Chain '{chain_id}' is a {chain_type} chain, not a nucleic acid")]
    NotANucleicAcid { chain_id: char, chain_type: ChainType },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
