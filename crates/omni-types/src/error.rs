//! OmniPlanet errors

use crate::network::NetworkKey;
use std::fmt;
use thiserror::Error;

/// Why a write was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionCause {
    /// The user dismissed the wallet prompt (EIP-1193 code 4001)
    UserCancelled,
    /// The contract reverted
    Reverted,
    /// The wallet or node refused the submission for another reason
    Failed,
}

impl fmt::Display for RejectionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionCause::UserCancelled => write!(f, "cancelled by user"),
            RejectionCause::Reverted => write!(f, "reverted"),
            RejectionCause::Failed => write!(f, "failed"),
        }
    }
}

/// OmniPlanet client errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OmniError {
    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    #[error("Remote read failed on {network}: {reason}")]
    RemoteReadFailed { network: NetworkKey, reason: String },

    #[error("Token {0} does not exist")]
    TokenNotFound(u64),

    #[error("Wallet is not on chain {expected}: {reason}")]
    WrongNetwork { expected: u64, reason: String },

    #[error("Transaction {cause}: {message}")]
    TransactionRejected {
        cause: RejectionCause,
        message: String,
    },

    #[error("No LayerZero endpoint id configured for {0}")]
    MissingRouteConfig(NetworkKey),

    #[error("No wallet account available")]
    MissingWallet,

    #[error("Account holds no ship")]
    NoShip,

    #[error("Ship is already on {0}")]
    SameChainTravel(NetworkKey),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl OmniError {
    /// Shorthand for a failed read on `network`
    pub fn read_failed(network: &NetworkKey, reason: impl fmt::Display) -> Self {
        OmniError::RemoteReadFailed {
            network: network.clone(),
            reason: reason.to_string(),
        }
    }

    /// Whether the user can simply try the same action again
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, OmniError::InvalidConfig(_) | OmniError::UnknownChain(_))
    }
}

pub type OmniResult<T> = Result<T, OmniError>;
