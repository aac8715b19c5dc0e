use thiserror::Error;

/// Failure taxonomy shared by the reader, the submitter and the client.
///
/// The reward estimator never produces one of these; it degrades to a zero
/// estimate instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorCode {
    /// RPC node or backend unreachable, timed out, or answered garbage at the
    /// transport level. The only retryable variant.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The wallet declined to sign (EIP-1193 code 4001).
    #[error("Transaction was rejected by user: {0}")]
    UserRejection(String),

    /// Execution reverted on chain or during simulation.
    #[error("Transaction reverted: {0}")]
    ContractRevert(String),

    /// Malformed address, amount or hex, caught before any network call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Contract return data did not match the expected ABI layout.
    #[error("Malformed contract return data: {0}")]
    Decode(String),

    /// Any other JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::NetworkError(_))
    }
}

pub type Result<T> = std::result::Result<T, ErrorCode>;
