use std::str::Utf8Error;

use thiserror::Error;
use tokio::time::error::Elapsed;

/// Anything that can go wrong during a query exchange, split between
/// transport faults (socket level) and protocol faults (response content).
#[derive(Debug, Error)]
pub enum QueryError {
    /// Could not bind a local UDP socket.
    #[error("failed to bind local udp socket: {0}")]
    FailedPortBind(std::io::Error),

    /// Host name resolution or the socket connect failed.
    /// Raised before any frame is sent.
    #[error("could not reach host: {0}")]
    UnreachableHost(std::io::Error),

    /// Sending a request frame failed.
    #[error("failed to send request: {0}")]
    SendError(std::io::Error),

    /// Receiving a response datagram failed.
    #[error("failed to receive response: {0}")]
    ReceiveError(std::io::Error),

    /// A send, receive or connect did not complete within the timeout.
    #[error("operation timed out: {0}")]
    TimeoutError(#[from] Elapsed),

    /// The handshake payload was not an ASCII decimal token.
    #[error("handshake payload is not a numeric challenge token: {0:?}")]
    InvalidChallengeToken(String),

    /// A response was shorter than its fixed header.
    #[error("response shorter than the {0}-byte header")]
    TruncatedHeader(usize),

    /// A stat response ended before the named section was complete.
    #[error("stat response truncated inside the {0} section")]
    TruncatedResponse(&'static str),

    /// A decoded string was not valid UTF-8.
    #[error("response contains invalid utf-8: {0}")]
    InvalidString(#[from] Utf8Error),
}
