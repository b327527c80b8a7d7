use snafu::Snafu;

/// Queue store error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum QueueError {
    /// The idempotency marker was already set by another request.
    #[snafu(display("already processed"))]
    AlreadyProcessed,
    /// A message could not be encoded or decoded.
    #[snafu(display("queue serialization error: {message}"))]
    Serialization {
        message: &'static str,
        source: serde_json::Error,
    },
    /// The underlying store failed.
    #[snafu(display("queue store error: {message}"))]
    Store { message: String },
}

pub type Result<T, E = QueueError> = std::result::Result<T, E>;
