use crate::wire::RemoteError;

/// Failure of a single attempt. Every variant is recoverable: the client
/// retries it while the attempt budget lasts.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// No complete response arrived before the per-attempt deadline.
    #[error("attempt timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Successful HTTP response carrying a non-empty GraphQL `errors` list.
    #[error("graphql errors: {}", join_messages(.errors))]
    Remote { errors: Vec<RemoteError> },
    /// Successful HTTP response whose body is not a usable GraphQL envelope.
    #[error("decode error: {0}")]
    Decode(String),
}

impl AttemptError {
    /// Returns `true` for [`AttemptError::Timeout`] and transport timeouts.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(err) => err.is_timeout(),
            _ => false,
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum GraphQlError {
    /// Every allowed attempt failed. `history` holds each attempt's error in
    /// attempt order; its last entry is the error that ended the call.
    #[error("query failed after {attempts} attempt(s): {}", describe_last(.history))]
    Exhausted {
        attempts: usize,
        history: Vec<AttemptError>,
    },
    /// The caller's cancellation token fired before the call resolved.
    #[error("query cancelled during attempt {attempt}")]
    Cancelled {
        /// 0-based index of the attempt that was running or about to run.
        attempt: usize,
        history: Vec<AttemptError>,
    },
    /// The `data` payload did not match the requested type.
    #[error("decode error: {0}")]
    Decode(String),
    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GraphQlError {
    /// Returns the error of the last failed attempt, if any attempt ran.
    pub fn last_attempt_error(&self) -> Option<&AttemptError> {
        match self {
            Self::Exhausted { history, .. } | Self::Cancelled { history, .. } => history.last(),
            Self::Decode(_) | Self::Config(_) => None,
        }
    }

    /// Returns every failed attempt's error in order.
    pub fn history(&self) -> &[AttemptError] {
        match self {
            Self::Exhausted { history, .. } | Self::Cancelled { history, .. } => history,
            Self::Decode(_) | Self::Config(_) => &[],
        }
    }
}

fn describe_last(history: &[AttemptError]) -> String {
    history
        .last()
        .map_or_else(|| "no attempt recorded".to_owned(), ToString::to_string)
}

fn join_messages(errors: &[RemoteError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
