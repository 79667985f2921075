/// Configures per-attempt timeout and retry behavior for a client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total number of attempts, including the first one.
    pub max_attempts: usize,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_attempts: 3,
            retry_backoff_ms: 1_000,
        }
    }
}

/// Per-call overrides of [`ClientOptions`].
///
/// Unset fields fall back to the client's options.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QueryOptions {
    /// Overrides [`ClientOptions::max_attempts`].
    pub max_attempts: Option<usize>,
    /// Overrides [`ClientOptions::timeout_ms`].
    pub timeout_ms: Option<u64>,
}

impl QueryOptions {
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub(crate) fn resolve(&self, defaults: &ClientOptions) -> ClientOptions {
        ClientOptions {
            timeout_ms: self.timeout_ms.unwrap_or(defaults.timeout_ms),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            retry_backoff_ms: defaults.retry_backoff_ms,
        }
    }
}
