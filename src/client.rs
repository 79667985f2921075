use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    events::{RetryEvent, RetryObserver},
    wire::{GraphQlRequest, GraphQlResponse},
    AttemptError, ClientOptions, GraphQlError, QueryOptions, Result, RetryPolicy, Variables,
};

/// Environment variable holding the GraphQL endpoint URL.
pub const ENDPOINT_ENV: &str = "WPGRAPHQL_ENDPOINT";
/// Environment variable holding an optional access token.
pub const TOKEN_ENV: &str = "WPGRAPHQL_TOKEN";

#[derive(Clone)]
/// HTTP client for a single GraphQL endpoint.
///
/// Every call is independent: attempts run one after another, each bounded by
/// its own deadline, with exponential backoff between failed attempts.
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
    options: ClientOptions,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.keys().map(HeaderName::as_str).collect();
        f.debug_struct("GraphQlClient")
            .field("endpoint", &self.endpoint)
            .field("headers", &header_names)
            .field("options", &self.options)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl GraphQlClient {
    /// Creates a client for the given endpoint with default options.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            headers: HeaderMap::new(),
            options: ClientOptions::default(),
            observer: None,
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `WPGRAPHQL_ENDPOINT` — GraphQL endpoint URL
    ///   (e.g. `https://example.com/graphql`)
    /// - `WPGRAPHQL_TOKEN` — optional access token, sent as a bearer token
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wpgraphql_http::GraphQlClient;
    ///
    /// let client = GraphQlClient::from_env().expect("missing WPGRAPHQL_ENDPOINT");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let endpoint = lookup(ENDPOINT_ENV).ok_or_else(|| {
            GraphQlError::Config(format!("missing {ENDPOINT_ENV} environment variable"))
        })?;
        if endpoint.trim().is_empty() {
            return Err(GraphQlError::Config(format!(
                "{ENDPOINT_ENV} is set but empty"
            )));
        }

        let client = Self::new(endpoint.trim());
        match lookup(TOKEN_ENV) {
            Some(token) if !token.trim().is_empty() => client.with_bearer_token(token),
            _ => Ok(client),
        }
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Uses a preconfigured `reqwest` client (proxy, TLS roots, user agent).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Subscribes an observer to the [`RetryEvent`]s of every call.
    pub fn with_observer(mut self, observer: impl RetryObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Adds a header sent with every request. The value is marked sensitive.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| GraphQlError::Config(format!("invalid header name '{name}': {err}")))?;
        let mut value = HeaderValue::from_str(value).map_err(|err| {
            GraphQlError::Config(format!("invalid value for header '{name}': {err}"))
        })?;
        value.set_sensitive(true);
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added automatically.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Result<Self> {
        let authorization = normalize_bearer_authorization(token.as_ref());
        self.with_header(header::AUTHORIZATION.as_str(), &authorization)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Executes a query and returns its raw `data` payload.
    pub async fn query<V: Into<Variables>>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<serde_json::Value> {
        self.query_with(query, variables, QueryOptions::default())
            .await
    }

    /// Executes a query and deserializes its `data` payload into `T`.
    pub async fn query_as<T, V>(&self, query: &str, variables: V) -> Result<T>
    where
        T: DeserializeOwned,
        V: Into<Variables>,
    {
        self.query_with(query, variables, QueryOptions::default())
            .await
    }

    /// Executes a query with per-call overrides of attempts and timeout.
    pub async fn query_with<T, V>(&self, query: &str, variables: V, opts: QueryOptions) -> Result<T>
    where
        T: DeserializeOwned,
        V: Into<Variables>,
    {
        let variables = variables.into();
        let request = GraphQlRequest {
            query,
            variables: &variables,
        };
        let data = self.send_with_retry(&request, opts, None).await?;
        decode_data(data)
    }

    /// Like [`GraphQlClient::query_with`], but stops at the next attempt or
    /// backoff boundary once `cancel` fires, returning
    /// [`GraphQlError::Cancelled`]. An in-flight attempt is dropped.
    pub async fn query_cancellable<T, V>(
        &self,
        query: &str,
        variables: V,
        opts: QueryOptions,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        V: Into<Variables>,
    {
        let variables = variables.into();
        let request = GraphQlRequest {
            query,
            variables: &variables,
        };
        let data = self.send_with_retry(&request, opts, Some(cancel)).await?;
        decode_data(data)
    }

    async fn send_with_retry(
        &self,
        request: &GraphQlRequest<'_>,
        opts: QueryOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<serde_json::Value> {
        let resolved = opts.resolve(&self.options);
        let policy = RetryPolicy::from(&resolved);
        let attempt_timeout = Duration::from_millis(resolved.timeout_ms);
        let mut history = Vec::new();

        for attempt in 0..policy.max_attempts() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(self.cancelled(attempt, history));
            }

            self.emit(&RetryEvent::AttemptStarted {
                attempt,
                timeout: attempt_timeout,
            });

            let Some(outcome) =
                until_cancelled(cancel, self.attempt(request, resolved.timeout_ms)).await
            else {
                return Err(self.cancelled(attempt, history));
            };

            let error = match outcome {
                Ok(data) => {
                    self.emit(&RetryEvent::Succeeded { attempt });
                    return Ok(data);
                }
                Err(error) => error,
            };

            let next_delay = policy.delay_after(attempt);
            self.emit(&RetryEvent::AttemptFailed {
                attempt,
                error: &error,
                next_delay,
            });
            history.push(error);

            if let Some(delay) = next_delay {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, ?delay, "retrying graphql request");

                if until_cancelled(cancel, sleep(delay)).await.is_none() {
                    return Err(self.cancelled(attempt + 1, history));
                }
            }
        }

        let attempts = policy.max_attempts();
        self.emit(&RetryEvent::Exhausted { attempts });

        #[cfg(feature = "tracing")]
        if let Some(last) = history.last() {
            tracing::warn!(attempts, error = %last, "graphql request failed");
        }

        Err(GraphQlError::Exhausted { attempts, history })
    }

    /// Runs one attempt: a single POST whose response status and body must
    /// both arrive within `timeout_ms`.
    async fn attempt(
        &self,
        request: &GraphQlRequest<'_>,
        timeout_ms: u64,
    ) -> std::result::Result<serde_json::Value, AttemptError> {
        let exchange = async {
            let response = self
                .http
                .post(&self.endpoint)
                .headers(self.headers.clone())
                .header(header::CONTENT_TYPE, "application/json")
                .json(request)
                .send()
                .await
                .map_err(AttemptError::Transport)?;
            let status = response.status();
            let body = response.text().await.map_err(AttemptError::Transport)?;
            Ok::<_, AttemptError>((status, body))
        };

        let (status, body) = timeout(Duration::from_millis(timeout_ms), exchange)
            .await
            .map_err(|_| AttemptError::Timeout { timeout_ms })??;

        if !status.is_success() {
            return Err(AttemptError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response = serde_json::from_str::<GraphQlResponse>(&body).map_err(|err| {
            AttemptError::Decode(format!("invalid graphql response JSON: {err}; body: {body}"))
        })?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            return Err(AttemptError::Remote { errors });
        }

        response
            .data
            .ok_or_else(|| AttemptError::Decode("response carries no data".to_owned()))
    }

    fn cancelled(&self, attempt: usize, history: Vec<AttemptError>) -> GraphQlError {
        self.emit(&RetryEvent::Cancelled { attempt });

        #[cfg(feature = "tracing")]
        tracing::debug!(attempt, "graphql request cancelled");

        GraphQlError::Cancelled { attempt, history }
    }

    fn emit(&self, event: &RetryEvent<'_>) {
        if let Some(observer) = &self.observer {
            observer.on_event(event);
        }
    }
}

/// Resolves `future`, or returns `None` as soon as `cancel` fires.
async fn until_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    future: F,
) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => None,
            output = future => Some(output),
        },
        None => Some(future.await),
    }
}

fn decode_data<T: DeserializeOwned>(data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|err| GraphQlError::Decode(format!("unexpected data shape: {err}")))
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
