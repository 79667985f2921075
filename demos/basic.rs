use std::time::Duration;

use wpgraphql_http::{ClientOptions, GraphQlClient, RetryEvent, Variables};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = GraphQlClient::from_env()?
        .with_options(ClientOptions {
            timeout_ms: 30_000,
            max_attempts: 5,
            retry_backoff_ms: 500,
        })
        .with_observer(|event: &RetryEvent<'_>| {
            if let RetryEvent::AttemptFailed {
                attempt,
                error,
                next_delay,
            } = event
            {
                let wait = next_delay.unwrap_or(Duration::ZERO);
                eprintln!("attempt {} failed: {error} (next wait {wait:?})", attempt + 1);
            }
        });

    let data = client
        .query(
            "query GetPageBySlug($slug: ID!) { page(id: $slug, idType: URI) { id title } }",
            Variables::new().with("slug", "about"),
        )
        .await?;

    println!("{data:#}");

    Ok(())
}
