use wpgraphql_http::{GraphQlClient, WordPress};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let wp = WordPress::new(GraphQlClient::from_env()?);

    // Independent calls share nothing and may run side by side.
    let (pages, posts) = tokio::join!(wp.pages(), wp.posts());

    // A failed listing renders as empty rather than aborting the run.
    let pages = pages.unwrap_or_else(|err| {
        eprintln!("pages unavailable: {err}");
        Vec::new()
    });
    let posts = posts.unwrap_or_else(|err| {
        eprintln!("posts unavailable: {err}");
        Vec::new()
    });

    for page in &pages {
        println!("page  {:<32} {}", page.slug, page.title);
    }
    for post in &posts {
        println!("post  {:<32} {} ({})", post.slug, post.title, post.date);
    }

    for uri in wp.all_page_uris().await? {
        println!("route /{uri}/");
    }

    Ok(())
}
