//! Typed queries against the WPGraphQL schema of a headless WordPress site.

use serde::{Deserialize, Deserializer};

use crate::{GraphQlClient, Result, Variables};

const PAGES_QUERY: &str = r#"
query GetPages {
  pages(first: 100) {
    nodes { id title slug uri }
  }
}"#;

const POSTS_QUERY: &str = r#"
query GetPosts {
  posts(first: 100) {
    nodes { id title slug uri date excerpt }
  }
}"#;

const HOME_PAGE_QUERY: &str = r#"
query GetHomePageContent {
  page(id: "home", idType: URI) { title content }
}"#;

const PAGE_BY_SLUG_QUERY: &str = r#"
query GetPageBySlug($slug: ID!) {
  page(id: $slug, idType: URI) { id title slug uri content }
}"#;

const POST_BY_SLUG_QUERY: &str = r#"
query GetPostBySlug($slug: ID!) {
  post(id: $slug, idType: SLUG) { id title slug uri date content excerpt }
}"#;

const PAGE_BY_URI_QUERY: &str = r#"
query GetPageByURI($uri: ID!) {
  page(id: $uri, idType: URI) { id title uri content }
}"#;

const ALL_PAGE_SLUGS_QUERY: &str = r#"
query GetAllPageSlugs {
  pages(first: 1000) { nodes { slug } }
}"#;

const ALL_PAGE_URIS_QUERY: &str = r#"
query GetAllPageURIs {
  pages(first: 1000) { nodes { uri } }
}"#;

const ALL_POST_SLUGS_QUERY: &str = r#"
query GetAllPostSlugs {
  posts(first: 1000) { nodes { slug } }
}"#;

/// Page as listed by [`WordPress::pages`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageSummary {
    #[serde(deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub uri: String,
}

/// Post as listed by [`WordPress::posts`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostSummary {
    #[serde(deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub uri: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub excerpt: String,
}

/// A full page. Fields outside the query's selection set are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    #[serde(deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub uri: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
}

/// A full post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub uri: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub excerpt: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HomePage {
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
}

#[derive(Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct PagesData<T> {
    pages: Connection<T>,
}

#[derive(Deserialize)]
struct PostsData<T> {
    posts: Connection<T>,
}

#[derive(Deserialize)]
struct PageData<T> {
    page: Option<T>,
}

#[derive(Deserialize)]
struct PostData<T> {
    post: Option<T>,
}

#[derive(Deserialize)]
struct SlugNode {
    slug: Option<String>,
}

#[derive(Deserialize)]
struct UriNode {
    uri: Option<String>,
}

/// WordPress content queries on top of a [`GraphQlClient`].
///
/// Every call goes through the client's retry loop; a terminal failure is
/// returned unchanged so the caller can decide how to degrade.
#[derive(Clone, Debug)]
pub struct WordPress {
    client: GraphQlClient,
}

impl WordPress {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphQlClient {
        &self.client
    }

    /// First 100 pages.
    pub async fn pages(&self) -> Result<Vec<PageSummary>> {
        let data: PagesData<PageSummary> = self.client.query_as(PAGES_QUERY, ()).await?;
        Ok(data.pages.nodes)
    }

    /// First 100 posts.
    pub async fn posts(&self) -> Result<Vec<PostSummary>> {
        let data: PostsData<PostSummary> = self.client.query_as(POSTS_QUERY, ()).await?;
        Ok(data.posts.nodes)
    }

    /// Title and content of the page at URI `home`.
    ///
    /// A missing home page yields an empty [`HomePage`].
    pub async fn home_page(&self) -> Result<HomePage> {
        let data: PageData<HomePage> = self.client.query_as(HOME_PAGE_QUERY, ()).await?;
        Ok(data.page.unwrap_or_default())
    }

    pub async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        let data: PageData<Page> = self
            .client
            .query_as(PAGE_BY_SLUG_QUERY, Variables::new().with("slug", slug))
            .await?;
        Ok(data.page)
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let data: PostData<Post> = self
            .client
            .query_as(POST_BY_SLUG_QUERY, Variables::new().with("slug", slug))
            .await?;
        Ok(data.post)
    }

    pub async fn page_by_uri(&self, uri: &str) -> Result<Option<Page>> {
        let data: PageData<Page> = self
            .client
            .query_as(PAGE_BY_URI_QUERY, Variables::new().with("uri", uri))
            .await?;
        Ok(data.page)
    }

    pub async fn all_page_slugs(&self) -> Result<Vec<String>> {
        let data: PagesData<SlugNode> = self.client.query_as(ALL_PAGE_SLUGS_QUERY, ()).await?;
        Ok(data.pages.nodes.into_iter().filter_map(|node| node.slug).collect())
    }

    pub async fn all_post_slugs(&self) -> Result<Vec<String>> {
        let data: PostsData<SlugNode> = self.client.query_as(ALL_POST_SLUGS_QUERY, ()).await?;
        Ok(data.posts.nodes.into_iter().filter_map(|node| node.slug).collect())
    }

    /// URIs of up to 1000 pages with surrounding slashes removed.
    /// The front page (`/`) is skipped.
    pub async fn all_page_uris(&self) -> Result<Vec<String>> {
        let data: PagesData<UriNode> = self.client.query_as(ALL_PAGE_URIS_QUERY, ()).await?;
        Ok(data
            .pages
            .nodes
            .into_iter()
            .filter_map(|node| node.uri.as_deref().and_then(route_path))
            .collect())
    }
}

/// WPGraphQL returns `null` for fields hidden from the viewer (drafts,
/// password-protected content); those read as empty strings.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Strips one leading and one trailing `/`; `None` when nothing remains.
fn route_path(uri: &str) -> Option<String> {
    let path = uri.strip_prefix('/').unwrap_or(uri);
    let path = path.strip_suffix('/').unwrap_or(path);
    (!path.is_empty()).then(|| path.to_owned())
}
