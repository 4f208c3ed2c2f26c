use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {endpoint}")]
    RateLimited {
        endpoint: String,
        /// Seconds from a `Retry-After` header, when the server sent one.
        retry_after_secs: Option<u64>,
    },

    #[error("transient HTTP status {status} from {url}")]
    Transient { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("authentication rejected (HTTP {status}); check SHOPIFY_ADMIN_API_TOKEN and its scopes")]
    Auth { status: u16 },

    #[error("product not found: {id}")]
    NotFound { id: String },

    #[error("GraphQL error in {operation}: {message}")]
    GraphQl { operation: String, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response shape for {context}: {reason}")]
    DataShape { context: String, reason: String },

    #[error("failed to fetch image {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to upload {filename}: {reason}")]
    Upload { filename: String, reason: String },

    #[error("pagination limit reached for query \"{query}\": exceeded {max_pages} pages")]
    PaginationLimit { query: String, max_pages: usize },

    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidStoreUrl { url: String, reason: String },
}
