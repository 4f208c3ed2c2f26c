pub mod client;
pub mod error;
pub mod normalize;
pub mod queries;
pub mod rate_limit;
pub mod types;

pub use client::ShopifyAdminClient;
pub use error::ShopifyError;
pub use normalize::normalize_product;
pub use rate_limit::RetryPolicy;
pub use types::ProductSummary;
