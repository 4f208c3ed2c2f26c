use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Shop domain, e.g. `example.myshopify.com`.
    pub shopify_store: String,
    pub shopify_admin_api_token: String,
    /// Admin API version segment, e.g. `2024-10`.
    pub shopify_api_version: String,
    pub env: Environment,
    pub log_level: String,
    /// Scratch directory for downloads and checkpoint manifests.
    pub work_dir: PathBuf,
    /// Default bulk-import file path.
    pub output_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub retry_backoff_factor: u32,
    /// Pause between per-image network round trips.
    pub inter_request_delay_ms: u64,
    pub upload_poll_attempts: u32,
    pub upload_poll_interval_ms: u64,
    pub keep_downloads: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shopify_store", &self.shopify_store)
            .field("shopify_admin_api_token", &"[redacted]")
            .field("shopify_api_version", &self.shopify_api_version)
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("work_dir", &self.work_dir)
            .field("output_path", &self.output_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("retry_backoff_factor", &self.retry_backoff_factor)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("upload_poll_attempts", &self.upload_poll_attempts)
            .field("upload_poll_interval_ms", &self.upload_poll_interval_ms)
            .field("keep_downloads", &self.keep_downloads)
            .finish()
    }
}
