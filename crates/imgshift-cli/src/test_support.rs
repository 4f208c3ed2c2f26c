use std::path::Path;

use imgshift_core::{AppConfig, Environment};

/// Config rooted at `work_dir` with retries, delays and polling turned off.
pub(crate) fn config(work_dir: &Path) -> AppConfig {
    AppConfig {
        shopify_store: "test-store.myshopify.com".to_owned(),
        shopify_admin_api_token: "shpat_test".to_owned(),
        shopify_api_version: "2024-10".to_owned(),
        env: Environment::Test,
        log_level: "debug".to_owned(),
        work_dir: work_dir.to_path_buf(),
        output_path: work_dir.join("import.csv"),
        request_timeout_secs: 5,
        user_agent: "imgshift-test/0.1".to_owned(),
        max_retries: 0,
        retry_backoff_base_ms: 0,
        retry_backoff_factor: 2,
        inter_request_delay_ms: 0,
        upload_poll_attempts: 1,
        upload_poll_interval_ms: 0,
        keep_downloads: false,
    }
}
