use serde::Deserialize;

/// Main configuration structure for aniharvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub fetch: FetchConfig,
    #[serde(default)]
    pub reviews: ReviewsConfig,
    pub storage: StorageConfig,
    pub http: HttpConfig,
}

/// Catalog enumeration configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the ranking list endpoint (paginated via `?limit=N`)
    #[serde(rename = "list-url")]
    pub list_url: String,

    /// Number of listing pages to enumerate
    #[serde(rename = "page-count")]
    pub page_count: u32,

    /// Number of entries per listing page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,
}

/// Fetch and recovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of retry passes over the failing subset
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Worker pool size for the first full pass
    #[serde(rename = "first-pass-workers", default = "default_first_pass_workers")]
    pub first_pass_workers: u32,

    /// Worker pool size for retry passes (kept small to ease server pressure)
    #[serde(rename = "retry-workers", default = "default_retry_workers")]
    pub retry_workers: u32,

    /// Upper bound of the uniform random pre-request sleep, in milliseconds
    #[serde(rename = "jitter-max-ms", default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,
}

/// Review snippet fetching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewsConfig {
    /// Maximum number of review snippets per target
    #[serde(default = "default_review_limit")]
    pub limit: usize,

    /// Wait before the second attempt, in seconds
    #[serde(rename = "initial-wait-secs", default = "default_initial_wait_secs")]
    pub initial_wait_secs: u64,

    /// Linear wait increase per further attempt, in seconds
    #[serde(rename = "wait-increment-secs", default = "default_wait_increment_secs")]
    pub wait_increment_secs: u64,

    /// Attempts per target before giving up on its reviews
    #[serde(rename = "max-attempts", default = "default_review_attempts")]
    pub max_attempts: u32,

    /// Worker pool size for the review sweep
    #[serde(default = "default_review_workers")]
    pub workers: u32,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            limit: default_review_limit(),
            initial_wait_secs: default_initial_wait_secs(),
            wait_increment_secs: default_wait_increment_secs(),
            max_attempts: default_review_attempts(),
            workers: default_review_workers(),
        }
    }
}

/// Storage layout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one numbered subdirectory per partition
    pub root: String,

    /// Path of the persisted tab-delimited target list
    #[serde(rename = "list-path")]
    pub list_path: String,

    /// Directory holding per-target review snippet files
    #[serde(rename = "reviews-root", default = "default_reviews_root")]
    pub reviews_root: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Name reported in the user agent string
    #[serde(rename = "agent-name")]
    pub agent_name: String,

    /// Version reported in the user agent string
    #[serde(rename = "agent-version")]
    pub agent_version: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_page_size() -> u32 {
    50
}

fn default_max_retries() -> u32 {
    5
}

fn default_first_pass_workers() -> u32 {
    8
}

fn default_retry_workers() -> u32 {
    1
}

fn default_jitter_max_ms() -> u64 {
    3000
}

fn default_review_limit() -> usize {
    5
}

fn default_initial_wait_secs() -> u64 {
    90
}

fn default_wait_increment_secs() -> u64 {
    30
}

fn default_review_attempts() -> u32 {
    5
}

fn default_review_workers() -> u32 {
    4
}

fn default_reviews_root() -> String {
    "./reviews".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
