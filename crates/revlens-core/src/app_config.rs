use std::net::SocketAddr;
use std::path::PathBuf;

/// Credential value shipped in sample `.env` files. The loader accepts it;
/// the model client treats it the same as an absent key.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_GEMINI_API_KEY_GOES_HERE";

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

/// Process-wide settings, built once at startup and never mutated.
///
/// Binaries hold this behind an `Arc` and hand `&AppConfig` to whatever
/// needs it; nothing re-reads the environment after startup.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub gemini_api_key: String,
    pub model: String,
    pub model_base_url: String,
    pub model_timeout_secs: u64,
    pub review_selector: String,
    pub max_batch_size: usize,
    pub fetch_timeout_secs: u64,
    pub fetch_max_redirects: usize,
    pub fetch_user_agent: String,
    pub analyze_timeout_secs: u64,
    pub rate_limit_per_minute: usize,
    pub static_dir: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("gemini_api_key", &"[redacted]")
            .field("model", &self.model)
            .field("model_base_url", &self.model_base_url)
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("review_selector", &self.review_selector)
            .field("max_batch_size", &self.max_batch_size)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_max_redirects", &self.fetch_max_redirects)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("analyze_timeout_secs", &self.analyze_timeout_secs)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}
