use downgrader_core::products::ProductCatalog;
use downgrader_core::quota::DEFAULT_FREE_TRIAL_LIMIT;
use downgrader_llm::LlmConfig;

/// Server configuration loaded from environment variables.
///
/// Built once at startup and handed to each component explicitly; nothing
/// reads the environment after `main` has constructed it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `45`). Kept above the LLM
    /// timeout so a slow completion fails as a backend error first.
    pub request_timeout_secs: u64,
    /// Free generations per device (default: `1`).
    pub free_trial_limit: i32,
    /// Completion backend connection settings.
    pub llm: LlmConfig,
    /// Purchasable generation packs.
    pub products: ProductCatalog,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default              |
    /// |------------------------|----------------------|
    /// | `HOST`                 | `0.0.0.0`            |
    /// | `PORT`                 | `8000`               |
    /// | `CORS_ORIGINS`         | `*`                  |
    /// | `REQUEST_TIMEOUT_SECS` | `45`                 |
    /// | `FREE_TRIAL_LIMIT`     | `1`                  |
    /// | `PRODUCTS`             | built-in pack table  |
    ///
    /// LLM settings are read by [`LlmConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "45".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let free_trial_limit: i32 = std::env::var("FREE_TRIAL_LIMIT")
            .unwrap_or_else(|_| DEFAULT_FREE_TRIAL_LIMIT.to_string())
            .parse()
            .expect("FREE_TRIAL_LIMIT must be a valid i32");
        assert!(free_trial_limit >= 0, "FREE_TRIAL_LIMIT must not be negative");

        let products = match std::env::var("PRODUCTS") {
            Ok(raw) if !raw.trim().is_empty() => ProductCatalog::from_json(&raw)
                .unwrap_or_else(|e| panic!("PRODUCTS is invalid: {e}")),
            _ => ProductCatalog::default(),
        };

        let llm = LlmConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            free_trial_limit,
            llm,
            products,
        }
    }
}
