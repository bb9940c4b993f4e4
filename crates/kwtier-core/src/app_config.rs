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
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub webhook_url: String,
    pub webhook_timeout_secs: u64,
    /// Total delivery attempts, including the first one. Always at least 1.
    pub webhook_max_attempts: u32,
    /// Base wait before the n-th retry: `webhook_retry_delay_ms * n`.
    pub webhook_retry_delay_ms: u64,
    pub suggest_url: String,
    pub suggest_timeout_secs: u64,
    pub suggest_inter_request_delay_ms: u64,
    pub suggest_user_agent: String,
    pub records_url: Option<String>,
    pub records_api_key: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("webhook_url", &"[redacted]")
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .field("webhook_max_attempts", &self.webhook_max_attempts)
            .field("webhook_retry_delay_ms", &self.webhook_retry_delay_ms)
            .field("suggest_url", &self.suggest_url)
            .field("suggest_timeout_secs", &self.suggest_timeout_secs)
            .field(
                "suggest_inter_request_delay_ms",
                &self.suggest_inter_request_delay_ms,
            )
            .field("suggest_user_agent", &self.suggest_user_agent)
            .field("records_url", &self.records_url)
            .field(
                "records_api_key",
                &self.records_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
