use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub channel_id: u64,
    pub operator_id: u64,
    pub check_interval_secs: u64,
    pub products_path: PathBuf,
    pub log_level: String,
    pub lookup_timeout_secs: u64,
    pub lookup_user_agent: String,
    pub max_concurrent_checks: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &"[redacted]")
            .field("channel_id", &self.channel_id)
            .field("operator_id", &self.operator_id)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("products_path", &self.products_path)
            .field("log_level", &self.log_level)
            .field("lookup_timeout_secs", &self.lookup_timeout_secs)
            .field("lookup_user_agent", &self.lookup_user_agent)
            .field("max_concurrent_checks", &self.max_concurrent_checks)
            .finish()
    }
}
