use crate::geo::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the hosted data API, without the `/rest/v1` suffix.
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub table_name: String,
    /// Locations with at least this many reports are hidden from every list.
    pub report_threshold: i64,
    pub nominatim_url: String,
    pub nominatim_country_codes: String,
    pub nominatim_limit: u32,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub default_center: Coordinates,
    pub default_zoom: u8,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &"[redacted]")
            .field("table_name", &self.table_name)
            .field("report_threshold", &self.report_threshold)
            .field("nominatim_url", &self.nominatim_url)
            .field("nominatim_country_codes", &self.nominatim_country_codes)
            .field("nominatim_limit", &self.nominatim_limit)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("default_center", &self.default_center)
            .field("default_zoom", &self.default_zoom)
            .finish()
    }
}
