use std::path::PathBuf;

pub struct Config {
    /// Analytics configuration file; built-in defaults when unset
    pub analytics_config: Option<PathBuf>,
    /// 0 selects the engine default
    pub timeframe_days: u32,
    pub benchmark: Option<String>,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let analytics_config = std::env::var("AKSJEFOLIO_CONFIG").ok().map(PathBuf::from);
        let timeframe_days: u32 = std::env::var("AKSJEFOLIO_TIMEFRAME_DAYS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .unwrap_or(0);
        let benchmark = std::env::var("AKSJEFOLIO_BENCHMARK")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let log_format =
            std::env::var("AKSJEFOLIO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        Self {
            analytics_config,
            timeframe_days,
            benchmark,
            log_format,
        }
    }
}
