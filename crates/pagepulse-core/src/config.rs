use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    pub cors_origins: Vec<String>,
    /// HS256 secret used to validate dashboard bearer tokens. Token
    /// issuance belongs to the external auth system.
    pub auth_secret: String,
    pub buffer_flush_interval_ms: u64,
    pub buffer_max_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("PAGEPULSE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("PAGEPULSE_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("PAGEPULSE_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            cors_origins: std::env::var("PAGEPULSE_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            auth_secret: std::env::var("PAGEPULSE_AUTH_SECRET")
                .map_err(|_| "PAGEPULSE_AUTH_SECRET is required".to_string())?,
            buffer_flush_interval_ms: 1000,
            buffer_max_size: 1000,
        })
    }

    pub fn buffer_flush_interval(&self) -> Duration {
        Duration::from_millis(self.buffer_flush_interval_ms)
    }
}
