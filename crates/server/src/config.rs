use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

/// Server configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to bind (`STOCKFOLIO_PORT`, default 3030)
    pub port: u16,

    /// Directory holding the holdings and account files
    /// (`STOCKFOLIO_DATA_DIR`, default `data`)
    pub data_dir: PathBuf,

    /// HS256 signing secret for bearer tokens (`STOCKFOLIO_JWT_SECRET`)
    pub jwt_secret: String,

    /// Alpha Vantage API key; enables the fallback quote source
    /// (`ALPHAVANTAGE_API_KEY`)
    pub alphavantage_key: Option<String>,

    /// Quote freshness window (`STOCKFOLIO_QUOTE_TTL_SECS`, default 15)
    pub quote_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("STOCKFOLIO_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3030);

        let data_dir = env::var("STOCKFOLIO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let jwt_secret = env::var("STOCKFOLIO_JWT_SECRET").unwrap_or_else(|_| {
            warn!("STOCKFOLIO_JWT_SECRET not set; using a development-only default");
            "stockfolio-dev-secret".to_string()
        });

        let alphavantage_key = env::var("ALPHAVANTAGE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let quote_ttl = env::var("STOCKFOLIO_QUOTE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(15));

        Self {
            port,
            data_dir,
            jwt_secret,
            alphavantage_key,
            quote_ttl,
        }
    }
}
