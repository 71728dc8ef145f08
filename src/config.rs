use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the remote API, including the version prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path of the file holding the persisted user record
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// How long the intro screen is shown before routing, in milliseconds
    #[serde(default = "default_intro_delay_ms")]
    pub intro_delay_ms: u64,

    /// Timeout for the recommendation fetch, in seconds
    #[serde(default = "default_recs_timeout_secs")]
    pub recs_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://worker.jawn.workers.dev/api/v1".to_string()
}

fn default_store_path() -> String {
    "cinematch-user.json".to_string()
}

fn default_intro_delay_ms() -> u64 {
    800
}

fn default_recs_timeout_secs() -> u64 {
    120
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.api_base_url, "https://worker.jawn.workers.dev/api/v1");
        assert_eq!(config.store_path, "cinematch-user.json");
        assert_eq!(config.intro_delay_ms, 800);
        assert_eq!(config.recs_timeout_secs, 120);
    }

    #[test]
    fn test_overrides() {
        let vars = vec![
            ("API_BASE_URL".to_string(), "http://localhost:8787/api/v1".to_string()),
            ("INTRO_DELAY_MS".to_string(), "0".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8787/api/v1");
        assert_eq!(config.intro_delay_ms, 0);
        assert_eq!(config.recs_timeout_secs, 120);
    }
}
