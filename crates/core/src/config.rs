use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `REWARDS__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

// ─── Data Source Config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: String,
    /// Accepted date formats, tried in order against the date column.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

fn default_data_path() -> String {
    "data.csv".to_string()
}
fn default_date_formats() -> Vec<String> {
    vec!["%Y-%m-%d".to_string(), "%m/%d/%Y".to_string()]
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            date_formats: default_date_formats(),
        }
    }
}

// ─── Load Cache Config ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
        }
    }
}

// ─── Export Config ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub output_path: String,
}

fn default_export_path() -> String {
    "filtered_rewards_data.csv".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: default_export_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("REWARDS")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
