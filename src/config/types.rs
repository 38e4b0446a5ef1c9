use serde::Deserialize;

/// Main configuration structure for Excavator
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub excavator: ExcavatorConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with defaults for everything but the base URL
    pub fn default_for(base_url: impl Into<String>) -> Self {
        Self {
            excavator: ExcavatorConfig {
                base_url: base_url.into(),
                workspace: default_workspace(),
                cache_dir: default_cache_dir(),
                radical_type: RadicalType::default(),
                batch_size: default_batch_size(),
                channel_capacity: default_channel_capacity(),
            },
            http: HttpConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Crawl target and pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExcavatorConfig {
    /// Site root; detail paths and radical queries are resolved against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Workspace directory holding the page cache
    #[serde(default = "default_workspace")]
    pub workspace: String,

    /// Cache directory name inside the workspace
    #[serde(rename = "cache-dir", default = "default_cache_dir")]
    pub cache_dir: String,

    /// Which radical index to discover characters from
    #[serde(rename = "radical-type", default)]
    pub radical_type: RadicalType,

    /// Number of stored radical links read per storage query
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Buffer size of the channels between stages
    #[serde(rename = "channel-capacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Radical index flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadicalType {
    /// Index grouped by radical (部首)
    #[default]
    Bushou,
    /// Index grouped by pinyin
    Pinyin,
}

impl RadicalType {
    /// Path of the index page relative to the site root
    pub fn index_path(&self) -> &'static str {
        match self {
            Self::Bushou => "bushou/kangxi/",
            Self::Pinyin => "pinyin/kangxi/",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bushou => "bushou",
            Self::Pinyin => "pinyin",
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_workspace() -> String {
    "tmp".to_string()
}

fn default_cache_dir() -> String {
    "cache".to_string()
}

fn default_batch_size() -> usize {
    500
}

fn default_channel_capacity() -> usize {
    1
}

fn default_user_agent() -> String {
    format!("excavator/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_database_path() -> String {
    "excavator.db".to_string()
}
