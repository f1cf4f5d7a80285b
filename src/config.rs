use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings resolved from the environment with sensible defaults.
///
/// `service_url: None` means no remote capability at all; the app then runs
/// every submission through the local fallback path.
#[derive(Debug, Clone)]
pub struct Settings {
    pub service_url: Option<String>,
    pub request_timeout: Duration,
    pub autosave_interval: Duration,
    pub data_dir: PathBuf,
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AUTOSAVE_SECS: u64 = 30;

impl Settings {
    /// Load settings from the environment (a `.env` file is honored if present).
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let service_url = std::env::var("INTAKE_SERVICE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let request_timeout = env_secs("INTAKE_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let autosave_interval = env_secs("INTAKE_AUTOSAVE_SECS", DEFAULT_AUTOSAVE_SECS);

        let data_dir = std::env::var("INTAKE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        Self {
            service_url,
            request_timeout,
            autosave_interval,
            data_dir,
        }
    }
}

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("repair-intake")
}
