use phishershield_core::signals::CollectorConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub collectors: CollectorConfig,
}

impl Config {
    /// Read configuration from the environment. Collector keys are all
    /// optional; a missing key degrades that signal to its neutral
    /// default instead of failing startup.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(4000);

        Self {
            port,
            collectors: CollectorConfig::from_env(),
        }
    }
}
