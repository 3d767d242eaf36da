use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

const CONFIG_FILE: &str = "config/trap_hp";
const ENV_PREFIX: &str = "TRAP_HP";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub calculator: CalculatorSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalculatorSettings {
    /// Artificial latency before a calculation completes
    pub delay_ms: u64,
    /// Idle time after which a form session is dropped
    pub session_ttl_secs: u64,
}

impl CalculatorSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Defaults, then `config/trap_hp.{toml,...}` if present, then `TRAP_HP__*`
/// environment variables (e.g. `TRAP_HP__SERVER__PORT=9000`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_with(config::File::with_name(CONFIG_FILE).required(false))
}

fn load_app_config_with<S>(file: S) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("calculator.delay_ms", 300)?
        .set_default("calculator.session_ttl_secs", 3600)?
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
