use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Parse `.env` style content into key/value pairs.
///
/// Blank lines and `#` comments are skipped; values may be wrapped in single
/// or double quotes and may contain spaces without them.
pub fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let unquoted = ['"', '\'']
                .iter()
                .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
                .unwrap_or(value);
            (key.trim().to_string(), unquoted.to_string())
        })
        .collect()
}

/// Read `.env` from the working directory, if present.
pub fn load_dotenv() -> HashMap<String, String> {
    let path = Path::new(".env");
    match fs::read_to_string(path) {
        Ok(content) => parse_dotenv(&content),
        Err(_) => HashMap::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub registry: RegistryConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub sensor_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

impl SimulationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: RegistryConfig { sensor_count: 16 },
            simulation: SimulationConfig {
                enabled: true,
                interval_ms: 1000,
            },
        }
    }
}

impl Config {
    /// Defaults overridden by process environment, then by `.env`.
    ///
    /// Process environment variables take precedence over `.env` entries.
    pub fn from_env() -> Self {
        let dotenv = load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    /// Defaults overridden by whatever `lookup` returns for each known key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(count) = lookup("LUNIX_SENSOR_COUNT")
            && let Ok(n) = count.parse()
        {
            config.registry.sensor_count = n;
        }
        if let Some(enabled) = lookup("LUNIX_SIMULATION") {
            config.simulation.enabled = !matches!(
                enabled.to_ascii_lowercase().as_str(),
                "0" | "false" | "off" | "no"
            );
        }
        if let Some(interval) = lookup("LUNIX_SIM_INTERVAL_MS")
            && let Ok(ms) = interval.parse()
        {
            config.simulation.interval_ms = ms;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv() {
        let vars = parse_dotenv(
            "# sensors\n\
             LUNIX_SENSOR_COUNT=4\n\
             \n\
             LUNIX_SIM_INTERVAL_MS = \"250\"\n\
             NAME='lab bench'\n\
             garbage line\n",
        );
        assert_eq!(vars.get("LUNIX_SENSOR_COUNT").map(String::as_str), Some("4"));
        assert_eq!(vars.get("LUNIX_SIM_INTERVAL_MS").map(String::as_str), Some("250"));
        assert_eq!(vars.get("NAME").map(String::as_str), Some("lab bench"));
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.registry.sensor_count, 16);
        assert_eq!(config.simulation.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let vars =
            parse_dotenv("LUNIX_SENSOR_COUNT=2\nLUNIX_SIMULATION=off\nLUNIX_SIM_INTERVAL_MS=50");
        let config = Config::from_lookup(|key| vars.get(key).cloned());
        assert_eq!(config.registry.sensor_count, 2);
        assert!(!config.simulation.enabled);
        assert_eq!(config.simulation.interval_ms, 50);
    }

    #[test]
    fn test_unparsable_values_keep_defaults() {
        let config = Config::from_lookup(|key| match key {
            "LUNIX_SENSOR_COUNT" => Some("many".to_string()),
            _ => None,
        });
        assert_eq!(config.registry.sensor_count, 16);
    }
}
