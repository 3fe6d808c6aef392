use anyhow::{bail, Context, Result};
use osm_preprocessor::overpass::Endpoints;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, time::Duration};
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Primary, secondary-1 and secondary-2 Overpass interpreters
    pub endpoints: Endpoints,
    /// Client side bound on a single endpoint attempt
    pub request_timeout_secs: u64,
    /// `[timeout:N]` sent along with the query
    pub server_timeout_secs: u32,
    pub max_body_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoints: Endpoints::default(),
            request_timeout_secs: 30,
            server_timeout_secs: 25,
            max_body_bytes: 256 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let f = File::open(path)
            .with_context(|| format!("Failed to open config {}", path.display()))?;
        let config: Config = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("Failed to parse config {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        if self.max_body_bytes == 0 {
            bail!("max_body_bytes must be greater than zero");
        }
        if u64::from(self.server_timeout_secs) >= self.request_timeout_secs {
            warn!(
                "Overpass may keep working for {}s but requests give up after {}s",
                self.server_timeout_secs, self.request_timeout_secs
            );
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn no_path_gives_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.endpoints.iter().count(), 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let f = write_config(
            r#"{
                "endpoints": ["http://a/api", "http://b/api", "http://c/api"],
                "request_timeout_secs": 60
            }"#,
        );

        let config = Config::load(Some(f.path())).unwrap();
        assert_eq!(
            config.endpoints,
            Endpoints::new("http://a/api", "http://b/api", "http://c/api")
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.server_timeout_secs, 25);
    }

    #[test]
    fn endpoint_list_must_have_three_entries() {
        let f = write_config(r#"{"endpoints": ["http://a/api", "http://b/api"]}"#);
        assert!(Config::load(Some(f.path())).is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let f = write_config(r#"{"request_timeout_secs": 0}"#);
        assert!(Config::load(Some(f.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(dir.path().join("absent.json").as_path())).is_err());
    }
}
