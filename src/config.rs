use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("io error on {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config {}: {source}", .path.display())]
	Decode {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub journal_path: Option<PathBuf>,
	pub log_level: Option<String>,
}

impl Config {
	/// Reads the TOML config. A missing file means defaults.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let raw = match fs::read_to_string(path) {
			Ok(raw) => raw,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
			Err(source) => {
				return Err(ConfigError::Io {
					path: path.to_path_buf(),
					source,
				});
			}
		};

		toml::from_str(&raw).map_err(|source| ConfigError::Decode {
			path: path.to_path_buf(),
			source,
		})
	}

	pub fn log_level(&self) -> &str {
		self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
	}
}

#[cfg(test)]
mod tests {
	use std::fs;
	use std::path::PathBuf;

	use super::{Config, ConfigError};

	#[test]
	fn missing_file_means_defaults() {
		let dir = tempfile::tempdir().expect("tempdir");
		let config = Config::load(&dir.path().join("config.toml")).expect("load should succeed");
		assert_eq!(config, Config::default());
		assert_eq!(config.log_level(), "warn");
	}

	#[test]
	fn reads_journal_path_and_level() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = dir.path().join("config.toml");
		fs::write(&path, "journal_path = \"/tmp/jurnal.json\"\nlog_level = \"debug\"\n").expect("seed config");

		let config = Config::load(&path).expect("load should succeed");
		assert_eq!(config.journal_path, Some(PathBuf::from("/tmp/jurnal.json")));
		assert_eq!(config.log_level(), "debug");
	}

	#[test]
	fn invalid_config_is_an_error() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path = dir.path().join("config.toml");
		fs::write(&path, "jurnal = [").expect("seed config");

		let err = Config::load(&path).expect_err("invalid TOML should fail");
		assert!(matches!(err, ConfigError::Decode { .. }));
	}
}
