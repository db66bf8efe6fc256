use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

const JOURNAL_FILE: &str = "data.json";
const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "mood_journal";

pub const JOURNAL_PATH_ENV: &str = "MOOD_JOURNAL_PATH";
pub const CONFIG_PATH_ENV: &str = "MOOD_JOURNAL_CONFIG";
pub const STATE_DIR_ENV: &str = "MOOD_JOURNAL_STATE_DIR";

/// Picks the journal document: `--journal`, then the environment, then the
/// config file, then the state directory.
pub fn resolve_journal_path(cli_path: Option<PathBuf>, config: &Config) -> PathBuf {
	select_journal_path(cli_path, env::var_os(JOURNAL_PATH_ENV), config, &state_dir())
}

pub fn config_path() -> PathBuf {
	if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return absolutize(path);
		}
	}

	state_dir().join(CONFIG_FILE)
}

fn select_journal_path(
	cli_path: Option<PathBuf>,
	env_path: Option<OsString>,
	config: &Config,
	state_dir: &Path,
) -> PathBuf {
	if let Some(path) = cli_path {
		return absolutize(path);
	}

	if let Some(path) = env_path {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return absolutize(path);
		}
	}

	if let Some(path) = &config.journal_path {
		return absolutize(path.clone());
	}

	state_dir.join(JOURNAL_FILE)
}

fn state_dir() -> PathBuf {
	if let Some(path) = env::var_os(STATE_DIR_ENV) {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join(APP_DIR);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path).join(".local").join("state").join(APP_DIR);
	}

	PathBuf::from(".mood_journal")
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}
