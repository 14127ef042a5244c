use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_finance::{DEFAULT_WINDOW_MONTHS, MAX_WINDOW_MONTHS};
use tally_ingest::DEFAULT_DATE_FORMATS;

use crate::state::{ensure_parent_dir, tally_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportSection,
    pub ingest: IngestSection,
    pub profile: ProfileSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Length of the trailing window in months
    pub months: u32,
    /// Emit every month of the window, even with no transactions
    pub dense: bool,
    /// Category mapping used when `--mapping` is not passed. A relative path
    /// is taken relative to the directory holding the config file.
    pub mapping: Option<PathBuf>,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            months: DEFAULT_WINDOW_MONTHS,
            dense: false,
            mapping: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// strftime patterns tried in order for the date column
    pub date_formats: Vec<String>,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSection {
    /// IANA timezone used to decide "today" when no as-of date is given
    pub timezone: String,
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(tally_home()?.join("config.toml")),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut cfg: Config =
        toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;

    ensure!(
        (1..=MAX_WINDOW_MONTHS).contains(&cfg.report.months),
        "{}: [report] months must be between 1 and {MAX_WINDOW_MONTHS}, got {}",
        path.display(),
        cfg.report.months
    );

    if let (Some(mapping), Some(dir)) = (cfg.report.mapping.as_mut(), path.parent()) {
        if mapping.is_relative() {
            *mapping = dir.join(&*mapping);
        }
    }
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    save_config(&Config::default(), path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.report.months, 12);
        assert_eq!(cfg.ingest.date_formats, vec!["%Y-%m-%d", "%m/%d/%Y"]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[report]\ndense = true\n\n[profile]\ntimezone = \"America/Chicago\"\n")
            .unwrap();
        let cfg = load_config(&path).unwrap();
        assert!(cfg.report.dense);
        assert_eq!(cfg.report.months, 12);
        assert_eq!(cfg.profile.timezone, "America/Chicago");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.report.mapping = Some(PathBuf::from("/tmp/map.json"));
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[report\nmonths = ").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_relative_mapping_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[report]\nmapping = \"maps/categories.json\"\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(
            cfg.report.mapping,
            Some(dir.path().join("maps").join("categories.json"))
        );
    }

    #[test]
    fn test_window_months_out_of_range_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        for months in ["0", "5000"] {
            fs::write(&path, format!("[report]\nmonths = {months}\n")).unwrap();
            let err = load_config(&path).unwrap_err();
            assert!(format!("{err:#}").contains("months must be between 1 and 1200"));
        }
    }
}
