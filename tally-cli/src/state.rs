use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn tally_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    Ok(())
}

/// Where a mapping file is looked for when neither the CLI nor config names one.
pub fn default_mapping_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("category_mappings.json"))
}
