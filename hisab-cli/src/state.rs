use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$HISAB_HOME`, else `~/.hisab`
pub fn hisab_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("HISAB_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".hisab"))
}

pub fn ensure_hisab_home() -> Result<PathBuf> {
    let dir = hisab_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
