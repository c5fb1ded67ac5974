use anyhow::{Context, Result};
use hisab_engine::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_hisab_home;

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_hisab_home()?.join("config.toml"))
}

pub fn load_config() -> Result<EngineConfig> {
    load_config_from(&config_path()?)
}

/// Missing file means defaults; missing keys fall back per section
pub fn load_config_from(p: &Path) -> Result<EngineConfig> {
    if !p.exists() {
        return Ok(EngineConfig::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &EngineConfig, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&EngineConfig::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config_from(&p)?;
    println!("# {}", p.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hisab-cli-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let cfg = load_config_from(&scratch_file("absent.toml")).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let p = scratch_file("partial.toml");
        fs::write(&p, "[remote]\nenabled = true\ntimeout_ms = 2500\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert!(cfg.remote.enabled);
        assert_eq!(cfg.remote.timeout_ms, 2500);
        assert_eq!(cfg.remote.endpoint, EngineConfig::default().remote.endpoint);
        assert_eq!(cfg.parser.timezone, "Asia/Dhaka");
    }

    #[test]
    fn test_save_then_load() {
        let p = scratch_file("saved.toml");
        let mut cfg = EngineConfig::default();
        cfg.remote.api_key = Some("secret".to_string());
        cfg.parser.timezone = "Asia/Kolkata".to_string();
        save_config_to(&cfg, &p).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }
}
