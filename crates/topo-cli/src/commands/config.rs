use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use topo_core::config::EngineConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save the default EngineConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let toml_str = EngineConfig::default().to_toml_string()?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}

/// Load `path` if given, else defaults.
pub fn load_or_default(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_default_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topo.toml");

        run(&ConfigArgs {
            output: Some(path.clone()),
        })
        .unwrap();

        let loaded = load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = load_or_default(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_no_path_gives_defaults() {
        assert_eq!(load_or_default(None).unwrap(), EngineConfig::default());
    }
}
