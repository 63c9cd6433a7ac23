//! Configuration commands

use crate::args::ConfigAction;
use crate::console::CliConsole;
use anyhow::Context;
use motofix_core::ClientConfig;
use std::path::Path;

pub fn run(
    action: ConfigAction,
    config: &ClientConfig,
    loaded_from: Option<&Path>,
    console: &CliConsole,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => show(config, loaded_from, console),
        ConfigAction::Init { path, force } => init(&path, force, console),
    }
}

fn show(config: &ClientConfig, loaded_from: Option<&Path>, console: &CliConsole) -> anyhow::Result<()> {
    match loaded_from {
        Some(path) => console.info(&format!("Loaded from {}", path.display())),
        None => console.info("Using built-in defaults"),
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn init(path: &Path, force: bool, console: &CliConsole) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }
    let content = toml::to_string_pretty(&ClientConfig::default())?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    console.success(&format!("Wrote {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("motofix.toml");
        init(&path, false, &CliConsole::new(false)).unwrap();

        let loaded = motofix_core::config::load_from_file(&path).unwrap();
        assert_eq!(loaded, ClientConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("motofix.toml");
        std::fs::write(&path, "# mine").unwrap();

        assert!(init(&path, false, &CliConsole::new(false)).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");

        init(&path, true, &CliConsole::new(false)).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "# mine");
    }
}
