use anyhow::Result;
use std::path::PathBuf;

use crate::config::MixMatchConfig;

pub struct ConfigCommand {
    pub write: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn execute(&self, config: &MixMatchConfig) -> Result<()> {
        println!("{}", toml::to_string_pretty(config)?);

        if let Some(path) = &self.write {
            config.save_to_file(path)?;
            println!("💾 Configuration written to {}", path.display());
        }
        Ok(())
    }
}
