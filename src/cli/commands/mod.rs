use anyhow::Result;
use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::config::MixMatchConfig;
use crate::http::{HttpImageApi, ImageApi};
use crate::observability::ApiMetrics;

pub mod capture;
pub mod catalog;
pub mod config;

/// What every subcommand needs: the effective configuration and one shared client.
#[derive(Clone)]
pub struct ClientContext {
    pub config: MixMatchConfig,
    pub api: Arc<dyn ImageApi>,
    pub metrics: Arc<ApiMetrics>,
}

impl ClientContext {
    pub fn connect(config: MixMatchConfig) -> Result<Self> {
        let client = HttpImageApi::new(&config.server, &config.http)?;
        let metrics = client.metrics();
        Ok(Self {
            config,
            api: Arc::new(client),
            metrics,
        })
    }

    pub fn with_api(config: MixMatchConfig, api: Arc<dyn ImageApi>) -> Self {
        Self {
            config,
            api,
            metrics: Arc::new(ApiMetrics::new()),
        }
    }
}

/// Ask a yes/no question on stdout, reading the answer from `input`.
pub fn confirm(question: &str, input: &mut impl BufRead) -> Result<bool> {
    print!("{question} [y/N]: ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

pub fn confirm_on_stdin(question: &str) -> Result<bool> {
    confirm(question, &mut std::io::stdin().lock())
}

pub fn show_how_to_get_started() -> Result<()> {
    println!("👕 MixMatch - garment cutouts for your wardrobe");
    println!();
    println!("To get started:");
    println!("  📸 mixmatch capture <photo>          # Preview the cutout of a photo");
    println!("  💾 mixmatch capture <photo> --save   # Preview and save it to the gallery");
    println!("  🖼️  mixmatch list                     # Browse the gallery");
    println!("  🗑️  mixmatch delete <id>              # Remove an item");
    println!("  ⚙️  mixmatch config                   # Show the effective configuration");
    println!();
    println!("💡 Point the client at your server with MIXMATCH_API_BASE=http://host:port");
    Ok(())
}
