use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "mixmatch")]
#[command(about = "Capture garment cutouts and manage the MixMatch gallery")]
#[command(long_about = "MixMatch sends a photo to the background-removal service, shows the \
                       returned cutout and saves it to your gallery on request. Start with \
                       'mixmatch capture <photo>' or browse with 'mixmatch list'.")]
pub struct Cli {
    /// Log request counters when the command finishes
    #[arg(long, global = true, help = "Log API request statistics after the command")]
    pub stats: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove the background from a photo and optionally save the cutout
    Capture {
        /// Photo to send for preview
        #[arg(help = "Path of the photo to use as the captured frame")]
        image: PathBuf,
        /// Where to write the decoded cutout
        #[arg(long, help = "Write the cutout PNG to this path")]
        out: Option<PathBuf>,
        /// Commit the cutout to the gallery
        #[arg(long, help = "Upload the previewed cutout to the gallery")]
        save: bool,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long, help = "Save without asking for confirmation")]
        yes: bool,
    },
    /// List gallery items page by page
    List {
        /// Pages to load, the first included
        #[arg(long, default_value = "1", help = "Number of pages to load")]
        pages: u32,
        /// Print the items as JSON
        #[arg(long, help = "Print items as a JSON array")]
        json: bool,
    },
    /// Delete a gallery item
    Delete {
        /// Item id as listed
        #[arg(help = "Id of the item to delete")]
        id: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long, help = "Delete without asking for confirmation")]
        yes: bool,
    },
    /// Show the effective configuration
    Config {
        /// Save the effective configuration as TOML
        #[arg(long, help = "Write the effective configuration to this file")]
        write: Option<PathBuf>,
    },
}
