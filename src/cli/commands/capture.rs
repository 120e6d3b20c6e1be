use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::{confirm_on_stdin, ClientContext};
use crate::capture::{CaptureWorkflow, StillImageSurface};

pub struct CaptureCommand {
    pub image: PathBuf,
    pub out: Option<PathBuf>,
    pub save: bool,
    pub yes: bool,
}

impl CaptureCommand {
    pub async fn execute(&self, context: &ClientContext) -> Result<()> {
        let surface = Arc::new(StillImageSurface::new(&self.image));
        let workflow = CaptureWorkflow::new(Arc::clone(&context.api), surface)
            .with_metrics(Arc::clone(&context.metrics));
        self.run(&workflow, context).await
    }

    async fn run(&self, workflow: &CaptureWorkflow, context: &ClientContext) -> Result<()> {
        println!("📸 Sending {} for preview...", self.image.display());

        let cutout = match workflow.capture().await {
            Ok(cutout) => cutout,
            Err(e) => {
                println!("❌ {}: {e}", e.title());
                if e.is_preview_error() {
                    println!("   💡 The photo was discarded; run capture again to retry");
                }
                return Err(e.into());
            }
        };
        println!("✅ Preview ready ({} base64 chars)", cutout.as_str().len());

        if let Some(out) = &self.out {
            let png = cutout
                .decode_png()
                .context("Preview payload is not valid base64")?;
            tokio::fs::write(out, &png)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("🖼️  Cutout written to {} ({} bytes)", out.display(), png.len());
        }

        if !self.save {
            workflow.retake().await?;
            println!("💡 Add --save to store this cutout in the gallery");
            return Ok(());
        }

        if !self.yes && !confirm_on_stdin("Save this cutout to the gallery?")? {
            workflow.retake().await?;
            println!("❌ Cutout discarded");
            return Ok(());
        }

        match workflow.commit().await {
            Ok(receipt) => {
                match receipt.saved_item {
                    Some(item) => {
                        println!("💾 Saved as {}", item.id);
                        println!("   🔗 {}", context.api.resolve_url(&item.display_url));
                    }
                    None => println!("💾 Saved"),
                }
                Ok(())
            }
            Err(e) => {
                println!("❌ {}: {e}", e.title());
                Err(e.into())
            }
        }
    }
}
