use anyhow::Result;
use std::sync::Arc;

use super::{confirm_on_stdin, ClientContext};
use crate::catalog::{CatalogWorkflow, FetchOutcome, ServerAck};

pub struct ListCommand {
    pub pages: u32,
    pub json: bool,
}

impl ListCommand {
    pub async fn execute(&self, context: &ClientContext) -> Result<()> {
        let catalog = CatalogWorkflow::new(Arc::clone(&context.api), context.config.catalog.page_size);

        let mut outcome = catalog.load_initial().await?;
        for _ in 1..self.pages.max(1) {
            if let FetchOutcome::Loaded { reached_end: true, .. } = outcome {
                break;
            }
            outcome = catalog.fetch_page(false).await?;
        }

        let state = catalog.snapshot().await;
        if self.json {
            let items: Vec<_> = state
                .items
                .iter()
                .map(|item| {
                    let urls = catalog.resolve_urls(item);
                    serde_json::json!({
                        "id": item.id,
                        "url": urls.display_url,
                        "thumb_url": urls.thumbnail_url,
                        "created_at": item.created_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
            return Ok(());
        }

        if state.items.is_empty() {
            println!("📋 The gallery is empty");
            println!("   💡 Save a cutout with: mixmatch capture <photo> --save");
            return Ok(());
        }

        println!("🖼️  {} items (next offset {})", state.items.len(), state.cursor);
        for item in &state.items {
            let urls = catalog.resolve_urls(item);
            match item.created_at {
                Some(created) => println!("  {}  {}  {}", item.id, created.format("%Y-%m-%d %H:%M"), urls.thumbnail_url),
                None => println!("  {}  {}", item.id, urls.thumbnail_url),
            }
        }
        Ok(())
    }
}

pub struct DeleteCommand {
    pub id: String,
    pub yes: bool,
}

impl DeleteCommand {
    pub async fn execute(&self, context: &ClientContext) -> Result<()> {
        if !self.yes && !confirm_on_stdin(&format!("Delete item {}?", self.id))? {
            println!("❌ Delete cancelled");
            return Ok(());
        }

        let catalog = CatalogWorkflow::new(Arc::clone(&context.api), context.config.catalog.page_size);
        let outcome = catalog.delete(&self.id).await;

        // The workflow already logged a server failure; report it and carry on
        match outcome.ack {
            ServerAck::Confirmed => println!("🗑️  Deleted {}", self.id),
            ServerAck::Unconfirmed { status, body_prefix } => {
                println!("⚠️  Server did not confirm the delete: HTTP {status} {body_prefix}");
            }
            ServerAck::Unreachable { detail } => {
                println!("⚠️  Server unreachable: {detail}");
            }
        }
        Ok(())
    }
}
