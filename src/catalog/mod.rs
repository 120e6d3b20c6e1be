pub mod item;
pub mod workflow;

pub use item::{parse_timestamp, CatalogItem, ResolvedUrls};
pub use workflow::{
    CatalogState, CatalogWorkflow, DeleteOutcome, FetchOutcome, ServerAck, DEFAULT_PAGE_SIZE,
};
