//! Client-side session handling for the front end running in a tab.

mod local_cart;
mod refresh;
mod site;

pub use local_cart::{CartStoreError, JsonFileCartStore, LocalCartStore, MemoryCartStore};
pub use refresh::{RefreshOrchestrator, RefreshOutcome};
pub use site::SiteClient;
