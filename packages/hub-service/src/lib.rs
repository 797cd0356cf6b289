pub mod blog;
pub mod bucket_list;
pub mod dashboard;
pub mod dating_ideas;
pub mod dating_journal;
pub mod events;
pub mod session;

mod error;
mod records;

pub use dashboard::{ReorderOutcome, SyncStatus};
pub use error::{Error, Result};
pub use session::Session;

use std::sync::Arc;

use hub_config::Config;
use hub_storage::DataClient;

pub struct HubService {
	pub cfg: Config,
	pub client: Arc<dyn DataClient>,
}
impl HubService {
	pub fn new(cfg: Config, client: Arc<dyn DataClient>) -> Self {
		Self { cfg, client }
	}
}
