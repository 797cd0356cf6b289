use std::sync::Arc;

use hub_config::Config;
use hub_service::HubService;
use hub_storage::DataClient;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<HubService>,
}
impl AppState {
	/// Connects the configured storage backend.
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let client = hub_storage::connect(&config.storage).await?;

		Ok(Self::with_client(config, client))
	}

	pub fn with_client(config: Config, client: Arc<dyn DataClient>) -> Self {
		Self { service: Arc::new(HubService::new(config, client)) }
	}
}
