pub mod client;
pub mod db;
pub mod pg;
pub mod rest;
pub mod schema;
pub mod table;

mod error;

pub use client::{
	BoxFuture, Condition, DataClient, Direction, Mutation, Order, Scope, Select, Target, UserId,
};
pub use error::Error;
pub use table::Table;

use std::sync::Arc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Builds the client selected by `storage.backend`, preparing the schema when the backend is
/// Postgres.
pub async fn connect(cfg: &hub_config::Storage) -> Result<Arc<dyn DataClient>> {
	match cfg.backend.as_str() {
		hub_config::BACKEND_POSTGRES => {
			let postgres = cfg.postgres.as_ref().ok_or_else(|| {
				Error::InvalidArgument("storage.postgres section is missing.".to_string())
			})?;
			let db = db::Db::connect(postgres).await?;

			db.ensure_schema().await?;

			tracing::info!(backend = "postgres", "Data client ready.");

			Ok(Arc::new(pg::PgClient::new(db.pool)))
		},
		hub_config::BACKEND_REST => {
			let rest = cfg.rest.as_ref().ok_or_else(|| {
				Error::InvalidArgument("storage.rest section is missing.".to_string())
			})?;
			let client = rest::RestClient::new(rest)?;

			tracing::info!(backend = "rest", url = %rest.url, "Data client ready.");

			Ok(Arc::new(client))
		},
		other => Err(Error::InvalidArgument(format!("Unknown storage backend {other:?}."))),
	}
}
