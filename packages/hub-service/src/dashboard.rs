//! Dashboard layout persistence.
//!
//! A reorder is written as one position update per changed row. The writes are not atomic as a
//! group, so every reorder ends by reading the layout back and comparing it with the intended
//! one. A reorder that could not be fully applied is rolled back on a best-effort basis and the
//! caller receives the layout the store actually holds.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, HubService, Result, Session, records};
use hub_domain::dashboard::{self, DashboardWidget, Divergence, PositionChange, WidgetPatch};
use hub_storage::{Direction, Mutation, Select, Table, Target};

const NOUN: &str = "Widget";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
	/// The drop had no destination or moved nothing.
	Unchanged,
	/// Every write landed and the store confirmed the intended layout.
	Synced { writes: usize, retries: u32 },
	/// Writes landed but the layout could not be read back.
	Unconfirmed { writes: usize, message: String },
	/// The store does not hold the intended layout. The returned layout is what it holds.
	Reverted { failed: Vec<Uuid>, divergences: Vec<Divergence>, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReorderOutcome {
	pub layout: Vec<DashboardWidget>,
	pub sync: SyncStatus,
}

struct WriteReport {
	committed: Vec<PositionChange>,
	failed: Vec<Uuid>,
	retries: u32,
	last_error: Option<String>,
}

impl HubService {
	/// The user's widgets in display order, creating the default set when none exist.
	pub async fn load_layout(&self, session: &Session) -> Result<Vec<DashboardWidget>> {
		match self.fetch_layout(session).await {
			Ok(widgets) if !widgets.is_empty() => Ok(widgets),
			Ok(_) => self.create_default_layout(session).await,
			Err(err) => {
				tracing::warn!(
					error = %err,
					user_id = %session.user_id(),
					"Failed to load dashboard layout. Creating the default layout."
				);

				self.create_default_layout(session).await
			},
		}
	}

	/// Moves the widget at `source` to `destination` and persists the new positions.
	///
	/// Unlike [`HubService::load_layout`], a failed fetch of the current layout is returned as an
	/// error. Defaults are only created when the store reports no widgets at all.
	pub async fn reorder_layout(
		&self,
		session: &Session,
		source: usize,
		destination: Option<usize>,
	) -> Result<ReorderOutcome> {
		let mut current = self.fetch_layout(session).await?;

		if current.is_empty() {
			current = self.create_default_layout(session).await?;
		}

		let Some(intended) = dashboard::reorder(&current, source, destination)? else {
			return Ok(ReorderOutcome { layout: current, sync: SyncStatus::Unchanged });
		};
		let changes = dashboard::position_changes(&current, &intended);

		if changes.is_empty() {
			return Ok(ReorderOutcome { layout: intended, sync: SyncStatus::Unchanged });
		}

		let report = self.write_positions(session, &changes).await;
		let confirmed = match self.fetch_layout(session).await {
			Ok(confirmed) => confirmed,
			Err(err) if report.failed.is_empty() => {
				tracing::warn!(
					error = %err,
					user_id = %session.user_id(),
					"Failed to confirm dashboard layout after reorder."
				);

				return Ok(ReorderOutcome {
					layout: intended,
					sync: SyncStatus::Unconfirmed {
						writes: report.committed.len(),
						message: err.to_string(),
					},
				});
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					user_id = %session.user_id(),
					"Failed to confirm dashboard layout after a failed write."
				);

				return Ok(
					self.settle_failed_reorder(session, &current, report, None, Vec::new()).await
				);
			},
		};
		let divergences = dashboard::diverging_positions(&intended, &confirmed);

		if report.failed.is_empty() && divergences.is_empty() {
			tracing::info!(
				user_id = %session.user_id(),
				writes = report.committed.len(),
				retries = report.retries,
				"Dashboard layout synced."
			);

			return Ok(ReorderOutcome {
				layout: confirmed,
				sync: SyncStatus::Synced { writes: report.committed.len(), retries: report.retries },
			});
		}

		let outcome = self
			.settle_failed_reorder(session, &current, report, Some(confirmed), divergences)
			.await;

		Ok(outcome)
	}

	/// Deletes every widget row of the user and recreates the defaults.
	pub async fn reset_layout(&self, session: &Session) -> Result<Vec<DashboardWidget>> {
		let removed =
			self.client.delete(Table::DashboardLayout, session.user_id(), Target::All).await?;

		tracing::info!(user_id = %session.user_id(), removed, "Dashboard layout reset.");

		self.create_default_layout(session).await
	}

	pub async fn update_widget(
		&self,
		session: &Session,
		id: Uuid,
		patch: WidgetPatch,
	) -> Result<DashboardWidget> {
		if patch.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Widget patch must set is_active or size.".to_string(),
			});
		}

		let mut payload = owner_patch(session);

		if let Some(is_active) = patch.is_active {
			payload.insert("is_active".to_string(), Value::Bool(is_active));
		}
		if let Some(size) = patch.size {
			payload.insert("size".to_string(), serde_json::to_value(size)?);
		}

		self.update_row(Table::DashboardLayout, session, id, &payload, NOUN).await
	}

	async fn fetch_layout(&self, session: &Session) -> Result<Vec<DashboardWidget>> {
		let query = Select::owned(session.user_id())
			.order_by("position", Direction::Asc)
			.order_by("created_at", Direction::Asc);
		let mut widgets: Vec<DashboardWidget> =
			self.select_rows(Table::DashboardLayout, &query).await?;

		dashboard::sort_layout(&mut widgets);

		Ok(widgets)
	}

	async fn create_default_layout(&self, session: &Session) -> Result<Vec<DashboardWidget>> {
		let rows = dashboard::default_layout()
			.iter()
			.map(|draft| records::owned_payload(draft, session))
			.collect::<Result<Vec<_>>>()?;
		let inserted =
			self.client.insert(Table::DashboardLayout, session.user_id(), &rows).await?;
		let mut widgets: Vec<DashboardWidget> = records::decode_rows(inserted)?;

		dashboard::sort_layout(&mut widgets);

		tracing::info!(
			user_id = %session.user_id(),
			widgets = widgets.len(),
			"Created default dashboard layout."
		);

		Ok(widgets)
	}

	// Stops at the first row whose write keeps failing. Later rows are left untouched.
	async fn write_positions(&self, session: &Session, changes: &[PositionChange]) -> WriteReport {
		let mut report =
			WriteReport { committed: Vec::new(), failed: Vec::new(), retries: 0, last_error: None };

		for change in changes {
			match self.write_position(session, change.widget_id, change.to).await {
				Ok(retries) => {
					report.retries += retries;
					report.committed.push(*change);
				},
				Err(err) => {
					report.failed.push(change.widget_id);
					report.last_error = Some(err.to_string());

					break;
				},
			}
		}

		report
	}

	/// Writes one position, retrying up to the configured attempts. Returns the retry count.
	async fn write_position(
		&self,
		session: &Session,
		widget_id: Uuid,
		position: i32,
	) -> Result<u32> {
		let attempts = self.cfg.dashboard.max_write_attempts.max(1);
		let target = Mutation { user_id: session.user_id(), id: widget_id };
		let mut payload = owner_patch(session);

		payload.insert("position".to_string(), Value::from(position));

		let mut attempt = 1;

		loop {
			match self.client.update(Table::DashboardLayout, target, &payload).await {
				Ok(Some(_)) => return Ok(attempt - 1),
				Ok(None) => {
					return Err(Error::NotFound {
						message: format!("{NOUN} {widget_id} not found."),
					});
				},
				Err(err) if attempt < attempts => {
					tracing::warn!(
						error = %err,
						widget_id = %widget_id,
						attempt,
						"Widget position write failed. Retrying."
					);

					attempt += 1;
				},
				Err(err) => return Err(err.into()),
			}
		}
	}

	// Returns the layout the store holds after a reorder that did not persist. When the store
	// cannot be read, the layout from before the reorder is the best available answer.
	async fn settle_failed_reorder(
		&self,
		session: &Session,
		current: &[DashboardWidget],
		report: WriteReport,
		confirmed: Option<Vec<DashboardWidget>>,
		divergences: Vec<Divergence>,
	) -> ReorderOutcome {
		let message = report.last_error.clone().unwrap_or_else(|| {
			format!("{} widget positions diverged from the intended layout.", divergences.len())
		});

		tracing::warn!(
			user_id = %session.user_id(),
			failed = report.failed.len(),
			divergences = divergences.len(),
			message = %message,
			"Dashboard reorder did not persist."
		);

		let layout = if self.cfg.dashboard.revert_on_failure {
			self.revert_positions(session, &report.committed).await;

			match self.fetch_layout(session).await {
				Ok(layout) => layout,
				Err(err) => {
					tracing::warn!(
						error = %err,
						user_id = %session.user_id(),
						"Failed to fetch dashboard layout after revert."
					);

					current.to_vec()
				},
			}
		} else {
			confirmed.unwrap_or_else(|| current.to_vec())
		};

		ReorderOutcome {
			layout,
			sync: SyncStatus::Reverted { failed: report.failed, divergences, message },
		}
	}

	async fn revert_positions(&self, session: &Session, committed: &[PositionChange]) {
		for change in committed.iter().rev() {
			if let Err(err) = self.write_position(session, change.widget_id, change.from).await {
				tracing::warn!(
					error = %err,
					widget_id = %change.widget_id,
					"Failed to revert widget position."
				);
			}
		}
	}
}

fn owner_patch(session: &Session) -> Map<String, Value> {
	let mut payload = Map::new();

	payload.insert("user_id".to_string(), Value::String(session.user_id().to_string()));

	payload
}
