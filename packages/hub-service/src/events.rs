use uuid::Uuid;

use crate::{HubService, Result, Session, records};
use hub_domain::{
	Gate,
	events::{Event, EventDraft, EventFilter},
	filter,
};
use hub_storage::{Direction, Select, Table};

const NOUN: &str = "Event";

impl HubService {
	/// Soonest first. Includes public events of other users.
	pub async fn list_events(
		&self,
		session: &Session,
		criteria: &EventFilter,
	) -> Result<Vec<Event>> {
		let query = Select::visible(session.user_id(), "is_public")
			.order_by("event_date", Direction::Asc)
			.order_by("created_at", Direction::Asc);
		let events = self.select_rows(Table::Events, &query).await?;

		Ok(filter::apply(events, criteria))
	}

	pub async fn create_event(&self, session: &Session, mut draft: EventDraft) -> Result<Event> {
		draft.gate(&self.cfg.limits)?;

		let payload = records::owned_payload(&draft, session)?;

		self.insert_row(Table::Events, session, payload).await
	}

	pub async fn update_event(
		&self,
		session: &Session,
		id: Uuid,
		mut draft: EventDraft,
	) -> Result<Event> {
		draft.gate(&self.cfg.limits)?;

		let payload = records::owned_payload(&draft, session)?;

		self.update_row(Table::Events, session, id, &payload, NOUN).await
	}

	pub async fn delete_event(&self, session: &Session, id: Uuid) -> Result<()> {
		self.delete_row(Table::Events, session, id, NOUN).await
	}
}
