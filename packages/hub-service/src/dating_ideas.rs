use uuid::Uuid;

use crate::{HubService, Result, Session, records};
use hub_domain::{
	Gate,
	dating_ideas::{DatingIdea, IdeaDraft, IdeaFilter},
	filter,
};
use hub_storage::{Direction, Select, Table};

const NOUN: &str = "Dating idea";

impl HubService {
	/// The user's ideas plus every public one, newest first.
	pub async fn list_dating_ideas(
		&self,
		session: &Session,
		criteria: &IdeaFilter,
	) -> Result<Vec<DatingIdea>> {
		let query = Select::visible(session.user_id(), "is_public")
			.order_by("created_at", Direction::Desc);
		let ideas = self.select_rows(Table::DatingIdeas, &query).await?;

		Ok(filter::apply(ideas, criteria))
	}

	pub async fn create_dating_idea(
		&self,
		session: &Session,
		mut draft: IdeaDraft,
	) -> Result<DatingIdea> {
		draft.gate(&self.cfg.limits)?;

		let payload = records::owned_payload(&draft, session)?;

		self.insert_row(Table::DatingIdeas, session, payload).await
	}

	pub async fn update_dating_idea(
		&self,
		session: &Session,
		id: Uuid,
		mut draft: IdeaDraft,
	) -> Result<DatingIdea> {
		draft.gate(&self.cfg.limits)?;

		let payload = records::owned_payload(&draft, session)?;

		self.update_row(Table::DatingIdeas, session, id, &payload, NOUN).await
	}

	pub async fn delete_dating_idea(&self, session: &Session, id: Uuid) -> Result<()> {
		self.delete_row(Table::DatingIdeas, session, id, NOUN).await
	}
}
