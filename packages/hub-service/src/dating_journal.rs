use uuid::Uuid;

use crate::{HubService, Result, Session, records};
use hub_domain::{
	Gate,
	dating_journal::{JournalDraft, JournalEntry, JournalFilter},
	filter,
};
use hub_storage::{Direction, Select, Table};

const NOUN: &str = "Journal entry";

impl HubService {
	/// Most recent date first.
	pub async fn list_journal_entries(
		&self,
		session: &Session,
		criteria: &JournalFilter,
	) -> Result<Vec<JournalEntry>> {
		let query = Select::owned(session.user_id())
			.order_by("date", Direction::Desc)
			.order_by("created_at", Direction::Desc);
		let entries = self.select_rows(Table::DatingJournalEntries, &query).await?;

		Ok(filter::apply(entries, criteria))
	}

	pub async fn create_journal_entry(
		&self,
		session: &Session,
		mut draft: JournalDraft,
	) -> Result<JournalEntry> {
		draft.gate(&self.cfg.limits)?;

		let payload = records::owned_payload(&draft, session)?;

		self.insert_row(Table::DatingJournalEntries, session, payload).await
	}

	pub async fn update_journal_entry(
		&self,
		session: &Session,
		id: Uuid,
		mut draft: JournalDraft,
	) -> Result<JournalEntry> {
		draft.gate(&self.cfg.limits)?;

		let payload = records::owned_payload(&draft, session)?;

		self.update_row(Table::DatingJournalEntries, session, id, &payload, NOUN).await
	}

	pub async fn delete_journal_entry(&self, session: &Session, id: Uuid) -> Result<()> {
		self.delete_row(Table::DatingJournalEntries, session, id, NOUN).await
	}
}
