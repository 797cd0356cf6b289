use time::OffsetDateTime;
use uuid::Uuid;

use crate::{HubService, Result, Session, records};
use hub_domain::{
	Gate,
	bucket_list::{BucketListDraft, BucketListFilter, BucketListItem},
	filter, writegate,
};
use hub_storage::{Direction, Select, Table};

const NOUN: &str = "Bucket list item";

impl HubService {
	/// Newest first.
	pub async fn list_bucket_list(
		&self,
		session: &Session,
		criteria: &BucketListFilter,
	) -> Result<Vec<BucketListItem>> {
		let query = Select::owned(session.user_id()).order_by("created_at", Direction::Desc);
		let items = self.select_rows(Table::BucketListItems, &query).await?;

		Ok(filter::apply(items, criteria))
	}

	pub async fn create_bucket_list_item(
		&self,
		session: &Session,
		mut draft: BucketListDraft,
	) -> Result<BucketListItem> {
		draft.gate(&self.cfg.limits)?;

		let completed_at =
			writegate::transition_stamp(draft.is_completed, None, OffsetDateTime::now_utc());
		let mut payload = records::owned_payload(&draft, session)?;

		payload.insert("completed_at".to_string(), records::timestamp_value(completed_at)?);

		self.insert_row(Table::BucketListItems, session, payload).await
	}

	pub async fn update_bucket_list_item(
		&self,
		session: &Session,
		id: Uuid,
		draft: BucketListDraft,
	) -> Result<BucketListItem> {
		let existing: BucketListItem =
			self.find_owned(Table::BucketListItems, session, id, NOUN).await?;

		self.replace_bucket_list_item(session, &existing, draft).await
	}

	/// Flips completion, stamping `completed_at` on completion and clearing it on reopen.
	pub async fn toggle_bucket_list_item(
		&self,
		session: &Session,
		id: Uuid,
	) -> Result<BucketListItem> {
		let existing: BucketListItem =
			self.find_owned(Table::BucketListItems, session, id, NOUN).await?;
		let mut draft = BucketListDraft::from_item(&existing);

		draft.is_completed = !existing.is_completed;

		self.replace_bucket_list_item(session, &existing, draft).await
	}

	pub async fn delete_bucket_list_item(&self, session: &Session, id: Uuid) -> Result<()> {
		self.delete_row(Table::BucketListItems, session, id, NOUN).await
	}

	async fn replace_bucket_list_item(
		&self,
		session: &Session,
		existing: &BucketListItem,
		mut draft: BucketListDraft,
	) -> Result<BucketListItem> {
		draft.gate(&self.cfg.limits)?;

		let completed_at = writegate::transition_stamp(
			draft.is_completed,
			existing.completed_at,
			OffsetDateTime::now_utc(),
		);
		let mut payload = records::owned_payload(&draft, session)?;

		payload.insert("completed_at".to_string(), records::timestamp_value(completed_at)?);

		self.update_row(Table::BucketListItems, session, existing.id, &payload, NOUN).await
	}
}
