use time::OffsetDateTime;
use uuid::Uuid;

use crate::{HubService, Result, Session, records};
use hub_domain::{
	Gate,
	blog::{BlogDraft, BlogFilter, BlogPost},
	filter, writegate,
};
use hub_storage::{Direction, Select, Table};

const NOUN: &str = "Blog post";
const PUBLIC_COLUMN: &str = "is_published";

impl HubService {
	/// Published posts plus the user's own drafts, newest first.
	pub async fn list_blog_posts(
		&self,
		session: &Session,
		criteria: &BlogFilter,
	) -> Result<Vec<BlogPost>> {
		let query = Select::visible(session.user_id(), PUBLIC_COLUMN)
			.order_by("created_at", Direction::Desc);
		let posts = self.select_rows(Table::BlogPosts, &query).await?;

		Ok(filter::apply(posts, criteria))
	}

	pub async fn get_blog_post(&self, session: &Session, id: Uuid) -> Result<BlogPost> {
		let query = Select::visible(session.user_id(), PUBLIC_COLUMN).eq("id", id.to_string());

		self.find_row(Table::BlogPosts, query, NOUN).await
	}

	pub async fn create_blog_post(
		&self,
		session: &Session,
		mut draft: BlogDraft,
	) -> Result<BlogPost> {
		draft.gate(&self.cfg.limits)?;

		let published_at =
			writegate::transition_stamp(draft.is_published, None, OffsetDateTime::now_utc());
		let mut payload = records::owned_payload(&draft, session)?;

		payload.insert("published_at".to_string(), records::timestamp_value(published_at)?);

		self.insert_row(Table::BlogPosts, session, payload).await
	}

	/// Keeps the first publication time while the post stays published.
	pub async fn update_blog_post(
		&self,
		session: &Session,
		id: Uuid,
		mut draft: BlogDraft,
	) -> Result<BlogPost> {
		draft.gate(&self.cfg.limits)?;

		let existing: BlogPost = self.find_owned(Table::BlogPosts, session, id, NOUN).await?;
		let published_at = writegate::transition_stamp(
			draft.is_published,
			existing.published_at,
			OffsetDateTime::now_utc(),
		);
		let mut payload = records::owned_payload(&draft, session)?;

		payload.insert("published_at".to_string(), records::timestamp_value(published_at)?);

		self.update_row(Table::BlogPosts, session, id, &payload, NOUN).await
	}

	pub async fn delete_blog_post(&self, session: &Session, id: Uuid) -> Result<()> {
		self.delete_row(Table::BlogPosts, session, id, NOUN).await
	}
}
