//! Row plumbing shared by the micro-apps: owner-stamped payloads and typed decoding.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, HubService, Result, Session};
use hub_storage::{Mutation, Select, Table, Target};

/// The draft as a row, always carrying the acting user's id.
pub(crate) fn owned_payload<T>(draft: &T, session: &Session) -> Result<Map<String, Value>>
where
	T: Serialize,
{
	let Value::Object(mut payload) = serde_json::to_value(draft)? else {
		return Err(Error::InvalidRequest { message: "Draft must be an object.".to_string() });
	};

	payload.insert("user_id".to_string(), Value::String(session.user_id().to_string()));

	Ok(payload)
}

pub(crate) fn timestamp_value(value: Option<OffsetDateTime>) -> Result<Value> {
	Ok(hub_domain::time_serde::option::serialize(&value, serde_json::value::Serializer)?)
}

pub(crate) fn decode_rows<T>(rows: Vec<Value>) -> Result<Vec<T>>
where
	T: DeserializeOwned,
{
	rows.into_iter().map(|row| Ok(serde_json::from_value(row)?)).collect()
}

impl HubService {
	pub(crate) async fn select_rows<T>(&self, table: Table, query: &Select) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		let rows = self.client.select(table, query).await?;

		decode_rows(rows)
	}

	pub(crate) async fn find_row<T>(&self, table: Table, query: Select, noun: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.select_rows(table, &query)
			.await?
			.into_iter()
			.next()
			.ok_or_else(|| Error::NotFound { message: format!("{noun} not found.") })
	}

	pub(crate) async fn find_owned<T>(
		&self,
		table: Table,
		session: &Session,
		id: Uuid,
		noun: &str,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let query = Select::owned(session.user_id()).eq("id", id.to_string());

		self.find_row(table, query, noun).await
	}

	pub(crate) async fn insert_row<T>(
		&self,
		table: Table,
		session: &Session,
		payload: Map<String, Value>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let rows = self.client.insert(table, session.user_id(), &[payload]).await?;
		let row = rows.into_iter().next().ok_or_else(|| Error::Storage {
			message: format!("Insert into {table} returned no row."),
		})?;

		tracing::debug!(table = %table, user_id = %session.user_id(), "Row created.");

		Ok(serde_json::from_value(row)?)
	}

	pub(crate) async fn update_row<T>(
		&self,
		table: Table,
		session: &Session,
		id: Uuid,
		payload: &Map<String, Value>,
		noun: &str,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let target = Mutation { user_id: session.user_id(), id };
		let row = self
			.client
			.update(table, target, payload)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("{noun} not found.") })?;

		Ok(serde_json::from_value(row)?)
	}

	pub(crate) async fn delete_row(
		&self,
		table: Table,
		session: &Session,
		id: Uuid,
		noun: &str,
	) -> Result<()> {
		let removed = self.client.delete(table, session.user_id(), Target::One(id)).await?;

		if removed == 0 {
			return Err(Error::NotFound { message: format!("{noun} not found.") });
		}

		tracing::info!(table = %table, user_id = %session.user_id(), id = %id, "Row deleted.");

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use hub_domain::bucket_list::BucketListDraft;

	#[test]
	fn payload_carries_the_session_user() {
		let session = Session::new(Uuid::from_u128(3)).expect("Non-nil id.");
		let draft: BucketListDraft =
			serde_json::from_value(json!({ "title": "See the aurora" })).expect("Draft.");
		let payload = owned_payload(&draft, &session).expect("Payload.");

		assert_eq!(payload["user_id"], json!(Uuid::from_u128(3).to_string()));
		assert_eq!(payload["title"], json!("See the aurora"));
		assert!(!payload.contains_key("id"));
	}

	#[test]
	fn missing_timestamps_serialize_as_null() {
		assert_eq!(timestamp_value(None).expect("Value."), Value::Null);
		assert_eq!(
			timestamp_value(Some(OffsetDateTime::UNIX_EPOCH)).expect("Value."),
			json!("1970-01-01T00:00:00Z")
		);
	}
}
