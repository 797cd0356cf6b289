//! Postgres backend. Rows cross the wire as `jsonb`, so one code path serves every table.

use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use crate::{
	BoxFuture, DataClient, Error, Mutation, Result, Scope, Select, Table, Target, UserId,
	client::{self, OWNER_COLUMN},
};

pub struct PgClient {
	pool: PgPool,
}
impl PgClient {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl DataClient for PgClient {
	fn select<'a>(&'a self, table: Table, query: &'a Select) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move {
			let mut builder = select_query(table, query)?;
			let rows = builder.build_query_scalar::<Value>().fetch_all(&self.pool).await?;

			tracing::debug!(
				table = %table,
				user_id = %query.scope.user_id(),
				rows = rows.len(),
				"Selected rows."
			);

			Ok(rows)
		})
	}

	fn insert<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		rows: &'a [Map<String, Value>],
	) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move {
			if rows.is_empty() {
				return Ok(Vec::new());
			}

			let mut builder = insert_query(table, user_id, rows)?;
			let inserted = builder.build_query_scalar::<Value>().fetch_all(&self.pool).await?;

			Ok(inserted)
		})
	}

	fn update<'a>(
		&'a self,
		table: Table,
		target: Mutation,
		patch: &'a Map<String, Value>,
	) -> BoxFuture<'a, Result<Option<Value>>> {
		Box::pin(async move {
			let mut builder = update_query(table, target, patch)?;
			let row = builder.build_query_scalar::<Value>().fetch_optional(&self.pool).await?;

			Ok(row)
		})
	}

	fn delete<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		target: Target,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let mut builder = delete_query(table, user_id, target);
			let result = builder.build().execute(&self.pool).await?;

			Ok(result.rows_affected())
		})
	}
}

pub fn select_query(table: Table, query: &Select) -> Result<QueryBuilder<'static, Postgres>> {
	query.validate()?;

	let mut builder = QueryBuilder::new(format!("SELECT to_jsonb(t) FROM {table} AS t WHERE "));

	match &query.scope {
		Scope::Owned { user_id } => {
			builder.push("t.user_id = ");
			builder.push_bind(user_id.as_uuid());
		},
		Scope::Visible { user_id, public_column } => {
			builder.push("(t.user_id = ");
			builder.push_bind(user_id.as_uuid());
			builder.push(format!(" OR t.{public_column} IS TRUE)"));
		},
	}

	for condition in &query.filters {
		if condition.value.is_null() {
			builder.push(format!(" AND t.{} IS NULL", condition.column));
		} else {
			builder.push(format!(" AND to_jsonb(t.{}) = ", condition.column));
			builder.push_bind(Json(condition.value.clone()));
		}
	}

	if !query.order.is_empty() {
		let order = query
			.order
			.iter()
			.map(|order| format!("t.{} {}", order.column, order.direction.as_str().to_uppercase()))
			.collect::<Vec<_>>()
			.join(", ");

		builder.push(format!(" ORDER BY {order}"));
	}

	Ok(builder)
}

pub fn insert_query(
	table: Table,
	user_id: UserId,
	rows: &[Map<String, Value>],
) -> Result<QueryBuilder<'static, Postgres>> {
	let columns = client::validate_rows(user_id, rows)?;

	if columns.is_empty() {
		return Err(Error::InvalidArgument("Insert needs at least one row.".to_string()));
	}

	let columns = columns.join(", ");
	let payload = Value::Array(rows.iter().cloned().map(Value::Object).collect());
	let mut builder = QueryBuilder::new(format!(
		"INSERT INTO {table} AS t ({columns}) SELECT {columns} FROM jsonb_populate_recordset(NULL::{table}, "
	));

	builder.push_bind(Json(payload));
	builder.push(") RETURNING to_jsonb(t.*)");

	Ok(builder)
}

pub fn update_query(
	table: Table,
	target: Mutation,
	patch: &Map<String, Value>,
) -> Result<QueryBuilder<'static, Postgres>> {
	let columns = client::validate_patch(target.user_id, patch)?;
	let assignments = columns
		.iter()
		.filter(|column| column.as_str() != OWNER_COLUMN)
		.map(|column| format!("{column} = p.{column}"))
		.collect::<Vec<_>>();

	if assignments.is_empty() {
		return Err(Error::InvalidArgument("Patch has no writable columns.".to_string()));
	}

	let mut builder = QueryBuilder::new(format!(
		"UPDATE {table} AS t SET {} FROM jsonb_populate_record(NULL::{table}, ",
		assignments.join(", ")
	));

	builder.push_bind(Json(Value::Object(patch.clone())));
	builder.push(") AS p WHERE t.id = ");
	builder.push_bind(target.id);
	builder.push(" AND t.user_id = ");
	builder.push_bind(target.user_id.as_uuid());
	builder.push(" RETURNING to_jsonb(t.*)");

	Ok(builder)
}

pub fn delete_query(
	table: Table,
	user_id: UserId,
	target: Target,
) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new(format!("DELETE FROM {table} WHERE user_id = "));

	builder.push_bind(user_id.as_uuid());

	if let Target::One(id) = target {
		builder.push(" AND id = ");
		builder.push_bind(id);
	}

	builder
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use uuid::Uuid;

	use super::*;
	use crate::Direction;

	fn user() -> UserId {
		UserId::new(Uuid::from_u128(42)).expect("Non-nil id.")
	}

	fn owned_row(title: &str) -> Map<String, Value> {
		json!({ "title": title, "user_id": user().to_string() })
			.as_object()
			.cloned()
			.expect("Object literal.")
	}

	#[test]
	fn owned_select_filters_by_user_and_orders() {
		let query = Select::owned(user())
			.eq("is_completed", false)
			.order_by("created_at", Direction::Desc);
		let builder = select_query(Table::BucketListItems, &query).expect("Query should build.");

		assert_eq!(
			builder.sql(),
			"SELECT to_jsonb(t) FROM bucket_list_items AS t WHERE t.user_id = $1 \
			 AND to_jsonb(t.is_completed) = $2 ORDER BY t.created_at DESC"
		);
	}

	#[test]
	fn visible_select_includes_public_rows() {
		let query = Select::visible(user(), "is_public").order_by("event_date", Direction::Asc);
		let builder = select_query(Table::Events, &query).expect("Query should build.");

		assert_eq!(
			builder.sql(),
			"SELECT to_jsonb(t) FROM events AS t WHERE (t.user_id = $1 OR t.is_public IS TRUE) \
			 ORDER BY t.event_date ASC"
		);
	}

	#[test]
	fn null_filters_use_is_null() {
		let query = Select::owned(user()).eq("mood", Value::Null);
		let builder =
			select_query(Table::DatingJournalEntries, &query).expect("Query should build.");

		assert!(builder.sql().ends_with("AND t.mood IS NULL"));
	}

	#[test]
	fn insert_uses_recordset_and_returns_rows() {
		let rows = vec![owned_row("a"), owned_row("b")];
		let builder = insert_query(Table::BlogPosts, user(), &rows).expect("Query should build.");
		let sql = builder.sql();

		assert!(sql.starts_with("INSERT INTO blog_posts AS t ("));
		assert!(sql.contains("jsonb_populate_recordset(NULL::blog_posts, $1)"));
		assert!(sql.ends_with("RETURNING to_jsonb(t.*)"));
	}

	#[test]
	fn update_matches_id_and_owner() {
		let target = Mutation { user_id: user(), id: Uuid::from_u128(9) };
		let patch = owned_row("renamed");
		let builder =
			update_query(Table::DatingIdeas, target, &patch).expect("Query should build.");

		assert_eq!(
			builder.sql(),
			"UPDATE dating_ideas AS t SET title = p.title FROM \
			 jsonb_populate_record(NULL::dating_ideas, $1) AS p WHERE t.id = $2 AND t.user_id = $3 \
			 RETURNING to_jsonb(t.*)"
		);
	}

	#[test]
	fn delete_all_only_filters_by_owner() {
		let builder = delete_query(Table::DashboardLayout, user(), Target::All);

		assert_eq!(builder.sql(), "DELETE FROM dashboard_layout WHERE user_id = $1");

		let builder = delete_query(Table::DashboardLayout, user(), Target::One(Uuid::from_u128(1)));

		assert_eq!(builder.sql(), "DELETE FROM dashboard_layout WHERE user_id = $1 AND id = $2");
	}

	#[test]
	fn unsafe_columns_never_reach_sql() {
		let query = Select::owned(user()).order_by("created_at; --", Direction::Asc);

		assert!(select_query(Table::Events, &query).is_err());
	}
}
