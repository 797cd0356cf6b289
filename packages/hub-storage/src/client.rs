//! Generic table access shared by every backend.

use std::{future::Future, pin::Pin};

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result, Table};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const OWNER_COLUMN: &str = "user_id";
pub const ID_COLUMN: &str = "id";

/// Row-level access to the hub tables. Every call names the owner explicitly.
pub trait DataClient
where
	Self: Send + Sync,
{
	fn select<'a>(&'a self, table: Table, query: &'a Select) -> BoxFuture<'a, Result<Vec<Value>>>;

	fn insert<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		rows: &'a [Map<String, Value>],
	) -> BoxFuture<'a, Result<Vec<Value>>>;

	/// Returns `None` when no row with this id is owned by the caller.
	fn update<'a>(
		&'a self,
		table: Table,
		target: Mutation,
		patch: &'a Map<String, Value>,
	) -> BoxFuture<'a, Result<Option<Value>>>;

	fn delete<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		target: Target,
	) -> BoxFuture<'a, Result<u64>>;
}

/// Owner id of a row. Never the nil UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);
impl UserId {
	pub fn new(id: Uuid) -> Result<Self> {
		if id.is_nil() {
			return Err(Error::InvalidArgument("user_id must not be nil.".to_string()));
		}

		Ok(Self(id))
	}

	pub fn as_uuid(&self) -> Uuid {
		self.0
	}
}
impl std::fmt::Display for UserId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.0.fmt(f)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
	Owned { user_id: UserId },
	/// Rows owned by the user plus rows whose boolean `public_column` is true.
	Visible { user_id: UserId, public_column: &'static str },
}
impl Scope {
	pub fn user_id(&self) -> UserId {
		match self {
			Self::Owned { user_id } | Self::Visible { user_id, .. } => *user_id,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
	pub column: &'static str,
	pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Asc,
	Desc,
}
impl Direction {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
	pub column: &'static str,
	pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
	pub scope: Scope,
	pub filters: Vec<Condition>,
	pub order: Vec<Order>,
}
impl Select {
	pub fn owned(user_id: UserId) -> Self {
		Self { scope: Scope::Owned { user_id }, filters: Vec::new(), order: Vec::new() }
	}

	pub fn visible(user_id: UserId, public_column: &'static str) -> Self {
		Self {
			scope: Scope::Visible { user_id, public_column },
			filters: Vec::new(),
			order: Vec::new(),
		}
	}

	pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
		self.filters.push(Condition { column, value: value.into() });

		self
	}

	pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
		self.order.push(Order { column, direction });

		self
	}

	pub fn validate(&self) -> Result<()> {
		if let Scope::Visible { public_column, .. } = &self.scope {
			validate_column(public_column)?;
		}
		for condition in &self.filters {
			validate_column(condition.column)?;

			if condition.value.is_array() || condition.value.is_object() {
				return Err(Error::InvalidArgument(format!(
					"Filter on {} must compare a scalar value.",
					condition.column
				)));
			}
		}
		for order in &self.order {
			validate_column(order.column)?;
		}

		Ok(())
	}
}

/// Identifies one row for a write. Matches on both `id` and `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
	pub user_id: UserId,
	pub id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	One(Uuid),
	All,
}

pub fn validate_column(column: &str) -> Result<()> {
	let mut chars = column.chars();
	let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
		&& chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

	if !valid {
		return Err(Error::InvalidArgument(format!("Invalid column name {column:?}.")));
	}

	Ok(())
}

/// Checks an insert batch and returns its shared column list.
pub fn validate_rows(user_id: UserId, rows: &[Map<String, Value>]) -> Result<Vec<String>> {
	let Some(first) = rows.first() else {
		return Ok(Vec::new());
	};
	let columns: Vec<String> = first.keys().cloned().collect();

	for column in &columns {
		validate_column(column)?;
	}
	if columns.iter().any(|column| column == ID_COLUMN) {
		return Err(Error::InvalidArgument("Inserted rows must not carry an id.".to_string()));
	}

	for row in rows {
		if row.len() != columns.len() || !columns.iter().all(|column| row.contains_key(column)) {
			return Err(Error::InvalidArgument(
				"Inserted rows must share the same columns.".to_string(),
			));
		}
		if !owned_by(row, user_id) {
			return Err(Error::InvalidArgument(format!(
				"Inserted rows must carry user_id {user_id}."
			)));
		}
	}

	Ok(columns)
}

/// Checks a patch and returns its column list. A patch may restate the owner but never change it.
pub fn validate_patch(user_id: UserId, patch: &Map<String, Value>) -> Result<Vec<String>> {
	if patch.is_empty() {
		return Err(Error::InvalidArgument("Patch must not be empty.".to_string()));
	}

	let columns: Vec<String> = patch.keys().cloned().collect();

	for column in &columns {
		validate_column(column)?;
	}
	if patch.contains_key(ID_COLUMN) {
		return Err(Error::InvalidArgument("Patch must not change the id.".to_string()));
	}
	if patch.contains_key(OWNER_COLUMN) && !owned_by(patch, user_id) {
		return Err(Error::InvalidArgument("Patch must not change the owner.".to_string()));
	}

	Ok(columns)
}

fn owned_by(row: &Map<String, Value>, user_id: UserId) -> bool {
	row.get(OWNER_COLUMN)
		.and_then(Value::as_str)
		.and_then(|raw| Uuid::parse_str(raw).ok())
		.is_some_and(|id| id == user_id.as_uuid())
}
