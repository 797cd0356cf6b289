//! In-memory `DataClient` for service and HTTP tests.

use std::{
	cmp::Ordering,
	collections::{HashMap, HashSet},
	sync::{Mutex, MutexGuard},
};

use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use hub_storage::{
	BoxFuture, DataClient, Direction, Error, Mutation, Result, Scope, Select, Table, Target,
	UserId,
};

const BASE_TIMESTAMP: i64 = 1_767_225_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
	Insert,
	Update,
	Delete,
}

/// A write that reached the client, kept in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
	pub table: Table,
	pub kind: WriteKind,
	pub id: Option<Uuid>,
	pub payload: Option<Map<String, Value>>,
	pub committed: bool,
}

#[derive(Default)]
struct Faults {
	passing_selects: u32,
	failing_selects: u32,
	failing_updates: u32,
	failing_ids: HashSet<Uuid>,
	dropped_ids: HashSet<Uuid>,
}

#[derive(Default)]
struct State {
	tables: HashMap<Table, Vec<Map<String, Value>>>,
	faults: Faults,
	writes: Vec<WriteRecord>,
	clock: i64,
}
impl State {
	fn stamp(&mut self) -> Result<String> {
		self.clock += 1;

		let at = OffsetDateTime::from_unix_timestamp(BASE_TIMESTAMP)
			.map_err(|err| Error::InvalidArgument(err.to_string()))?
			+ Duration::seconds(self.clock);

		at.format(&Rfc3339).map_err(|err| Error::InvalidArgument(err.to_string()))
	}
}

#[derive(Default)]
pub struct MemoryClient {
	state: Mutex<State>,
}
impl MemoryClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a row as-is, filling in `id` and `created_at` when absent. Returns the row id.
	pub fn seed(&self, table: Table, row: Value) -> Uuid {
		let mut state = self.lock();
		let mut row = row.as_object().cloned().unwrap_or_default();
		let id = row
			.get("id")
			.and_then(Value::as_str)
			.and_then(|raw| Uuid::parse_str(raw).ok())
			.unwrap_or_else(Uuid::new_v4);

		row.insert("id".to_string(), Value::String(id.to_string()));

		if !row.contains_key("created_at") {
			let stamp = state.stamp().unwrap_or_default();

			row.insert("created_at".to_string(), Value::String(stamp));
		}

		state.tables.entry(table).or_default().push(row);

		id
	}

	pub fn rows(&self, table: Table) -> Vec<Value> {
		self.lock()
			.tables
			.get(&table)
			.map(|rows| rows.iter().cloned().map(Value::Object).collect())
			.unwrap_or_default()
	}

	pub fn writes(&self) -> Vec<WriteRecord> {
		self.lock().writes.clone()
	}

	pub fn clear_writes(&self) {
		self.lock().writes.clear();
	}

	/// The next `count` selects fail with a remote error.
	pub fn fail_next_selects(&self, count: u32) {
		self.fail_selects_after(0, count);
	}

	/// Lets `passing` selects through, then fails the following `count`.
	pub fn fail_selects_after(&self, passing: u32, count: u32) {
		let mut state = self.lock();

		state.faults.passing_selects = passing;
		state.faults.failing_selects = count;
	}

	/// The next `count` updates fail with a remote error.
	pub fn fail_next_updates(&self, count: u32) {
		self.lock().faults.failing_updates = count;
	}

	/// Every update of this row fails until faults are cleared.
	pub fn fail_updates_for(&self, id: Uuid) {
		self.lock().faults.failing_ids.insert(id);
	}

	/// Updates of this row report success but are never stored.
	pub fn drop_updates_for(&self, id: Uuid) {
		self.lock().faults.dropped_ids.insert(id);
	}

	pub fn clear_faults(&self) {
		self.lock().faults = Faults::default();
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl DataClient for MemoryClient {
	fn select<'a>(&'a self, table: Table, query: &'a Select) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move {
			query.validate()?;

			let mut state = self.lock();

			if state.faults.failing_selects > 0 {
				if state.faults.passing_selects > 0 {
					state.faults.passing_selects -= 1;
				} else {
					state.faults.failing_selects -= 1;

					return Err(injected());
				}
			}

			let mut rows: Vec<Map<String, Value>> = state
				.tables
				.get(&table)
				.map(|rows| {
					rows.iter()
						.filter(|row| in_scope(row, &query.scope))
						.filter(|row| {
							query.filters.iter().all(|condition| {
								row.get(condition.column).unwrap_or(&Value::Null)
									== &condition.value
							})
						})
						.cloned()
						.collect()
				})
				.unwrap_or_default();

			rows.sort_by(|a, b| {
				for order in &query.order {
					let ordering = compare(a.get(order.column), b.get(order.column));
					let ordering = match order.direction {
						Direction::Asc => ordering,
						Direction::Desc => ordering.reverse(),
					};

					if ordering != Ordering::Equal {
						return ordering;
					}
				}

				Ordering::Equal
			});

			Ok(rows.into_iter().map(Value::Object).collect())
		})
	}

	fn insert<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		rows: &'a [Map<String, Value>],
	) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move {
			hub_storage::client::validate_rows(user_id, rows)?;

			let mut state = self.lock();
			let mut inserted = Vec::with_capacity(rows.len());

			for row in rows {
				let mut stored = row.clone();
				let id = Uuid::new_v4();
				let stamp = state.stamp()?;

				stored.insert("id".to_string(), Value::String(id.to_string()));
				stored.insert("created_at".to_string(), Value::String(stamp));
				state.writes.push(WriteRecord {
					table,
					kind: WriteKind::Insert,
					id: Some(id),
					payload: Some(row.clone()),
					committed: true,
				});
				state.tables.entry(table).or_default().push(stored.clone());
				inserted.push(Value::Object(stored));
			}

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
			hub_storage::client::validate_patch(target.user_id, patch)?;

			let mut state = self.lock();
			let mut record = WriteRecord {
				table,
				kind: WriteKind::Update,
				id: Some(target.id),
				payload: Some(patch.clone()),
				committed: false,
			};
			let failed = if state.faults.failing_updates > 0 {
				state.faults.failing_updates -= 1;

				true
			} else {
				state.faults.failing_ids.contains(&target.id)
			};

			if failed {
				state.writes.push(record);

				return Err(injected());
			}

			let dropped = state.faults.dropped_ids.contains(&target.id);
			let row = state
				.tables
				.get_mut(&table)
				.and_then(|rows| rows.iter_mut().find(|row| owned_row(row, target)));
			let Some(row) = row else {
				state.writes.push(record);

				return Ok(None);
			};
			let mut updated = row.clone();

			for (key, value) in patch {
				updated.insert(key.clone(), value.clone());
			}
			if !dropped {
				*row = updated.clone();
			}

			record.committed = !dropped;
			state.writes.push(record);

			Ok(Some(Value::Object(updated)))
		})
	}

	fn delete<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		target: Target,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let mut state = self.lock();
			let rows = state.tables.entry(table).or_default();
			let before = rows.len();

			rows.retain(|row| {
				let owned = owner_of(row) == Some(user_id.as_uuid());
				let matches = match target {
					Target::One(id) => id_of(row) == Some(id),
					Target::All => true,
				};

				!(owned && matches)
			});

			let removed = (before - rows.len()) as u64;
			let id = match target {
				Target::One(id) => Some(id),
				Target::All => None,
			};

			state.writes.push(WriteRecord {
				table,
				kind: WriteKind::Delete,
				id,
				payload: None,
				committed: removed > 0,
			});

			Ok(removed)
		})
	}
}

fn injected() -> Error {
	Error::Remote { status: 503, message: "Injected failure.".to_string() }
}

fn uuid_field(row: &Map<String, Value>, key: &str) -> Option<Uuid> {
	row.get(key).and_then(Value::as_str).and_then(|raw| Uuid::parse_str(raw).ok())
}

fn id_of(row: &Map<String, Value>) -> Option<Uuid> {
	uuid_field(row, "id")
}

fn owner_of(row: &Map<String, Value>) -> Option<Uuid> {
	uuid_field(row, "user_id")
}

fn owned_row(row: &Map<String, Value>, target: Mutation) -> bool {
	id_of(row) == Some(target.id) && owner_of(row) == Some(target.user_id.as_uuid())
}

fn in_scope(row: &Map<String, Value>, scope: &Scope) -> bool {
	let owned = owner_of(row) == Some(scope.user_id().as_uuid());

	match scope {
		Scope::Owned { .. } => owned,
		Scope::Visible { public_column, .. } =>
			owned || row.get(*public_column).and_then(Value::as_bool).unwrap_or(false),
	}
}

// Nulls sort last ascending, matching Postgres.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	let a = a.filter(|value| !value.is_null());
	let b = b.filter(|value| !value.is_null());

	match (a, b) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Greater,
		(Some(_), None) => Ordering::Less,
		(Some(a), Some(b)) => match (a, b) {
			(Value::Number(a), Value::Number(b)) => a
				.as_f64()
				.partial_cmp(&b.as_f64())
				.unwrap_or(Ordering::Equal),
			(Value::Bool(a), Value::Bool(b)) => a.cmp(b),
			(Value::String(a), Value::String(b)) => a.cmp(b),
			_ => a.to_string().cmp(&b.to_string()),
		},
	}
}
