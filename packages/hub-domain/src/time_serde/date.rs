//! Calendar dates as `YYYY-MM-DD`, the form both Postgres `to_jsonb` and PostgREST emit.

pub mod option;

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::FormatItem, macros::format_description};

pub(crate) const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn serialize<S>(value: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(FORMAT).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	Date::parse(&raw, FORMAT).map_err(serde::de::Error::custom)
}
