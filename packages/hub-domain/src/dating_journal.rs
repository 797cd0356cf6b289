use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
	filter::Filter,
	writegate::{self, Gate, RejectCode, Rejection},
};
use hub_config::Limits;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mood {
	Amazing,
	Good,
	Okay,
	Awkward,
	Bad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
	pub id: Uuid,
	pub user_id: Uuid,
	pub title: String,
	#[serde(with = "crate::time_serde::date")]
	pub date: Date,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub partner_name: Option<String>,
	pub rating: u8,
	#[serde(default)]
	pub mood: Option<Mood>,
	#[serde(default)]
	pub notes: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalDraft {
	pub title: String,
	#[serde(with = "crate::time_serde::date")]
	pub date: Date,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub partner_name: Option<String>,
	pub rating: u8,
	#[serde(default)]
	pub mood: Option<Mood>,
	#[serde(default)]
	pub notes: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}
impl Gate for JournalDraft {
	fn gate(&mut self, limits: &Limits) -> Result<(), Rejection> {
		writegate::require_title("$.title", &mut self.title, limits)?;
		writegate::optional_text("$.location", &mut self.location, limits.max_title_chars)?;
		writegate::optional_text("$.partner_name", &mut self.partner_name, limits.max_title_chars)?;
		writegate::optional_text("$.notes", &mut self.notes, limits.max_text_chars)?;

		if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
			return Err(Rejection::new(RejectCode::RejectOutOfRange, "$.rating"));
		}

		writegate::normalize_tags("$.tags", &mut self.tags, limits)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalFilter {
	pub min_rating: Option<u8>,
	pub tag: Option<String>,
}
impl Filter<JournalEntry> for JournalFilter {
	fn matches(&self, entry: &JournalEntry) -> bool {
		let rating_ok = self.min_rating.is_none_or(|min| entry.rating >= min);
		let tag_ok = match self.tag.as_deref().map(str::trim) {
			Some(tag) if !tag.is_empty() =>
				entry.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag)),
			_ => true,
		};

		rating_ok && tag_ok
	}
}
