use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
	filter::{self, Filter},
	writegate::{self, Gate, Rejection},
};
use hub_config::Limits;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketCategory {
	Travel,
	Adventure,
	Learning,
	Career,
	Health,
	Relationships,
	Personal,
	#[default]
	Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
	Low,
	#[default]
	Medium,
	High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionStatus {
	Active,
	Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketListItem {
	pub id: Uuid,
	pub user_id: Uuid,
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	pub category: BucketCategory,
	pub priority: Priority,
	#[serde(default, with = "crate::time_serde::date::option")]
	pub target_date: Option<Date>,
	pub is_completed: bool,
	#[serde(default, with = "crate::time_serde::option")]
	pub completed_at: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketListDraft {
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub category: BucketCategory,
	#[serde(default)]
	pub priority: Priority,
	#[serde(default, with = "crate::time_serde::date::option")]
	pub target_date: Option<Date>,
	#[serde(default)]
	pub is_completed: bool,
}
impl BucketListDraft {
	pub fn from_item(item: &BucketListItem) -> Self {
		Self {
			title: item.title.clone(),
			description: item.description.clone(),
			category: item.category,
			priority: item.priority,
			target_date: item.target_date,
			is_completed: item.is_completed,
		}
	}
}
impl Gate for BucketListDraft {
	fn gate(&mut self, limits: &Limits) -> Result<(), Rejection> {
		writegate::require_title("$.title", &mut self.title, limits)?;
		writegate::optional_text("$.description", &mut self.description, limits.max_text_chars)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketListFilter {
	pub category: Option<BucketCategory>,
	pub priority: Option<Priority>,
	pub status: Option<CompletionStatus>,
}
impl Filter<BucketListItem> for BucketListFilter {
	fn matches(&self, item: &BucketListItem) -> bool {
		let status = if item.is_completed {
			CompletionStatus::Completed
		} else {
			CompletionStatus::Active
		};

		filter::accepts(self.category.as_ref(), &item.category)
			&& filter::accepts(self.priority.as_ref(), &item.priority)
			&& filter::accepts(self.status.as_ref(), &status)
	}
}
