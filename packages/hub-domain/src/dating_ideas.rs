use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	filter::{self, Filter},
	writegate::{self, Gate, RejectCode, Rejection},
};
use hub_config::Limits;

/// Upper bound of the `integer` column backing `duration_minutes`.
pub const MAX_DURATION_MINUTES: u32 = i32::MAX as u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdeaCategory {
	#[default]
	Romantic,
	Adventure,
	Casual,
	Creative,
	Food,
	Outdoor,
	Indoor,
	Cultural,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostLevel {
	Free,
	#[default]
	Low,
	Medium,
	High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatingIdea {
	pub id: Uuid,
	pub user_id: Uuid,
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	pub category: IdeaCategory,
	pub cost: CostLevel,
	#[serde(default)]
	pub duration_minutes: Option<u32>,
	pub is_public: bool,
	pub is_completed: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaDraft {
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub category: IdeaCategory,
	#[serde(default)]
	pub cost: CostLevel,
	#[serde(default)]
	pub duration_minutes: Option<u32>,
	#[serde(default)]
	pub is_public: bool,
	#[serde(default)]
	pub is_completed: bool,
}
impl Gate for IdeaDraft {
	fn gate(&mut self, limits: &Limits) -> Result<(), Rejection> {
		writegate::require_title("$.title", &mut self.title, limits)?;
		writegate::optional_text("$.description", &mut self.description, limits.max_text_chars)?;

		if self.duration_minutes.is_some_and(|minutes| minutes > MAX_DURATION_MINUTES) {
			return Err(Rejection::new(RejectCode::RejectOutOfRange, "$.duration_minutes"));
		}

		Ok(())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaFilter {
	pub category: Option<IdeaCategory>,
	pub cost: Option<CostLevel>,
	pub completed: Option<bool>,
}
impl Filter<DatingIdea> for IdeaFilter {
	fn matches(&self, idea: &DatingIdea) -> bool {
		filter::accepts(self.category.as_ref(), &idea.category)
			&& filter::accepts(self.cost.as_ref(), &idea.cost)
			&& filter::accepts(self.completed.as_ref(), &idea.is_completed)
	}
}
