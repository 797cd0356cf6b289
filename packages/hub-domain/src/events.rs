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
pub enum EventCategory {
	Music,
	Food,
	Sports,
	Arts,
	Outdoors,
	Nightlife,
	Community,
	#[default]
	Other,
}

/// Distance ranges in miles: nearby `[0, 5]`, close `(5, 15]`, moderate `(15, 30]`, far `> 30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceBucket {
	Nearby,
	Close,
	Moderate,
	Far,
}
impl DistanceBucket {
	pub fn of(miles: f64) -> Self {
		if miles <= 5.0 {
			Self::Nearby
		} else if miles <= 15.0 {
			Self::Close
		} else if miles <= 30.0 {
			Self::Moderate
		} else {
			Self::Far
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Nearby => "nearby",
			Self::Close => "close",
			Self::Moderate => "moderate",
			Self::Far => "far",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
	pub id: Uuid,
	pub user_id: Uuid,
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	pub category: EventCategory,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(with = "crate::time_serde::date")]
	pub event_date: Date,
	#[serde(default)]
	pub distance_miles: Option<f64>,
	#[serde(default)]
	pub url: Option<String>,
	pub is_public: bool,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl Event {
	pub fn distance_bucket(&self) -> Option<DistanceBucket> {
		self.distance_miles.map(DistanceBucket::of)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub category: EventCategory,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(with = "crate::time_serde::date")]
	pub event_date: Date,
	#[serde(default)]
	pub distance_miles: Option<f64>,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub is_public: bool,
}
impl Gate for EventDraft {
	fn gate(&mut self, limits: &Limits) -> Result<(), Rejection> {
		writegate::require_title("$.title", &mut self.title, limits)?;
		writegate::optional_text("$.description", &mut self.description, limits.max_text_chars)?;
		writegate::optional_text("$.location", &mut self.location, limits.max_title_chars)?;
		writegate::optional_text("$.url", &mut self.url, limits.max_text_chars)?;
		writegate::non_negative("$.distance_miles", self.distance_miles)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
	pub category: Option<EventCategory>,
	pub distance: Option<DistanceBucket>,
}
impl Filter<Event> for EventFilter {
	fn matches(&self, event: &Event) -> bool {
		let distance_ok = match self.distance {
			Some(bucket) => event.distance_bucket() == Some(bucket),
			None => true,
		};

		filter::accepts(self.category.as_ref(), &event.category) && distance_ok
	}
}
