use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	filter::Filter,
	writegate::{self, Gate, RejectCode, Rejection},
};
use hub_config::Limits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
	pub id: Uuid,
	pub user_id: Uuid,
	pub title: String,
	pub slug: String,
	#[serde(default)]
	pub excerpt: Option<String>,
	pub content: String,
	#[serde(default)]
	pub tags: Vec<String>,
	pub is_published: bool,
	#[serde(default, with = "crate::time_serde::option")]
	pub published_at: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDraft {
	pub title: String,
	/// Derived from the title when left empty.
	#[serde(default)]
	pub slug: String,
	#[serde(default)]
	pub excerpt: Option<String>,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub is_published: bool,
}
impl Gate for BlogDraft {
	fn gate(&mut self, limits: &Limits) -> Result<(), Rejection> {
		writegate::require_title("$.title", &mut self.title, limits)?;
		writegate::optional_text("$.excerpt", &mut self.excerpt, limits.max_text_chars)?;
		writegate::body_text("$.content", &self.content, limits)?;
		writegate::normalize_tags("$.tags", &mut self.tags, limits)?;

		let source = if self.slug.trim().is_empty() { &self.title } else { &self.slug };
		let slug = writegate::slugify(source);

		if slug.is_empty() {
			return Err(Rejection::new(RejectCode::RejectEmpty, "$.slug"));
		}

		self.slug = slug;

		Ok(())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogFilter {
	pub tag: Option<String>,
}
impl Filter<BlogPost> for BlogFilter {
	fn matches(&self, post: &BlogPost) -> bool {
		match self.tag.as_deref().map(str::trim) {
			Some(tag) if !tag.is_empty() =>
				post.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag)),
			_ => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn draft(title: &str, slug: &str) -> BlogDraft {
		BlogDraft {
			title: title.to_string(),
			slug: slug.to_string(),
			excerpt: None,
			content: "Body".to_string(),
			tags: Vec::new(),
			is_published: false,
		}
	}

	#[test]
	fn slug_is_derived_from_title_when_blank() {
		let mut post = draft("First Dates That Worked", " ");

		post.gate(&Limits::default()).expect("Draft must pass.");

		assert_eq!(post.slug, "first-dates-that-worked");
	}

	#[test]
	fn explicit_slug_is_normalized() {
		let mut post = draft("Anything", "My Custom_Slug");

		post.gate(&Limits::default()).expect("Draft must pass.");

		assert_eq!(post.slug, "my-custom-slug");
	}

	#[test]
	fn title_without_slug_characters_is_rejected() {
		let mut post = draft("???", "");

		assert_eq!(
			post.gate(&Limits::default()),
			Err(Rejection::new(RejectCode::RejectEmpty, "$.slug"))
		);
	}
}
