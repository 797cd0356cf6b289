use std::collections::HashSet;

use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

use hub_config::Limits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmpty,
	RejectTooLong,
	RejectOutOfRange,
	RejectTooManyTags,
}
impl RejectCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::RejectEmpty => "REJECT_EMPTY",
			Self::RejectTooLong => "REJECT_TOO_LONG",
			Self::RejectOutOfRange => "REJECT_OUT_OF_RANGE",
			Self::RejectTooManyTags => "REJECT_TOO_MANY_TAGS",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} at {field}.", .code.as_str())]
pub struct Rejection {
	pub code: RejectCode,
	pub field: &'static str,
}
impl Rejection {
	pub fn new(code: RejectCode, field: &'static str) -> Self {
		Self { code, field }
	}
}

/// Normalizes a draft in place and rejects it when it breaks a limit.
pub trait Gate {
	fn gate(&mut self, limits: &Limits) -> Result<(), Rejection>;
}

pub fn grapheme_len(text: &str) -> usize {
	text.graphemes(true).count()
}

pub fn require_title(
	field: &'static str,
	title: &mut String,
	limits: &Limits,
) -> Result<(), Rejection> {
	let trimmed = title.trim();

	if trimmed.is_empty() {
		return Err(Rejection::new(RejectCode::RejectEmpty, field));
	}
	if grapheme_len(trimmed) > limits.max_title_chars as usize {
		return Err(Rejection::new(RejectCode::RejectTooLong, field));
	}

	*title = trimmed.to_string();

	Ok(())
}

/// Blank optional text collapses to `None`.
pub fn optional_text(
	field: &'static str,
	text: &mut Option<String>,
	max_chars: u32,
) -> Result<(), Rejection> {
	let Some(value) = text.as_deref() else {
		return Ok(());
	};
	let trimmed = value.trim();

	if trimmed.is_empty() {
		*text = None;

		return Ok(());
	}
	if grapheme_len(trimmed) > max_chars as usize {
		return Err(Rejection::new(RejectCode::RejectTooLong, field));
	}

	*text = Some(trimmed.to_string());

	Ok(())
}

pub fn body_text(field: &'static str, text: &str, limits: &Limits) -> Result<(), Rejection> {
	if grapheme_len(text) > limits.max_text_chars as usize {
		return Err(Rejection::new(RejectCode::RejectTooLong, field));
	}

	Ok(())
}

/// Lowercases and trims tags, dropping blanks and repeats while keeping first-seen order.
pub fn normalize_tags(
	field: &'static str,
	tags: &mut Vec<String>,
	limits: &Limits,
) -> Result<(), Rejection> {
	let mut seen = HashSet::with_capacity(tags.len());
	let mut normalized = Vec::with_capacity(tags.len());

	for tag in tags.iter() {
		let tag = tag.trim().to_lowercase();

		if tag.is_empty() || !seen.insert(tag.clone()) {
			continue;
		}
		if grapheme_len(&tag) > limits.max_title_chars as usize {
			return Err(Rejection::new(RejectCode::RejectTooLong, field));
		}

		normalized.push(tag);
	}

	if normalized.len() > limits.max_tags as usize {
		return Err(Rejection::new(RejectCode::RejectTooManyTags, field));
	}

	*tags = normalized;

	Ok(())
}

pub fn non_negative(field: &'static str, value: Option<f64>) -> Result<(), Rejection> {
	match value {
		Some(value) if !value.is_finite() || value < 0.0 =>
			Err(Rejection::new(RejectCode::RejectOutOfRange, field)),
		_ => Ok(()),
	}
}

/// ASCII alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
	let mut slug = String::with_capacity(text.len());
	let mut pending_dash = false;

	for ch in text.chars() {
		if ch.is_ascii_alphanumeric() {
			if pending_dash && !slug.is_empty() {
				slug.push('-');
			}

			slug.push(ch.to_ascii_lowercase());

			pending_dash = false;
		} else {
			pending_dash = true;
		}
	}

	slug
}

/// Timestamp that tracks a boolean flag: kept while the flag stays set, stamped on the
/// transition to set, cleared when unset.
pub fn transition_stamp(
	flag: bool,
	previous: Option<OffsetDateTime>,
	now: OffsetDateTime,
) -> Option<OffsetDateTime> {
	if !flag {
		return None;
	}

	Some(previous.unwrap_or(now))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn slugify_collapses_separators() {
		assert_eq!(slugify("  Hello, World -- again!"), "hello-world-again");
		assert_eq!(slugify("Ünïcode only ✨"), "n-code-only");
		assert_eq!(slugify("!!!"), "");
	}

	#[test]
	fn tags_are_normalized_in_first_seen_order() {
		let mut tags = vec![
			" Beach ".to_string(),
			"sunset".to_string(),
			"beach".to_string(),
			"".to_string(),
		];

		normalize_tags("$.tags", &mut tags, &Limits::default()).expect("Tags must pass.");

		assert_eq!(tags, vec!["beach".to_string(), "sunset".to_string()]);
	}

	#[test]
	fn too_many_tags_are_rejected_after_dedup() {
		let limits = Limits { max_tags: 2, ..Limits::default() };
		let mut duplicated = vec!["a".to_string(), "A".to_string(), "b".to_string()];
		let mut distinct = vec!["a".to_string(), "b".to_string(), "c".to_string()];

		assert!(normalize_tags("$.tags", &mut duplicated, &limits).is_ok());
		assert_eq!(
			normalize_tags("$.tags", &mut distinct, &limits),
			Err(Rejection::new(RejectCode::RejectTooManyTags, "$.tags"))
		);
	}

	#[test]
	fn title_limit_counts_graphemes() {
		let limits = Limits { max_title_chars: 3, ..Limits::default() };
		let mut accented = "e\u{301}e\u{301}e\u{301}".to_string();
		let mut long = "abcd".to_string();

		assert!(require_title("$.title", &mut accented, &limits).is_ok());
		assert_eq!(
			require_title("$.title", &mut long, &limits),
			Err(Rejection::new(RejectCode::RejectTooLong, "$.title"))
		);
	}

	#[test]
	fn blank_optional_text_becomes_none() {
		let mut text = Some("   ".to_string());

		optional_text("$.description", &mut text, 10).expect("Blank text must pass.");

		assert_eq!(text, None);
	}

	#[test]
	fn transition_stamp_keeps_previous_value() {
		let earlier = OffsetDateTime::UNIX_EPOCH;
		let now = OffsetDateTime::now_utc();

		assert_eq!(transition_stamp(true, Some(earlier), now), Some(earlier));
		assert_eq!(transition_stamp(true, None, now), Some(now));
		assert_eq!(transition_stamp(false, Some(earlier), now), None);
	}
}
