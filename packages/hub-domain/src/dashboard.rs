//! Widget layout: catalog defaults, drag reordering, and the diffs used to persist and
//! reconcile a reorder against the remote store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetType {
	BucketList,
	DatingJournal,
	DatingIdeas,
}
impl WidgetType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::BucketList => "bucket-list",
			Self::DatingJournal => "dating-journal",
			Self::DatingIdeas => "dating-ideas",
		}
	}
}

/// Known widgets in their default display order.
pub const WIDGET_CATALOG: [WidgetType; 3] =
	[WidgetType::BucketList, WidgetType::DatingJournal, WidgetType::DatingIdeas];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetSize {
	Small,
	#[default]
	Medium,
	Large,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardWidget {
	pub id: Uuid,
	pub user_id: Uuid,
	pub widget_type: WidgetType,
	pub position: i32,
	pub is_active: bool,
	pub size: WidgetSize,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDraft {
	pub widget_type: WidgetType,
	pub position: i32,
	pub is_active: bool,
	pub size: WidgetSize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetPatch {
	#[serde(default)]
	pub is_active: Option<bool>,
	#[serde(default)]
	pub size: Option<WidgetSize>,
}
impl WidgetPatch {
	pub fn is_empty(&self) -> bool {
		self.is_active.is_none() && self.size.is_none()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
	#[error("Source index {index} is out of range for {len} widgets.")]
	SourceOutOfRange { index: usize, len: usize },
	#[error("Destination index {index} is out of range for {len} widgets.")]
	DestinationOutOfRange { index: usize, len: usize },
}

/// A row whose stored position differs from its place in the new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
	pub widget_id: Uuid,
	pub from: i32,
	pub to: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
	pub widget_id: Uuid,
	pub intended: Option<i32>,
	pub confirmed: Option<i32>,
}

/// One active, medium-sized widget per catalog entry, positioned by catalog order.
pub fn default_layout() -> Vec<WidgetDraft> {
	WIDGET_CATALOG
		.iter()
		.enumerate()
		.map(|(index, widget_type)| WidgetDraft {
			widget_type: *widget_type,
			position: index as i32,
			is_active: true,
			size: WidgetSize::Medium,
		})
		.collect()
}

/// Display order: stored position, then creation time, then id. Stored positions may carry
/// gaps or duplicates after a partial write, so ties need a stable order.
pub fn sort_layout(widgets: &mut [DashboardWidget]) {
	widgets.sort_by(|a, b| {
		a.position.cmp(&b.position).then(a.created_at.cmp(&b.created_at)).then(a.id.cmp(&b.id))
	});
}

pub fn move_item<T>(
	items: &mut Vec<T>,
	source: usize,
	destination: usize,
) -> Result<(), MoveError> {
	let len = items.len();

	if source >= len {
		return Err(MoveError::SourceOutOfRange { index: source, len });
	}
	if destination >= len {
		return Err(MoveError::DestinationOutOfRange { index: destination, len });
	}

	let item = items.remove(source);

	items.insert(destination, item);

	Ok(())
}

/// Rewrites every position to its index.
pub fn assign_positions(widgets: &mut [DashboardWidget]) {
	for (index, widget) in widgets.iter_mut().enumerate() {
		widget.position = index as i32;
	}
}

/// Applies a drag from `source` to `destination` over a display-ordered layout.
///
/// Returns `Ok(None)` when the drop had no destination. The returned layout always carries
/// dense positions `0..N-1`.
pub fn reorder(
	layout: &[DashboardWidget],
	source: usize,
	destination: Option<usize>,
) -> Result<Option<Vec<DashboardWidget>>, MoveError> {
	let Some(destination) = destination else {
		return Ok(None);
	};
	let mut next = layout.to_vec();

	move_item(&mut next, source, destination)?;
	assign_positions(&mut next);

	Ok(Some(next))
}

/// Rows of `after` whose position differs from the one stored in `before`.
pub fn position_changes(
	before: &[DashboardWidget],
	after: &[DashboardWidget],
) -> Vec<PositionChange> {
	let stored: HashMap<Uuid, i32> =
		before.iter().map(|widget| (widget.id, widget.position)).collect();

	after
		.iter()
		.filter_map(|widget| {
			let from = stored.get(&widget.id).copied()?;

			(from != widget.position).then_some(PositionChange {
				widget_id: widget.id,
				from,
				to: widget.position,
			})
		})
		.collect()
}

/// Rows whose confirmed position differs from the intended one, including rows present on
/// only one side.
pub fn diverging_positions(
	intended: &[DashboardWidget],
	confirmed: &[DashboardWidget],
) -> Vec<Divergence> {
	let confirmed_positions: HashMap<Uuid, i32> =
		confirmed.iter().map(|widget| (widget.id, widget.position)).collect();
	let mut divergences = Vec::new();

	for widget in intended {
		let confirmed = confirmed_positions.get(&widget.id).copied();

		if confirmed != Some(widget.position) {
			divergences.push(Divergence {
				widget_id: widget.id,
				intended: Some(widget.position),
				confirmed,
			});
		}
	}
	for widget in confirmed {
		if !intended.iter().any(|candidate| candidate.id == widget.id) {
			divergences.push(Divergence {
				widget_id: widget.id,
				intended: None,
				confirmed: Some(widget.position),
			});
		}
	}

	divergences
}

/// True when positions are exactly `0..N-1` in display order.
pub fn is_dense(widgets: &[DashboardWidget]) -> bool {
	widgets.iter().enumerate().all(|(index, widget)| widget.position == index as i32)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn widget(widget_type: WidgetType, position: i32) -> DashboardWidget {
		DashboardWidget {
			id: Uuid::new_v4(),
			user_id: Uuid::nil(),
			widget_type,
			position,
			is_active: true,
			size: WidgetSize::Medium,
			created_at: OffsetDateTime::UNIX_EPOCH,
		}
	}

	#[test]
	fn missing_destination_is_a_no_op() {
		let layout = vec![widget(WidgetType::BucketList, 0)];

		assert_eq!(reorder(&layout, 0, None), Ok(None));
	}

	#[test]
	fn out_of_range_indices_are_rejected() {
		let layout = vec![widget(WidgetType::BucketList, 0), widget(WidgetType::DatingIdeas, 1)];

		assert_eq!(
			reorder(&layout, 2, Some(0)),
			Err(MoveError::SourceOutOfRange { index: 2, len: 2 })
		);
		assert_eq!(
			reorder(&layout, 0, Some(5)),
			Err(MoveError::DestinationOutOfRange { index: 5, len: 2 })
		);
	}

	#[test]
	fn gaps_are_healed_by_the_next_reorder() {
		let layout = vec![
			widget(WidgetType::BucketList, 0),
			widget(WidgetType::DatingJournal, 4),
			widget(WidgetType::DatingIdeas, 9),
		];
		let next = reorder(&layout, 0, Some(0)).expect("Valid move.").expect("Has destination.");
		let changes = position_changes(&layout, &next);

		assert!(is_dense(&next));
		assert_eq!(changes.len(), 2);
		assert!(changes.iter().all(|change| change.to < change.from));
	}

	#[test]
	fn sort_breaks_position_ties_by_creation_time() {
		let mut first = widget(WidgetType::DatingIdeas, 1);
		let mut second = widget(WidgetType::BucketList, 1);

		first.created_at = OffsetDateTime::UNIX_EPOCH;
		second.created_at = OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(1);

		let mut layout = vec![second.clone(), first.clone()];

		sort_layout(&mut layout);

		assert_eq!(layout[0].id, first.id);
		assert_eq!(layout[1].id, second.id);
	}

	#[test]
	fn divergence_reports_rows_missing_on_either_side() {
		let kept = widget(WidgetType::BucketList, 0);
		let dropped = widget(WidgetType::DatingJournal, 1);
		let extra = widget(WidgetType::DatingIdeas, 1);
		let divergences =
			diverging_positions(&[kept.clone(), dropped.clone()], &[kept, extra.clone()]);

		assert_eq!(divergences.len(), 2);
		assert!(divergences.contains(&Divergence {
			widget_id: dropped.id,
			intended: Some(1),
			confirmed: None,
		}));
		assert!(divergences.contains(&Divergence {
			widget_id: extra.id,
			intended: None,
			confirmed: Some(1),
		}));
	}
}
