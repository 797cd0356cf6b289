use std::sync::Arc;

use serde_json::{Value, json};
use time::macros::date;
use uuid::Uuid;

use hub_config::{Config, Dashboard, Limits, Security, Service, Storage};
use hub_domain::{
	RejectCode,
	blog::BlogDraft,
	bucket_list::{BucketCategory, BucketListDraft, BucketListFilter, CompletionStatus, Priority},
	dashboard::{self, DashboardWidget, WIDGET_CATALOG, WidgetPatch, WidgetSize, WidgetType},
	events::{DistanceBucket, EventCategory, EventDraft, EventFilter},
};
use hub_service::{Error, HubService, Session, SyncStatus};
use hub_storage::Table;
use hub_testkit::{MemoryClient, WriteKind};

fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { backend: "rest".to_string(), postgres: None, rest: None },
		dashboard: Dashboard { max_write_attempts: 3, revert_on_failure: true },
		limits: Limits::default(),
		security: Security { bind_localhost_only: true, api_auth_token: None },
	}
}

fn service_with(cfg: Config) -> (HubService, Arc<MemoryClient>) {
	let client = Arc::new(MemoryClient::new());

	(HubService::new(cfg, client.clone()), client)
}

fn session(n: u128) -> Session {
	Session::new(Uuid::from_u128(n)).expect("Non-nil id.")
}

fn bucket_draft(title: &str) -> BucketListDraft {
	BucketListDraft {
		title: title.to_string(),
		description: None,
		category: BucketCategory::Travel,
		priority: Priority::High,
		target_date: Some(date!(2027 - 06 - 01)),
		is_completed: false,
	}
}

fn event_draft(title: &str, distance_miles: Option<f64>, is_public: bool) -> EventDraft {
	EventDraft {
		title: title.to_string(),
		description: None,
		category: EventCategory::Music,
		location: Some("Riverside".to_string()),
		event_date: date!(2026 - 11 - 20),
		distance_miles,
		url: None,
		is_public,
	}
}

fn widget_types(layout: &[DashboardWidget]) -> Vec<WidgetType> {
	layout.iter().map(|widget| widget.widget_type).collect()
}

fn positions_of(layout: &[DashboardWidget]) -> Vec<(Uuid, i64)> {
	let mut positions: Vec<(Uuid, i64)> =
		layout.iter().map(|widget| (widget.id, i64::from(widget.position))).collect();

	positions.sort();

	positions
}

fn stored_positions(client: &MemoryClient) -> Vec<(Uuid, i64)> {
	let mut positions: Vec<(Uuid, i64)> = client
		.rows(Table::DashboardLayout)
		.iter()
		.filter_map(|row| {
			let id = row["id"].as_str().and_then(|raw| Uuid::parse_str(raw).ok())?;

			Some((id, row["position"].as_i64()?))
		})
		.collect();

	positions.sort();

	positions
}

#[tokio::test]
async fn create_and_update_payloads_carry_the_session_user() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let item = service
		.create_bucket_list_item(&alice, bucket_draft("Visit Kyoto"))
		.await
		.expect("Create failed.");

	service
		.update_bucket_list_item(&alice, item.id, bucket_draft("Visit Kyoto in spring"))
		.await
		.expect("Update failed.");

	let writes = client.writes();
	let expected = json!(alice.user_id().to_string());

	assert_eq!(writes.len(), 2);
	assert_eq!(writes[0].kind, WriteKind::Insert);
	assert_eq!(writes[1].kind, WriteKind::Update);

	for write in writes {
		let payload = write.payload.expect("Writes carry a payload.");

		assert_eq!(payload.get("user_id"), Some(&expected));
	}
}

#[tokio::test]
async fn delete_removes_only_the_target_row() {
	let (service, _client) = service_with(test_config());
	let alice = session(1);
	let keep = service
		.create_bucket_list_item(&alice, bucket_draft("Learn to sail"))
		.await
		.expect("Create failed.");
	let doomed = service
		.create_bucket_list_item(&alice, bucket_draft("Run a marathon"))
		.await
		.expect("Create failed.");

	service.delete_bucket_list_item(&alice, doomed.id).await.expect("Delete failed.");

	let items = service
		.list_bucket_list(&alice, &BucketListFilter::default())
		.await
		.expect("List failed.");

	assert_eq!(items, vec![keep]);
	assert!(matches!(
		service.delete_bucket_list_item(&alice, doomed.id).await,
		Err(Error::NotFound { .. })
	));
}

#[tokio::test]
async fn rows_of_other_users_cannot_be_changed() {
	let (service, _client) = service_with(test_config());
	let alice = session(1);
	let mallory = session(2);
	let item = service
		.create_bucket_list_item(&alice, bucket_draft("Climb Kilimanjaro"))
		.await
		.expect("Create failed.");

	assert!(matches!(
		service.update_bucket_list_item(&mallory, item.id, bucket_draft("Mine now")).await,
		Err(Error::NotFound { .. })
	));
	assert!(matches!(
		service.delete_bucket_list_item(&mallory, item.id).await,
		Err(Error::NotFound { .. })
	));
	assert!(
		service
			.list_bucket_list(&mallory, &BucketListFilter::default())
			.await
			.expect("List failed.")
			.is_empty()
	);
}

#[tokio::test]
async fn toggle_stamps_and_clears_completion_time() {
	let (service, _client) = service_with(test_config());
	let alice = session(1);
	let item = service
		.create_bucket_list_item(&alice, bucket_draft("Write a book"))
		.await
		.expect("Create failed.");

	assert!(item.completed_at.is_none());

	let done = service.toggle_bucket_list_item(&alice, item.id).await.expect("Toggle failed.");

	assert!(done.is_completed);
	assert!(done.completed_at.is_some());

	let completed = service
		.list_bucket_list(
			&alice,
			&BucketListFilter { status: Some(CompletionStatus::Completed), ..Default::default() },
		)
		.await
		.expect("List failed.");

	assert_eq!(completed.len(), 1);

	let reopened = service.toggle_bucket_list_item(&alice, item.id).await.expect("Toggle failed.");

	assert!(!reopened.is_completed);
	assert!(reopened.completed_at.is_none());
}

#[tokio::test]
async fn rejected_drafts_never_reach_the_store() {
	let (service, client) = service_with(test_config());
	let result = service.create_bucket_list_item(&session(1), bucket_draft("   ")).await;
	let Err(Error::Rejected(rejection)) = &result else {
		panic!("Expected a rejection, got {result:?}.");
	};

	assert_eq!(rejection.code, RejectCode::RejectEmpty);
	assert_eq!(rejection.field, "$.title");
	assert!(client.writes().is_empty());
}

#[tokio::test]
async fn events_include_public_rows_and_filter_by_distance() {
	let (service, _client) = service_with(test_config());
	let alice = session(1);
	let bob = session(2);

	service
		.create_event(&alice, event_draft("Jazz night", Some(3.0), false))
		.await
		.expect("Create failed.");
	service
		.create_event(&bob, event_draft("Folk festival", Some(25.0), true))
		.await
		.expect("Create failed.");
	service
		.create_event(&bob, event_draft("Private gig", Some(1.0), false))
		.await
		.expect("Create failed.");
	service
		.create_event(&bob, event_draft("Somewhere", None, true))
		.await
		.expect("Create failed.");

	let all = service.list_events(&alice, &EventFilter::default()).await.expect("List failed.");
	let titles: Vec<&str> = all.iter().map(|event| event.title.as_str()).collect();

	assert_eq!(titles.len(), 3);
	assert!(!titles.contains(&"Private gig"));

	let moderate = service
		.list_events(
			&alice,
			&EventFilter { distance: Some(DistanceBucket::Moderate), ..Default::default() },
		)
		.await
		.expect("List failed.");

	assert_eq!(moderate.len(), 1);
	assert_eq!(moderate[0].title, "Folk festival");
}

#[tokio::test]
async fn blog_drafts_are_private_until_published() {
	let (service, _client) = service_with(test_config());
	let author = session(1);
	let reader = session(2);
	let draft = BlogDraft {
		title: "Hello, Hub!".to_string(),
		slug: String::new(),
		excerpt: None,
		content: "First post.".to_string(),
		tags: vec!["Intro".to_string()],
		is_published: false,
	};
	let post = service.create_blog_post(&author, draft.clone()).await.expect("Create failed.");

	assert_eq!(post.slug, "hello-hub");
	assert_eq!(post.tags, vec!["intro".to_string()]);
	assert!(post.published_at.is_none());
	assert!(matches!(
		service.get_blog_post(&reader, post.id).await,
		Err(Error::NotFound { .. })
	));

	let published = service
		.update_blog_post(&author, post.id, BlogDraft { is_published: true, ..draft })
		.await
		.expect("Update failed.");

	assert!(published.published_at.is_some());
	assert_eq!(
		service.get_blog_post(&reader, post.id).await.expect("Get failed.").id,
		post.id
	);
}

#[tokio::test]
async fn first_load_creates_the_default_layout_once() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let first = service.load_layout(&alice).await.expect("Load failed.");
	let second = service.load_layout(&alice).await.expect("Load failed.");

	assert_eq!(widget_types(&first), WIDGET_CATALOG.to_vec());
	assert!(dashboard::is_dense(&first));
	assert!(first.iter().all(|widget| widget.is_active && widget.size == WidgetSize::Medium));
	assert_eq!(first, second);
	assert_eq!(client.rows(Table::DashboardLayout).len(), WIDGET_CATALOG.len());
}

#[tokio::test]
async fn failed_fetch_falls_back_to_the_default_layout() {
	let (service, client) = service_with(test_config());

	client.fail_next_selects(1);

	let layout = service.load_layout(&session(1)).await.expect("Load failed.");

	assert_eq!(widget_types(&layout), WIDGET_CATALOG.to_vec());
}

#[tokio::test]
async fn reset_twice_yields_the_same_catalog() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let first = service.reset_layout(&alice).await.expect("Reset failed.");
	let second = service.reset_layout(&alice).await.expect("Reset failed.");

	assert_eq!(widget_types(&first), widget_types(&second));
	assert!(first.iter().zip(&second).all(|(a, b)| a.id != b.id));
	assert_eq!(client.rows(Table::DashboardLayout).len(), WIDGET_CATALOG.len());
}

#[tokio::test]
async fn dragging_the_last_widget_first_is_synced() {
	let (service, _client) = service_with(test_config());
	let alice = session(1);

	service.load_layout(&alice).await.expect("Load failed.");

	let outcome = service.reorder_layout(&alice, 2, Some(0)).await.expect("Reorder failed.");

	assert_eq!(outcome.sync, SyncStatus::Synced { writes: 3, retries: 0 });
	assert_eq!(
		widget_types(&outcome.layout),
		vec![WidgetType::DatingIdeas, WidgetType::BucketList, WidgetType::DatingJournal]
	);
	assert_eq!(
		outcome.layout.iter().map(|widget| widget.position).collect::<Vec<_>>(),
		vec![0, 1, 2]
	);

	let reloaded = service.load_layout(&alice).await.expect("Load failed.");

	assert_eq!(reloaded, outcome.layout);
}

#[tokio::test]
async fn drop_without_destination_writes_nothing() {
	let (service, client) = service_with(test_config());
	let alice = session(1);

	service.load_layout(&alice).await.expect("Load failed.");
	client.clear_writes();

	let outcome = service.reorder_layout(&alice, 1, None).await.expect("Reorder failed.");

	assert_eq!(outcome.sync, SyncStatus::Unchanged);
	assert!(client.writes().is_empty());

	let same_slot = service.reorder_layout(&alice, 1, Some(1)).await.expect("Reorder failed.");

	assert_eq!(same_slot.sync, SyncStatus::Unchanged);
	assert!(client.writes().is_empty());
}

#[tokio::test]
async fn out_of_range_moves_are_invalid() {
	let (service, _client) = service_with(test_config());

	assert!(matches!(
		service.reorder_layout(&session(1), 0, Some(9)).await,
		Err(Error::InvalidRequest { .. })
	));
}

#[tokio::test]
async fn transient_write_failures_are_retried() {
	let (service, client) = service_with(test_config());
	let alice = session(1);

	service.load_layout(&alice).await.expect("Load failed.");
	client.fail_next_updates(2);

	let outcome = service.reorder_layout(&alice, 0, Some(2)).await.expect("Reorder failed.");

	assert_eq!(outcome.sync, SyncStatus::Synced { writes: 3, retries: 2 });
	assert_eq!(
		widget_types(&outcome.layout),
		vec![WidgetType::DatingJournal, WidgetType::DatingIdeas, WidgetType::BucketList]
	);
}

#[tokio::test]
async fn persistent_write_failure_reverts_committed_rows() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let original = service.load_layout(&alice).await.expect("Load failed.");
	let bucket_list = original[0].id;

	client.fail_updates_for(bucket_list);

	let outcome = service.reorder_layout(&alice, 2, Some(0)).await.expect("Reorder failed.");
	let SyncStatus::Reverted { failed, message, .. } = &outcome.sync else {
		panic!("Expected a reverted reorder, got {:?}.", outcome.sync);
	};

	assert_eq!(failed, &vec![bucket_list]);
	assert!(message.contains("Injected failure"));
	assert_eq!(outcome.layout, original);
}

#[tokio::test]
async fn silently_lost_writes_are_detected_and_reverted() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let original = service.load_layout(&alice).await.expect("Load failed.");

	client.drop_updates_for(original[2].id);

	let outcome = service.reorder_layout(&alice, 2, Some(0)).await.expect("Reorder failed.");
	let SyncStatus::Reverted { failed, divergences, .. } = &outcome.sync else {
		panic!("Expected a reverted reorder, got {:?}.", outcome.sync);
	};

	assert!(failed.is_empty());
	assert!(divergences.iter().any(|divergence| divergence.widget_id == original[2].id));
	assert_eq!(outcome.layout, original);
}

#[tokio::test]
async fn without_revert_the_confirmed_layout_is_returned() {
	let mut cfg = test_config();

	cfg.dashboard.revert_on_failure = false;

	let (service, client) = service_with(cfg);
	let alice = session(1);
	let original = service.load_layout(&alice).await.expect("Load failed.");

	client.fail_updates_for(original[0].id);

	let outcome = service.reorder_layout(&alice, 2, Some(0)).await.expect("Reorder failed.");

	assert!(matches!(outcome.sync, SyncStatus::Reverted { .. }));
	assert!(!dashboard::is_dense(&outcome.layout));
	assert_eq!(outcome.layout[0].id, original[0].id);
	assert_eq!(outcome.layout[1].id, original[2].id);
}

#[tokio::test]
async fn failed_fetch_during_reorder_creates_no_rows() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let original = service.load_layout(&alice).await.expect("Load failed.");

	client.fail_next_selects(1);

	assert!(matches!(
		service.reorder_layout(&alice, 2, Some(0)).await,
		Err(Error::Storage { .. })
	));
	assert_eq!(client.rows(Table::DashboardLayout).len(), WIDGET_CATALOG.len());
	assert_eq!(stored_positions(&client), positions_of(&original));
}

#[tokio::test]
async fn unreadable_confirmation_returns_the_intended_layout() {
	let (service, client) = service_with(test_config());
	let alice = session(1);

	service.load_layout(&alice).await.expect("Load failed.");
	client.fail_selects_after(1, 1);

	let outcome = service.reorder_layout(&alice, 2, Some(0)).await.expect("Reorder failed.");
	let SyncStatus::Unconfirmed { writes, message } = &outcome.sync else {
		panic!("Expected an unconfirmed reorder, got {:?}.", outcome.sync);
	};

	assert_eq!(*writes, 3);
	assert!(message.contains("Injected failure"));
	assert_eq!(
		widget_types(&outcome.layout),
		vec![WidgetType::DatingIdeas, WidgetType::BucketList, WidgetType::DatingJournal]
	);
	assert_eq!(stored_positions(&client), positions_of(&outcome.layout));
}

#[tokio::test]
async fn failed_write_is_reverted_even_when_the_store_cannot_be_read() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let original = service.load_layout(&alice).await.expect("Load failed.");

	client.fail_updates_for(original[0].id);
	// The confirmation fetch and the fetch after the revert both fail.
	client.fail_selects_after(1, 2);

	let outcome = service.reorder_layout(&alice, 2, Some(0)).await.expect("Reorder failed.");
	let SyncStatus::Reverted { failed, divergences, .. } = &outcome.sync else {
		panic!("Expected a reverted reorder, got {:?}.", outcome.sync);
	};

	assert_eq!(failed, &vec![original[0].id]);
	assert!(divergences.is_empty());
	assert_eq!(outcome.layout, original);
	assert_eq!(stored_positions(&client), positions_of(&original));
}

#[tokio::test]
async fn widget_updates_require_a_change_and_carry_the_owner() {
	let (service, client) = service_with(test_config());
	let alice = session(1);
	let layout = service.load_layout(&alice).await.expect("Load failed.");

	assert!(matches!(
		service.update_widget(&alice, layout[0].id, WidgetPatch::default()).await,
		Err(Error::InvalidRequest { .. })
	));

	client.clear_writes();

	let widget = service
		.update_widget(
			&alice,
			layout[0].id,
			WidgetPatch { is_active: Some(false), size: Some(WidgetSize::Large) },
		)
		.await
		.expect("Update failed.");

	assert!(!widget.is_active);
	assert_eq!(widget.size, WidgetSize::Large);

	let payload = client.writes()[0].payload.clone().expect("Update payload.");

	assert_eq!(payload.get("user_id"), Some(&Value::String(alice.user_id().to_string())));
	assert_eq!(payload.get("size"), Some(&json!("large")));
}
