use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, PathRejection, QueryRejection},
	},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, patch, post, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use hub_domain::{
	blog::{BlogDraft, BlogFilter, BlogPost},
	bucket_list::{BucketListDraft, BucketListFilter, BucketListItem},
	dashboard::{DashboardWidget, WidgetPatch},
	dating_ideas::{DatingIdea, IdeaDraft, IdeaFilter},
	dating_journal::{JournalDraft, JournalEntry, JournalFilter},
	events::{Event, EventDraft, EventFilter},
};
use hub_service::{Error as ServiceError, ReorderOutcome, Session};

pub const HEADER_USER_ID: &str = "x-hub-user-id";
pub const HEADER_DISPLAY_NAME: &str = "x-hub-display-name";
const HEADER_AUTHORIZATION: &str = "authorization";

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
	pub source: usize,
	#[serde(default)]
	pub destination: Option<usize>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/bucket-list", get(list_bucket_list).post(create_bucket_list_item))
		.route(
			"/v1/bucket-list/{id}",
			put(update_bucket_list_item).delete(delete_bucket_list_item),
		)
		.route("/v1/bucket-list/{id}/toggle", post(toggle_bucket_list_item))
		.route("/v1/dating-journal", get(list_journal_entries).post(create_journal_entry))
		.route(
			"/v1/dating-journal/{id}",
			put(update_journal_entry).delete(delete_journal_entry),
		)
		.route("/v1/dating-ideas", get(list_dating_ideas).post(create_dating_idea))
		.route("/v1/dating-ideas/{id}", put(update_dating_idea).delete(delete_dating_idea))
		.route("/v1/events", get(list_events).post(create_event))
		.route("/v1/events/{id}", put(update_event).delete(delete_event))
		.route("/v1/blog", get(list_blog_posts).post(create_blog_post))
		.route(
			"/v1/blog/{id}",
			get(get_blog_post).put(update_blog_post).delete(delete_blog_post),
		)
		.route("/v1/dashboard", get(load_layout))
		.route("/v1/dashboard/reorder", post(reorder_layout))
		.route("/v1/dashboard/reset", post(reset_layout))
		.route("/v1/dashboard/widgets/{id}", patch(update_widget))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_bucket_list(
	State(state): State<AppState>,
	headers: HeaderMap,
	criteria: Result<Query<BucketListFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<BucketListItem>>> {
	let session = session_from_headers(&state, &headers)?;
	let items = state.service.list_bucket_list(&session, &query(criteria)?).await?;

	Ok(Json(items))
}

async fn create_bucket_list_item(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<BucketListDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BucketListItem>)> {
	let session = session_from_headers(&state, &headers)?;
	let item = state.service.create_bucket_list_item(&session, body(payload)?).await?;

	Ok((StatusCode::CREATED, Json(item)))
}

async fn update_bucket_list_item(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<BucketListDraft>, JsonRejection>,
) -> ApiResult<Json<BucketListItem>> {
	let session = session_from_headers(&state, &headers)?;
	let item =
		state.service.update_bucket_list_item(&session, path_id(id)?, body(payload)?).await?;

	Ok(Json(item))
}

async fn toggle_bucket_list_item(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BucketListItem>> {
	let session = session_from_headers(&state, &headers)?;
	let item = state.service.toggle_bucket_list_item(&session, path_id(id)?).await?;

	Ok(Json(item))
}

async fn delete_bucket_list_item(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
	let session = session_from_headers(&state, &headers)?;

	state.service.delete_bucket_list_item(&session, path_id(id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_journal_entries(
	State(state): State<AppState>,
	headers: HeaderMap,
	criteria: Result<Query<JournalFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<JournalEntry>>> {
	let session = session_from_headers(&state, &headers)?;
	let entries = state.service.list_journal_entries(&session, &query(criteria)?).await?;

	Ok(Json(entries))
}

async fn create_journal_entry(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<JournalDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<JournalEntry>)> {
	let session = session_from_headers(&state, &headers)?;
	let entry = state.service.create_journal_entry(&session, body(payload)?).await?;

	Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_journal_entry(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<JournalDraft>, JsonRejection>,
) -> ApiResult<Json<JournalEntry>> {
	let session = session_from_headers(&state, &headers)?;
	let entry = state.service.update_journal_entry(&session, path_id(id)?, body(payload)?).await?;

	Ok(Json(entry))
}

async fn delete_journal_entry(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
	let session = session_from_headers(&state, &headers)?;

	state.service.delete_journal_entry(&session, path_id(id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_dating_ideas(
	State(state): State<AppState>,
	headers: HeaderMap,
	criteria: Result<Query<IdeaFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<DatingIdea>>> {
	let session = session_from_headers(&state, &headers)?;
	let ideas = state.service.list_dating_ideas(&session, &query(criteria)?).await?;

	Ok(Json(ideas))
}

async fn create_dating_idea(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<IdeaDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DatingIdea>)> {
	let session = session_from_headers(&state, &headers)?;
	let idea = state.service.create_dating_idea(&session, body(payload)?).await?;

	Ok((StatusCode::CREATED, Json(idea)))
}

async fn update_dating_idea(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<IdeaDraft>, JsonRejection>,
) -> ApiResult<Json<DatingIdea>> {
	let session = session_from_headers(&state, &headers)?;
	let idea = state.service.update_dating_idea(&session, path_id(id)?, body(payload)?).await?;

	Ok(Json(idea))
}

async fn delete_dating_idea(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
	let session = session_from_headers(&state, &headers)?;

	state.service.delete_dating_idea(&session, path_id(id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_events(
	State(state): State<AppState>,
	headers: HeaderMap,
	criteria: Result<Query<EventFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Event>>> {
	let session = session_from_headers(&state, &headers)?;
	let events = state.service.list_events(&session, &query(criteria)?).await?;

	Ok(Json(events))
}

async fn create_event(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<EventDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Event>)> {
	let session = session_from_headers(&state, &headers)?;
	let event = state.service.create_event(&session, body(payload)?).await?;

	Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<EventDraft>, JsonRejection>,
) -> ApiResult<Json<Event>> {
	let session = session_from_headers(&state, &headers)?;
	let event = state.service.update_event(&session, path_id(id)?, body(payload)?).await?;

	Ok(Json(event))
}

async fn delete_event(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
	let session = session_from_headers(&state, &headers)?;

	state.service.delete_event(&session, path_id(id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn list_blog_posts(
	State(state): State<AppState>,
	headers: HeaderMap,
	criteria: Result<Query<BlogFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<BlogPost>>> {
	let session = session_from_headers(&state, &headers)?;
	let posts = state.service.list_blog_posts(&session, &query(criteria)?).await?;

	Ok(Json(posts))
}

async fn get_blog_post(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BlogPost>> {
	let session = session_from_headers(&state, &headers)?;
	let post = state.service.get_blog_post(&session, path_id(id)?).await?;

	Ok(Json(post))
}

async fn create_blog_post(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<BlogDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
	let session = session_from_headers(&state, &headers)?;
	let post = state.service.create_blog_post(&session, body(payload)?).await?;

	Ok((StatusCode::CREATED, Json(post)))
}

async fn update_blog_post(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<BlogDraft>, JsonRejection>,
) -> ApiResult<Json<BlogPost>> {
	let session = session_from_headers(&state, &headers)?;
	let post = state.service.update_blog_post(&session, path_id(id)?, body(payload)?).await?;

	Ok(Json(post))
}

async fn delete_blog_post(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
	let session = session_from_headers(&state, &headers)?;

	state.service.delete_blog_post(&session, path_id(id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn load_layout(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> ApiResult<Json<Vec<DashboardWidget>>> {
	let session = session_from_headers(&state, &headers)?;
	let layout = state.service.load_layout(&session).await?;

	Ok(Json(layout))
}

async fn reorder_layout(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<ReorderOutcome>> {
	let session = session_from_headers(&state, &headers)?;
	let request = body(payload)?;
	let outcome =
		state.service.reorder_layout(&session, request.source, request.destination).await?;

	Ok(Json(outcome))
}

async fn reset_layout(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> ApiResult<Json<Vec<DashboardWidget>>> {
	let session = session_from_headers(&state, &headers)?;
	let layout = state.service.reset_layout(&session).await?;

	Ok(Json(layout))
}

async fn update_widget(
	State(state): State<AppState>,
	headers: HeaderMap,
	id: Result<Path<Uuid>, PathRejection>,
	payload: Result<Json<WidgetPatch>, JsonRejection>,
) -> ApiResult<Json<DashboardWidget>> {
	let session = session_from_headers(&state, &headers)?;
	let widget = state.service.update_widget(&session, path_id(id)?, body(payload)?).await?;

	Ok(Json(widget))
}

/// Resolves the acting session. Checks the bearer token first when one is configured.
fn session_from_headers(state: &AppState, headers: &HeaderMap) -> ApiResult<Session> {
	if let Some(expected) = state.service.cfg.security.api_auth_token.as_deref()
		&& read_bearer_token(headers) != Some(expected)
	{
		return Err(unauthenticated("A valid bearer token is required."));
	}

	let raw = headers
		.get(HEADER_USER_ID)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.ok_or_else(|| unauthenticated("X-Hub-User-Id header is required."))?;
	let user_id = Uuid::parse_str(raw)
		.map_err(|_| unauthenticated("X-Hub-User-Id must be a UUID."))?;
	let session = Session::new(user_id)?;
	let display_name = headers.get(HEADER_DISPLAY_NAME).and_then(|value| value.to_str().ok());

	Ok(match display_name {
		Some(name) => session.with_display_name(name),
		None => session,
	})
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(HEADER_AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
	payload
		.map(|Json(value)| value)
		.map_err(|err| invalid_request(format!("Invalid request body: {}", err.body_text())))
}

fn query<T>(criteria: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
	criteria
		.map(|Query(value)| value)
		.map_err(|err| invalid_request(format!("Invalid query: {}", err.body_text())))
}

fn path_id(id: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
	id.map(|Path(value)| value).map_err(|_| invalid_request("Path id must be a UUID."))
}

fn invalid_request(message: impl Into<String>) -> ApiError {
	json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None)
}

fn unauthenticated(message: &str) -> ApiError {
	json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message, None)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => invalid_request(message),
			ServiceError::Rejected(rejection) => json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				rejection.to_string(),
				Some(vec![rejection.field.to_string()]),
			),
			ServiceError::Unauthenticated { message } => unauthenticated(&message),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			ServiceError::Storage { message } => {
				tracing::warn!(error = %message, "Storage request failed.");

				json_error(StatusCode::BAD_GATEWAY, "storage_error", message, None)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
