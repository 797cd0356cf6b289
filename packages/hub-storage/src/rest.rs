//! Hosted PostgREST-compatible backend.

use std::time::Duration;

use reqwest::{
	Client, RequestBuilder, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::{Map, Value};

use crate::{
	BoxFuture, DataClient, Error, Mutation, Result, Scope, Select, Table, Target, UserId, client,
};

const API_KEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

pub struct RestClient {
	http: Client,
	base_url: String,
	headers: HeaderMap,
}
impl RestClient {
	pub fn new(cfg: &hub_config::Rest) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let headers = auth_headers(&cfg.api_key, &cfg.default_headers)?;

		Ok(Self { http, base_url: cfg.url.trim_end_matches('/').to_string(), headers })
	}

	pub fn table_url(&self, table: Table) -> String {
		format!("{}/rest/v1/{table}", self.base_url)
	}

	fn request(&self, builder: RequestBuilder) -> RequestBuilder {
		builder.headers(self.headers.clone())
	}
}
impl DataClient for RestClient {
	fn select<'a>(&'a self, table: Table, query: &'a Select) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move {
			let params = select_params(query)?;
			let res =
				self.request(self.http.get(self.table_url(table))).query(&params).send().await?;

			read_rows(res).await
		})
	}

	fn insert<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		rows: &'a [Map<String, Value>],
	) -> BoxFuture<'a, Result<Vec<Value>>> {
		Box::pin(async move {
			client::validate_rows(user_id, rows)?;

			if rows.is_empty() {
				return Ok(Vec::new());
			}

			let res = self
				.request(self.http.post(self.table_url(table)))
				.header(PREFER_HEADER, RETURN_REPRESENTATION)
				.json(rows)
				.send()
				.await?;

			read_rows(res).await
		})
	}

	fn update<'a>(
		&'a self,
		table: Table,
		target: Mutation,
		patch: &'a Map<String, Value>,
	) -> BoxFuture<'a, Result<Option<Value>>> {
		Box::pin(async move {
			client::validate_patch(target.user_id, patch)?;

			let params = row_params(target.user_id, Target::One(target.id));
			let res = self
				.request(self.http.patch(self.table_url(table)))
				.header(PREFER_HEADER, RETURN_REPRESENTATION)
				.query(&params)
				.json(patch)
				.send()
				.await?;
			let rows = read_rows(res).await?;

			Ok(rows.into_iter().next())
		})
	}

	fn delete<'a>(
		&'a self,
		table: Table,
		user_id: UserId,
		target: Target,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			let params = row_params(user_id, target);
			let res = self
				.request(self.http.delete(self.table_url(table)))
				.header(PREFER_HEADER, RETURN_REPRESENTATION)
				.query(&params)
				.send()
				.await?;
			let rows = read_rows(res).await?;

			Ok(rows.len() as u64)
		})
	}
}

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(HeaderName::from_static(API_KEY_HEADER), HeaderValue::from_str(api_key)?);
	headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {api_key}"))?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidArgument(format!(
				"Default header {key:?} must be a string."
			)));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, HeaderValue::from_str(raw)?);
	}

	Ok(headers)
}

/// Query string for a select: `select=*`, the scope, `eq.` filters, and the order.
pub fn select_params(query: &Select) -> Result<Vec<(String, String)>> {
	query.validate()?;

	let mut params = vec![("select".to_string(), "*".to_string())];

	match &query.scope {
		Scope::Owned { user_id } => params.push(("user_id".to_string(), format!("eq.{user_id}"))),
		Scope::Visible { user_id, public_column } => params
			.push(("or".to_string(), format!("(user_id.eq.{user_id},{public_column}.is.true)"))),
	}

	for condition in &query.filters {
		let operand = match &condition.value {
			Value::Null => "is.null".to_string(),
			Value::String(raw) => format!("eq.{raw}"),
			other => format!("eq.{other}"),
		};

		params.push((condition.column.to_string(), operand));
	}

	if !query.order.is_empty() {
		let order = query
			.order
			.iter()
			.map(|order| format!("{}.{}", order.column, order.direction.as_str()))
			.collect::<Vec<_>>()
			.join(",");

		params.push(("order".to_string(), order));
	}

	Ok(params)
}

pub fn row_params(user_id: UserId, target: Target) -> Vec<(String, String)> {
	let mut params = Vec::with_capacity(2);

	if let Target::One(id) = target {
		params.push(("id".to_string(), format!("eq.{id}")));
	}

	params.push(("user_id".to_string(), format!("eq.{user_id}")));

	params
}

async fn read_rows(res: Response) -> Result<Vec<Value>> {
	let status = res.status();

	if !status.is_success() {
		let message = res.text().await.unwrap_or_default();

		tracing::warn!(
			status = status.as_u16(),
			message = %message,
			"Remote store rejected request."
		);

		return Err(Error::Remote { status: status.as_u16(), message });
	}

	let body: Value = res.json().await?;
	let rows: Vec<Value> = serde_json::from_value(body)?;

	Ok(rows)
}
