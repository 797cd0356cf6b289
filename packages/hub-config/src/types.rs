use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub dashboard: Dashboard,
	#[serde(default)]
	pub limits: Limits,
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	/// Either "postgres" or "rest".
	pub backend: String,
	pub postgres: Option<Postgres>,
	pub rest: Option<Rest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// A hosted PostgREST-compatible endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Rest {
	pub url: String,
	pub api_key: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Dashboard {
	/// Attempts per position write before the reorder is considered failed.
	pub max_write_attempts: u32,
	pub revert_on_failure: bool,
}
impl Default for Dashboard {
	fn default() -> Self {
		Self { max_write_attempts: 3, revert_on_failure: true }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
	pub max_title_chars: u32,
	pub max_text_chars: u32,
	pub max_tags: u32,
}
impl Default for Limits {
	fn default() -> Self {
		Self { max_title_chars: 200, max_text_chars: 10_000, max_tags: 16 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub api_auth_token: Option<String>,
}
