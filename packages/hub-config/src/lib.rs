mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Dashboard, Limits, Postgres, Rest, Security, Service, Storage};

use std::{fs, path::Path};

pub const BACKEND_POSTGRES: &str = "postgres";
pub const BACKEND_REST: &str = "rest";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	match cfg.storage.backend.as_str() {
		BACKEND_POSTGRES => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		BACKEND_REST => {
			let Some(rest) = cfg.storage.rest.as_ref() else {
				return Err(Error::Validation {
					message: "storage.rest is required when storage.backend is rest.".to_string(),
				});
			};

			if !(rest.url.starts_with("http://") || rest.url.starts_with("https://")) {
				return Err(Error::Validation {
					message: "storage.rest.url must start with http:// or https://.".to_string(),
				});
			}
			if rest.api_key.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.rest.api_key must be non-empty.".to_string(),
				});
			}
			if rest.timeout_ms == 0 {
				return Err(Error::Validation {
					message: "storage.rest.timeout_ms must be greater than zero.".to_string(),
				});
			}
			if rest.default_headers.values().any(|value| !value.is_string()) {
				return Err(Error::Validation {
					message: "storage.rest.default_headers values must be strings.".to_string(),
				});
			}
		},
		_ => {
			return Err(Error::Validation {
				message: "storage.backend must be one of postgres or rest.".to_string(),
			});
		},
	}

	if cfg.dashboard.max_write_attempts == 0 {
		return Err(Error::Validation {
			message: "dashboard.max_write_attempts must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("limits.max_title_chars", cfg.limits.max_title_chars),
		("limits.max_text_chars", cfg.limits.max_text_chars),
		("limits.max_tags", cfg.limits.max_tags),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.limits.max_title_chars > cfg.limits.max_text_chars {
		return Err(Error::Validation {
			message: "limits.max_title_chars must not exceed limits.max_text_chars.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.storage.backend = cfg.storage.backend.trim().to_ascii_lowercase();

	if let Some(rest) = cfg.storage.rest.as_mut() {
		rest.url = rest.url.trim().trim_end_matches('/').to_string();
	}
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
}
