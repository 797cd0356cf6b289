use std::path::PathBuf;

use clap::{
	Args,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Flags every hub binary accepts.
#[derive(Debug, Args)]
pub struct ConfigArgs {
	/// Path to the hub TOML configuration.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Falls back to `info` when the configured directive does not parse.
pub fn log_filter(level: &str) -> EnvFilter {
	EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_tracing(level: &str) {
	tracing_subscriber::fmt().with_env_filter(log_filter(level)).with_target(false).init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_log_level_falls_back_to_info() {
		let filter = log_filter("hub=loud");

		assert_eq!(filter.to_string(), "info");
	}

	#[test]
	fn valid_log_level_is_kept() {
		let filter = log_filter("hub_service=debug");

		assert_eq!(filter.to_string(), "hub_service=debug");
	}
}
