#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use clap::Parser;
use context::Context;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod context;
mod docker;
mod helpers;
mod process;
mod python;

#[derive(Parser)]
#[clap(name = "scrape-tasks", version)]
/// Build, install, lint and containerize assisted-events-scrape
struct Cli {
	#[command(subcommand)]
	command: commands::Command,
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();

	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("scrape_tasks=info")),
		)
		.init();

	let result = match Context::new() {
		Ok(ctx) => commands::exec(ctx, cli.command).await,
		Err(e) => Err(e),
	};

	if let Err(err) = result {
		eprintln!("Error: {err:#}");
		std::process::exit(exit_code(&err));
	}
}

/// The exit status of the tool that failed, or 1 when no tool is to blame.
fn exit_code(err: &anyhow::Error) -> i32 {
	err.chain()
		.find_map(|cause| {
			cause
				.downcast_ref::<process::Error>()
				.or_else(|| match cause.downcast_ref::<docker::Error>() {
					Some(docker::Error::Process(e)) => Some(e),
					_ => None,
				})
		})
		.map_or(1, process::Error::exit_code)
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;
	use anyhow::Context as _;
	use std::{os::unix::process::ExitStatusExt, process::ExitStatus};

	fn failed(code: i32) -> process::Error {
		process::Error::Failed {
			program: "flake8".to_string(),
			status: ExitStatus::from_raw(code << 8),
		}
	}

	#[test]
	fn tool_exit_code_survives_context() {
		let err = Err::<(), _>(failed(4)).context("Lint check failed").unwrap_err();

		assert_eq!(exit_code(&err), 4);
	}

	#[test]
	fn tool_exit_code_survives_docker_wrapping() {
		let err = Err::<(), _>(docker::Error::from(failed(7)))
			.context("Failed to build image")
			.unwrap_err();

		assert_eq!(exit_code(&err), 7);
	}

	#[test]
	fn other_errors_exit_with_one() {
		let err = anyhow::anyhow!("no project here");

		assert_eq!(exit_code(&err), 1);
	}
}
