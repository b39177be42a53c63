mod builder;
mod dockerfile;

use std::{collections::HashMap, path::Path, process::Stdio};

use serde_json::Value;
use tokio::process::Command;

pub use builder::Builder;

use crate::{helpers::is_m1_mac, process};

/// Errors that can occur when interacting with the docker CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Could not connect to Docker. Is the docker daemon running?")]
	NotRunning,

	#[error("The provided image could not be found.")]
	NotFound,

	#[error("{0}")]
	Command(String),

	#[error("Failed to parse output from command: {0}")]
	Parse(String),

	#[error("Image entrypoint is {found}, expected [\"{expected}\"] with no default command.")]
	Entrypoint { expected: String, found: String },

	#[error("Failed to write .dockerignore: {0}")]
	Ignore(#[source] std::io::Error),

	#[error(transparent)]
	Process(#[from] process::Error),

	#[error("Failed to run command: {0}")]
	Spawn(#[from] std::io::Error),

	#[error("Failed to parse output from command: {0}")]
	ToString(#[from] std::string::FromUtf8Error),

	#[error("Failed to parse output from command: {0}")]
	Deserialize(#[from] serde_json::Error),
}

/// Options for a single `docker build`.
#[derive(Debug, Default)]
pub struct BuildOptions<'a> {
	pub image: &'a str,
	pub dockerfile: &'a str,
	pub labels: HashMap<&'a str, String>,
}

/// A wrapper around the docker CLI.
#[derive(Debug, Clone)]
pub struct Docker {
	program: String,
}

impl Docker {
	pub fn new(program: impl Into<String>) -> Self {
		Self {
			program: program.into(),
		}
	}

	fn command(&self) -> Command {
		Command::new(&self.program)
	}

	/// Check if the docker daemon is running.
	///
	/// # Errors
	///
	/// Returns an error if the docker daemon is not running.
	pub async fn check_connection(&self) -> Result<(), Error> {
		let status = self
			.command()
			.arg("info")
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.status()
			.await?;

		if !status.success() {
			return Err(Error::NotRunning);
		}

		Ok(())
	}

	/// Inspect the given image.
	/// Returns the image metadata as a JSON struct.
	///
	/// # Errors
	///
	/// Returns an error if the image could not be found.
	pub async fn inspect_image(&self, image: &str) -> Result<Value, Error> {
		let output = self
			.command()
			.arg("image")
			.arg("inspect")
			.arg(image)
			.output()
			.await?;

		if !output.status.success()
			&& String::from_utf8(output.stderr.clone())?.contains("No such image")
		{
			return Err(Error::NotFound);
		}

		if !output.status.success() {
			return Err(Error::Command(format!(
				"Failed to inspect image: {}",
				String::from_utf8(output.stderr)?.trim()
			)));
		}

		Ok(serde_json::from_slice(&output.stdout)?)
	}

	/// Build an image from the given Dockerfile contents, using `context` as the
	/// build context. Build output is streamed to the terminal.
	///
	/// # Errors
	///
	/// Returns an error if the build fails.
	pub async fn build(&self, context: &Path, opts: BuildOptions<'_>) -> Result<(), Error> {
		let mut cmd = self.command();

		cmd.args(if is_m1_mac() {
			vec!["buildx", "build", "--platform", "linux/amd64", "--load"]
		} else {
			vec!["build"]
		})
		.args(["--file", "-", "--tag", opts.image])
		.args(
			sorted(&opts.labels)
				.into_iter()
				.flat_map(|(key, value)| ["--label".to_string(), format!("{key}={value}")]),
		)
		.arg(".")
		.current_dir(context)
		.env("DOCKER_BUILDKIT", "1");

		process::run_with_input(cmd, opts.dockerfile.as_bytes()).await?;

		Ok(())
	}

	/// Push the given image to its registry.
	///
	/// # Errors
	///
	/// Returns an error if the push fails.
	pub async fn push(&self, image: &str) -> Result<(), Error> {
		let mut cmd = self.command();
		cmd.arg("push").arg(image);

		process::run(cmd).await?;

		Ok(())
	}
}

/// Check that an inspected image starts `entrypoint` with no arguments.
///
/// # Errors
///
/// Returns an error if the metadata is malformed or the entrypoint differs.
pub fn verify_entrypoint(inspect: &Value, entrypoint: &str) -> Result<(), Error> {
	let config = inspect
		.get(0)
		.and_then(|image| image.get("Config"))
		.ok_or_else(|| Error::Parse("docker image inspect".to_string()))?;

	let found = config.get("Entrypoint").cloned().unwrap_or(Value::Null);
	let has_cmd = config
		.get("Cmd")
		.and_then(Value::as_array)
		.is_some_and(|cmd| !cmd.is_empty());

	if has_cmd || found != Value::Array(vec![Value::from(entrypoint)]) {
		return Err(Error::Entrypoint {
			expected: entrypoint.to_string(),
			found: found.to_string(),
		});
	}

	Ok(())
}

fn sorted<'a>(labels: &'a HashMap<&'a str, String>) -> Vec<(&'a str, &'a str)> {
	let mut labels = labels
		.iter()
		.map(|(key, value)| (*key, value.as_str()))
		.collect::<Vec<_>>();
	labels.sort_unstable();
	labels
}
