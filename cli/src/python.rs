use std::path::Path;

use events_scrape_core::{PackageDefinition, PythonProject};
use tokio::process::Command;

use crate::process;

/// A wrapper around the Python interpreter and pip.
#[derive(Debug, Clone)]
pub struct Python {
	program: String,
}

impl Python {
	pub fn new(program: impl Into<String>) -> Self {
		Self {
			program: program.into(),
		}
	}

	fn command(&self, cwd: &Path) -> Command {
		let mut cmd = Command::new(&self.program);
		cmd.current_dir(cwd);
		cmd
	}

	fn pip(&self, cwd: &Path) -> Command {
		let mut cmd = self.command(cwd);
		cmd.args(["-m", "pip"]);
		cmd
	}

	/// `pip install <args>`.
	///
	/// # Errors
	///
	/// Returns an error if pip fails.
	pub async fn pip_install<I, S>(&self, cwd: &Path, args: I) -> Result<(), process::Error>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<std::ffi::OsStr>,
	{
		let mut cmd = self.pip(cwd);
		cmd.arg("install").args(args);

		process::run(cmd).await
	}

	/// `pip uninstall -y <package>`. Returns whether pip reported success; a
	/// package that isn't installed is not an error.
	///
	/// # Errors
	///
	/// Returns an error only if pip cannot be run at all or is interrupted.
	pub async fn pip_uninstall(&self, cwd: &Path, package: &str) -> Result<bool, process::Error> {
		let mut cmd = self.pip(cwd);
		cmd.args(["uninstall", "-y", package]);

		let status = process::status(&mut cmd).await?;
		if !status.success() {
			tracing::debug!("Ignoring failed uninstall of {package} ({status})");
		}

		Ok(status.success())
	}

	/// Build a wheel for `project` into its `dist/` directory.
	///
	/// # Errors
	///
	/// Returns an error if the packaging tool fails.
	pub async fn build_wheel(&self, project: &PythonProject) -> Result<(), process::Error> {
		let mut cmd = self.command(project.root());

		match project.definition() {
			PackageDefinition::SetupPy => {
				cmd.args(["setup.py", "bdist_wheel"]);
			},
			PackageDefinition::PyProject => {
				cmd.args(["-m", "pip", "wheel", "--no-deps", "--wheel-dir"])
					.arg(project.dist_dir())
					.arg(".");
			},
		}

		process::run(cmd).await
	}

	/// Run pytest with the given arguments.
	///
	/// # Errors
	///
	/// Returns an error if any test fails.
	pub async fn pytest(&self, cwd: &Path, args: &[&str]) -> Result<(), process::Error> {
		let mut cmd = self.command(cwd);
		cmd.args(["-m", "pytest"]).args(args);

		process::run(cmd).await
	}
}
