use std::path::PathBuf;

use anyhow::Result;
use events_scrape_core::PythonProject;

use crate::{config::Config, docker::Builder, python::Python};

#[derive(Debug, Clone)]
pub struct Context {
	pub cwd: PathBuf,
	pub config: Config,
}

impl Context {
	/// Create a new context
	///
	/// # Errors
	///
	/// This function will return an error if the current working directory cannot be
	/// determined or the settings file is invalid.
	pub fn new() -> Result<Self> {
		let cwd = std::env::current_dir()?;

		Ok(Self {
			config: Config::load(&cwd)?,
			cwd,
		})
	}

	/// Open the Python project rooted at the working directory.
	///
	/// # Errors
	///
	/// Returns an error if the directory isn't a packageable project.
	pub fn project(&self) -> Result<PythonProject> {
		Ok(PythonProject::open(&self.cwd, &self.config.package)?)
	}

	#[must_use]
	pub fn python(&self) -> Python {
		Python::new(&self.config.tools.python)
	}

	/// # Errors
	///
	/// Returns an error if the directory isn't a packageable project.
	pub fn into_builder(self) -> Result<Builder> {
		Ok(Builder::new(self.project()?, self.config))
	}
}
