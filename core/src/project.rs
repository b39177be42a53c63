use std::{
	fs, io,
	path::{Path, PathBuf},
	time::SystemTime,
};

/// Pinned third-party dependencies, installed before the project itself.
pub const REQUIREMENTS: &str = "requirements.txt";
/// Directories produced by a wheel build.
pub const OUTPUT_DIRS: [&str; 2] = ["dist", "build"];
pub const DIST_DIR: &str = "dist";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Couldn't find {} in {}. Make sure you are in the root of the project.", REQUIREMENTS, .0.display())]
	MissingRequirements(PathBuf),

	#[error("Couldn't find setup.py or pyproject.toml in {}. Make sure you are in the root of the project.", .0.display())]
	MissingPackageDefinition(PathBuf),

	#[error("No wheel matching {prefix}-*.whl found in {}. Did the wheel build succeed?", .dir.display())]
	WheelNotFound { prefix: String, dir: PathBuf },

	#[error("Failed to access {}: {source}", .path.display())]
	Io { path: PathBuf, source: io::Error },
}

/// How the project declares itself installable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageDefinition {
	SetupPy,
	PyProject,
}

impl PackageDefinition {
	#[must_use]
	pub const fn file_name(self) -> &'static str {
		match self {
			Self::SetupPy => "setup.py",
			Self::PyProject => "pyproject.toml",
		}
	}
}

/// A Python source tree that can be packaged as a wheel and an image.
#[derive(Debug, Clone)]
pub struct PythonProject {
	root: PathBuf,
	name: String,
	definition: PackageDefinition,
}

impl PythonProject {
	/// Open the project at `root`, checking that it carries a dependency manifest
	/// and a package definition. `setup.py` is preferred over `pyproject.toml`.
	///
	/// # Errors
	///
	/// Returns an error if either file is missing.
	pub fn open(root: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self, Error> {
		let root = root.into();

		if !root.join(REQUIREMENTS).is_file() {
			return Err(Error::MissingRequirements(root));
		}

		let definition = [PackageDefinition::SetupPy, PackageDefinition::PyProject]
			.into_iter()
			.find(|def| root.join(def.file_name()).is_file())
			.ok_or_else(|| Error::MissingPackageDefinition(root.clone()))?;

		Ok(Self {
			root,
			name: name.into(),
			definition,
		})
	}

	#[must_use]
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// The distribution name, as given to `pip uninstall`.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub const fn definition(&self) -> PackageDefinition {
		self.definition
	}

	#[must_use]
	pub fn dist_dir(&self) -> PathBuf {
		self.root.join(DIST_DIR)
	}

	/// The file name prefix of wheels built for this project.
	#[must_use]
	pub fn wheel_prefix(&self) -> String {
		wheel_prefix(&self.name)
	}

	/// Remove every build output directory. Missing directories are fine.
	///
	/// # Errors
	///
	/// Returns an error if an existing directory cannot be removed.
	pub fn clean_outputs(&self) -> Result<(), Error> {
		for dir in OUTPUT_DIRS {
			let path = self.root.join(dir);
			match fs::remove_dir_all(&path) {
				Ok(()) => {},
				Err(e) if e.kind() == io::ErrorKind::NotFound => {},
				Err(source) => return Err(Error::Io { path, source }),
			}
		}

		Ok(())
	}

	/// Find the most recently built wheel for this project in `dist/`.
	///
	/// # Errors
	///
	/// Returns an error if `dist/` cannot be read or holds no matching wheel.
	pub fn find_wheel(&self) -> Result<PathBuf, Error> {
		let dir = self.dist_dir();
		let prefix = self.wheel_prefix();
		let not_found = || Error::WheelNotFound {
			prefix: prefix.clone(),
			dir: dir.clone(),
		};

		let entries = match fs::read_dir(&dir) {
			Ok(entries) => entries,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
			Err(source) => return Err(Error::Io { path: dir, source }),
		};

		let mut newest: Option<(SystemTime, PathBuf)> = None;
		for entry in entries {
			let entry = entry.map_err(|source| Error::Io {
				path: dir.clone(),
				source,
			})?;
			let path = entry.path();

			if !is_wheel_for(&path, &prefix) {
				continue;
			}

			let modified = entry
				.metadata()
				.and_then(|meta| meta.modified())
				.unwrap_or(SystemTime::UNIX_EPOCH);

			if newest.as_ref().map_or(true, |(time, _)| modified >= *time) {
				newest = Some((modified, path));
			}
		}

		newest.map(|(_, path)| path).ok_or_else(not_found)
	}
}

/// Normalise a distribution name the way wheel file names do.
#[must_use]
pub fn wheel_prefix(name: &str) -> String {
	name.replace(['-', '.'], "_")
}

fn is_wheel_for(path: &Path, prefix: &str) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.and_then(|name| name.strip_suffix(".whl"))
		.and_then(|stem| stem.strip_prefix(prefix))
		.is_some_and(|rest| rest.starts_with('-'))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	const NAME: &str = "assisted-events-scrape";

	fn project_dir(files: &[&str]) -> TempDir {
		let dir = tempfile::tempdir().unwrap();
		for file in files {
			fs::write(dir.path().join(file), "").unwrap();
		}
		dir
	}

	#[test]
	fn opens_a_setup_py_project() {
		let dir = project_dir(&["requirements.txt", "setup.py", "pyproject.toml"]);
		let project = PythonProject::open(dir.path(), NAME).unwrap();

		assert_eq!(project.definition(), PackageDefinition::SetupPy);
		assert_eq!(project.wheel_prefix(), "assisted_events_scrape");
	}

	#[test]
	fn falls_back_to_pyproject() {
		let dir = project_dir(&["requirements.txt", "pyproject.toml"]);
		let project = PythonProject::open(dir.path(), NAME).unwrap();

		assert_eq!(project.definition(), PackageDefinition::PyProject);
	}

	#[test]
	fn requires_manifest_and_definition() {
		let dir = project_dir(&["setup.py"]);
		assert!(matches!(
			PythonProject::open(dir.path(), NAME),
			Err(Error::MissingRequirements(_))
		));

		let dir = project_dir(&["requirements.txt"]);
		assert!(matches!(
			PythonProject::open(dir.path(), NAME),
			Err(Error::MissingPackageDefinition(_))
		));
	}

	#[test]
	fn clean_outputs_removes_previous_artifacts() {
		let dir = project_dir(&["requirements.txt", "setup.py"]);
		let project = PythonProject::open(dir.path(), NAME).unwrap();

		fs::create_dir_all(dir.path().join("dist")).unwrap();
		fs::create_dir_all(dir.path().join("build/lib")).unwrap();
		fs::write(
			dir.path().join("dist/assisted_events_scrape-0.1-py3-none-any.whl"),
			"",
		)
		.unwrap();

		project.clean_outputs().unwrap();
		assert!(!dir.path().join("dist").exists());
		assert!(!dir.path().join("build").exists());

		// Nothing left to remove is not an error.
		project.clean_outputs().unwrap();
	}

	#[test]
	fn finds_only_matching_wheels() {
		let dir = project_dir(&["requirements.txt", "setup.py"]);
		let project = PythonProject::open(dir.path(), NAME).unwrap();

		assert!(matches!(
			project.find_wheel(),
			Err(Error::WheelNotFound { .. })
		));

		fs::create_dir_all(project.dist_dir()).unwrap();
		for file in [
			"assisted_events_scrape_extra-1.0-py3-none-any.whl",
			"other-1.0-py3-none-any.whl",
			"assisted_events_scrape-0.1.tar.gz",
		] {
			fs::write(project.dist_dir().join(file), "").unwrap();
		}
		assert!(project.find_wheel().is_err());

		let wheel = project
			.dist_dir()
			.join("assisted_events_scrape-0.1-py3-none-any.whl");
		fs::write(&wheel, "").unwrap();
		assert_eq!(project.find_wheel().unwrap(), wheel);
	}
}
