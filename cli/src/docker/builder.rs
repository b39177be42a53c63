use events_scrape_core::{ImageRef, PythonProject};
use indoc::indoc;
use map_macro::hash_map;
use std::{
	fs,
	path::{Path, PathBuf},
	process::Command,
};

use super::{
	dockerfile::{Dockerfile, DockerfileExt},
	verify_entrypoint, BuildOptions, Docker, Error,
};
use crate::config::Config;

const DOCKERIGNORE: &str = indoc! {"
	.git
	dist
	build
	*.egg-info
	__pycache__
	.venv
"};

/// Renders the image recipe for a project and drives `docker build`.
pub struct Builder {
	project: PythonProject,
	config: Config,
	docker: Docker,
}

impl Builder {
	pub fn new(project: PythonProject, config: Config) -> Self {
		Self {
			docker: Docker::new(&config.tools.docker),
			project,
			config,
		}
	}

	/// The Dockerfile this builder feeds to docker.
	pub fn dockerfile(&self) -> String {
		include_str!("../templates/Dockerfile")
			.to_string()
			.fill("service_image", &self.config.service_image)
			.fill("base_image", &self.config.base_image)
			.fill("entrypoint", &self.config.entrypoint)
			.handler("system", || Some(self.system_packages()))
			.handler("env", || {
				Some(
					self.config
						.env
						.iter()
						.fold(Dockerfile::new(), |file, (key, value)| file.env(key, value)),
				)
			})
			.build()
	}

	fn system_packages(&self) -> Dockerfile {
		let mut update = Command::new("dnf");
		update.args(["update", "-y"]);

		let mut install = Command::new("dnf");
		install
			.args(["install", "-y", "python3", "python3-pip"])
			.args(&self.config.system_packages);

		let mut clean = Command::new("dnf");
		clean.args(["clean", "all"]);

		Dockerfile::new().run_multiple(&[&update, &install, &clean])
	}

	/// Build the image and check that it starts the configured entrypoint.
	///
	/// # Errors
	///
	/// Returns an error if the daemon is unreachable, the build fails, or the
	/// resulting image has an unexpected entrypoint.
	pub async fn build(&self, image: &ImageRef) -> Result<(), Error> {
		self.docker.check_connection().await?;

		let image_name = image.to_string();
		let version = image.tag_or_default().to_string();
		let source = env!("CARGO_PKG_REPOSITORY").to_string();
		let dockerfile = self.dockerfile();
		tracing::debug!("Rendered Dockerfile:\n{dockerfile}");

		{
			let _ignore = IgnoreGuard::create(self.project.root())?;

			self.docker
				.build(
					self.project.root(),
					BuildOptions {
						image: &image_name,
						dockerfile: &dockerfile,
						labels: hash_map! {
							"org.opencontainers.image.title" => self.config.image_name.clone(),
							"org.opencontainers.image.version" => version,
							"org.opencontainers.image.source" => source,
						},
					},
				)
				.await?;
		}

		tracing::info!("Verifying entrypoint of {image_name}");
		let inspect = self.docker.inspect_image(&image_name).await?;
		verify_entrypoint(&inspect, &self.config.entrypoint)
	}

	/// # Errors
	///
	/// Returns an error if the push fails.
	pub async fn push(&self, image: &ImageRef) -> Result<(), Error> {
		self.docker.push(&image.to_string()).await
	}
}

/// Writes a `.dockerignore` for the duration of a build, unless the project
/// already has one. Only a file this guard created is removed again.
struct IgnoreGuard {
	path: Option<PathBuf>,
}

impl IgnoreGuard {
	fn create(root: &Path) -> Result<Self, Error> {
		let path = root.join(".dockerignore");
		if path.exists() {
			return Ok(Self { path: None });
		}

		fs::write(&path, DOCKERIGNORE).map_err(Error::Ignore)?;
		Ok(Self { path: Some(path) })
	}
}

impl Drop for IgnoreGuard {
	fn drop(&mut self) {
		if let Some(path) = &self.path {
			if let Err(e) = fs::remove_file(path) {
				tracing::warn!(
					"Failed to remove {}: {e}. You may need to remove it manually.",
					path.display()
				);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use indoc::indoc;

	fn project() -> (tempfile::TempDir, PythonProject) {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("requirements.txt"), "requests==2.31.0\n").unwrap();
		fs::write(dir.path().join("setup.py"), "").unwrap();
		let project = PythonProject::open(dir.path(), "assisted-events-scrape").unwrap();

		(dir, project)
	}

	#[test]
	fn default_recipe() {
		let (_dir, project) = project();
		let builder = Builder::new(project, Config::default());

		assert_eq!(
			builder.dockerfile(),
			indoc! {r#"
				FROM quay.io/edge-infrastructure/assisted-service:latest AS service

				FROM quay.io/centos/centos:stream9

				COPY --from=service /clients/assisted-service-client-*.tar.gz /build/pip/
				RUN dnf update -y && dnf install -y python3 python3-pip && dnf clean all

				WORKDIR /assisted-events-scrape
				COPY requirements.txt .
				RUN python3 -m pip install --no-cache-dir -r requirements.txt && python3 -m pip install --no-cache-dir /build/pip/*

				COPY . .
				RUN python3 -m pip install --no-cache-dir .

				ENTRYPOINT ["events_scrape"]
			"#}
		);
	}

	#[test]
	fn recipe_carries_configured_packages_and_env() {
		let (_dir, project) = project();
		let mut config = Config::default();
		config.system_packages = vec!["git".to_string()];
		config.env.insert("PYTHONUNBUFFERED".to_string(), "1".to_string());
		config.env.insert("A_FIRST".to_string(), "yes".to_string());

		let dockerfile = Builder::new(project, config).dockerfile();

		assert!(dockerfile.contains("dnf install -y python3 python3-pip git &&"));
		assert!(dockerfile.contains("ENV A_FIRST=yes\nENV PYTHONUNBUFFERED=1\n"));
		assert!(!dockerfile.contains("#SLOT"));
	}

	#[test]
	fn recipe_has_entrypoint_and_no_default_command() {
		let (_dir, project) = project();
		let dockerfile = Builder::new(project, Config::default()).dockerfile();

		assert!(dockerfile.ends_with("ENTRYPOINT [\"events_scrape\"]\n"));
		assert!(!dockerfile.lines().any(|line| line.starts_with("CMD")));
	}

	#[test]
	fn ignore_guard_cleans_up_only_its_own_file() {
		let (dir, _project) = project();
		let path = dir.path().join(".dockerignore");

		{
			let _guard = IgnoreGuard::create(dir.path()).unwrap();
			assert_eq!(fs::read_to_string(&path).unwrap(), DOCKERIGNORE);
		}
		assert!(!path.exists());

		fs::write(&path, "custom\n").unwrap();
		{
			let _guard = IgnoreGuard::create(dir.path()).unwrap();
		}
		assert_eq!(fs::read_to_string(&path).unwrap(), "custom\n");
	}

	#[test]
	fn ignore_file_write_failure_names_the_file() {
		let dir = tempfile::tempdir().unwrap();
		let err = IgnoreGuard::create(&dir.path().join("missing")).err().unwrap();

		assert!(matches!(err, Error::Ignore(_)));
		assert!(err.to_string().starts_with("Failed to write .dockerignore"));
	}
}
