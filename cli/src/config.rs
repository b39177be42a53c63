use std::{collections::BTreeMap, fs, io, path::Path};

use events_scrape_core::{image, ImageRef, DEFAULT_REGISTRY_PATH, TOOL_NAME};
use serde::Deserialize;

/// Optional project-level settings file, read from the project root.
pub const CONFIG_FILE: &str = "events-scrape.toml";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read {CONFIG_FILE}: {0}")]
	Read(#[from] io::Error),

	#[error("Failed to parse {CONFIG_FILE}: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("Invalid image name: {0}")]
	Image(#[from] image::Error),
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Registry path the image is published under.
	pub registry: String,
	/// Repository name of the image.
	pub image_name: String,
	/// Distribution name of the Python package.
	pub package: String,
	/// Package installed by `install_assisted_service_client`.
	pub client_package: String,
	/// Image carrying the assisted-service client tarballs.
	pub service_image: String,
	pub base_image: String,
	/// Extra OS packages installed next to the Python runtime.
	pub system_packages: Vec<String>,
	pub env: BTreeMap<String, String>,
	pub entrypoint: String,
	pub tools: Tools,
}

/// Programs the runner shells out to.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Tools {
	pub python: String,
	pub docker: String,
	pub flake8: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			registry: DEFAULT_REGISTRY_PATH.to_string(),
			image_name: TOOL_NAME.to_string(),
			package: TOOL_NAME.to_string(),
			client_package: "assisted-service-client".to_string(),
			service_image: "quay.io/edge-infrastructure/assisted-service:latest".to_string(),
			base_image: "quay.io/centos/centos:stream9".to_string(),
			system_packages: Vec::new(),
			env: BTreeMap::new(),
			entrypoint: "events_scrape".to_string(),
			tools: Tools::default(),
		}
	}
}

impl Default for Tools {
	fn default() -> Self {
		Self {
			python: "python3".to_string(),
			docker: "docker".to_string(),
			flake8: "flake8".to_string(),
		}
	}
}

impl Config {
	/// Load the settings file from `root`, or the defaults if there is none.
	///
	/// # Errors
	///
	/// Returns an error if the file exists but cannot be read or parsed.
	pub fn load(root: &Path) -> Result<Self, Error> {
		match fs::read_to_string(root.join(CONFIG_FILE)) {
			Ok(contents) => Self::from_toml(&contents),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
			Err(e) => Err(e.into()),
		}
	}

	/// # Errors
	///
	/// Returns an error if `contents` is not a valid settings document.
	pub fn from_toml(contents: &str) -> Result<Self, Error> {
		Ok(toml::from_str(contents)?)
	}

	/// The image to build: `image` if given, otherwise `<registry>/<image_name>:<tag>`.
	///
	/// # Errors
	///
	/// Returns an error if the override is not a valid image reference.
	pub fn image_ref(&self, tag: Option<&str>, image: Option<&str>) -> Result<ImageRef, Error> {
		Ok(ImageRef::resolve(
			&self.registry,
			&self.image_name,
			tag,
			image,
		)?)
	}
}
