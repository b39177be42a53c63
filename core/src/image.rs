use std::{fmt, str::FromStr};

/// Registry path images are published under.
pub const DEFAULT_REGISTRY_PATH: &str = "quay.io/edge-infrastructure";
/// Repository name of the tool inside the registry path.
pub const TOOL_NAME: &str = "assisted-events-scrape";
pub const DEFAULT_TAG: &str = "latest";

/// Environment variable holding the image tag.
pub const TAG_ENV: &str = "TAG";
/// Environment variable overriding the whole image reference.
pub const IMAGE_ENV: &str = "ASSISTED_EVENTS_SCRAPE_IMAGE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
	#[error("Image reference is empty.")]
	Empty,

	#[error("Image reference '{0}' has an empty tag.")]
	EmptyTag(String),

	#[error("Image reference '{0}' contains whitespace.")]
	Whitespace(String),
}

/// A container image reference in the form `repository[:tag]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
	pub repository: String,
	pub tag: Option<String>,
}

impl ImageRef {
	/// Build the reference `<registry>/<name>:<tag>`, falling back to [`DEFAULT_TAG`]
	/// when `tag` is missing or empty.
	#[must_use]
	pub fn new(registry: &str, name: &str, tag: Option<&str>) -> Self {
		let tag = non_empty(tag).unwrap_or(DEFAULT_TAG);

		Self {
			repository: format!("{}/{name}", registry.trim_end_matches('/')),
			tag: Some(tag.to_string()),
		}
	}

	/// Resolve the image to build. A non-empty `image_override` wins over the
	/// computed `<registry>/<name>:<tag>` reference.
	///
	/// # Errors
	///
	/// Returns an error if the override is not a valid image reference.
	pub fn resolve(
		registry: &str,
		name: &str,
		tag: Option<&str>,
		image_override: Option<&str>,
	) -> Result<Self, Error> {
		match non_empty(image_override) {
			Some(image) => image.parse(),
			None => Ok(Self::new(registry, name, tag)),
		}
	}

	#[must_use]
	pub fn tag_or_default(&self) -> &str {
		self.tag.as_deref().unwrap_or(DEFAULT_TAG)
	}
}

impl FromStr for ImageRef {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if s.is_empty() {
			return Err(Error::Empty);
		}
		if s.contains(char::is_whitespace) {
			return Err(Error::Whitespace(s.to_string()));
		}

		// A colon before the last slash belongs to a registry port, not a tag.
		let name_start = s.rfind('/').map_or(0, |i| i + 1);
		match s[name_start..].rfind(':') {
			Some(i) => {
				let (repository, tag) = s.split_at(name_start + i);
				let tag = &tag[1..];
				if tag.is_empty() {
					return Err(Error::EmptyTag(s.to_string()));
				}

				Ok(Self {
					repository: repository.to_string(),
					tag: Some(tag.to_string()),
				})
			},
			None => Ok(Self {
				repository: s.to_string(),
				tag: None,
			}),
		}
	}
}

impl fmt::Display for ImageRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.tag {
			Some(tag) => write!(f, "{}:{tag}", self.repository),
			None => f.write_str(&self.repository),
		}
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|v| !v.is_empty())
}
