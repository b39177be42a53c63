#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod image;
pub mod project;

pub use image::{ImageRef, DEFAULT_REGISTRY_PATH, DEFAULT_TAG, IMAGE_ENV, TAG_ENV, TOOL_NAME};
pub use project::{PackageDefinition, PythonProject};
