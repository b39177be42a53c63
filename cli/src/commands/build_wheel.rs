use std::path::PathBuf;

use anyhow::{Context as _, Result};
use events_scrape_core::PythonProject;

use crate::Context;

pub async fn handle(ctx: &Context) -> Result<()> {
	let wheel = build(ctx, &ctx.project()?).await?;

	println!("Wheel built at {}", wheel.display());
	Ok(())
}

/// Build a fresh wheel and return its path.
pub(super) async fn build(ctx: &Context, project: &PythonProject) -> Result<PathBuf> {
	tracing::info!("Removing previous build output");
	project.clean_outputs()?;

	ctx.python()
		.build_wheel(project)
		.await
		.context("Failed to build wheel")?;

	Ok(project.find_wheel()?)
}
