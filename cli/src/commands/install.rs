use std::ffi::OsStr;

use anyhow::{Context as _, Result};

use super::build_wheel;
use crate::Context;

pub async fn handle(ctx: &Context) -> Result<()> {
	let project = ctx.project()?;
	let wheel = build_wheel::build(ctx, &project).await?;
	let python = ctx.python();
	let package = project.name();

	// Uninstall first so stale files from an older version can't clash.
	if !python.pip_uninstall(&ctx.cwd, package).await? {
		tracing::info!("{package} was not installed, continuing");
	}

	python
		.pip_install(&ctx.cwd, [OsStr::new("-I"), wheel.as_os_str()])
		.await
		.with_context(|| format!("Failed to install {}", wheel.display()))?;

	println!("Installed {}", wheel.display());
	Ok(())
}
