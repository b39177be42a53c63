use anyhow::{Context as _, Result};

use crate::Context;

pub async fn handle(ctx: &Context) -> Result<()> {
	let package = &ctx.config.client_package;

	ctx.python()
		.pip_install(&ctx.cwd, [package])
		.await
		.with_context(|| format!("Failed to install {package}"))?;

	println!("Installed {package}");
	Ok(())
}
