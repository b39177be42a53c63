use anyhow::{Context as _, Result};
use tokio::process::Command;

use crate::{process, Context};

pub async fn handle(ctx: &Context) -> Result<()> {
	let mut cmd = Command::new(&ctx.config.tools.flake8);
	cmd.arg(".").current_dir(&ctx.cwd);

	process::run(cmd).await.context("Lint check failed")?;

	println!("No lint violations found");
	Ok(())
}
