use anyhow::Result;

use crate::Context;

pub fn handle(ctx: Context) -> Result<()> {
	let builder = ctx.into_builder()?;

	print!("{}", builder.dockerfile());
	Ok(())
}
