use anyhow::{Context as _, Result};

use super::{build_image, ImageArgs};
use crate::Context;

pub async fn handle(ctx: Context, args: ImageArgs) -> Result<()> {
	let image = build_image::resolve(&ctx, &args)?;
	let builder = ctx.into_builder()?;

	build_image::build(&builder, &image).await?;
	builder
		.push(&image)
		.await
		.with_context(|| format!("Failed to push image {image}"))?;

	println!("Image '{image}' pushed");
	Ok(())
}
