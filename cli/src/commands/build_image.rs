use anyhow::{Context as _, Result};
use events_scrape_core::ImageRef;

use super::ImageArgs;
use crate::{docker::Builder, Context};

pub async fn handle(ctx: Context, args: ImageArgs) -> Result<()> {
	let image = resolve(&ctx, &args)?;
	let builder = ctx.into_builder()?;

	build(&builder, &image).await?;

	println!("Image built as {image}");
	Ok(())
}

pub(super) fn resolve(ctx: &Context, args: &ImageArgs) -> Result<ImageRef> {
	Ok(ctx
		.config
		.image_ref(args.tag.as_deref(), args.image.as_deref())?)
}

pub(super) async fn build(builder: &Builder, image: &ImageRef) -> Result<()> {
	tracing::info!("Building image {image}");

	builder
		.build(image)
		.await
		.with_context(|| format!("Failed to build image {image}"))
}
