use anyhow::Result;
use clap::{Args, Subcommand};
use events_scrape_core::{IMAGE_ENV, TAG_ENV};

use crate::Context;

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Install the assisted-service client package with pip
	#[clap(name = "install_assisted_service_client")]
	InstallAssistedServiceClient,

	/// Build the container image
	BuildImage(ImageArgs),

	/// Build a distributable wheel into dist/, removing previous build output first
	BuildWheel,

	/// Build the wheel and (re)install it into the current Python environment
	Install,

	/// Run flake8 over the project
	#[clap(visible_alias = "flake8")]
	Lint,

	/// Run the unit test suite
	UnitTest,

	/// Run the integration test suite against a running environment
	IntegrationTest,

	/// Build the container image and push it to its registry
	Push(ImageArgs),

	/// Print the Dockerfile used to build the image
	Dockerfile,
}

#[derive(Debug, Args)]
pub struct ImageArgs {
	/// Tag for the image. Defaults to 'latest'
	#[clap(long, env = TAG_ENV)]
	pub tag: Option<String>,

	/// Full image reference, overriding the registry path and tag
	#[clap(long, env = IMAGE_ENV)]
	pub image: Option<String>,
}

mod build_image;
mod build_wheel;
mod dockerfile;
mod install;
mod install_client;
mod lint;
mod push;

pub async fn exec(ctx: Context, command: Command) -> Result<()> {
	match command {
		Command::InstallAssistedServiceClient => install_client::handle(&ctx).await,
		Command::BuildImage(args) => build_image::handle(ctx, args).await,
		Command::BuildWheel => build_wheel::handle(&ctx).await,
		Command::Install => install::handle(&ctx).await,
		Command::Lint => lint::handle(&ctx).await,
		Command::UnitTest => test::unit(&ctx).await,
		Command::IntegrationTest => test::integration(&ctx).await,
		Command::Push(args) => push::handle(ctx, args).await,
		Command::Dockerfile => dockerfile::handle(ctx),
	}
}
