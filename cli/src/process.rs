use std::{
	io,
	process::{ExitStatus, Stdio},
};

use tokio::{io::AsyncWriteExt, process::Command, signal};

/// Exit status reported when the user interrupts a running tool.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to run {program}. Is it installed and in your PATH? ({source})")]
	Spawn { program: String, source: io::Error },

	#[error("{program} failed with {status}")]
	Failed { program: String, status: ExitStatus },

	#[error("Interrupted while running {program}")]
	Interrupted { program: String },
}

impl Error {
	/// The exit code the runner should terminate with.
	#[must_use]
	pub fn exit_code(&self) -> i32 {
		match self {
			Self::Spawn { .. } => 1,
			Self::Failed { status, .. } => status.code().filter(|c| *c != 0).unwrap_or(1),
			Self::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
		}
	}
}

/// Render a command the way a user would type it.
pub fn render(cmd: &Command) -> String {
	let cmd = cmd.as_std();

	std::iter::once(cmd.get_program())
		.chain(cmd.get_args())
		.map(|arg| arg.to_string_lossy().into_owned())
		.collect::<Vec<_>>()
		.join(" ")
}

/// Run `cmd` to completion with inherited stdio.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned, exits unsuccessfully, or
/// is interrupted with Ctrl-C (in which case it is killed).
pub async fn run(mut cmd: Command) -> Result<(), Error> {
	let status = status(&mut cmd).await?;

	if !status.success() {
		return Err(Error::Failed {
			program: program(&cmd),
			status,
		});
	}

	Ok(())
}

/// Run `cmd` to completion, feeding `input` to its stdin.
///
/// # Errors
///
/// Same as [`run`], plus a spawn error if stdin cannot be written.
pub async fn run_with_input(mut cmd: Command, input: &[u8]) -> Result<(), Error> {
	let status = wait(&mut cmd, Some(input)).await?;

	if !status.success() {
		return Err(Error::Failed {
			program: program(&cmd),
			status,
		});
	}

	Ok(())
}

/// Run `cmd` to completion and report its exit status without judging it.
///
/// # Errors
///
/// Returns an error if the process cannot be spawned or is interrupted.
pub async fn status(cmd: &mut Command) -> Result<ExitStatus, Error> {
	wait(cmd, None).await
}

async fn wait(cmd: &mut Command, input: Option<&[u8]>) -> Result<ExitStatus, Error> {
	let line = render(cmd);
	tracing::info!("Running {line}");

	let mut child = cmd
		.stdin(if input.is_some() {
			Stdio::piped()
		} else {
			Stdio::null()
		})
		.kill_on_drop(true)
		.spawn()
		.map_err(|source| Error::Spawn {
			program: program(cmd),
			source,
		})?;

	if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
		let written = stdin.write_all(input).await;
		// Closing stdin signals end of input.
		drop(stdin);
		match written {
			Ok(()) => {},
			// The child exited without reading everything; its status tells why.
			Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
				tracing::debug!("{} closed its stdin early", program(cmd));
			},
			Err(source) => {
				return Err(Error::Spawn {
					program: program(cmd),
					source,
				})
			},
		}
	}

	tokio::select! {
		status = child.wait() => {
			let status = status.map_err(|source| Error::Spawn {
				program: program(cmd),
				source,
			})?;
			tracing::debug!("{} exited with {status}", program(cmd));

			Ok(status)
		},
		_ = signal::ctrl_c() => {
			tracing::warn!("Interrupt received, stopping {}", program(cmd));
			if let Err(e) = child.kill().await {
				tracing::error!("Failed to kill {}: {e}", program(cmd));
			}

			Err(Error::Interrupted { program: program(cmd) })
		},
	}
}

fn program(cmd: &Command) -> String {
	cmd.as_std().get_program().to_string_lossy().into_owned()
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;

	fn sh(script: &str) -> Command {
		let mut cmd = Command::new("sh");
		cmd.arg("-c").arg(script);
		cmd
	}

	#[tokio::test]
	async fn successful_command_is_ok() {
		assert!(run(sh("exit 0")).await.is_ok());
	}

	#[tokio::test]
	async fn exit_code_is_propagated() {
		let err = run(sh("exit 3")).await.unwrap_err();

		assert!(matches!(err, Error::Failed { .. }));
		assert_eq!(err.exit_code(), 3);
	}

	#[tokio::test]
	async fn status_does_not_judge() {
		let status = status(&mut sh("exit 2")).await.unwrap();

		assert_eq!(status.code(), Some(2));
	}

	#[tokio::test]
	async fn input_is_fed_to_stdin() {
		let ok = run_with_input(sh("test \"$(cat)\" = hello"), b"hello").await;
		assert!(ok.is_ok());

		let err = run_with_input(sh("test \"$(cat)\" = hello"), b"bye")
			.await
			.unwrap_err();
		assert_eq!(err.exit_code(), 1);
	}

	#[tokio::test]
	async fn runs_while_logging_is_enabled() {
		let _guard = tracing::subscriber::set_default(
			tracing_subscriber::fmt()
				.with_max_level(tracing::Level::DEBUG)
				.with_test_writer()
				.finish(),
		);

		assert!(run(sh("exit 0")).await.is_ok());
		assert_eq!(run(sh("exit 5")).await.unwrap_err().exit_code(), 5);
	}

	#[tokio::test]
	async fn interrupt_kills_the_child() {
		let started = std::time::Instant::now();
		let err = run(sh("sleep 0.3; kill -INT $PPID; sleep 20"))
			.await
			.unwrap_err();

		assert!(matches!(err, Error::Interrupted { .. }));
		assert_eq!(err.exit_code(), INTERRUPTED_EXIT_CODE);
		assert!(started.elapsed() < std::time::Duration::from_secs(10));
	}

	#[tokio::test]
	async fn missing_program_is_a_spawn_error() {
		let err = run(Command::new("definitely-not-a-real-tool-4f1c"))
			.await
			.unwrap_err();

		assert!(matches!(err, Error::Spawn { .. }));
		assert_eq!(err.exit_code(), 1);
	}

	#[test]
	fn commands_are_rendered_with_arguments() {
		let mut cmd = Command::new("python3");
		cmd.args(["-m", "pip", "install", "-I", "dist/x.whl"]);

		assert_eq!(render(&cmd), "python3 -m pip install -I dist/x.whl");
	}
}
