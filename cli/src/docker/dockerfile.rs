use std::process::Command;

/// A fragment of Dockerfile instructions, spliced into the template at a `#SLOT`.
#[derive(Debug, Default)]
pub struct Dockerfile(String);

impl Dockerfile {
	pub const fn new() -> Self {
		Self(String::new())
	}

	pub fn run_multiple(mut self, command: &[&Command]) -> Self {
		self.0.push_str(&format!(
			"RUN {}\n",
			command
				.iter()
				.map(|cmd| std::iter::once(cmd.get_program())
					.chain(cmd.get_args())
					.map(|arg| arg.to_string_lossy().to_string())
					.collect::<Vec<String>>()
					.join(" "))
				.collect::<Vec<String>>()
				.join(" && ")
		));

		self
	}

	pub fn env(mut self, key: &str, value: &str) -> Self {
		self.0.push_str(&format!("ENV {key}={}\n", quote(value)));

		self
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

#[allow(clippy::module_name_repetitions)]
pub trait DockerfileExt {
	fn build(self) -> Self;
	fn fill(self, key: &str, value: &str) -> Self;
	fn handler(self, slot: &str, value: impl FnOnce() -> Option<Dockerfile>) -> Self;
}

impl DockerfileExt for String {
	fn fill(self, key: &str, value: &str) -> Self {
		self.replace(&format!("{{:{key}}}"), value)
	}

	fn handler(self, slot: &str, value: impl FnOnce() -> Option<Dockerfile>) -> Self {
		match value().filter(|value| !value.is_empty()) {
			Some(value) => self.replace(
				&format!("#SLOT {slot}"),
				&format!("{}#SLOT {slot}", value.0),
			),
			None => self,
		}
	}

	fn build(self) -> Self {
		let mut out = Self::new();
		let mut previous_blank = true;

		for line in self.lines().filter(|line| !line.starts_with("#SLOT")) {
			let blank = line.trim().is_empty();
			if blank && previous_blank {
				continue;
			}

			out.push_str(line);
			out.push('\n');
			previous_blank = blank;
		}

		while out.ends_with("\n\n") {
			out.pop();
		}

		out
	}
}

fn quote(value: &str) -> String {
	if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"') {
		format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
	} else {
		value.to_string()
	}
}
