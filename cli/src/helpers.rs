#[must_use]
pub fn is_m1_mac() -> bool {
	std::env::consts::OS == "macos" && std::env::consts::ARCH == "aarch64"
}
