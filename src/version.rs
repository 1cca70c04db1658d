//! Version and build information
//!
//! Build metadata (commit SHA, build date, rustc version) is injected by `build.rs`.

/// Full version string
///
/// Returns format: "depindex {version} ({commit} {date}) rustc {rustc_version}"
pub fn version() -> String {
    format!(
        "depindex {} ({} {}) rustc {}",
        package_version(),
        build_commit(),
        build_date(),
        rustc_version()
    )
}

/// Get the package version (e.g., "0.4.0")
pub fn package_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns "unknown" if not built with commit info
pub fn build_commit() -> &'static str {
    option_env!("DEPINDEX_COMMIT_SHA").unwrap_or("unknown")
}

pub fn build_date() -> &'static str {
    option_env!("DEPINDEX_BUILD_DATE").unwrap_or("unknown")
}

pub fn rustc_version() -> &'static str {
    option_env!("DEPINDEX_RUSTC_VERSION").unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_shape() {
        let v = version();
        assert!(v.starts_with(&format!("depindex {} (", package_version())));
        assert!(v.contains(" rustc "));
    }
}
