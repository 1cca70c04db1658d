use std::process::Command;

/// Trimmed stdout of a successful command, if any.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    let commit_sha = command_output("git", &["rev-parse", "--short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());

    let build_date =
        command_output("date", &["-u", "+%Y-%m-%d"]).unwrap_or_else(|| "unknown".to_string());

    // Cargo tells build scripts which compiler it is using
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = command_output(&rustc, &["--version"])
        .and_then(|s| {
            s.strip_prefix("rustc ")
                .and_then(|v| v.split_whitespace().next())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=DEPINDEX_COMMIT_SHA={}", commit_sha);
    println!("cargo:rustc-env=DEPINDEX_BUILD_DATE={}", build_date);
    println!("cargo:rustc-env=DEPINDEX_RUSTC_VERSION={}", rustc_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=DEPINDEX_COMMIT_SHA");
}
