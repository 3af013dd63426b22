// Fetch the commit hash from git before the build and expose
// "<package version>-<short hash>" as BUILD_VERSION.

use std::process::Command;

fn main() {
    let commit_hash = if let Some(hash) = option_env!("SALIS_COMMIT_HASH") {
        hash.get(0..7).unwrap_or(hash).to_string()
    } else {
        // Build script: a missing git binary or repository falls back to "unknown"
        match Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
        {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            _ => "unknown".to_string(),
        }
    };

    let build_version = format!("{}-{}", env!("CARGO_PKG_VERSION"), commit_hash);
    println!("cargo:rerun-if-env-changed=SALIS_COMMIT_HASH");
    println!("cargo:rustc-env=BUILD_VERSION={build_version}");
}
