//! Build identification for tunefind-proxy
//!
//! Exposes `TUNEFIND_GIT_HASH`, `TUNEFIND_BUILT_AT` (UTC, RFC 3339) and
//! `TUNEFIND_BUILD_PROFILE` to the crate. They are logged at startup and
//! reported by `/health`.

use std::path::Path;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    // Re-run when HEAD moves so the reported hash tracks the checkout
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        for entry in ["HEAD", "index"] {
            let path = Path::new(&git_dir).join(entry);
            if path.exists() {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
    }
    println!("cargo:rerun-if-changed=build.rs");

    let mut git_hash = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    if git(&["status", "--porcelain", "--untracked-files=no"]).is_some() && git_hash != "unknown" {
        git_hash.push_str("-dirty");
    }

    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=TUNEFIND_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=TUNEFIND_BUILT_AT={}", built_at);
    println!("cargo:rustc-env=TUNEFIND_BUILD_PROFILE={}", profile);
}
