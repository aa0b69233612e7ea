// Sets TABLESORT_VERSION for `tablesort --version`: the package version, with
// the short commit hash appended when building from a git checkout.

use std::process::Command;

fn main() {
    let version = match short_commit() {
        Some(commit) => format!("{} ({})", env!("CARGO_PKG_VERSION"), commit),
        None => env!("CARGO_PKG_VERSION").to_string(),
    };
    println!("cargo:rustc-env=TABLESORT_VERSION={}", version);
    println!("cargo:rerun-if-changed=../.git/HEAD");
}

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let commit = String::from_utf8(output.stdout).ok()?;
    Some(commit.trim().to_string()).filter(|commit| !commit.is_empty())
}
