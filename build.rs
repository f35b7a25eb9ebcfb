//! Embeds the commit hash and build date for `sealed-zone --version`.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() -> io::Result<()> {
    // CI sets these explicitly; local builds fall back to git and the clock.
    let commit = env::var("BUILD_COMMIT")
        .ok()
        .or_else(git_short_hash)
        .unwrap_or_else(|| "unknown".to_string());
    let date = env::var("BUILD_DATE")
        .unwrap_or_else(|_| chrono::Utc::now().format("%Y-%m-%d").to_string());

    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    let dest = PathBuf::from(out_dir).join("build_info.rs");
    fs::write(
        dest,
        format!(
            "pub const BUILD_COMMIT: &str = \"{commit}\";\n\
             pub const BUILD_DATE: &str = \"{date}\";\n"
        ),
    )?;

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=BUILD_COMMIT");
    println!("cargo:rerun-if-env-changed=BUILD_DATE");
    Ok(())
}
