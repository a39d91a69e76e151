use std::process::Command;

fn main() {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .output();
    let hash = match output {
        Ok(o) => String::from_utf8(o.stdout).unwrap_or_default(),
        Err(_) => String::new(),
    };
    let hash = hash.trim();

    let version = std::env::var("CARGO_PKG_VERSION").unwrap();
    if hash.is_empty() {
        println!("cargo:rustc-env=VERSION={version}");
    } else {
        println!("cargo:rustc-env=VERSION={version} (commit {hash})");
    }
}
