// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Embeds the version reported in `serverInfo` and `--version`.
//!
//! Resolution order:
//! 1. `YOUTH_MCP_VERSION_OVERRIDE` (for packagers building from tarballs)
//! 2. `git describe --tags --always --dirty`, only when the crate root is
//!    itself a git checkout
//! 3. `CARGO_PKG_VERSION`

use std::path::Path;
use std::process::Command;

const OVERRIDE_VAR: &str = "YOUTH_MCP_VERSION_OVERRIDE";

fn main() {
    println!("cargo:rerun-if-env-changed={OVERRIDE_VAR}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let version = std::env::var(OVERRIDE_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(git_version)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=YOUTH_MCP_VERSION={version}");
}

fn git_version() -> Option<String> {
    let root = std::env::var("CARGO_MANIFEST_DIR").ok()?;
    if !Path::new(&root).join(".git").exists() {
        return None;
    }

    let output = Command::new("git")
        .current_dir(&root)
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    (!described.is_empty()).then(|| described.trim_start_matches('v').to_string())
}
