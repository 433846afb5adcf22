use anyhow::{Context, Result};
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

const LIB_NAME: &str = "st2110";

fn main() -> Result<()> {
    // Generate git information
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
    }

    // Reproducible builds pin the timestamp through SOURCE_DATE_EPOCH
    let now = match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => {
            let secs = val
                .parse::<i64>()
                .with_context(|| format!("Invalid SOURCE_DATE_EPOCH {val:?}"))?;
            chrono::Utc
                .timestamp_opt(secs, 0)
                .single()
                .with_context(|| format!("SOURCE_DATE_EPOCH {secs} is out of range"))?
        }
        Err(_) => chrono::Utc::now(),
    };

    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let lib_version = lib_version_from_metadata().unwrap_or_else(|_| {
        lib_version_from_manifest().unwrap_or_else(|_| "unknown".to_string())
    });
    println!("cargo:rustc-env=ST2110_VERSION={lib_version}");

    println!("cargo:rerun-if-changed={LIB_NAME}/Cargo.toml");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    Ok(())
}

/// Library version from cargo metadata (covers both path and registry dependencies)
fn lib_version_from_metadata() -> Result<String> {
    let output = Command::new("cargo")
        .args(["metadata", "--format-version", "1"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    let packages = metadata["packages"].as_array().into_iter().flatten();
    for package in packages {
        if package["name"].as_str() == Some(LIB_NAME) {
            if let Some(version) = package["version"].as_str() {
                return Ok(version.to_string());
            }
        }
    }

    anyhow::bail!("{LIB_NAME} package not found in metadata");
}

/// Fallback: read the version line of the library manifest
fn lib_version_from_manifest() -> Result<String> {
    let path = format!("{LIB_NAME}/Cargo.toml");
    let toml_content = fs::read_to_string(&path)?;

    for line in toml_content.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("version") {
            if let Some(value) = value.trim_start().strip_prefix('=') {
                return Ok(value.trim().trim_matches('"').trim_matches('\'').to_string());
            }
        }
    }

    anyhow::bail!("Could not find version in {path}");
}
