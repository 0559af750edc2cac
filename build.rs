use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

fn main() {
    prepare_pageless_assets().expect("failed to prepare pageless static assets");

    let static_dir = Path::new("static");
    let templates_dir = Path::new("templates");

    println!("cargo:rerun-if-changed={}", static_dir.display());
    println!("cargo:rerun-if-changed={}", templates_dir.display());

    for dir in [static_dir, templates_dir] {
        if dir.is_dir() {
            for entry in WalkDir::new(dir).into_iter().flatten() {
                println!("cargo:rerun-if-changed={}", entry.path().display());
            }
        }
    }
}

fn prepare_pageless_assets() -> Result<(), String> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").map_err(|err| err.to_string())?);
    let source = Path::new("static").join("pageless");
    let dest = out_dir.join("static_pageless");

    if dest.exists() {
        fs::remove_dir_all(&dest)
            .map_err(|err| format!("failed to clean {}: {err}", dest.display()))?;
    }

    copy_dir(&source, &dest)
}

fn copy_dir(source: &Path, destination: &Path) -> Result<(), String> {
    fs::create_dir_all(destination)
        .map_err(|err| format!("failed to create {}: {err}", destination.display()))?;

    for entry in WalkDir::new(source).into_iter().flatten() {
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|err| format!("failed to strip prefix: {err}"))?;
        let target_path = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path)
                .map_err(|err| format!("failed to create {}: {err}", target_path.display()))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| format!("failed to create {}: {err}", parent.display()))?;
            }
            fs::copy(entry.path(), &target_path)
                .map_err(|err| format!("failed to copy {}: {err}", target_path.display()))?;
        }
    }

    Ok(())
}
