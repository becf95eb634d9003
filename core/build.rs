//! Build script for dlr-rs.
//!
//! With the `native` feature enabled, this script locates the prebuilt
//! `libdlr` shared library and links the crate against it. Without the
//! feature nothing is linked.
//!
//! # Environment Variables
//!
//! - `DLR_LIB_DIR`: Directory containing `libdlr` (checked first)
//! - `DLR_HOME`: DLR installation prefix; `$DLR_HOME/lib` is searched
//! - `DLR_SKIP_LINK`: Set to "1" to skip linking (for development)
//!
//! When neither variable is set, the `dlr` Python package is queried for the
//! copy of `libdlr` it ships.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// File name of the DLR library on the target platform.
fn dlr_library_name() -> &'static str {
    match env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("macos") => "libdlr.dylib",
        Ok("windows") => "dlr.dll",
        _ => "libdlr.so",
    }
}

fn has_dlr_library(dir: &Path) -> bool {
    dir.join(dlr_library_name()).exists()
}

/// Detect libdlr from the `dlr` Python package.
///
/// Tries `.venv/bin/python` in the repo root and crate directory, then
/// `python3`, then `python`.
fn detect_dlr_from_python() -> Option<PathBuf> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").ok()?);

    let python_candidates = [
        manifest_dir.join("../.venv/bin/python"),
        manifest_dir.join(".venv/bin/python"),
        PathBuf::from("python3"),
        PathBuf::from("python"),
    ];

    for python in &python_candidates {
        let output = Command::new(python)
            .args(["-c", "import dlr, os; print(os.path.dirname(dlr.__file__))"])
            .output();

        if let Ok(output) = output {
            if output.status.success() {
                if let Ok(stdout) = String::from_utf8(output.stdout) {
                    let dir = PathBuf::from(stdout.trim());
                    if has_dlr_library(&dir) {
                        return Some(dir);
                    }
                }
            }
        }
    }
    None
}

fn main() {
    println!("cargo:rerun-if-env-changed=DLR_LIB_DIR");
    println!("cargo:rerun-if-env-changed=DLR_HOME");
    println!("cargo:rerun-if-env-changed=DLR_SKIP_LINK");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }
    link_dlr();
}

fn link_dlr() {
    if env::var("DLR_SKIP_LINK").map(|v| v == "1").unwrap_or(false) {
        println!("cargo:warning=Skipping libdlr linking (DLR_SKIP_LINK=1)");
        return;
    }

    let lib_dir = if let Ok(dir) = env::var("DLR_LIB_DIR") {
        PathBuf::from(dir)
    } else if let Ok(home) = env::var("DLR_HOME") {
        PathBuf::from(home).join("lib")
    } else if let Some(dir) = detect_dlr_from_python() {
        eprintln!("info: Auto-detected libdlr from Python: {}", dir.display());
        dir
    } else {
        panic!(
            "Could not find libdlr.\n\
             Checked: DLR_LIB_DIR, DLR_HOME, the `dlr` Python package\n\
             \n\
             To fix, either:\n\
             1. Install DLR for Python: pip install dlr\n\
             2. Set DLR_LIB_DIR to the directory containing {}",
            dlr_library_name()
        );
    };

    if !has_dlr_library(&lib_dir) {
        panic!(
            "{} not found in {}",
            dlr_library_name(),
            lib_dir.display()
        );
    }

    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=dylib=dlr");

    // Embed the library location so binaries run without LD_LIBRARY_PATH
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        println!("cargo:rustc-link-arg=-Wl,-rpath,{}", lib_dir.display());
    }
}
