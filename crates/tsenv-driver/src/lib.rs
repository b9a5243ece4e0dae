//! # tsenv driver
//!
//! Runs the environment reader end to end: option assembly, program
//! loading, diagnostic reporting and serialization.

pub mod env;
pub mod logging;
pub mod report;

pub use env::{compiler_options, root_files, OptionOverrides, Profile, LIB_DIR_VAR};
pub use report::{diagnostic_line, print_diagnostics, DiagnosticStyle};

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use tsenv_checker::{check_files, CompilerOptions, Diagnostic, Program};
use tsenv_serializer::{analyze_program, OutputDocument};

/// Result of reading one environment
pub struct Environment {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
    pub document: OutputDocument,
}

/// Loads `roots`, collects diagnostics and serializes the environment.
/// Diagnostics do not stop serialization.
pub fn read_environment(roots: &[PathBuf], options: CompilerOptions) -> Result<Environment> {
    let names: Vec<String> = roots.iter().map(|p| p.display().to_string()).collect();
    info!("Reading files: {}", names.join(","));
    let (program, diagnostics) = check_files(roots, options).context("failed to load program")?;
    let document = analyze_program(&program).context("failed to serialize environment")?;
    Ok(Environment {
        program,
        diagnostics,
        document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_environment_keeps_going_on_diagnostics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("env.d.ts");
        fs::write(&path, "declare var ok: number;\ndeclare var bad: Missing;").expect("write");
        let env = read_environment(&[path], CompilerOptions::default()).expect("read");
        assert_eq!(env.diagnostics.len(), 1);
        let names: Vec<_> = env.document.globals.iter().map(|g| g.q_name.join(".")).collect();
        assert_eq!(names, vec!["ok", "bad"]);
    }

    #[test]
    fn test_missing_file_fails() {
        let err = read_environment(&[PathBuf::from("/nonexistent/env.d.ts")], CompilerOptions::default())
            .err()
            .expect("error");
        assert_eq!(err.to_string(), "failed to load program");
    }
}
