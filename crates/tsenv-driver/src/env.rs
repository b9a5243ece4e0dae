//! Environment profiles and option assembly

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};
use tsenv_checker::CompilerOptions;

/// Environment variable naming the default library directory
pub const LIB_DIR_VAR: &str = "TSENV_LIB_DIR";

/// Standard-library profiles selectable with `--env`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// ECMAScript 5 core library
    Es5,
    /// ECMAScript 2015 core library
    Es6,
    /// ECMAScript 5 with the DOM
    #[value(name = "es5-dom")]
    Es5Dom,
    /// ECMAScript 2015 with the DOM
    #[value(name = "es6-dom")]
    Es6Dom,
    /// ECMAScript 2015 with Node.js declarations
    Node,
}

impl Profile {
    /// Library file names making up the profile, in load order.
    pub fn files(self) -> &'static [&'static str] {
        match self {
            Profile::Es5 => &["lib.es5.d.ts"],
            Profile::Es6 => &["lib.es2015.d.ts"],
            Profile::Es5Dom => &["lib.d.ts"],
            Profile::Es6Dom => &["lib.es6.d.ts"],
            Profile::Node => &["lib.es2015.d.ts", "node.d.ts"],
        }
    }
}

/// Option overrides given on the command line. `None` leaves the value
/// from the configuration file alone.
#[derive(Clone, Debug, Default)]
pub struct OptionOverrides {
    pub lib_dir: Option<PathBuf>,
    pub module_resolution: Option<tsenv_checker::ModuleResolution>,
    pub strict_null_checks: bool,
    pub no_implicit_any: bool,
    pub no_implicit_returns: bool,
    pub no_implicit_this: bool,
    pub no_lib: bool,
    pub allow_js: bool,
    pub skip_js_checking: bool,
}

/// Builds compiler options: the configuration file first, then
/// `TSENV_LIB_DIR` for a missing library directory, then the flags.
pub fn compiler_options(
    config: Option<&Path>,
    overrides: &OptionOverrides,
    env_lib_dir: Option<PathBuf>,
) -> Result<CompilerOptions> {
    let mut options = match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration {}", path.display()))?;
            CompilerOptions::from_json(&text)
                .with_context(|| format!("invalid configuration {}", path.display()))?
        }
        None => CompilerOptions::default(),
    };
    if options.lib_dir.is_none() {
        options.lib_dir = env_lib_dir;
    }
    if let Some(dir) = &overrides.lib_dir {
        options.lib_dir = Some(dir.clone());
    }
    if let Some(resolution) = overrides.module_resolution {
        options.module_resolution = resolution;
    }
    options.strict_null_checks |= overrides.strict_null_checks;
    options.no_implicit_any |= overrides.no_implicit_any;
    options.no_implicit_returns |= overrides.no_implicit_returns;
    options.no_implicit_this |= overrides.no_implicit_this;
    options.no_lib |= overrides.no_lib;
    options.allow_js |= overrides.allow_js;
    options.skip_js_checking |= overrides.skip_js_checking;
    Ok(options)
}

/// Root files for a run: the profile's library files followed by the
/// explicit files. A profile loads its own library files, so the implicit
/// default library is switched off.
pub fn root_files(profile: Option<Profile>, files: &[PathBuf], options: &mut CompilerOptions) -> Result<Vec<PathBuf>> {
    let mut roots = Vec::new();
    if let Some(profile) = profile {
        let Some(dir) = &options.lib_dir else {
            bail!("--env needs a library directory (--lib-dir, libDir or {})", LIB_DIR_VAR);
        };
        roots.extend(profile.files().iter().map(|name| dir.join(name)));
        options.no_lib = true;
    }
    roots.extend(files.iter().cloned());
    if roots.is_empty() {
        bail!("no input files: pass --env or at least one file");
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsenv_checker::ModuleResolution;

    #[test]
    fn test_profile_files() {
        assert_eq!(Profile::Node.files(), &["lib.es2015.d.ts", "node.d.ts"]);
        assert_eq!(Profile::from_str("es5-dom", false), Ok(Profile::Es5Dom));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = dir.path().join("tsconfig.json");
        fs::write(
            &config,
            r#"{"compilerOptions": {"libDir": "/from/config", "moduleResolution": "node"}}"#,
        )
        .expect("write");

        let overrides = OptionOverrides {
            strict_null_checks: true,
            module_resolution: Some(ModuleResolution::Classic),
            ..OptionOverrides::default()
        };
        let options = compiler_options(Some(&config), &overrides, Some(PathBuf::from("/from/env"))).expect("options");
        assert_eq!(options.lib_dir, Some(PathBuf::from("/from/config")));
        assert_eq!(options.module_resolution, ModuleResolution::Classic);
        assert!(options.strict_null_checks);
    }

    #[test]
    fn test_env_lib_dir_is_a_fallback() {
        let options = compiler_options(None, &OptionOverrides::default(), Some(PathBuf::from("/env"))).expect("options");
        assert_eq!(options.lib_dir, Some(PathBuf::from("/env")));

        let overrides = OptionOverrides {
            lib_dir: Some(PathBuf::from("/flag")),
            ..OptionOverrides::default()
        };
        let options = compiler_options(None, &overrides, Some(PathBuf::from("/env"))).expect("options");
        assert_eq!(options.lib_dir, Some(PathBuf::from("/flag")));
    }

    #[test]
    fn test_root_files() {
        let mut options = CompilerOptions {
            lib_dir: Some(PathBuf::from("/lib")),
            ..CompilerOptions::default()
        };
        let roots = root_files(Some(Profile::Es5), &[PathBuf::from("extra.d.ts")], &mut options).expect("roots");
        assert_eq!(roots, vec![PathBuf::from("/lib/lib.es5.d.ts"), PathBuf::from("extra.d.ts")]);
        assert!(options.no_lib);

        let mut options = CompilerOptions::default();
        assert!(root_files(None, &[], &mut options).is_err());
        assert!(root_files(Some(Profile::Es6), &[], &mut options).is_err());
    }

    #[test]
    fn test_missing_config_is_reported() {
        let err = compiler_options(Some(Path::new("/nonexistent/tsconfig.json")), &OptionOverrides::default(), None)
            .expect_err("missing");
        assert!(err.to_string().contains("failed to read configuration"));
    }
}
