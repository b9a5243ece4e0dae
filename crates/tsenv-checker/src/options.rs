//! Compiler options recognized by the checker

use serde::Deserialize;
use std::path::PathBuf;

/// How non-relative module specifiers are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleResolution {
    /// Walk up from the importing file looking for `<name>.ts` / `<name>.d.ts`
    #[default]
    Classic,
    /// `node_modules` lookup, honouring `types`/`typings` in `package.json`
    #[serde(alias = "node10", alias = "node16", alias = "nodenext", alias = "bundler")]
    Node,
}

impl std::str::FromStr for ModuleResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" => Ok(ModuleResolution::Classic),
            "node" | "node10" | "node16" | "nodenext" | "bundler" => Ok(ModuleResolution::Node),
            other => Err(format!("unknown module resolution '{}'", other)),
        }
    }
}

/// Options accepted in the `compilerOptions` of a configuration file.
///
/// Unknown keys are ignored so ordinary `tsconfig.json` files can be used
/// as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    pub module_resolution: ModuleResolution,
    pub strict_null_checks: bool,
    pub no_implicit_any: bool,
    pub no_implicit_returns: bool,
    pub no_implicit_this: bool,
    /// Do not add `lib.d.ts` from `lib_dir` implicitly
    pub no_lib: bool,
    pub allow_js: bool,
    /// Suppress diagnostics originating in `.js` files
    pub skip_js_checking: bool,
    /// Directory containing the standard `lib.*.d.ts` files
    pub lib_dir: Option<PathBuf>,
}

impl CompilerOptions {
    /// Reads options from a JSON document. Both a bare options object and a
    /// tsconfig-style `{ "compilerOptions": { ... } }` wrapper are accepted.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("compilerOptions") {
            Some(nested) => serde_json::from_value(nested.clone()),
            None => serde_json::from_value(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_options() {
        let options =
            CompilerOptions::from_json(r#"{"strictNullChecks": true, "moduleResolution": "node"}"#)
                .unwrap();
        assert!(options.strict_null_checks);
        assert_eq!(options.module_resolution, ModuleResolution::Node);
        assert!(!options.no_lib);
    }

    #[test]
    fn test_nested_compiler_options() {
        let options = CompilerOptions::from_json(
            r#"{"compilerOptions": {"noLib": true, "allowJs": true, "target": "es5"}, "files": []}"#,
        )
        .unwrap();
        assert!(options.no_lib);
        assert!(options.allow_js);
        assert_eq!(options.module_resolution, ModuleResolution::Classic);
    }

    #[test]
    fn test_module_resolution_from_str() {
        assert_eq!("Node".parse::<ModuleResolution>(), Ok(ModuleResolution::Node));
        assert!("amd".parse::<ModuleResolution>().is_err());
    }
}
