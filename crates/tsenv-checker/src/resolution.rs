//! Module resolution
//!
//! Maps import specifiers and `/// <reference types>` names to files,
//! following either the classic walk-up lookup or the `node_modules`
//! algorithm.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::options::{CompilerOptions, ModuleResolution};

/// File access used while loading a program
pub trait CompilerHost {
    fn read_file(&self, path: &Path) -> io::Result<String>;
    fn file_exists(&self, path: &Path) -> bool;
}

/// Reads from the real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemHost;

impl CompilerHost for FileSystemHost {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Serves files from memory, keyed by normalized path
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new(sources: &[(&str, &str)]) -> Self {
        let files = sources
            .iter()
            .map(|(name, text)| (normalize(Path::new(name)), text.to_string()))
            .collect();
        Self { files }
    }
}

impl CompilerHost for MemoryHost {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }
}

/// Lexically collapses `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

pub fn is_relative_specifier(spec: &str) -> bool {
    spec.starts_with("./") || spec.starts_with("../") || spec == "." || spec == ".." || spec.starts_with('/')
}

/// The part of `package.json` that points at declarations
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    types: Option<String>,
    typings: Option<String>,
}

pub(crate) struct ModuleResolver<'a> {
    host: &'a dyn CompilerHost,
    options: &'a CompilerOptions,
}

impl<'a> ModuleResolver<'a> {
    pub(crate) fn new(host: &'a dyn CompilerHost, options: &'a CompilerOptions) -> Self {
        Self { host, options }
    }

    /// Resolves `spec` imported from a file in `dir`.
    pub(crate) fn resolve(&self, spec: &str, dir: &Path) -> Option<PathBuf> {
        if is_relative_specifier(spec) {
            return self.try_file_or_directory(&dir.join(spec));
        }
        match self.options.module_resolution {
            ModuleResolution::Node => self.resolve_node_modules(spec, dir),
            ModuleResolution::Classic => self.resolve_classic(spec, dir),
        }
    }

    /// Resolves `/// <reference types="name" />`.
    pub(crate) fn resolve_type_reference(&self, name: &str, dir: &Path) -> Option<PathBuf> {
        walk_up(dir).find_map(|current| {
            self.try_package(&current.join("node_modules").join("@types").join(name), None)
        })
    }

    fn resolve_classic(&self, spec: &str, dir: &Path) -> Option<PathBuf> {
        walk_up(dir).find_map(|current| {
            let base = current.join(spec);
            [".ts", ".tsx", ".d.ts"]
                .iter()
                .map(|ext| with_suffix(&base, ext))
                .find(|candidate| self.host.file_exists(candidate))
        })
    }

    fn resolve_node_modules(&self, spec: &str, dir: &Path) -> Option<PathBuf> {
        let (package, subpath) = parse_package_specifier(spec);
        walk_up(dir).find_map(|current| {
            let modules = current.join("node_modules");
            self.try_package(&modules.join(package), subpath).or_else(|| {
                let typed = types_package_name(package);
                self.try_package(&modules.join("@types").join(typed), subpath)
            })
        })
    }

    fn try_package(&self, package_dir: &Path, subpath: Option<&str>) -> Option<PathBuf> {
        if let Some(sub) = subpath {
            return self.try_file_or_directory(&package_dir.join(sub));
        }
        self.try_manifest(package_dir)
            .or_else(|| self.try_file(&package_dir.join("index")))
            .or_else(|| self.try_file(package_dir))
    }

    fn try_manifest(&self, package_dir: &Path) -> Option<PathBuf> {
        let text = self.host.read_file(&package_dir.join("package.json")).ok()?;
        let manifest: PackageManifest = serde_json::from_str(&text).ok()?;
        let entry = manifest.types.or(manifest.typings)?;
        let target = package_dir.join(entry);
        if self.host.file_exists(&target) {
            Some(normalize(&target))
        } else {
            self.try_file(&target)
        }
    }

    fn try_file_or_directory(&self, base: &Path) -> Option<PathBuf> {
        self.try_file(base)
            .or_else(|| self.try_manifest(base))
            .or_else(|| self.try_file(&base.join("index")))
    }

    fn try_file(&self, base: &Path) -> Option<PathBuf> {
        let has_source_extension = base
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e, "ts" | "tsx") || (self.options.allow_js && matches!(e, "js" | "jsx")));
        if has_source_extension && self.host.file_exists(base) {
            return Some(normalize(base));
        }
        let mut extensions = vec![".ts", ".tsx", ".d.ts"];
        if self.options.allow_js {
            extensions.extend([".js", ".jsx"]);
        }
        extensions
            .into_iter()
            .map(|ext| with_suffix(base, ext))
            .find(|candidate| self.host.file_exists(candidate))
            .map(|p| normalize(&p))
    }
}

fn walk_up(dir: &Path) -> impl Iterator<Item = PathBuf> {
    let mut next = Some(dir.to_path_buf());
    std::iter::from_fn(move || {
        let current = next.take()?;
        next = current
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Some(current)
    })
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut text = base.as_os_str().to_owned();
    text.push(suffix);
    PathBuf::from(text)
}

/// Splits `lodash/fp` into `("lodash", Some("fp"))`; scoped packages keep
/// their scope: `@scope/pkg/sub` becomes `("@scope/pkg", Some("sub"))`.
fn parse_package_specifier(spec: &str) -> (&str, Option<&str>) {
    let name_segments = if spec.starts_with('@') { 2 } else { 1 };
    let mut slashes = spec.match_indices('/').map(|(i, _)| i);
    match slashes.nth(name_segments - 1) {
        Some(pos) => (&spec[..pos], Some(&spec[pos + 1..])),
        None => (spec, None),
    }
}

/// `@scope/pkg` is published under `@types/scope__pkg`.
fn types_package_name(package: &str) -> String {
    match package.strip_prefix('@') {
        Some(scoped) => scoped.replacen('/', "__", 1),
        None => package.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_specifier() {
        assert_eq!(parse_package_specifier("lodash"), ("lodash", None));
        assert_eq!(parse_package_specifier("lodash/fp"), ("lodash", Some("fp")));
        assert_eq!(parse_package_specifier("@types/node"), ("@types/node", None));
        assert_eq!(parse_package_specifier("@scope/pkg/sub/x"), ("@scope/pkg", Some("sub/x")));
        assert_eq!(types_package_name("@scope/pkg"), "scope__pkg");
    }

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(normalize(Path::new("a/./b/../c.d.ts")), PathBuf::from("a/c.d.ts"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_relative_resolution_probes_extensions() {
        let host = MemoryHost::new(&[("src/a.ts", ""), ("src/lib/index.d.ts", "")]);
        let options = CompilerOptions::default();
        let resolver = ModuleResolver::new(&host, &options);
        assert_eq!(
            resolver.resolve("./a", Path::new("src")),
            Some(PathBuf::from("src/a.ts"))
        );
        assert_eq!(
            resolver.resolve("./lib", Path::new("src")),
            Some(PathBuf::from("src/lib/index.d.ts"))
        );
        assert_eq!(resolver.resolve("./missing", Path::new("src")), None);
    }

    #[test]
    fn test_node_modules_resolution_uses_manifest() {
        let host = MemoryHost::new(&[
            ("app/node_modules/pkg/package.json", r#"{"name": "pkg", "types": "dist/pkg.d.ts"}"#),
            ("app/node_modules/pkg/dist/pkg.d.ts", ""),
            ("app/node_modules/@types/other/index.d.ts", ""),
        ]);
        let options = CompilerOptions {
            module_resolution: ModuleResolution::Node,
            ..Default::default()
        };
        let resolver = ModuleResolver::new(&host, &options);
        assert_eq!(
            resolver.resolve("pkg", Path::new("app/src")),
            Some(PathBuf::from("app/node_modules/pkg/dist/pkg.d.ts"))
        );
        assert_eq!(
            resolver.resolve("other", Path::new("app/src")),
            Some(PathBuf::from("app/node_modules/@types/other/index.d.ts"))
        );
        assert_eq!(
            resolver.resolve_type_reference("other", Path::new("app")),
            Some(PathBuf::from("app/node_modules/@types/other/index.d.ts"))
        );
    }

    #[test]
    fn test_classic_resolution_walks_up() {
        let host = MemoryHost::new(&[("root/shared.d.ts", "")]);
        let options = CompilerOptions::default();
        let resolver = ModuleResolver::new(&host, &options);
        assert_eq!(
            resolver.resolve("shared", Path::new("root/deep/dir")),
            Some(PathBuf::from("root/shared.d.ts"))
        );
    }
}
