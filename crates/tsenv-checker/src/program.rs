//! Program construction: loading, parsing and binding a file set

use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tsenv_ast::*;
use tsenv_parser::{parse_source, reference_directives, ReferenceDirective};

use crate::binder::{bind_files, Binding};
use crate::checker::TypeChecker;
use crate::error::{codes, Diagnostic, ProgramError};
use crate::options::CompilerOptions;
use crate::resolution::{normalize, CompilerHost, FileSystemHost, MemoryHost, ModuleResolver};

/// One parsed input file
#[derive(Debug, Clone)]
pub struct SourceFileInfo {
    /// Path as loaded, used for display
    pub name: String,
    pub text: String,
    pub ast: SourceFile,
    /// `.d.ts` files are ambient throughout
    pub is_declaration: bool,
    pub is_js: bool,
    line_starts: Vec<usize>,
}

impl SourceFileInfo {
    fn new(name: String, text: String, ast: SourceFile) -> Self {
        let is_declaration = name.ends_with(".d.ts");
        let is_js = name.ends_with(".js") || name.ends_with(".jsx");
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name,
            text,
            ast,
            is_declaration,
            is_js,
            line_starts,
        }
    }

    /// Zero-based line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = self
            .text
            .get(start..offset.min(self.text.len()))
            .map_or(0, |s| s.chars().count());
        (line, column)
    }

    /// Name of the file as a module: the path without its extension.
    pub fn module_name(&self) -> String {
        [".d.ts", ".tsx", ".ts", ".jsx", ".js"]
            .iter()
            .find_map(|ext| self.name.strip_suffix(ext))
            .unwrap_or(&self.name)
            .to_string()
    }
}

/// A loaded, parsed and bound set of files
#[derive(Debug)]
pub struct Program {
    files: Vec<SourceFileInfo>,
    options: CompilerOptions,
    binding: Binding,
    diagnostics: Vec<Diagnostic>,
    resolved_modules: FxHashMap<(usize, String), usize>,
}

impl Program {
    /// Loads `roots` and everything they reference from disk.
    pub fn load(roots: &[PathBuf], options: CompilerOptions) -> Result<Program, ProgramError> {
        Self::load_with_host(&FileSystemHost, roots, options)
    }

    /// Builds a program from in-memory `(file name, text)` pairs; every
    /// entry is a root.
    pub fn from_sources(sources: &[(&str, &str)], options: CompilerOptions) -> Program {
        let host = MemoryHost::new(sources);
        let roots: Vec<PathBuf> = sources.iter().map(|(name, _)| PathBuf::from(name)).collect();
        match Self::load_with_host(&host, &roots, options.clone()) {
            Ok(program) => program,
            Err(err) => {
                let diagnostics = vec![Diagnostic::global(codes::FILE_NOT_FOUND, err.to_string())];
                Self::assemble(Vec::new(), options, diagnostics, FxHashMap::default())
            }
        }
    }

    pub fn load_with_host(
        host: &dyn CompilerHost,
        roots: &[PathBuf],
        options: CompilerOptions,
    ) -> Result<Program, ProgramError> {
        if roots.is_empty() {
            return Err(ProgramError::NoInputs);
        }
        info!(files = ?roots, "reading files");

        let mut loader = Loader {
            host,
            options: &options,
            files: Vec::new(),
            by_path: FxHashMap::default(),
            diagnostics: Vec::new(),
            resolved_modules: FxHashMap::default(),
        };

        if !options.no_lib {
            if let Some(dir) = &options.lib_dir {
                let default_lib = dir.join("lib.d.ts");
                if host.file_exists(&default_lib) {
                    loader.add_file(&default_lib, None)?;
                } else {
                    debug!(path = %default_lib.display(), "default library not found");
                }
            }
        }
        for root in roots {
            loader.add_root(root)?;
        }

        let Loader {
            files,
            diagnostics,
            resolved_modules,
            ..
        } = loader;
        Ok(Self::assemble(files, options, diagnostics, resolved_modules))
    }

    fn assemble(
        files: Vec<SourceFileInfo>,
        options: CompilerOptions,
        mut diagnostics: Vec<Diagnostic>,
        resolved_modules: FxHashMap<(usize, String), usize>,
    ) -> Program {
        let binding = bind_files(&files);
        diagnostics.extend(binding.diagnostics.iter().cloned());
        Program {
            files,
            options,
            binding,
            diagnostics,
            resolved_modules,
        }
    }

    pub fn files(&self) -> &[SourceFileInfo] {
        &self.files
    }

    pub fn file(&self, index: usize) -> &SourceFileInfo {
        &self.files[index]
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Load, parse and binding diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// File an import specifier in `file` resolved to during loading.
    pub fn resolved_module(&self, file: usize, spec: &str) -> Option<usize> {
        self.resolved_modules.get(&(file, spec.to_string())).copied()
    }

    /// Creates a type checker over this program.
    pub fn checker(&self) -> TypeChecker<'_> {
        TypeChecker::new(self)
    }
}

struct Loader<'a> {
    host: &'a dyn CompilerHost,
    options: &'a CompilerOptions,
    files: Vec<SourceFileInfo>,
    by_path: FxHashMap<PathBuf, usize>,
    diagnostics: Vec<Diagnostic>,
    resolved_modules: FxHashMap<(usize, String), usize>,
}

impl Loader<'_> {
    fn add_root(&mut self, path: &Path) -> Result<(), ProgramError> {
        let name = path.to_string_lossy();
        let supported = [".ts", ".tsx", ".js", ".jsx"].iter().any(|ext| name.ends_with(ext));
        if !supported {
            return Err(ProgramError::UnsupportedExtension(path.to_path_buf()));
        }
        if !self.host.file_exists(path) {
            return Err(ProgramError::MissingFile(path.to_path_buf()));
        }
        self.add_file(path, None)?;
        Ok(())
    }

    /// Loads `path` unless already loaded. `referrer` is the referencing
    /// file for non-root files; read failures of those are diagnostics.
    fn add_file(&mut self, path: &Path, referrer: Option<usize>) -> Result<Option<usize>, ProgramError> {
        let path = normalize(path);
        if let Some(&index) = self.by_path.get(&path) {
            return Ok(Some(index));
        }

        let name = path.to_string_lossy().into_owned();
        if (name.ends_with(".js") || name.ends_with(".jsx")) && !self.options.allow_js {
            self.report(
                referrer,
                codes::UNSUPPORTED_EXTENSION,
                format!("File '{}' has an unsupported extension; enable allowJs to include it.", name),
            );
            return Ok(None);
        }

        let text = match self.host.read_file(&path) {
            Ok(text) => text,
            Err(source) => {
                if referrer.is_none() {
                    return Err(ProgramError::Io { path, source });
                }
                self.report(referrer, codes::FILE_NOT_FOUND, format!("File '{}' not found.", name));
                return Ok(None);
            }
        };

        let index = self.files.len();
        let (ast, errors) = parse_source(&text, index);
        for error in errors {
            self.diagnostics
                .push(Diagnostic::new(error.span, codes::PARSE_ERROR, error.message));
        }
        debug!(file = %name, index, "parsed file");

        let directives = reference_directives(&text);
        let specifiers = module_specifiers(&ast.items);
        self.files.push(SourceFileInfo::new(name, text, ast));
        self.by_path.insert(path.clone(), index);

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        for directive in directives {
            self.process_directive(index, &dir, directive)?;
        }

        let resolver = ModuleResolver::new(self.host, self.options);
        let targets: Vec<(String, PathBuf)> = specifiers
            .into_iter()
            .filter_map(|spec| resolver.resolve(&spec, &dir).map(|target| (spec, target)))
            .collect();
        for (spec, target) in targets {
            if let Some(target_index) = self.add_file(&target, Some(index))? {
                self.resolved_modules.insert((index, spec), target_index);
            }
        }
        Ok(Some(index))
    }

    fn process_directive(
        &mut self,
        index: usize,
        dir: &Path,
        directive: ReferenceDirective,
    ) -> Result<(), ProgramError> {
        match directive {
            ReferenceDirective::Path(relative) => {
                self.add_file(&dir.join(relative), Some(index))?;
            }
            ReferenceDirective::Lib(lib) => match &self.options.lib_dir {
                Some(lib_dir) => {
                    let path = lib_dir.join(format!("lib.{}.d.ts", lib.to_ascii_lowercase()));
                    self.add_file(&path, Some(index))?;
                }
                None => self.report(
                    Some(index),
                    codes::FILE_NOT_FOUND,
                    format!("Cannot find lib definition for '{}': no library directory configured.", lib),
                ),
            },
            ReferenceDirective::Types(name) => {
                let resolver = ModuleResolver::new(self.host, self.options);
                match resolver.resolve_type_reference(&name, dir) {
                    Some(path) => {
                        self.add_file(&path, Some(index))?;
                    }
                    None => self.report(
                        Some(index),
                        codes::CANNOT_FIND_TYPE_DEFINITION,
                        format!("Cannot find type definition file for '{}'.", name),
                    ),
                }
            }
            ReferenceDirective::NoDefaultLib => {}
        }
        Ok(())
    }

    fn report(&mut self, file: Option<usize>, code: u32, message: String) {
        let diagnostic = match file {
            Some(file) => Diagnostic::new(Span::new(0, 0, file), code, message),
            None => Diagnostic::global(code, message),
        };
        self.diagnostics.push(diagnostic);
    }
}

/// Every module specifier a file imports or re-exports from.
fn module_specifiers(items: &[Node<ModuleItem>]) -> Vec<String> {
    let mut specifiers = Vec::new();
    collect_specifiers(items, &mut specifiers);
    specifiers
}

fn collect_specifiers(items: &[Node<ModuleItem>], out: &mut Vec<String>) {
    for item in items {
        match &item.value {
            ModuleItem::Import(import) => out.push(import.source.clone()),
            ModuleItem::Export(ExportDecl::Named {
                source: Some(source), ..
            })
            | ModuleItem::Export(ExportDecl::All { source, .. }) => out.push(source.clone()),
            ModuleItem::Decl(decl) => collect_decl_specifiers(&decl.value, out),
            ModuleItem::Export(ExportDecl::Decl(decl)) => collect_decl_specifiers(&decl.value, out),
            _ => {}
        }
    }
}

fn collect_decl_specifiers(decl: &Decl, out: &mut Vec<String>) {
    match decl {
        Decl::ImportEquals(ImportEqualsDecl {
            target: ImportEqualsTarget::External(spec),
            ..
        }) => out.push(spec.clone()),
        Decl::Module(module) => {
            let mut body = module.body.as_ref();
            while let Some(ModuleBody::Namespace(inner)) = body {
                body = inner.value.body.as_ref();
            }
            if let Some(ModuleBody::Block(items)) = body {
                collect_specifiers(items, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_reference_paths_and_imports() {
        let host = MemoryHost::new(&[
            ("proj/main.d.ts", "/// <reference path=\"./globals.d.ts\" />\nimport { A } from './types';"),
            ("proj/globals.d.ts", "declare var g: number;"),
            ("proj/types.d.ts", "export interface A {}"),
        ]);
        let program = Program::load_with_host(
            &host,
            &[PathBuf::from("proj/main.d.ts")],
            CompilerOptions::default(),
        )
        .unwrap();
        let names: Vec<_> = program.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["proj/main.d.ts", "proj/globals.d.ts", "proj/types.d.ts"]);
        assert_eq!(program.resolved_module(0, "./types"), Some(2));
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn test_missing_reference_is_a_diagnostic() {
        let program = Program::from_sources(
            &[("a.d.ts", "/// <reference path=\"missing.d.ts\" />\ndeclare var x: number;")],
            CompilerOptions::default(),
        );
        assert_eq!(program.files().len(), 1);
        assert_eq!(program.diagnostics()[0].code, codes::FILE_NOT_FOUND);
    }

    #[test]
    fn test_root_errors() {
        let host = MemoryHost::new(&[]);
        let err = Program::load_with_host(&host, &[PathBuf::from("a.d.ts")], CompilerOptions::default())
            .unwrap_err();
        assert!(matches!(err, ProgramError::MissingFile(_)));
        let err = Program::load_with_host(&host, &[PathBuf::from("a.txt")], CompilerOptions::default())
            .unwrap_err();
        assert!(matches!(err, ProgramError::UnsupportedExtension(_)));
        assert!(matches!(
            Program::load_with_host(&host, &[], CompilerOptions::default()),
            Err(ProgramError::NoInputs)
        ));
    }

    #[test]
    fn test_js_requires_allow_js() {
        let program = Program::from_sources(&[("a.js", "var x = 1;")], CompilerOptions::default());
        assert!(program.files().is_empty());
        assert_eq!(program.diagnostics()[0].code, codes::UNSUPPORTED_EXTENSION);

        let options = CompilerOptions {
            allow_js: true,
            ..Default::default()
        };
        let program = Program::from_sources(&[("a.js", "var x = 1;")], options);
        assert_eq!(program.files().len(), 1);
        assert!(program.file(0).is_js);
    }

    #[test]
    fn test_lib_directive_resolves_in_lib_dir() {
        let host = MemoryHost::new(&[
            ("a.d.ts", "/// <reference lib=\"es2015.promise\" />"),
            ("libs/lib.es2015.promise.d.ts", "interface Promise<T> {}"),
            ("libs/lib.d.ts", "interface Object {}"),
        ]);
        let options = CompilerOptions {
            lib_dir: Some(PathBuf::from("libs")),
            ..Default::default()
        };
        let program = Program::load_with_host(&host, &[PathBuf::from("a.d.ts")], options).unwrap();
        let names: Vec<_> = program.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["libs/lib.d.ts", "a.d.ts", "libs/lib.es2015.promise.d.ts"]);
    }

    #[test]
    fn test_parse_errors_become_diagnostics() {
        let program = Program::from_sources(&[("a.d.ts", "declare var x: ;")], CompilerOptions::default());
        assert!(program
            .diagnostics()
            .iter()
            .any(|d| d.code == codes::PARSE_ERROR && d.file == Some(0)));
    }

    #[test]
    fn test_line_col() {
        let program = Program::from_sources(&[("a.d.ts", "var a;\nvar bb;\n")], CompilerOptions::default());
        let file = program.file(0);
        assert_eq!(file.line_col(0), (0, 0));
        assert_eq!(file.line_col(7), (1, 0));
        assert_eq!(file.line_col(11), (1, 4));
        assert_eq!(file.module_name(), "a");
    }
}
