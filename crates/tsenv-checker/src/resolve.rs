//! Name resolution
//!
//! Looks names up through the declaration-node ancestry, then the global
//! table, and follows import/export aliases to the symbols they denote.

use std::rc::Rc;
use tracing::trace;
use tsenv_ast::*;

use crate::binder::Table;
use crate::checker::{Resolving, TypeChecker};
use crate::error::codes;
use crate::symbols::{names, SymbolFlags, SymbolId, SymbolTable};
use crate::syntax::{ImportedName, NodeId, NodePayload, SyntaxKind};

/// What kind of entity a name is looked up as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meaning {
    Type,
    Value,
    Namespace,
    All,
}

impl Meaning {
    fn flags(self) -> SymbolFlags {
        match self {
            Meaning::Type => SymbolFlags::TYPE,
            Meaning::Value => SymbolFlags::VALUE,
            Meaning::Namespace => SymbolFlags::NAMESPACE,
            Meaning::All => SymbolFlags::TYPE | SymbolFlags::VALUE | SymbolFlags::NAMESPACE,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Meaning::Namespace => "namespace",
            _ => "name",
        }
    }
}

impl TypeChecker<'_> {
    /// Symbol `name` denotes at `scope` with the given meaning, aliases
    /// followed.
    pub fn resolve_name(&mut self, name: &str, scope: NodeId, meaning: Meaning) -> Option<SymbolId> {
        self.resolve_name_excluding(name, scope, meaning, None)
    }

    fn resolve_name_excluding(
        &mut self,
        name: &str,
        scope: NodeId,
        meaning: Meaning,
        exclude: Option<SymbolId>,
    ) -> Option<SymbolId> {
        let chain: Vec<NodeId> = std::iter::once(scope)
            .chain(self.binding.nodes.ancestors(scope))
            .collect();
        for node in chain {
            for table in self.scope_tables(node) {
                let candidate = self.binding.table(table).and_then(|t| t.get(name)).copied();
                if let Some(symbol) = candidate.filter(|&s| Some(s) != exclude) {
                    if let Some(found) = self.symbol_with_meaning(symbol, meaning) {
                        return Some(found);
                    }
                }
            }
        }
        let global = self.binding.globals.get(name).copied()?;
        if Some(global) == exclude {
            return None;
        }
        self.symbol_with_meaning(global, meaning)
    }

    /// Tables a scope node contributes, innermost first.
    fn scope_tables(&self, node: NodeId) -> Vec<Table> {
        let data = self.node(node);
        match data.kind {
            SyntaxKind::ClassDeclaration | SyntaxKind::InterfaceDeclaration => {
                data.symbol.map(Table::TypeParameters).into_iter().collect()
            }
            SyntaxKind::TypeAliasDeclaration
            | SyntaxKind::FunctionDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::MethodSignature
            | SyntaxKind::CallSignature
            | SyntaxKind::ConstructSignature
            | SyntaxKind::Constructor
            | SyntaxKind::FunctionType
            | SyntaxKind::ConstructorType
            | SyntaxKind::MappedType
            | SyntaxKind::ConditionalType => vec![Table::Locals(node)],
            SyntaxKind::ModuleDeclaration => {
                let mut tables = vec![Table::Locals(node)];
                if let Some(symbol) = data.symbol.filter(|_| data.name.as_ref().is_some_and(|n| n.text != "global")) {
                    tables.push(Table::Exports(symbol));
                }
                tables
            }
            SyntaxKind::SourceFile => {
                let is_external = matches!(
                    *data.payload,
                    NodePayload::SourceFile {
                        is_external_module: true,
                        ..
                    }
                );
                if is_external {
                    let mut tables = vec![Table::Locals(node)];
                    if let Some(symbol) = data.symbol {
                        tables.push(Table::Exports(symbol));
                    }
                    tables
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// `symbol` itself or its alias target, if it carries `meaning`.
    fn symbol_with_meaning(&mut self, symbol: SymbolId, meaning: Meaning) -> Option<SymbolId> {
        let flags = self.symbol(symbol).flags;
        if flags.intersects(meaning.flags()) {
            return Some(symbol);
        }
        if flags.contains(SymbolFlags::ALIAS) {
            let target = self.resolve_alias(symbol)?;
            if self.symbol(target).flags.intersects(meaning.flags()) {
                return Some(target);
            }
        }
        None
    }

    /// Resolves a dotted name, reporting what cannot be found.
    pub fn resolve_entity(
        &mut self,
        name: &Node<EntityName>,
        scope: NodeId,
        meaning: Meaning,
    ) -> Option<SymbolId> {
        self.resolve_entity_with(name, scope, meaning, true)
    }

    /// Like [`resolve_entity`](Self::resolve_entity), without diagnostics.
    pub(crate) fn try_resolve_entity(
        &mut self,
        name: &Node<EntityName>,
        scope: NodeId,
        meaning: Meaning,
    ) -> Option<SymbolId> {
        self.resolve_entity_with(name, scope, meaning, false)
    }

    fn resolve_entity_with(
        &mut self,
        name: &Node<EntityName>,
        scope: NodeId,
        meaning: Meaning,
        report: bool,
    ) -> Option<SymbolId> {
        let parts = &name.value.parts;
        let (first, rest) = parts.split_first()?;
        let first_meaning = if rest.is_empty() { meaning } else { Meaning::Namespace };

        let mut current = match self.resolve_name(&first.name, scope, first_meaning) {
            Some(symbol) => symbol,
            None => {
                if report {
                    self.report_unresolved(&first.name, name.span, scope, first_meaning);
                }
                return None;
            }
        };

        for (i, part) in rest.iter().enumerate() {
            let last = i + 1 == rest.len();
            let part_meaning = if last { meaning } else { Meaning::Namespace };
            let exports = self.exports_of(current);
            let next = exports
                .get(&part.name)
                .copied()
                .and_then(|s| self.symbol_with_meaning(s, part_meaning));
            match next {
                Some(symbol) => current = symbol,
                None if !report => return None,
                None => {
                    let container = self.symbol(current).name.clone();
                    self.error(
                        name.span,
                        codes::NO_EXPORTED_MEMBER,
                        format!("Namespace '{}' has no exported member '{}'.", container, part.name),
                    );
                    return None;
                }
            }
        }
        Some(current)
    }

    fn report_unresolved(&mut self, text: &str, span: Span, scope: NodeId, meaning: Meaning) {
        if meaning == Meaning::Type && self.resolve_name(text, scope, Meaning::Value).is_some() {
            self.error(
                span,
                codes::VALUE_AS_TYPE,
                format!("'{}' refers to a value, but is being used as a type here.", text),
            );
            return;
        }
        let code = match meaning {
            Meaning::Namespace => codes::CANNOT_FIND_NAMESPACE,
            _ => codes::CANNOT_FIND_NAME,
        };
        self.error(span, code, format!("Cannot find {} '{}'.", meaning.describe(), text));
    }

    /// Symbol an alias (import, export specifier, `export =`) stands for.
    pub fn resolve_alias(&mut self, alias: SymbolId) -> Option<SymbolId> {
        if !self.symbol(alias).flags.contains(SymbolFlags::ALIAS) {
            return Some(alias);
        }
        if let Some(&target) = self.alias_targets.get(&alias) {
            return target;
        }
        if !self.resolving.insert(Resolving::AliasTarget(alias)) {
            trace!(alias = %self.symbol(alias).name, "circular alias");
            return None;
        }
        let target = self.compute_alias_target(alias);
        self.resolving.remove(&Resolving::AliasTarget(alias));
        self.alias_targets.insert(alias, target);
        target
    }

    fn compute_alias_target(&mut self, alias: SymbolId) -> Option<SymbolId> {
        let node = *self.symbol(alias).declarations.first()?;
        let file = self.node(node).file;
        let span = self.node(node).span;
        let scope = self.node(node).parent.unwrap_or(node);
        let payload = self.binding.nodes.payload(node);

        let target = match &*payload {
            NodePayload::ImportEquals(ImportEqualsTarget::External(spec)) => {
                let module = self.resolve_external_module(spec, file, span)?;
                Some(self.resolve_export_equals(module))
            }
            NodePayload::ImportEquals(ImportEqualsTarget::Entity(entity)) => {
                self.resolve_entity(entity, scope, Meaning::All)
            }
            NodePayload::ImportSpecifier { source, imported } => {
                let module = self.resolve_external_module(source, file, span)?;
                match imported {
                    ImportedName::Namespace => Some(self.resolve_export_equals(module)),
                    ImportedName::Default => {
                        let exports = self.exports_of(module);
                        match exports.get(names::DEFAULT) {
                            Some(&default) => self.resolve_alias(default),
                            None => Some(self.resolve_export_equals(module)),
                        }
                    }
                    ImportedName::Named(name) => self.module_member(module, name, span),
                }
            }
            NodePayload::ExportSpecifier {
                local,
                source: Some(source),
            } => {
                let module = self.resolve_external_module(source, file, span)?;
                self.module_member(module, local, span)
            }
            NodePayload::ExportSpecifier { local, source: None } => {
                let found = self.resolve_name_excluding(local, scope, Meaning::All, Some(alias));
                if found.is_none() {
                    self.error(span, codes::CANNOT_FIND_NAME, format!("Cannot find name '{}'.", local));
                }
                found
            }
            NodePayload::ExportStar { source } => {
                let module = self.resolve_external_module(source, file, span)?;
                Some(self.resolve_export_equals(module))
            }
            NodePayload::ExportAssignment(entity) => self.resolve_entity(entity, scope, Meaning::All),
            NodePayload::None if self.node_kind(node) == SyntaxKind::NamespaceExportDeclaration => {
                self.binding.file_symbols.get(file).copied().flatten()
            }
            _ => None,
        }?;

        // Chains of aliases collapse to their final target.
        if target != alias && self.symbol(target).flags == SymbolFlags::ALIAS {
            self.resolve_alias(target)
        } else {
            Some(target)
        }
    }

    fn module_member(&mut self, module: SymbolId, name: &str, span: Span) -> Option<SymbolId> {
        let container = self.resolve_export_equals(module);
        let exports = self.exports_of(container);
        match exports.get(name) {
            Some(&member) => self.resolve_alias(member),
            None => {
                let module_name = self.symbol(module).name.clone();
                self.error(
                    span,
                    codes::NO_EXPORTED_MODULE_MEMBER,
                    format!("Module {} has no exported member '{}'.", module_name, name),
                );
                None
            }
        }
    }

    /// The `export =` target of a module, or the module itself.
    pub fn resolve_export_equals(&mut self, module: SymbolId) -> SymbolId {
        let export_equals = self.symbol(module).exports.get(names::EXPORT_EQUALS).copied();
        export_equals
            .and_then(|alias| self.resolve_alias(alias))
            .unwrap_or(module)
    }

    /// Module symbol a specifier used in `file` refers to.
    pub fn resolve_external_module(&mut self, spec: &str, file: usize, span: Span) -> Option<SymbolId> {
        if let Some(index) = self.program.resolved_module(file, spec) {
            if let Some(symbol) = self.binding.file_symbols.get(index).copied().flatten() {
                return Some(symbol);
            }
        }
        if let Some(&symbol) = self.binding.globals.get(&format!("\"{}\"", spec)) {
            return Some(symbol);
        }
        self.error(span, codes::CANNOT_FIND_MODULE, format!("Cannot find module '{}'.", spec));
        None
    }

    /// Exports of a namespace, module, class or enum, with `export *`
    /// re-exports merged in.
    pub fn exports_of(&mut self, symbol: SymbolId) -> Rc<SymbolTable> {
        if let Some(exports) = self.exports.get(&symbol) {
            return Rc::clone(exports);
        }
        let own = self.symbol(symbol).exports.clone();
        let stars = self.symbol(symbol).export_stars.clone();
        if stars.is_empty() {
            let exports = Rc::new(own);
            self.exports.insert(symbol, Rc::clone(&exports));
            return exports;
        }
        if !self.resolving.insert(Resolving::Exports(symbol)) {
            return Rc::new(own);
        }

        let mut merged = own;
        for star in stars {
            let data = self.node(star);
            let (file, span) = (data.file, data.span);
            let payload = self.binding.nodes.payload(star);
            let NodePayload::ExportStar { source } = &*payload else {
                continue;
            };
            let Some(module) = self.resolve_external_module(source, file, span) else {
                continue;
            };
            let reexported = self.exports_of(module);
            for (name, &member) in reexported.iter() {
                if name != names::DEFAULT && name != names::EXPORT_EQUALS {
                    merged.entry(name.clone()).or_insert(member);
                }
            }
        }

        self.resolving.remove(&Resolving::Exports(symbol));
        let exports = Rc::new(merged);
        self.exports.insert(symbol, Rc::clone(&exports));
        exports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostic;
    use crate::options::CompilerOptions;
    use crate::program::Program;

    fn program(sources: &[(&str, &str)]) -> Program {
        Program::from_sources(sources, CompilerOptions::default())
    }

    fn decl(checker: &TypeChecker<'_>, file: usize, name: &str) -> NodeId {
        checker.named_declarations(file).expect("file")[name][0]
    }

    fn codes_of(diagnostics: &[Diagnostic]) -> Vec<u32> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_resolves_through_namespaces() {
        let program = program(&[(
            "a.d.ts",
            "declare namespace N { namespace M { interface I {} } var v: M.I; }",
        )]);
        let mut checker = program.checker();
        let v = decl(&checker, 0, "v");
        let scope = checker.node(v).parent.expect("parent");
        let m = checker.resolve_name("M", scope, Meaning::Namespace).expect("M");
        assert_eq!(checker.symbol(m).name, "M");
        assert!(checker.resolve_name("I", scope, Meaning::Type).is_none());
        assert!(checker.pre_emit_diagnostics().is_empty());
    }

    #[test]
    fn test_import_equals_follows_export_equals() {
        let program = program(&[(
            "a.d.ts",
            "declare module 'lib' { interface Options { a: string } var options: Options; export = options; }\n\
             declare module 'app' { import o = require('lib'); var copy: typeof o; }",
        )]);
        let mut checker = program.checker();
        let o = decl(&checker, 0, "o");
        let alias = checker.node(o).symbol.expect("alias symbol");
        let target = checker.resolve_alias(alias).expect("target");
        assert_eq!(checker.symbol(target).name, "options");
    }

    #[test]
    fn test_external_module_imports() {
        let program = program(&[
            ("main.ts", "import { Shape, missing } from './shapes';\nexport declare var s: Shape;"),
            ("shapes.d.ts", "export interface Shape { area: number }"),
        ]);
        let mut checker = program.checker();
        let shape = decl(&checker, 0, "Shape");
        let alias = checker.node(shape).symbol.expect("alias");
        let target = checker.resolve_alias(alias).expect("resolved");
        assert!(checker.symbol(target).flags.contains(SymbolFlags::INTERFACE));
        let diagnostics = checker.pre_emit_diagnostics();
        assert_eq!(codes_of(&diagnostics), vec![codes::NO_EXPORTED_MODULE_MEMBER]);
    }

    #[test]
    fn test_export_star_merges_exports() {
        let program = program(&[
            ("index.d.ts", "export * from './a';\nexport declare var own: number;"),
            ("a.d.ts", "export declare var fromA: string;"),
        ]);
        let mut checker = program.checker();
        let module = checker.binding.file_symbols[0].expect("module");
        let exports = checker.exports_of(module);
        let names: Vec<_> = exports.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["own", "fromA"]);
    }

    #[test]
    fn test_unresolved_names_are_reported() {
        let program = program(&[(
            "a.d.ts",
            "declare var a: Missing;\ndeclare var b: NoSpace.T;\ndeclare var c: Fn;\ndeclare function Fn(): void;\n\
             declare namespace N {}\ndeclare var d: N.Gone;\nimport m = require('nowhere');",
        )]);
        let mut checker = program.checker();
        let diagnostics = checker.pre_emit_diagnostics();
        assert_eq!(
            codes_of(&diagnostics),
            vec![
                codes::CANNOT_FIND_NAME,
                codes::CANNOT_FIND_NAMESPACE,
                codes::VALUE_AS_TYPE,
                codes::NO_EXPORTED_MEMBER,
                codes::CANNOT_FIND_MODULE,
            ]
        );
    }
}
