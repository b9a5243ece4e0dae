//! Symbols and symbol tables

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::syntax::NodeId;

/// Handle of a symbol in the [`SymbolArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u32 {
        const FUNCTION_SCOPED_VARIABLE = 1 << 0;
        const BLOCK_SCOPED_VARIABLE    = 1 << 1;
        const PROPERTY                 = 1 << 2;
        const ENUM_MEMBER              = 1 << 3;
        const FUNCTION                 = 1 << 4;
        const CLASS                    = 1 << 5;
        const INTERFACE                = 1 << 6;
        const CONST_ENUM               = 1 << 7;
        const REGULAR_ENUM             = 1 << 8;
        const VALUE_MODULE             = 1 << 9;
        const NAMESPACE_MODULE         = 1 << 10;
        const TYPE_LITERAL             = 1 << 11;
        const METHOD                   = 1 << 12;
        const CONSTRUCTOR              = 1 << 13;
        const GET_ACCESSOR             = 1 << 14;
        const SET_ACCESSOR             = 1 << 15;
        const SIGNATURE                = 1 << 16;
        const TYPE_PARAMETER           = 1 << 17;
        const TYPE_ALIAS               = 1 << 18;
        const ALIAS                    = 1 << 19;
        const PROTOTYPE                = 1 << 20;
        const OPTIONAL                 = 1 << 21;
        const TRANSIENT                = 1 << 22;

        const VARIABLE = Self::FUNCTION_SCOPED_VARIABLE.bits() | Self::BLOCK_SCOPED_VARIABLE.bits();
        const ENUM = Self::REGULAR_ENUM.bits() | Self::CONST_ENUM.bits();
        const MODULE = Self::VALUE_MODULE.bits() | Self::NAMESPACE_MODULE.bits();
        const ACCESSOR = Self::GET_ACCESSOR.bits() | Self::SET_ACCESSOR.bits();

        const VALUE = Self::VARIABLE.bits() | Self::PROPERTY.bits() | Self::ENUM_MEMBER.bits()
            | Self::FUNCTION.bits() | Self::CLASS.bits() | Self::ENUM.bits()
            | Self::VALUE_MODULE.bits() | Self::METHOD.bits() | Self::ACCESSOR.bits();
        const TYPE = Self::CLASS.bits() | Self::INTERFACE.bits() | Self::ENUM.bits()
            | Self::ENUM_MEMBER.bits() | Self::TYPE_LITERAL.bits()
            | Self::TYPE_PARAMETER.bits() | Self::TYPE_ALIAS.bits();
        const NAMESPACE = Self::VALUE_MODULE.bits() | Self::NAMESPACE_MODULE.bits() | Self::ENUM.bits();
    }
}

impl SymbolFlags {
    /// Flags an existing symbol must not carry for a declaration with
    /// these flags to merge into it.
    pub fn excludes(self) -> SymbolFlags {
        let value = SymbolFlags::VALUE;
        let ty = SymbolFlags::TYPE;
        if self.contains(SymbolFlags::BLOCK_SCOPED_VARIABLE) {
            value
        } else if self.contains(SymbolFlags::FUNCTION_SCOPED_VARIABLE) {
            value - SymbolFlags::FUNCTION_SCOPED_VARIABLE
        } else if self.contains(SymbolFlags::ENUM_MEMBER) {
            value | ty
        } else if self.contains(SymbolFlags::FUNCTION) {
            value - (SymbolFlags::FUNCTION | SymbolFlags::VALUE_MODULE | SymbolFlags::CLASS)
        } else if self.contains(SymbolFlags::CLASS) {
            (value | ty) - (SymbolFlags::VALUE_MODULE | SymbolFlags::INTERFACE | SymbolFlags::FUNCTION)
        } else if self.contains(SymbolFlags::INTERFACE) {
            ty - (SymbolFlags::INTERFACE | SymbolFlags::CLASS)
        } else if self.contains(SymbolFlags::REGULAR_ENUM) {
            (value | ty) - (SymbolFlags::REGULAR_ENUM | SymbolFlags::VALUE_MODULE)
        } else if self.contains(SymbolFlags::CONST_ENUM) {
            (value | ty) - SymbolFlags::CONST_ENUM
        } else if self.contains(SymbolFlags::VALUE_MODULE) {
            value
                - (SymbolFlags::FUNCTION
                    | SymbolFlags::CLASS
                    | SymbolFlags::REGULAR_ENUM
                    | SymbolFlags::VALUE_MODULE)
        } else if self.contains(SymbolFlags::METHOD) {
            value - SymbolFlags::METHOD
        } else if self.contains(SymbolFlags::GET_ACCESSOR) {
            value - SymbolFlags::SET_ACCESSOR
        } else if self.contains(SymbolFlags::SET_ACCESSOR) {
            value - SymbolFlags::GET_ACCESSOR
        } else if self.contains(SymbolFlags::TYPE_PARAMETER) {
            ty - SymbolFlags::TYPE_PARAMETER
        } else if self.contains(SymbolFlags::TYPE_ALIAS) {
            ty
        } else if self.contains(SymbolFlags::ALIAS) {
            SymbolFlags::ALIAS
        } else {
            SymbolFlags::empty()
        }
    }
}

/// Insertion-ordered name table
pub type SymbolTable = IndexMap<String, SymbolId>;

/// Reserved member names for unnamed members
pub mod names {
    pub const CONSTRUCTOR: &str = "__constructor";
    pub const CALL: &str = "__call";
    pub const NEW: &str = "__new";
    pub const INDEX: &str = "__index";
    pub const TYPE: &str = "__type";
    pub const EXPORT_EQUALS: &str = "export=";
    pub const DEFAULT: &str = "default";
    pub const PROTOTYPE: &str = "prototype";

    /// Names that never surface as properties
    pub fn is_reserved(name: &str) -> bool {
        matches!(name, CONSTRUCTOR | CALL | NEW | INDEX | TYPE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Symbol {
    pub name: String,
    pub flags: SymbolFlags,
    pub declarations: Vec<NodeId>,
    pub value_declaration: Option<NodeId>,
    pub parent: Option<SymbolId>,
    /// Instance members of classes, members of interfaces and type literals
    pub members: SymbolTable,
    /// Namespace exports, static class members and enum members
    pub exports: SymbolTable,
    /// Type parameters shared by all declarations of a class or interface
    pub type_parameters: SymbolTable,
    /// `export * from "..."` declarations of a module
    pub export_stars: Vec<NodeId>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, flags: SymbolFlags) -> Self {
        Self {
            name: name.into(),
            flags,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_exclusions() {
        let interface = SymbolFlags::INTERFACE;
        assert!(!interface.excludes().intersects(SymbolFlags::INTERFACE));
        assert!(!interface.excludes().intersects(SymbolFlags::CLASS));
        assert!(!interface.excludes().intersects(SymbolFlags::FUNCTION_SCOPED_VARIABLE));
        assert!(interface.excludes().intersects(SymbolFlags::TYPE_ALIAS));

        let var = SymbolFlags::FUNCTION_SCOPED_VARIABLE;
        assert!(!var.excludes().intersects(SymbolFlags::FUNCTION_SCOPED_VARIABLE));
        assert!(var.excludes().intersects(SymbolFlags::CLASS));

        let class = SymbolFlags::CLASS;
        assert!(class.excludes().intersects(SymbolFlags::CLASS));
        assert!(!class.excludes().intersects(SymbolFlags::VALUE_MODULE | SymbolFlags::NAMESPACE_MODULE));

        assert!(SymbolFlags::NAMESPACE_MODULE.excludes().is_empty());
        assert!(SymbolFlags::BLOCK_SCOPED_VARIABLE
            .excludes()
            .intersects(SymbolFlags::FUNCTION_SCOPED_VARIABLE));
    }

    #[test]
    fn test_reserved_names() {
        assert!(names::is_reserved("__call"));
        assert!(!names::is_reserved("prototype"));
        assert!(!names::is_reserved("export="));
    }
}
