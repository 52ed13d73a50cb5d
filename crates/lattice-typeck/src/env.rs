//! Symbol table and program context.
//!
//! The symbol table is a scope stack: entering a lexical region pushes a
//! frame, leaving pops it, and lookups search from the innermost scope
//! outward. On top of it, [`Environment`] carries the two global registries
//! (element kinds and function signatures) that later passes read back out.

use rustc_hash::FxHashMap;

use crate::ty::{ElementType, Type};

/// Read/write permission of a binding.
///
/// Function arguments are readable (read-write when `inout`), results are
/// writable, locals and externs are read-write, and constants are
/// read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

/// A name binding: its IR type and its permission.
///
/// `ty` is `None` when the declared type failed to check -- the binding
/// still exists so later references resolve without cascading diagnostics.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub ty: Option<Type>,
    pub access: Access,
}

impl Symbol {
    pub fn new(ty: Option<Type>, access: Access) -> Self {
        Symbol { ty, access }
    }
}

/// Lexically scoped bindings from name to symbol.
#[derive(Debug)]
pub struct SymbolTable {
    /// The scope stack. Index 0 is the global scope.
    scopes: Vec<FxHashMap<String, Symbol>>,
}

impl SymbolTable {
    /// Create a symbol table with one empty global scope.
    pub fn new() -> Self {
        SymbolTable { scopes: vec![FxHashMap::default()] }
    }

    /// Enter a nested scope.
    pub fn scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Leave the current scope.
    ///
    /// # Panics
    ///
    /// Panics if called when only the global scope remains.
    pub fn unscope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot unscope the global scope");
        self.scopes.pop();
    }

    /// Bind a name in the current scope, shadowing any outer binding.
    pub fn insert(&mut self, name: String, symbol: Symbol) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name, symbol);
    }

    /// Look up a name, searching from the innermost scope outward.
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Whether the name is bound in any scope.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether the name is bound in the current scope only. Re-declaration
    /// in the same scope is diagnosed with this; shadowing an outer binding
    /// is not an error.
    pub fn contains_local(&self, name: &str) -> bool {
        self.scopes
            .last()
            .expect("scope stack is never empty")
            .contains_key(name)
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// A declared parameter or result of a function signature. `ty` is `None`
/// when the annotation failed to check; such slots participate in no
/// further checks.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<Type>,
}

/// A function signature as registered in the program context.
///
/// Intrinsics declared with an empty parameter list are shape-polymorphic:
/// call sites skip the arity and argument checks for them.
#[derive(Debug, Clone)]
pub struct FuncSignature {
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub intrinsic: bool,
}

/// The program context: the symbol stack plus the global registries of
/// element kinds and functions. Registered entries are immutable;
/// re-registration is refused and diagnosed by the checker.
#[derive(Debug)]
pub struct Environment {
    pub symbols: SymbolTable,
    element_types: FxHashMap<String, ElementType>,
    functions: FxHashMap<String, FuncSignature>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            symbols: SymbolTable::new(),
            element_types: FxHashMap::default(),
            functions: FxHashMap::default(),
        }
    }

    pub fn contains_element_type(&self, name: &str) -> bool {
        self.element_types.contains_key(name)
    }

    /// Register an element kind. Returns `false` (and leaves the first
    /// registration in place) if the name is taken.
    pub fn add_element_type(&mut self, element: ElementType) -> bool {
        if self.element_types.contains_key(&element.name) {
            return false;
        }
        self.element_types.insert(element.name.clone(), element);
        true
    }

    pub fn element_type(&self, name: &str) -> Option<&ElementType> {
        self.element_types.get(name)
    }

    pub fn contains_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Register a function signature. Returns `false` (and leaves the first
    /// registration in place) if the name is taken.
    pub fn add_function(&mut self, func: FuncSignature) -> bool {
        if self.functions.contains_key(&func.name) {
            return false;
        }
        self.functions.insert(func.name.clone(), func);
        true
    }

    pub fn function(&self, name: &str) -> Option<&FuncSignature> {
        self.functions.get(name)
    }

    /// Names of all registered element kinds, unordered.
    pub fn element_type_names(&self) -> impl Iterator<Item = &str> {
        self.element_types.keys().map(String::as_str)
    }

    /// Names of all registered functions, unordered.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
