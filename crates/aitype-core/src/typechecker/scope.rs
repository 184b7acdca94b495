use crate::types::Type;
use id_arena::{Arena, Id};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

pub type ScopeId = Id<Scope>;

/// One lexical environment: variable bindings and type aliases.
///
/// Bindings keep declaration order so namespace re-exports are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: FxIndexMap<String, Type>,
    types: FxIndexMap<String, Type>,
    parent: Option<ScopeId>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Look up a variable in this scope only
    pub fn get_local_variable(&self, name: &str) -> Option<&Type> {
        self.variables.get(name)
    }

    /// Look up a type alias in this scope only
    pub fn get_local_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, typ: Type) -> &Type {
        let (index, _) = self.variables.insert_full(name.into(), typ);
        &self.variables[index]
    }

    pub fn set_type(&mut self, name: impl Into<String>, typ: Type) -> &Type {
        let (index, _) = self.types.insert_full(name.into(), typ);
        &self.types[index]
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.variables.iter().map(|(name, typ)| (name.as_str(), typ))
    }

    pub fn types(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.types.iter().map(|(name, typ)| (name.as_str(), typ))
    }
}

/// All scopes opened while checking one program.
///
/// Scopes live in an arena and refer to their parent by id. The root of the
/// arena is a fresh child of `globals`, which is shared and never written.
pub struct ScopeTree<'g> {
    arena: Arena<Scope>,
    globals: &'g Scope,
    root: ScopeId,
}

impl<'g> ScopeTree<'g> {
    pub fn new(globals: &'g Scope) -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(Scope::new());
        Self {
            arena,
            globals,
            root,
        }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub fn globals(&self) -> &'g Scope {
        self.globals
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.arena[id]
    }

    /// Number of scopes opened so far, the root included
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn create_child_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.arena.alloc(Scope {
            parent: Some(parent),
            ..Scope::default()
        })
    }

    /// Resolve a variable outward through the chain, ending at the globals
    pub fn get_variable(&self, scope: ScopeId, name: &str) -> Option<&Type> {
        self.ancestors(scope)
            .find_map(|s| s.get_local_variable(name))
            .or_else(|| self.globals.get_local_variable(name))
    }

    /// Resolve a type alias outward through the chain, ending at the globals
    pub fn get_type(&self, scope: ScopeId, name: &str) -> Option<&Type> {
        self.ancestors(scope)
            .find_map(|s| s.get_local_type(name))
            .or_else(|| self.globals.get_local_type(name))
    }

    pub fn set_variable(&mut self, scope: ScopeId, name: impl Into<String>, typ: Type) -> &Type {
        self.arena[scope].set_variable(name, typ)
    }

    pub fn set_type(&mut self, scope: ScopeId, name: impl Into<String>, typ: Type) -> &Type {
        self.arena[scope].set_type(name, typ)
    }

    fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(&self.arena[scope]), |s| s.parent.map(|p| &self.arena[p]))
    }
}
