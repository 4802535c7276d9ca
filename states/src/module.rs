//! Module declarations and namespacing.
//!
//! A module bundles one piece of state with the mutations allowed to write it,
//! the actions allowed to commit those mutations, and the getters that read it.
//! Modules are addressed by name; when a module is namespaced every action and
//! mutation it declares is addressed as `module/name`, so two modules composed
//! into one `StateCtx` can reuse the same short names.

use std::fmt::{Debug, Display, Formatter};

use ustr::Ustr;

/// A named, self-contained slice of the store.
///
/// The module value itself is shared with its actions (behind an `Arc`), which
/// makes it the natural home for collaborators such as API clients. The state
/// lives in the `StateCtx` and is only ever written through [`Mutation`]s.
///
/// [`Mutation`]: crate::Mutation
pub trait Module: Send + Sync + 'static {
    const NAME: &'static str;

    type State: Default + Debug + Send + 'static;

    /// Read-only view over the state. Getters are plain methods on this type.
    type Getters<'a>: From<&'a Self::State>;

    fn descriptor() -> ModuleDescriptor;
}

/// The export contract of a module: its name, whether it is namespaced, and
/// the names of everything it exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: &'static str,
    pub namespaced: bool,
    pub getters: &'static [&'static str],
    pub actions: &'static [&'static str],
    pub mutations: &'static [&'static str],
}

impl ModuleDescriptor {
    /// A namespaced module that exposes nothing yet.
    pub const fn namespaced(name: &'static str) -> Self {
        Self {
            name,
            namespaced: true,
            getters: &[],
            actions: &[],
            mutations: &[],
        }
    }

    /// A module whose names live in the root namespace.
    pub const fn global(name: &'static str) -> Self {
        Self {
            namespaced: false,
            ..Self::namespaced(name)
        }
    }

    pub const fn with_getters(self, getters: &'static [&'static str]) -> Self {
        Self { getters, ..self }
    }

    pub const fn with_actions(self, actions: &'static [&'static str]) -> Self {
        Self { actions, ..self }
    }

    pub const fn with_mutations(self, mutations: &'static [&'static str]) -> Self {
        Self { mutations, ..self }
    }

    /// Address `name` the way this module exposes it.
    pub fn qualify(&self, name: &str) -> QualifiedPath {
        if self.namespaced {
            QualifiedPath::of(self.name, name)
        } else {
            QualifiedPath::global(name)
        }
    }

    pub fn declares_action(&self, name: &str) -> bool {
        self.actions.contains(&name)
    }

    pub fn declares_mutation(&self, name: &str) -> bool {
        self.mutations.contains(&name)
    }

    pub fn qualified_actions(&self) -> impl Iterator<Item = QualifiedPath> + '_ {
        self.actions.iter().map(|name| self.qualify(name))
    }

    pub fn qualified_mutations(&self) -> impl Iterator<Item = QualifiedPath> + '_ {
        self.mutations.iter().map(|name| self.qualify(name))
    }
}

/// An action or mutation address such as `users/fetchUsers`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedPath(Ustr);

impl QualifiedPath {
    const SEPARATOR: char = '/';

    pub fn of(module: &str, name: &str) -> Self {
        Self(Ustr::from(
            format!("{module}{}{name}", Self::SEPARATOR).as_str(),
        ))
    }

    pub fn global(name: &str) -> Self {
        Self(Ustr::from(name))
    }

    /// The namespace part, `None` for root-level names.
    pub fn module(&self) -> Option<&'static str> {
        self.0
            .as_str()
            .rsplit_once(Self::SEPARATOR)
            .map(|(module, _)| module)
    }

    pub fn name(&self) -> &'static str {
        let path = self.0.as_str();
        path.rsplit_once(Self::SEPARATOR)
            .map_or(path, |(_, name)| name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0.as_str()
    }
}

impl Display for QualifiedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Debug for QualifiedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0.as_str())
    }
}
