//! Index-style access to the children of a container.

use std::fmt;

use component_model_core::{ComponentId, ComponentTree, TreeResult};

/// Key of a child in [`ContainerAccess`].
///
/// Integer keys address the child named by their decimal form, so `3` and
/// `"3"` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// A component name or `-`-separated path.
    Name(String),
    /// A numeric name.
    Index(i64),
}

impl ComponentKey {
    /// The name or path this key addresses.
    pub fn to_name(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for ComponentKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ComponentKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for ComponentKey {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<i32> for ComponentKey {
    fn from(index: i32) -> Self {
        Self::Index(index.into())
    }
}

impl From<u32> for ComponentKey {
    fn from(index: u32) -> Self {
        Self::Index(index.into())
    }
}

/// Map-like view of a container's children.
///
/// `get`, `set`, `exists` and `unset` behave like indexing into the
/// container: they translate to [`ComponentTree::get_component`],
/// [`ComponentTree::add_component`], [`ComponentTree::try_get_component`] and
/// [`ComponentTree::remove_component`].
pub struct ContainerAccess<'a> {
    tree: &'a mut ComponentTree,
    container: ComponentId,
}

impl<'a> ContainerAccess<'a> {
    /// Create a view of `container`'s children.
    pub fn new(tree: &'a mut ComponentTree, container: ComponentId) -> Self {
        Self { tree, container }
    }

    /// The container being accessed.
    pub fn container(&self) -> ComponentId {
        self.container
    }

    /// The underlying tree.
    pub fn tree(&mut self) -> &mut ComponentTree {
        &mut *self.tree
    }

    /// Get the child (or descendant, for a path) under `key`, creating it
    /// through the factory if needed.
    pub fn get(&mut self, key: impl Into<ComponentKey>) -> TreeResult<ComponentId> {
        let name = key.into().to_name();
        self.tree.get_component(self.container, &name)
    }

    /// Add `component` under `key`.
    pub fn set(&mut self, key: impl Into<ComponentKey>, component: ComponentId) -> TreeResult<()> {
        let name = key.into().to_name();
        tracing::trace!(target: "component_model::access", container = ?self.container, ?component, %name, "set");
        self.tree
            .add_component(self.container, component, Some(&name), None)
    }

    /// Whether a child exists under `key`, creating it through the factory if
    /// needed.
    pub fn exists(&mut self, key: impl Into<ComponentKey>) -> TreeResult<bool> {
        let name = key.into().to_name();
        Ok(self.tree.try_get_component(self.container, &name)?.is_some())
    }

    /// Remove the child under `key`, if there is one.
    ///
    /// For a path, the descendant is removed from its own container.
    pub fn unset(&mut self, key: impl Into<ComponentKey>) -> TreeResult<()> {
        let name = key.into().to_name();
        let Some(component) = self.tree.try_get_component(self.container, &name)? else {
            return Ok(());
        };
        match self.tree.parent(component)? {
            Some(parent) => self.tree.remove_component(parent, component),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ContainerAccess<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerAccess")
            .field("container", &self.container)
            .finish()
    }
}
