//! The [`Component`] trait: per-type behaviour of tree nodes.
//!
//! Node bookkeeping (name, parent, children, monitors) lives in the
//! [`ComponentTree`]; a node's payload only supplies what varies between
//! component types: which capabilities it has, whether it can hold children,
//! the validation hooks, and the factory used to create children on demand.

use std::any::Any;
use std::rc::Rc;

use crate::error::TreeResult;
use crate::kind::Kind;
use crate::tree::{ComponentId, ComponentTree};

/// Base trait for component payloads.
///
/// Every hook has a permissive default, so a plain leaf is just:
///
/// ```
/// use component_model_core::Component;
///
/// #[derive(Clone)]
/// struct Label {
///     text: String,
/// }
///
/// impl Component for Label {}
/// ```
///
/// Containers return `true` from [`is_container`](Self::is_container) and may
/// create children lazily:
///
/// ```
/// use component_model_core::{Component, ComponentId, ComponentTree, TreeResult};
///
/// #[derive(Clone)]
/// struct Label;
/// impl Component for Label {}
///
/// #[derive(Clone)]
/// struct Form;
///
/// impl Component for Form {
///     fn is_container(&self) -> bool {
///         true
///     }
///
///     fn create_component(
///         &self,
///         tree: &mut ComponentTree,
///         _this: ComponentId,
///         name: &str,
///     ) -> TreeResult<Option<ComponentId>> {
///         Ok(match name {
///             "title" => Some(tree.insert(Label)),
///             _ => None,
///         })
///     }
///
///     fn factory_names(&self) -> Vec<String> {
///         vec!["title".into()]
///     }
/// }
///
/// let mut tree = ComponentTree::new();
/// let form = tree.insert(Form);
/// let title = tree.get_component(form, "title").unwrap();
/// assert_eq!(tree.parent(title).unwrap(), Some(form));
/// ```
pub trait Component: Any + ComponentClone {
    /// Capabilities satisfied in addition to the concrete type.
    ///
    /// Ancestor lookups match a node when the requested [`Kind`] is either its
    /// concrete type or one of these.
    fn kinds(&self) -> Vec<Kind> {
        Vec::new()
    }

    /// Whether nodes with this payload own children.
    fn is_container(&self) -> bool {
        false
    }

    /// Called before this component accepts `parent`. Return
    /// [`TreeError::InvalidState`](crate::TreeError::InvalidState) to veto.
    fn validate_parent(
        &self,
        _tree: &ComponentTree,
        _this: ComponentId,
        _parent: ComponentId,
    ) -> TreeResult<()> {
        Ok(())
    }

    /// Called before `child` is inserted into this container. Return
    /// [`TreeError::InvalidState`](crate::TreeError::InvalidState) to veto.
    fn validate_child(
        &self,
        _tree: &ComponentTree,
        _this: ComponentId,
        _child: ComponentId,
    ) -> TreeResult<()> {
        Ok(())
    }

    /// Create the child called `name` on first access.
    ///
    /// The factory may add the new component to `this` itself; otherwise the
    /// returned component is added under `name` automatically.
    fn create_component(
        &self,
        _tree: &mut ComponentTree,
        _this: ComponentId,
        _name: &str,
    ) -> TreeResult<Option<ComponentId>> {
        Ok(None)
    }

    /// Names [`create_component`](Self::create_component) knows how to build.
    ///
    /// Used for "did you mean" hints, and to report a factory that produced
    /// nothing for a name it advertises.
    fn factory_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Object-safe cloning for component payloads.
///
/// Implemented automatically for every `Component + Clone`.
pub trait ComponentClone {
    /// Clone the payload into a fresh shared allocation.
    fn clone_component(&self) -> Rc<dyn Component>;
}

impl<T: Component + Clone> ComponentClone for T {
    fn clone_component(&self) -> Rc<dyn Component> {
        Rc::new(self.clone())
    }
}

/// Downcast a payload to its concrete type.
///
/// Returns `None` when the payload is of another type.
pub fn component_cast<T: Component>(component: &dyn Component) -> Option<&T> {
    (component as &dyn Any).downcast_ref::<T>()
}
