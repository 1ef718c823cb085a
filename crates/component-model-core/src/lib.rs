//! Core engine of the component model.
//!
//! This crate provides a tree of named components:
//!
//! - **Composition**: Containers own ordered, uniquely named children
//! - **Ancestor Lookup**: Cached search for the nearest ancestor of a kind,
//!   with the name path leading to it
//! - **Monitoring**: Attach/detach callbacks for ancestors, fired once per
//!   structural change
//! - **Lazy Children**: Containers create missing children through a factory hook
//! - **Cloning**: Deep copies that re-resolve their monitors in the new tree
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use component_model_core::{AncestorKey, Component, ComponentTree, MonitorCallback};
//!
//! #[derive(Clone)]
//! struct Presenter;
//! impl Component for Presenter {
//!     fn is_container(&self) -> bool {
//!         true
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Link;
//! impl Component for Link {}
//!
//! let mut tree = ComponentTree::new();
//! let presenter = tree.insert(Presenter);
//! let link = tree.insert(Link);
//!
//! let attached = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&attached);
//! tree.monitor(
//!     link,
//!     AncestorKey::of::<Presenter>(),
//!     Some(MonitorCallback::new(move |_, _, _| counter.set(counter.get() + 1))),
//!     None,
//! )
//! .unwrap();
//!
//! // Not attached yet: the callback waits.
//! assert_eq!(attached.get(), 0);
//!
//! tree.add_component(presenter, link, Some("link"), None).unwrap();
//! assert_eq!(attached.get(), 1);
//! assert_eq!(tree.lookup_path(link, AncestorKey::of::<Presenter>()).unwrap(), "link");
//! ```

mod component;
mod error;
mod iter;
mod kind;
pub mod logging;
mod monitor;
pub mod name;
#[cfg(feature = "serde")]
mod serde_impl;
mod tree;

pub use component::{component_cast, Component, ComponentClone};
pub use error::{TreeError, TreeResult};
pub use iter::Components;
pub use kind::{AncestorKey, Kind};
pub use logging::{ComponentTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use monitor::MonitorCallback;
pub use name::NAME_SEPARATOR;
pub use tree::{ComponentId, ComponentTree};
