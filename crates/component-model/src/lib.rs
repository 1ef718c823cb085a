//! Component model - a tree of named components.
//!
//! This is the umbrella crate that re-exports the public API of the engine
//! and the derive macro, plus index-style child access.
//!
//! # Example
//!
//! ```
//! use component_model::prelude::*;
//!
//! #[derive(Clone, Component)]
//! #[component(container)]
//! struct Form;
//!
//! #[derive(Clone, Component)]
//! struct TextInput;
//!
//! let mut tree = ComponentTree::new();
//! let form = tree.insert(Form);
//! let email = tree.insert(TextInput);
//!
//! let mut access = ContainerAccess::new(&mut tree, form);
//! access.set("email", email).unwrap();
//! assert!(access.exists("email").unwrap());
//! assert_eq!(access.get("email").unwrap(), email);
//! ```

pub use component_model_core::*;
pub use component_model_macros::*;

mod access;
pub mod prelude;

pub use access::{ComponentKey, ContainerAccess};
