//! Prelude module for the component model.
//!
//! ```ignore
//! use component_model::prelude::*;
//! ```
//!
//! This provides access to:
//! - The tree and its handles (`ComponentTree`, `ComponentId`)
//! - The payload trait and its derive (`Component`)
//! - Lookup keys and monitor callbacks (`AncestorKey`, `Kind`, `MonitorCallback`)
//! - Errors (`TreeError`, `TreeResult`)
//! - Index-style access (`ContainerAccess`, `ComponentKey`)

// ============================================================================
// Tree
// ============================================================================

pub use crate::{component_cast, Component, ComponentId, ComponentTree};

// ============================================================================
// Lookup and Monitoring
// ============================================================================

pub use crate::{AncestorKey, Kind, MonitorCallback};

// ============================================================================
// Errors
// ============================================================================

pub use crate::{TreeError, TreeResult};

// ============================================================================
// Index Access
// ============================================================================

pub use crate::{ComponentKey, ContainerAccess};
