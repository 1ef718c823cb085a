//! Logging and debugging facilities for the component model.
//!
//! This module provides:
//! - Target names for filtering the crate's `tracing` output
//! - Debug visualization for component trees
//! - A performance span guard for profiling
//!
//! # Tracing Integration
//!
//! The crate emits `trace!`/`debug!` events but never installs a subscriber.
//! To see them, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("component_model_core::monitor=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use component_model_core::logging::{ComponentTreeDebug, TreeFormatOptions};
//! use component_model_core::{Component, ComponentTree};
//!
//! #[derive(Clone)]
//! struct Panel;
//! impl Component for Panel {
//!     fn is_container(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let mut tree = ComponentTree::new();
//! let root = tree.insert_named(Panel, "main");
//! let side = tree.insert(Panel);
//! tree.add_component(root, side, Some("side"), None).unwrap();
//!
//! let debug = ComponentTreeDebug::with_options(TreeFormatOptions::minimal());
//! let output = debug.format_subtree(&tree, root).unwrap();
//! assert!(output.contains("main"));
//! assert!(output.contains("side"));
//! ```

use std::fmt::{self, Write as FmtWrite};

use crate::error::TreeResult;
use crate::tree::{ComponentId, ComponentTree};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "component_model_core";
    /// Tree structure target: registration, attach/detach, cloning.
    pub const TREE: &str = "component_model_core::tree";
    /// Lookup cache and monitor notifications.
    pub const MONITOR: &str = "component_model_core::monitor";
    /// Performance spans.
    pub const PERF: &str = "component_model::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show component IDs.
    pub show_ids: bool,
    /// Whether to show payload type names.
    pub show_types: bool,
    /// Whether to list monitored and cached ancestor keys.
    pub show_monitors: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_monitors: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_monitors: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_monitors: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing component trees.
#[derive(Debug, Clone, Default)]
pub struct ComponentTreeDebug {
    options: TreeFormatOptions,
}

impl ComponentTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every tree in the arena, one root after another.
    pub fn format_all(&self, tree: &ComponentTree) -> TreeResult<String> {
        let mut output = String::new();
        let roots: Vec<ComponentId> = tree.root_components().collect();
        // Writing into a String cannot fail.
        let _ = writeln!(output, "Component Tree ({} total components):", tree.component_count());

        if roots.is_empty() {
            output.push_str("  (empty)\n");
        } else {
            for root in roots {
                self.format_subtree_into(tree, root, 0, true, &mut output)?;
            }
        }
        Ok(output)
    }

    /// Format a subtree starting from a specific component.
    pub fn format_subtree(&self, tree: &ComponentTree, root: ComponentId) -> TreeResult<String> {
        let mut output = String::new();
        self.format_subtree_into(tree, root, 0, true, &mut output)?;
        Ok(output)
    }

    fn format_subtree_into(
        &self,
        tree: &ComponentTree,
        id: ComponentId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> TreeResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        let data = tree.data(id)?;
        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(data.name.as_deref().unwrap_or("(unnamed)"));
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        if self.options.show_types {
            let _ = write!(output, " ({})", data.kind.short_name());
        }
        output.push('\n');

        if self.options.show_monitors {
            let prefix = self.build_detail_prefix(depth);
            for (key, record) in data.monitors.iter() {
                let state = match &record.resolved {
                    Some(resolved) => format!("-> {:?} via '{}'", resolved.ancestor, resolved.path),
                    None => "-> none".to_string(),
                };
                let marker = if record.is_active() { "monitor" } else { "cached" };
                let _ = writeln!(output, "{prefix}  @{marker} {} {state}", key.describe());
            }
        }

        let children = tree.children(id)?;
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            self.format_subtree_into(tree, child, depth + 1, i + 1 == count, output)?;
        }
        Ok(())
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "- ", "- "),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix
    }

    /// Build the prefix for monitor lines.
    fn build_detail_prefix(&self, depth: usize) -> String {
        let branch = match self.options.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };
        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        prefix
    }

    /// Bind the visualizer to a tree for use with `{}` formatting.
    pub fn display<'a>(&'a self, tree: &'a ComponentTree) -> impl fmt::Display + 'a {
        DisplayTree { debug: self, tree }
    }
}

struct DisplayTree<'a> {
    debug: &'a ComponentTreeDebug,
    tree: &'a ComponentTree,
}

impl fmt::Display for DisplayTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.debug.format_all(self.tree) {
            Ok(output) => f.write_str(&output),
            Err(e) => write!(f, "Error formatting component tree: {e}"),
        }
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
