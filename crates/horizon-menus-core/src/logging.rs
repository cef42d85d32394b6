//! Logging and debugging facilities for Horizon Menus.
//!
//! This module provides:
//! - Target names for filtering `tracing` output by subsystem
//! - Debug visualization for open menu chains
//!
//! # Tracing Integration
//!
//! Horizon Menus uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_menus=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Use [`ChainDebug`] to render a parent/child chain of menus:
//!
//! ```
//! use horizon_menus_core::logging::{ChainDebug, ChainNode};
//!
//! let nodes = vec![
//!     ChainNode::new("Menu").with_detail("active=10"),
//!     ChainNode::new("Menu").with_detail("active=none"),
//! ];
//! let text = ChainDebug::new().format(&nodes);
//! assert_eq!(text.lines().count(), 2);
//! ```

use std::fmt::Write as FmtWrite;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_menus_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "horizon_menus_core::timer";
    /// Popup menu state machine target.
    pub const MENU: &str = "horizon_menus::menu";
    /// Menu bar target.
    pub const MENU_BAR: &str = "horizon_menus::menu_bar";
    /// Arena, update pass and input routing target.
    pub const HOST: &str = "horizon_menus::host";
    /// Keyboard and mouse handling target.
    pub const INPUT: &str = "horizon_menus::input";
}

/// One level of a menu chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainNode {
    /// Short name of the node.
    pub label: String,
    /// Optional extra state, shown in brackets.
    pub detail: Option<String>,
}

impl ChainNode {
    /// Create a node with no detail.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    /// Attach detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Formats a root-to-leaf chain, each node nested under the previous one.
#[derive(Debug, Clone, Copy)]
pub struct ChainDebug {
    indent_size: usize,
}

impl Default for ChainDebug {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainDebug {
    /// Create a formatter with a two-column indent.
    pub fn new() -> Self {
        Self { indent_size: 2 }
    }

    /// Format `nodes`, the first being the root.
    pub fn format(&self, nodes: &[ChainNode]) -> String {
        let mut output = String::new();
        for (depth, node) in nodes.iter().enumerate() {
            if depth > 0 {
                let pad = (depth - 1) * (self.indent_size + 2);
                output.push_str(&" ".repeat(pad));
                output.push_str("\u{2514}\u{2500}\u{2500} ");
            }
            let _ = writeln!(output, "{}", Self::node_text(node));
        }
        output
    }

    fn node_text(node: &ChainNode) -> String {
        match &node.detail {
            Some(detail) => format!("{} [{}]", node.label, detail),
            None => node.label.clone(),
        }
    }
}
