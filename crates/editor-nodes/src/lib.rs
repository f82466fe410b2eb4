//! Editor Nodes
//!
//! Built-in node type plugins for the node editor. Each plugin submits
//! itself through `inventory`, so linking this crate is enough for
//! `PluginManager::load_builtin_plugins` to find it.
//!
//! # Plugins
//!
//! - **calculator**: number sources, displays and arithmetic operators
//! - **text**: text sources and displays

pub mod calculator;
pub mod text;

pub use calculator::{CalculatorPlugin, MathOperation, NumberDisplay, NumberSource};
pub use text::{TextDisplay, TextPlugin, TextSource};
