//! Node type plugins
//!
//! A plugin is a named bundle of node types. Built-in plugins are collected
//! at link time with `inventory`:
//!
//! ```ignore
//! inventory::submit!(node_editor::PluginFn(CalculatorPlugin::create));
//! ```
//!
//! [`PluginManager`] tracks which plugin registered which node types so that
//! unloading a plugin removes exactly its types from the registry. A type
//! that is already registered keeps its first owner. Nodes already in a
//! graph keep working after their type is unloaded; only new ones can no
//! longer be created.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::registry::NodeRegistry;

/// A bundle of node types
pub trait NodePlugin: Send + Sync {
    /// Unique plugin name
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "0.0.0"
    }

    /// One-line description for plugin lists
    fn describe(&self) -> &str {
        ""
    }

    fn register_node_types(&self, registry: &mut NodeRegistry);
}

/// Link-time registration of a built-in plugin
pub struct PluginFn(pub fn() -> Arc<dyn NodePlugin>);

inventory::collect!(PluginFn);

/// Summary of a loaded plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Node types the plugin owns, sorted
    pub node_types: Vec<String>,
}

struct LoadedPlugin {
    plugin: Arc<dyn NodePlugin>,
    info: PluginInfo,
}

/// Loads and unloads plugins into a [`NodeRegistry`]
#[derive(Default)]
pub struct PluginManager {
    loaded: BTreeMap<String, LoadedPlugin>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one plugin
    ///
    /// Loading a name that is already loaded changes nothing and returns the
    /// info of the plugin already in place. Types the registry already holds
    /// are skipped and stay with their current owner.
    pub fn load_plugin(
        &mut self,
        plugin: Arc<dyn NodePlugin>,
        registry: &mut NodeRegistry,
    ) -> PluginInfo {
        if let Some(existing) = self.loaded.get(plugin.name()) {
            log::debug!("Plugin '{}' is already loaded", plugin.name());
            return existing.info.clone();
        }

        let mut own = NodeRegistry::new();
        plugin.register_node_types(&mut own);

        let taken: Vec<String> = own
            .node_types()
            .into_iter()
            .filter(|node_type| registry.has_node_type(node_type))
            .map(String::from)
            .collect();
        for node_type in &taken {
            log::warn!(
                "Plugin '{}' skips node type '{}', which is already registered",
                plugin.name(),
                node_type
            );
            own.unregister(node_type);
        }

        let info = PluginInfo {
            name: plugin.name().to_string(),
            version: plugin.version().to_string(),
            description: plugin.describe().to_string(),
            node_types: own.node_types().into_iter().map(String::from).collect(),
        };
        registry.merge(own);

        log::info!(
            "Loaded plugin '{}' {} ({} node types)",
            info.name,
            info.version,
            info.node_types.len()
        );
        self.loaded.insert(
            info.name.clone(),
            LoadedPlugin {
                plugin,
                info: info.clone(),
            },
        );
        info
    }

    pub fn load_plugins(
        &mut self,
        plugins: impl IntoIterator<Item = Arc<dyn NodePlugin>>,
        registry: &mut NodeRegistry,
    ) -> Vec<PluginInfo> {
        plugins
            .into_iter()
            .map(|plugin| self.load_plugin(plugin, registry))
            .collect()
    }

    /// Load every plugin submitted through [`PluginFn`]
    ///
    /// Returns how many were newly loaded.
    pub fn load_builtin_plugins(&mut self, registry: &mut NodeRegistry) -> usize {
        let before = self.loaded.len();
        for entry in inventory::iter::<PluginFn> {
            self.load_plugin((entry.0)(), registry);
        }
        self.loaded.len() - before
    }

    /// Unload a plugin and remove the node types it registered
    pub fn unload_plugin(&mut self, name: &str, registry: &mut NodeRegistry) -> bool {
        let Some(loaded) = self.loaded.remove(name) else {
            return false;
        };
        for node_type in &loaded.info.node_types {
            registry.unregister(node_type);
        }
        log::info!("Unloaded plugin '{}'", name);
        true
    }

    /// Unload every plugin, returning how many were loaded
    pub fn unload_plugins(&mut self, registry: &mut NodeRegistry) -> usize {
        let names: Vec<String> = self.loaded.keys().cloned().collect();
        names
            .iter()
            .filter(|name| self.unload_plugin(name.as_str(), registry))
            .count()
    }

    /// Loaded plugins, sorted by name
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.loaded.values().map(|l| l.info.clone()).collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    pub fn plugin(&self, name: &str) -> Option<Arc<dyn NodePlugin>> {
        self.loaded.get(name).map(|l| Arc::clone(&l.plugin))
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.loaded.keys().collect::<Vec<_>>())
            .finish()
    }
}
