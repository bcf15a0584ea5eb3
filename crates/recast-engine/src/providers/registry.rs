//! Transformer discovery and lookup
//!
//! Transformers come from three places, in this order: the plugins built into this crate, plugins
//! other crates submit with `inventory::submit!`, and recipe files in a configured directory.
//! Plugins are sorted by priority, then name. A transformer that fails to initialize is recorded
//! and skipped; it never stops the others from loading.

use super::{RecipeTransformer, Transformer, TransformerMetadata};
use crate::error::{EngineError, Result};
use crate::patterns::{PathlibRules, PatternRewriter, PrintToLoggingRules};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A transformer constructor registered at link time
///
/// ```ignore
/// inventory::submit! {
///     TransformerPlugin::new("my-rules", || Ok(Box::new(MyTransformer::default())))
/// }
/// ```
pub struct TransformerPlugin {
    /// Name the transformer must report from `describe()`
    pub name: &'static str,
    /// Discovery order (lower = earlier, default = 100)
    pub priority: u32,
    pub init: fn() -> Result<Box<dyn Transformer>>,
}

impl TransformerPlugin {
    pub const fn new(name: &'static str, init: fn() -> Result<Box<dyn Transformer>>) -> Self {
        Self {
            name,
            priority: 100,
            init,
        }
    }

    pub const fn with_priority(
        name: &'static str,
        init: fn() -> Result<Box<dyn Transformer>>,
        priority: u32,
    ) -> Self {
        Self {
            name,
            priority,
            init,
        }
    }
}

inventory::collect!(TransformerPlugin);

fn init_pathlib() -> Result<Box<dyn Transformer>> {
    Ok(Box::new(PatternRewriter::new(PathlibRules)))
}

fn init_print_to_logging() -> Result<Box<dyn Transformer>> {
    Ok(Box::new(PatternRewriter::new(PrintToLoggingRules)))
}

static BUILTIN_PLUGINS: [TransformerPlugin; 2] = [
    TransformerPlugin::with_priority("pathlib", init_pathlib, 10),
    TransformerPlugin::with_priority("print-to-logging", init_print_to_logging, 20),
];

/// Plugins shipped with this crate
pub fn builtin_plugins() -> &'static [TransformerPlugin] {
    &BUILTIN_PLUGINS
}

/// A transformer that was excluded during discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginLoadFailure {
    pub name: String,
    pub message: String,
}

impl PluginLoadFailure {
    pub fn to_error(&self) -> EngineError {
        EngineError::PluginLoad {
            name: self.name.clone(),
            message: self.message.clone(),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    order: Vec<String>,
    transformers: HashMap<String, Arc<dyn Transformer>>,
    failures: Vec<PluginLoadFailure>,
}

/// Transformers available by name
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl TransformerRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in plugins plus every plugin submitted through `inventory`
    pub fn discover() -> Self {
        Self::from_plugins(builtin_plugins().iter().chain(inventory::iter::<TransformerPlugin>()))
    }

    /// Load an explicit set of plugins
    pub fn from_plugins<'a>(plugins: impl IntoIterator<Item = &'a TransformerPlugin>) -> Self {
        let registry = Self::new();
        let mut plugins: Vec<&TransformerPlugin> = plugins.into_iter().collect();
        plugins.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(b.name)));

        for plugin in plugins {
            registry.load_plugin(plugin);
        }
        info!(
            loaded = registry.len(),
            failed = registry.failures().len(),
            "transformer discovery finished"
        );
        registry
    }

    /// Register every recipe file (`.json`, `.yaml`, `.yml`) in `dir`, in file name order
    ///
    /// Returns how many were registered. Recipes that fail to load are recorded as failures.
    pub fn load_recipe_dir(&self, dir: &Path) -> Result<usize> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|ext| ext.to_str()),
                        Some("json" | "yaml" | "yml")
                    )
            })
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let registered = RecipeTransformer::from_file(&path)
                .and_then(|transformer| self.register(Arc::new(transformer)));
            match registered {
                Ok(()) => loaded += 1,
                Err(err) => self.record_failure(&name, err.to_string()),
            }
        }
        debug!(dir = %dir.display(), loaded, "loaded recipe directory");
        Ok(loaded)
    }

    /// Register a transformer under the name it reports
    pub fn register(&self, transformer: Arc<dyn Transformer>) -> Result<()> {
        let metadata = transformer.describe();
        self.insert(metadata, transformer)
    }

    fn insert(&self, metadata: TransformerMetadata, transformer: Arc<dyn Transformer>) -> Result<()> {
        if let Some(problem) = metadata.problem() {
            return Err(EngineError::PluginLoad {
                name: metadata.name,
                message: problem,
            });
        }

        let mut state = self.state();
        if state.transformers.contains_key(&metadata.name) {
            return Err(EngineError::PluginLoad {
                name: metadata.name,
                message: "a transformer with this name is already registered".to_string(),
            });
        }
        debug!(name = %metadata.name, version = %metadata.version, "registered transformer");
        state.order.push(metadata.name.clone());
        state.transformers.insert(metadata.name, transformer);
        Ok(())
    }

    fn load_plugin(&self, plugin: &TransformerPlugin) {
        let transformer: Arc<dyn Transformer> = match catch_unwind(plugin.init) {
            Ok(Ok(transformer)) => Arc::from(transformer),
            Ok(Err(err)) => return self.record_failure(plugin.name, err.to_string()),
            Err(payload) => {
                let message = format!("initializer panicked: {}", panic_message(payload.as_ref()));
                return self.record_failure(plugin.name, message);
            }
        };

        let metadata = match catch_unwind(AssertUnwindSafe(|| transformer.describe())) {
            Ok(metadata) => metadata,
            Err(payload) => {
                let message = format!("describe() panicked: {}", panic_message(payload.as_ref()));
                return self.record_failure(plugin.name, message);
            }
        };
        if metadata.name != plugin.name {
            return self.record_failure(
                plugin.name,
                format!("plugin reports itself as `{}`", metadata.name),
            );
        }
        if let Err(err) = self.insert(metadata, transformer) {
            self.record_failure(plugin.name, err.to_string());
        }
    }

    fn record_failure(&self, name: &str, message: String) {
        warn!(transformer = name, "excluding transformer: {}", message);
        self.state().failures.push(PluginLoadFailure {
            name: name.to_string(),
            message,
        });
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registered names in discovery order
    pub fn list(&self) -> Vec<String> {
        self.state().order.clone()
    }

    /// Look a transformer up by name; a miss is not an error
    pub fn get(&self, name: &str) -> Option<Arc<dyn Transformer>> {
        self.state().transformers.get(name).cloned()
    }

    /// Metadata of every registered transformer, in discovery order
    pub fn metadata(&self) -> Vec<TransformerMetadata> {
        let state = self.state();
        state
            .order
            .iter()
            .filter_map(|name| state.transformers.get(name))
            .map(|transformer| transformer.describe())
            .collect()
    }

    pub fn failures(&self) -> Vec<PluginLoadFailure> {
        self.state().failures.clone()
    }

    pub fn len(&self) -> usize {
        self.state().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Rewrite;
    use recast_parsers::SyntaxTree;

    fn failing_init() -> Result<Box<dyn Transformer>> {
        Err(EngineError::Other("missing model file".to_string()))
    }

    struct Nameless;

    impl Transformer for Nameless {
        fn describe(&self) -> TransformerMetadata {
            panic!("metadata not configured")
        }

        fn can_handle(&self, _source: &str) -> bool {
            false
        }

        fn rewrite(&self, tree: SyntaxTree) -> Result<Rewrite> {
            Ok(Rewrite::unchanged(tree))
        }
    }

    fn nameless_init() -> Result<Box<dyn Transformer>> {
        Ok(Box::new(Nameless))
    }

    #[test]
    fn test_discover_includes_builtins_in_priority_order() {
        let registry = TransformerRegistry::discover();
        let names = registry.list();
        assert_eq!(&names[..2], &["pathlib".to_string(), "print-to-logging".to_string()]);
        assert!(registry.get("pathlib").is_some());
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_failed_plugin_is_recorded_not_fatal() {
        let plugins = [
            TransformerPlugin::new("broken", failing_init),
            TransformerPlugin::with_priority("pathlib", init_pathlib, 10),
        ];
        let registry = TransformerRegistry::from_plugins(plugins.iter());
        assert_eq!(registry.list(), vec!["pathlib".to_string()]);
        let failures = registry.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "broken");
        assert!(failures[0].message.contains("missing model file"));
    }

    #[test]
    fn test_panicking_describe_is_recorded_not_fatal() {
        let plugins = [
            TransformerPlugin::with_priority("nameless", nameless_init, 1),
            TransformerPlugin::with_priority("pathlib", init_pathlib, 10),
        ];
        let registry = TransformerRegistry::from_plugins(plugins.iter());
        assert_eq!(registry.list(), vec!["pathlib".to_string()]);
        let failures = registry.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "nameless");
        assert!(failures[0].message.contains("metadata not configured"));
    }

    #[test]
    fn test_name_mismatch_is_rejected() {
        let plugins = [TransformerPlugin::new("paths", init_pathlib)];
        let registry = TransformerRegistry::from_plugins(plugins.iter());
        assert!(registry.is_empty());
        assert!(registry.failures()[0].message.contains("`pathlib`"));
    }

    #[test]
    fn test_duplicate_name_keeps_first() -> Result<()> {
        let registry = TransformerRegistry::from_plugins(builtin_plugins());
        let duplicate: Arc<dyn Transformer> = Arc::new(PatternRewriter::new(PathlibRules));
        assert!(matches!(
            registry.register(duplicate),
            Err(EngineError::PluginLoad { .. })
        ));
        assert_eq!(registry.len(), 2);
        Ok(())
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42), "unknown panic");
    }
}
