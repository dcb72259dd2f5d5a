use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::Router;
use plugin_api::{Plugin, PluginError};
use thiserror::Error;

use super::PLUGINS;

#[derive(Debug, Error, PartialEq)]
pub enum PluginContainerError {
    #[error("found duplicate entries in plugin registry")]
    DuplicateEntry,
    #[error("plugin container is unloaded")]
    Unloaded,
    #[error("{0:?}")]
    PluginErrorMap(HashMap<String, PluginError>),
}

pub struct PluginContainer<'a> {
    loaded: bool,
    collected_routes: Vec<Router>,
    plugins: &'a Vec<Arc<Mutex<dyn Plugin + 'static>>>,
    mounted_plugins: Vec<Arc<Mutex<dyn Plugin + 'static>>>,
}

impl Default for PluginContainer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginContainer<'_> {
    /// Instantiate an object aware of all statically registered plugins
    pub fn new() -> Self {
        Self {
            loaded: false,
            collected_routes: vec![],
            plugins: &*PLUGINS,
            mounted_plugins: vec![],
        }
    }

    /// Search loaded plugin based on name string
    pub fn find_plugin(&self, name: &str) -> Option<Arc<Mutex<dyn Plugin + 'static>>> {
        self.plugins
            .iter()
            .find(|plugin| name == plugin.lock().unwrap().name())
            .cloned()
    }

    /// Load referenced plugins
    ///
    /// This entails mounting them and merging their routes internally (only
    /// upon successful initialization). An error is returned if plugins
    /// bearing the same name are found. Also, all plugins failing to be
    /// initialized are returned in a map with respectively raised errors.
    pub fn load(&mut self) -> Result<(), PluginContainerError> {
        tracing::debug!("loading plugin container");

        // Checking for duplicates before mounting plugins
        let mut seen_names = HashSet::new();
        for plugin in self.plugins.iter() {
            let name = plugin.lock().unwrap().name().to_string();
            if !seen_names.insert(name.clone()) {
                tracing::error!("found duplicate entry in plugin registry: {name}");
                return Err(PluginContainerError::DuplicateEntry);
            }
        }

        // Reset collection of routes and mounted plugins
        self.collected_routes.clear();
        self.mounted_plugins.clear();

        // Mount plugins and collect routes on successful status
        let errors: HashMap<_, _> = self
            .plugins
            .iter()
            .filter_map(|plugin| {
                let mut entry = plugin.lock().unwrap();
                match entry.mount() {
                    Ok(_) => {
                        tracing::info!("mounted plugin {}", entry.name());
                        match entry.routes() {
                            Ok(routes) => {
                                self.collected_routes.push(routes);
                                self.mounted_plugins.push(plugin.clone());
                                None
                            }
                            Err(err) => Some((entry.name().to_string(), err)),
                        }
                    }
                    Err(err) => {
                        tracing::error!("error mounting plugin {}", entry.name());
                        Some((entry.name().to_string(), err))
                    }
                }
            })
            .collect();

        // Flag as loaded
        self.loaded = true;

        // Return state of completion
        if errors.is_empty() {
            tracing::debug!("plugin container loaded");
            Ok(())
        } else {
            Err(PluginContainerError::PluginErrorMap(errors))
        }
    }

    /// Unload mounted plugins, reverting their initialization
    pub fn unload(&mut self) -> Result<(), PluginContainerError> {
        let errors: HashMap<_, _> = self
            .mounted_plugins
            .iter()
            .filter_map(|plugin| {
                let entry = plugin.lock().unwrap();
                match entry.unmount() {
                    Ok(_) => {
                        tracing::info!("unmounted plugin {}", entry.name());
                        None
                    }
                    Err(err) => Some((entry.name().to_string(), err)),
                }
            })
            .collect();

        self.loaded = false;
        self.mounted_plugins.clear();
        self.collected_routes.clear();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PluginContainerError::PluginErrorMap(errors))
        }
    }

    /// Merge collected routes from all plugins successfully initialized.
    pub fn routes(&self) -> Result<Router, PluginContainerError> {
        if self.loaded {
            Ok(self
                .collected_routes
                .iter()
                .fold(Router::new(), |acc, e| acc.merge(e.clone())))
        } else {
            Err(PluginContainerError::Unloaded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    struct FirstPlugin;
    impl Plugin for FirstPlugin {
        fn name(&self) -> &'static str {
            "first"
        }

        fn mount(&mut self) -> Result<(), PluginError> {
            Ok(())
        }

        fn unmount(&self) -> Result<(), PluginError> {
            Ok(())
        }

        fn routes(&self) -> Result<Router, PluginError> {
            Ok(Router::new().route("/first", get(|| async {})))
        }
    }

    struct SecondPlugin;
    impl Plugin for SecondPlugin {
        fn name(&self) -> &'static str {
            "second"
        }

        fn mount(&mut self) -> Result<(), PluginError> {
            Ok(())
        }

        fn unmount(&self) -> Result<(), PluginError> {
            Ok(())
        }

        fn routes(&self) -> Result<Router, PluginError> {
            Ok(Router::new().route("/second", get(|| async {})))
        }
    }

    struct SecondAgainPlugin;
    impl Plugin for SecondAgainPlugin {
        fn name(&self) -> &'static str {
            "second"
        }

        fn mount(&mut self) -> Result<(), PluginError> {
            Ok(())
        }

        fn unmount(&self) -> Result<(), PluginError> {
            Ok(())
        }

        fn routes(&self) -> Result<Router, PluginError> {
            Ok(Router::new().route("/second", get(|| async {})))
        }
    }

    struct FaultyPlugin;
    impl Plugin for FaultyPlugin {
        fn name(&self) -> &'static str {
            "faulty"
        }

        fn mount(&mut self) -> Result<(), PluginError> {
            Err(PluginError::InitError("init failed".to_owned()))
        }

        fn unmount(&self) -> Result<(), PluginError> {
            Ok(())
        }

        fn routes(&self) -> Result<Router, PluginError> {
            Ok(Router::new().route("/faulty", get(|| async {})))
        }
    }

    fn container_with(
        plugins: &'static Vec<Arc<Mutex<dyn Plugin + 'static>>>,
    ) -> PluginContainer<'static> {
        PluginContainer {
            loaded: false,
            collected_routes: vec![],
            plugins,
            mounted_plugins: vec![],
        }
    }

    lazy_static::lazy_static! {
        static ref WORKING_PLUGINS: Vec<Arc<Mutex<dyn Plugin + 'static>>> = vec![
            Arc::new(Mutex::new(FirstPlugin {})),
            Arc::new(Mutex::new(SecondPlugin {})),
        ];

        static ref DUPLICATE_PLUGINS: Vec<Arc<Mutex<dyn Plugin + 'static>>> = vec![
            Arc::new(Mutex::new(SecondPlugin {})),
            Arc::new(Mutex::new(SecondAgainPlugin {})),
        ];

        static ref FAULTY_PLUGINS: Vec<Arc<Mutex<dyn Plugin + 'static>>> = vec![
            Arc::new(Mutex::new(FirstPlugin {})),
            Arc::new(Mutex::new(FaultyPlugin {})),
        ];
    }

    #[test]
    fn test_loading() {
        let mut container = container_with(&WORKING_PLUGINS);

        assert!(container.load().is_ok());
        assert!(container.routes().is_ok());

        assert!(container.find_plugin("first").is_some());
        assert!(container.find_plugin("second").is_some());
        assert!(container.find_plugin("non-existent").is_none());

        assert_eq!(container.collected_routes.len(), 2);
    }

    #[test]
    fn test_double_loading() {
        let mut container = container_with(&WORKING_PLUGINS);

        assert!(container.load().is_ok());
        assert!(container.load().is_ok());

        assert_eq!(container.collected_routes.len(), 2);
    }

    #[test]
    fn test_unloading() {
        let mut container = container_with(&WORKING_PLUGINS);

        assert!(container.load().is_ok());
        assert!(container.unload().is_ok());

        // Routes are gone after unloading.
        assert_eq!(
            container.routes().unwrap_err(),
            PluginContainerError::Unloaded
        );
    }

    #[test]
    fn test_loading_with_duplicates() {
        let mut container = container_with(&DUPLICATE_PLUGINS);

        assert_eq!(
            container.load().unwrap_err(),
            PluginContainerError::DuplicateEntry
        );
    }

    #[test]
    fn test_loading_with_failing_plugin() {
        let mut container = container_with(&FAULTY_PLUGINS);

        let err = container.load().unwrap_err();

        assert_eq!(
            err,
            PluginContainerError::PluginErrorMap(
                [(
                    "faulty".to_string(),
                    PluginError::InitError("init failed".to_owned())
                )]
                .into_iter()
                .collect()
            )
        );

        assert_eq!(container.collected_routes.len(), 1);
    }

    #[test]
    fn test_route_extraction_without_loading() {
        let container = container_with(&WORKING_PLUGINS);

        assert_eq!(
            container.routes().unwrap_err(),
            PluginContainerError::Unloaded
        );
    }
}
