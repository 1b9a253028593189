//! Route list factories.
//!
//! # Data Flow
//! ```text
//! RoutingConfig.resources ─┐
//! routes_dir/*.toml ───────┼→ ConfigRouteListFactory → RouteList
//! strict_prefix ───────────┘          ↑
//!                      CachedRouteListFactory
//!                        ↑ notify watcher on routes_dir (rebuild off the request path)
//! ```
//!
//! # Design Decisions
//! - Route files are plain TOML with `[[resources]]` tables
//! - Requests only read the cached list; file I/O happens at startup and on
//!   the watcher thread
//! - A rebuild is stored only when it succeeds, so a half-written route file
//!   keeps the previous routes serving
//! - Cached lists are swapped atomically; readers never block

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;

use crate::config::schema::{ResourceRouteConfig, RoutingConfig};
use crate::config::ConfigError;
use crate::routing::method::Method;
use crate::routing::node::RouteList;
use crate::routing::resource_route::ResourceRoute;
use crate::routing::strict::StrictRoute;

/// Source of route lists.
pub trait RouteListFactory: Send + Sync {
    /// Route list for `module`; `None` uses the factory's own module.
    fn create(&self, module: Option<&str>) -> Result<Arc<RouteList>, ConfigError>;
}

/// Contents of a route file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RouteFile {
    resources: Vec<ResourceRouteConfig>,
}

/// Build a resource route from its configuration.
pub fn build_resource_route(config: &ResourceRouteConfig) -> Result<ResourceRoute, ConfigError> {
    let mut route = ResourceRoute::new(&config.mask, config.presenter.clone())
        .map_err(|e| ConfigError::Route(format!("{}: {e}", config.mask)))?;
    for (name, action) in &config.actions {
        let method = Method::from_name(name).ok_or_else(|| {
            ConfigError::Route(format!("{}: unknown HTTP method '{name}'", config.mask))
        })?;
        route = route.action(method, action.clone());
    }
    Ok(route)
}

/// `*.toml` files under `dir`, recursively, sorted by path.
pub fn route_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Resource route definitions read from every route file under `dir`.
pub fn load_route_files(dir: &Path) -> Result<Vec<ResourceRouteConfig>, ConfigError> {
    let mut resources = Vec::new();
    for path in route_files(dir)? {
        let content = fs::read_to_string(&path)?;
        let file: RouteFile = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), routes = file.resources.len(), "Loaded route file");
        resources.extend(file.resources);
    }
    Ok(resources)
}

/// Routes from configuration: resource routes (inline, then route files),
/// then the strict route.
#[derive(Debug, Clone)]
pub struct ConfigRouteListFactory {
    routing: RoutingConfig,
}

impl ConfigRouteListFactory {
    pub fn new(routing: RoutingConfig) -> Self {
        Self { routing }
    }
}

impl RouteListFactory for ConfigRouteListFactory {
    fn create(&self, module: Option<&str>) -> Result<Arc<RouteList>, ConfigError> {
        let module = module.map(str::to_string).or_else(|| self.routing.module.clone());
        let mut list = match &module {
            Some(module) => RouteList::with_module(module.clone()),
            None => RouteList::new(),
        };

        let mut resources = self.routing.resources.clone();
        if let Some(dir) = &self.routing.routes_dir {
            resources.extend(load_route_files(Path::new(dir))?);
        }
        for config in &resources {
            list.add_resource(Arc::new(build_resource_route(config)?));
        }

        if let Some(prefix) = &self.routing.strict_prefix {
            list.add_route(Arc::new(StrictRoute::new(prefix.clone(), module.clone())));
        }

        tracing::info!(routes = list.len(), module = ?module, "Route list built");
        Ok(Arc::new(list))
    }
}

/// Routes read only from the route files under a directory.
#[derive(Debug, Clone)]
pub struct FileRouteListFactory {
    dir: PathBuf,
}

impl FileRouteListFactory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RouteListFactory for FileRouteListFactory {
    fn create(&self, module: Option<&str>) -> Result<Arc<RouteList>, ConfigError> {
        let mut list = match module {
            Some(module) => RouteList::with_module(module),
            None => RouteList::new(),
        };
        for config in load_route_files(&self.dir)? {
            list.add_resource(Arc::new(build_resource_route(&config)?));
        }
        Ok(Arc::new(list))
    }
}

#[derive(Debug)]
struct CachedList {
    module: Option<String>,
    list: Arc<RouteList>,
}

/// Inner factory plus the list it last built, shared with the watcher.
struct Shared<F> {
    inner: F,
    cache: ArcSwapOption<CachedList>,
}

impl<F: RouteListFactory> Shared<F> {
    fn build(&self, module: Option<&str>) -> Result<Arc<RouteList>, ConfigError> {
        let list = self.inner.create(module)?;
        self.cache.store(Some(Arc::new(CachedList {
            module: module.map(str::to_string),
            list: Arc::clone(&list),
        })));
        Ok(list)
    }

    fn reload(&self) -> bool {
        let module = self.cache.load_full().and_then(|cached| cached.module.clone());
        match self.build(module.as_deref()) {
            Ok(list) => {
                tracing::info!(routes = list.len(), "Route list reloaded");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload routes. Keeping current route list.");
                false
            }
        }
    }
}

/// Caches the list built by an inner factory.
///
/// `create` serves the cached list without touching the filesystem. With
/// [`watch`](Self::watch), changes to route files rebuild the list on the
/// watcher thread; a failed rebuild leaves the previous list in place.
pub struct CachedRouteListFactory<F> {
    shared: Arc<Shared<F>>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl<F: RouteListFactory + 'static> CachedRouteListFactory<F> {
    pub fn new(inner: F) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner,
                cache: ArcSwapOption::empty(),
            }),
            watcher: Mutex::new(None),
        }
    }

    /// Rebuild the cached list now. Returns `false`, keeping the current
    /// list, when the inner factory fails.
    pub fn reload(&self) -> bool {
        self.shared.reload()
    }

    /// Reload whenever a `*.toml` file under `dir` is created, modified or
    /// removed. Replaces any previous watch.
    pub fn watch(&self, dir: &Path) -> Result<(), ConfigError> {
        let shared = Arc::clone(&self.shared);
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify()
                        || event.kind.is_create()
                        || event.kind.is_remove();
                    let touches_routes = event
                        .paths
                        .iter()
                        .any(|path| path.extension().is_some_and(|ext| ext == "toml"));
                    if relevant && touches_routes {
                        tracing::info!(paths = ?event.paths, "Route file change detected, reloading");
                        shared.reload();
                    }
                }
                Err(e) => tracing::error!(error = %e, "Route watch error"),
            },
            Config::default(),
        )?;
        watcher.watch(dir, RecursiveMode::Recursive)?;

        let mut slot = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(watcher);
        tracing::info!(path = %dir.display(), "Route watcher started");
        Ok(())
    }
}

impl<F: RouteListFactory + 'static> RouteListFactory for CachedRouteListFactory<F> {
    fn create(&self, module: Option<&str>) -> Result<Arc<RouteList>, ConfigError> {
        if let Some(cached) = self.shared.cache.load_full() {
            if cached.module.as_deref() == module {
                return Ok(Arc::clone(&cached.list));
            }
        }
        // First use, or a different module than the one cached.
        self.shared.build(module)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::http::request::HttpRequest;
    use url::Url;

    fn request(method: &str, path: &str) -> HttpRequest {
        HttpRequest::new(method, Url::parse(&format!("http://localhost{path}")).unwrap())
    }

    fn items_config() -> ResourceRouteConfig {
        ResourceRouteConfig {
            mask: "items/<id>".into(),
            presenter: "Items".into(),
            actions: BTreeMap::from([("GET".to_string(), "read".to_string())]),
        }
    }

    #[test]
    fn test_config_factory_orders_resources_before_strict() {
        let routing = RoutingConfig {
            module: Some("Api".into()),
            strict_prefix: Some("items".into()),
            resources: vec![items_config()],
            ..Default::default()
        };
        let list = ConfigRouteListFactory::new(routing).create(None).unwrap();
        assert_eq!(list.len(), 2);

        let matched = list.match_request(&request("GET", "/items/1")).unwrap().unwrap();
        assert_eq!(matched.presenter_name(), "Api:Items");
        assert_eq!(matched.action, "read");

        let strict = list.match_request(&request("POST", "/items/orders")).unwrap().unwrap();
        assert_eq!(strict.action, "create");
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let mut config = items_config();
        config.actions.insert("FETCH".into(), "read".into());
        assert!(matches!(build_resource_route(&config), Err(ConfigError::Route(_))));
    }

    #[test]
    fn test_file_factory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("users.toml"),
            "[[resources]]\nmask = \"users/<id>\"\npresenter = \"Users\"\nactions = { GET = \"read\" }\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let list = FileRouteListFactory::new(dir.path()).create(Some("Api")).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.module(), Some("Api"));
    }

    struct Counting {
        builds: AtomicUsize,
    }

    impl RouteListFactory for Counting {
        fn create(&self, _module: Option<&str>) -> Result<Arc<RouteList>, ConfigError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(RouteList::new()))
        }
    }

    const USERS_ROUTES: &str =
        "[[resources]]\nmask = \"users/<id>\"\npresenter = \"Users\"\nactions = { GET = \"read\" }\n";

    #[test]
    fn test_cache_serves_without_rebuilding() {
        let cached = CachedRouteListFactory::new(Counting {
            builds: AtomicUsize::new(0),
        });

        let first = cached.create(None).unwrap();
        let second = cached.create(None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cached.shared.inner.builds.load(Ordering::SeqCst), 1);

        cached.create(Some("Admin")).unwrap();
        assert_eq!(cached.shared.inner.builds.load(Ordering::SeqCst), 2);

        assert!(cached.reload());
        cached.create(Some("Admin")).unwrap();
        assert_eq!(cached.shared.inner.builds.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_broken_route_file_keeps_current_routes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.toml");
        fs::write(&path, USERS_ROUTES).unwrap();

        let cached = CachedRouteListFactory::new(FileRouteListFactory::new(dir.path()));
        let before = cached.create(None).unwrap();
        assert!(before.match_request(&request("GET", "/users/1")).unwrap().is_some());

        fs::write(&path, "[[resources]]\nmask = \n").unwrap();
        assert!(!cached.reload());

        let after = cached.create(None).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(after.match_request(&request("GET", "/users/1")).unwrap().is_some());

        fs::write(&path, USERS_ROUTES.replace("users/", "people/")).unwrap();
        assert!(cached.reload());
        let fixed = cached.create(None).unwrap();
        assert!(fixed.match_request(&request("GET", "/people/1")).unwrap().is_some());
        assert!(fixed.match_request(&request("GET", "/users/1")).unwrap().is_none());
    }

    #[test]
    fn test_watcher_picks_up_new_route_file() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedRouteListFactory::new(FileRouteListFactory::new(dir.path()));
        assert!(cached.create(None).unwrap().is_empty());
        cached.watch(dir.path()).unwrap();

        fs::write(dir.path().join("users.toml"), USERS_ROUTES).unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while cached.create(None).unwrap().is_empty() {
            assert!(std::time::Instant::now() < deadline, "route file change not observed");
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        assert_eq!(cached.create(None).unwrap().len(), 1);
    }

    #[test]
    fn test_watch_missing_dir_fails() {
        let cached = CachedRouteListFactory::new(Counting {
            builds: AtomicUsize::new(0),
        });
        assert!(matches!(
            cached.watch(Path::new("/nonexistent/routes")),
            Err(ConfigError::Watch(_))
        ));
    }
}
