//! Resource presenters: the application code behind routed requests.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{RestError, RestResult};
use crate::resource::Resource;
use crate::routing::router::AppRequest;
use crate::validation::Input;

/// Handles the actions of one presenter.
pub trait ResourcePresenter: Send + Sync {
    /// Declare validation rules for `request.action` on `input`.
    ///
    /// Runs before [`handle`](Self::handle); a failing rule turns the request
    /// into a 422 response and `handle` is not called.
    fn validate(&self, _request: &AppRequest, _input: &mut Input) {}

    fn handle(&self, request: &AppRequest, input: &Input) -> RestResult<Resource>;
}

/// Presenters by name, with an optional fallback for unknown names.
#[derive(Clone, Default)]
pub struct PresenterRegistry {
    presenters: HashMap<String, Arc<dyn ResourcePresenter>>,
    fallback: Option<Arc<dyn ResourcePresenter>>,
}

impl PresenterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `presenter` under `name` (`Presenter` or `Module:Presenter`).
    /// Lookup is case-insensitive.
    pub fn register(&mut self, name: &str, presenter: Arc<dyn ResourcePresenter>) -> &mut Self {
        self.presenters.insert(name.to_ascii_lowercase(), presenter);
        self
    }

    pub fn with_fallback(mut self, presenter: Arc<dyn ResourcePresenter>) -> Self {
        self.fallback = Some(presenter);
        self
    }

    /// Presenter for `request`: by qualified name, then bare name, then the
    /// fallback. A miss is a 404.
    pub fn get(&self, request: &AppRequest) -> RestResult<Arc<dyn ResourcePresenter>> {
        let qualified = request.presenter_name().to_ascii_lowercase();
        let bare = request.presenter.to_ascii_lowercase();

        self.presenters
            .get(&qualified)
            .or_else(|| self.presenters.get(&bare))
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                RestError::not_found(format!(
                    "Presenter '{}' not found",
                    request.presenter_name()
                ))
            })
    }

    pub fn len(&self) -> usize {
        self.presenters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presenters.is_empty()
    }
}

impl std::fmt::Debug for PresenterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.presenters.keys().collect();
        names.sort();
        f.debug_struct("PresenterRegistry")
            .field("presenters", &names)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Describes the routed request back to the client.
///
/// Useful as a fallback while presenters are being wired up, and for
/// checking route configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoPresenter;

impl ResourcePresenter for EchoPresenter {
    fn handle(&self, request: &AppRequest, input: &Input) -> RestResult<Resource> {
        let mut resource = Resource::new();
        resource.set("presenter", request.presenter_name());
        resource.set("action", request.action.clone());
        resource.set("method", request.method.clone());
        resource.set("params", Value::Object(request.params.clone()));
        resource.set("input", Value::Object(input.data().clone()));
        resource.set("files", request.files.clone());
        Ok(resource)
    }
}
