//! Methods available at a URL, for `OPTIONS` responses and `Allow` headers.

use url::Url;

use crate::http::request::HttpRequest;
use crate::routing::method::Method;
use crate::routing::node::{RouteList, RouterNode};
use crate::routing::router::ResourceRouter;

#[derive(Debug, Clone)]
pub struct MethodOptions {
    routes: RouteList,
}

impl MethodOptions {
    pub fn new(routes: RouteList) -> Self {
        Self { routes }
    }

    /// Method names accepted at `url`.
    ///
    /// Within one list the first resource route that accepts the URL wins
    /// and its full method set is returned. Results of nested lists are
    /// concatenated in walk order, duplicates included.
    pub fn get_options(&self, url: &Url) -> Vec<String> {
        check_available_methods(&self.routes, url)
    }
}

fn check_available_methods(list: &RouteList, url: &Url) -> Vec<String> {
    let mut methods = Vec::new();
    for node in list.nodes() {
        match node {
            RouterNode::Resource(route) => {
                if let Some(names) = accepting_methods(route.as_ref(), url) {
                    return names;
                }
            }
            RouterNode::List(nested) => methods.extend(check_available_methods(nested, url)),
            RouterNode::Route(_) => {}
        }
    }
    methods
}

/// The route's method names when a request with its first declared method
/// matches `url`.
fn accepting_methods(route: &dyn ResourceRouter, url: &Url) -> Option<Vec<String>> {
    let method = Method::ALL.into_iter().find(|m| route.is_method(*m))?;
    let request = HttpRequest::new(method.as_str(), url.clone());

    let dictionary = route.action_dictionary();
    let resolved = route.get_method(&request)?;
    if !dictionary.contains_key(&resolved) {
        return None;
    }
    match route.match_request(&request) {
        Ok(Some(_)) => Some(dictionary.keys().map(|m| m.as_str().to_string()).collect()),
        Ok(None) => None,
        Err(e) => {
            tracing::debug!(error = %e, url = %url, "Route rejected options lookup");
            None
        }
    }
}
