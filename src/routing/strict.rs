//! Strict API route.
//!
//! Accepts only URLs of the form
//! `<prefix>/<presenter>[/<relation>/<relationId>]...` and derives the
//! action from the HTTP verb and the relation names:
//!
//! ```text
//! GET /api/users/posts/5/comments/9
//!     presenter: users
//!     action:    read + Posts + Comments
//!     params:    ["5", "9"]
//! ```
//!
//! Arguments after the presenter alternate between names (even positions,
//! capitalized into the action) and ids (odd positions, collected as
//! params). The route is parse-only: it never builds URLs.

use serde_json::Value;
use url::Url;

use crate::error::{RestError, RestResult};
use crate::http::request::HttpRequest;
use crate::routing::router::{AppRequest, Router};

/// Verb → action prefix.
const VERBS: [(&str, &str); 7] = [
    ("GET", "read"),
    ("POST", "create"),
    ("PUT", "update"),
    ("DELETE", "delete"),
    ("HEAD", "head"),
    ("PATCH", "patch"),
    ("OPTIONS", "options"),
];

#[derive(Debug, Clone, Default)]
pub struct StrictRoute {
    prefix: String,
    module: Option<String>,
}

impl StrictRoute {
    pub fn new(prefix: impl Into<String>, module: Option<String>) -> Self {
        Self {
            prefix: prefix.into(),
            module,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn action_name(method: &str, arguments: &[&str]) -> RestResult<String> {
        let Some((_, verb)) = VERBS.iter().find(|(name, _)| *name == method) else {
            let accepted: Vec<&str> = VERBS.iter().map(|(name, _)| *name).collect();
            return Err(RestError::InvalidArgument(format!(
                "Request method must be one of {}, {method} given",
                accepted.join(", ")
            )));
        };

        let mut name = verb.to_string();
        for argument in arguments.iter().step_by(2) {
            name.push_str(&first_upper(argument));
        }
        Ok(name)
    }

    fn path_parameters(arguments: &[&str]) -> Vec<Value> {
        arguments
            .iter()
            .skip(1)
            .step_by(2)
            .map(|a| Value::String(a.to_string()))
            .collect()
    }
}

impl Router for StrictRoute {
    fn match_request(&self, request: &HttpRequest) -> RestResult<Option<AppRequest>> {
        let path = request.path().trim_start_matches('/');
        let Some(start) = path.find(self.prefix.as_str()) else {
            return Ok(None);
        };

        let rest = &path[start + self.prefix.len()..];
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        let parts: Vec<&str> = rest.split('/').collect();
        let Some((presenter, arguments)) = parts.split_first() else {
            return Ok(None);
        };
        if presenter.is_empty() {
            return Ok(None);
        }

        let action = Self::action_name(request.method(), arguments)?;

        let mut app_request = AppRequest::new(*presenter, action);
        app_request.module = self.module.clone();
        app_request.method = request.method().to_string();
        app_request
            .params
            .insert("params".into(), Value::Array(Self::path_parameters(arguments)));
        app_request.post = request.post().clone();
        app_request.files = request.files().to_vec();
        Ok(Some(app_request))
    }

    fn construct_url(&self, _request: &AppRequest, _base: &Url) -> Option<String> {
        None
    }
}

fn first_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
