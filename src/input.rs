//! Request input.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Request method: an HTTP verb, or the marker for command-line tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// The request is a command-line task
    Cli,
    /// Any other verb, upper-cased
    Other(String),
}

impl Method {
    /// Parse a verb; unknown verbs are kept upper-cased.
    pub fn parse(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "CLI" => Method::Cli,
            other => Method::Other(other.to_string()),
        }
    }

    /// The verb as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Cli => "CLI",
            Method::Other(verb) => verb,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of one request, chained to the input of the request that issued it.
#[derive(Debug, Clone)]
pub struct Input {
    method: Method,
    params: BTreeMap<String, String>,
    parent: Option<Arc<Input>>,
}

impl Input {
    /// Create an input without parameters.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            params: BTreeMap::new(),
            parent: None,
        }
    }

    /// Add a parameter, builder style.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Add several parameters, builder style.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Chain this input to a parent, builder style.
    pub fn with_parent(mut self, parent: Arc<Input>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Look up a parameter here, then in the parent chain.
    pub fn param(&self, name: &str) -> Option<&str> {
        match self.params.get(name) {
            Some(value) => Some(value),
            None => self.parent.as_deref().and_then(|p| p.param(name)),
        }
    }

    /// Parameters set on this input only.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// The parent input, if any.
    pub fn parent(&self) -> Option<&Arc<Input>> {
        self.parent.as_ref()
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new(Method::Get)
    }
}
