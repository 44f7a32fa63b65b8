//! High-level router API.

use http::Method;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;

/// A matched route: the registered value and the extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the method and pattern
    pub value: &'a T,
    /// Extracted path parameters
    pub params: Params,
}

/// Outcome of a [`Router::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// Path and method both matched.
    Found(RouteMatch<'a, T>),
    /// The path matched but not for this method. Carries the allowed methods.
    MethodNotAllowed(Vec<Method>),
    /// No pattern matches the path.
    NotFound,
}

/// A radix tree router over values of type `T`.
///
/// # Route Priority
///
/// 1. **Static segments** (e.g., `/user/login`)
/// 2. **Parameter segments** (e.g., `/item/view/{id}`)
/// 3. **Wildcard segments** (e.g., `/static/*path`)
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `value` for `method` and `pattern`.
    ///
    /// Fails if the pair is already registered or the pattern is malformed.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouteError> {
        self.root.insert(method, pattern, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Resolves a request method and path.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        let Some((methods, params)) = self.root.match_path(path) else {
            return Lookup::NotFound;
        };
        match methods.get(method) {
            Some(value) => Lookup::Found(RouteMatch { value, params }),
            None => Lookup::MethodNotAllowed(methods.allowed_methods()),
        }
    }

    /// Matches a path regardless of method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.root.match_path(path)
    }

    /// Number of registered (method, pattern) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
