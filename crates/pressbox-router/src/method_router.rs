//! HTTP method dispatch for a single path.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to values for one path pattern.
///
/// A `HEAD` request falls back to the `GET` entry when no explicit `HEAD`
/// entry exists.
///
/// # Example
///
/// ```rust
/// use pressbox_router::MethodRouter;
/// use http::Method;
///
/// let mut methods = MethodRouter::new();
/// methods.insert(Method::GET, "show").unwrap();
/// methods.insert(Method::POST, "submit").unwrap();
///
/// assert_eq!(methods.get(&Method::GET), Some(&"show"));
/// assert_eq!(methods.get(&Method::HEAD), Some(&"show"));
/// assert_eq!(methods.get(&Method::DELETE), None);
/// assert!(methods.insert(Method::GET, "other").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 2]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value for `method`.
    ///
    /// Returns the value back if the method is already taken.
    pub fn insert(&mut self, method: Method, value: T) -> Result<(), T> {
        if self.entries.iter().any(|(m, _)| *m == method) {
            return Err(value);
        }
        self.entries.push((method, value));
        Ok(())
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.find(method).or_else(|| {
            if *method == Method::HEAD {
                self.find(&Method::GET)
            } else {
                None
            }
        })
    }

    fn find(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// Methods with a registered value, in registration order.
    ///
    /// `HEAD` is listed when `GET` is registered.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.entries.iter().map(|(m, _)| m.clone()).collect();
        if methods.contains(&Method::GET) && !methods.contains(&Method::HEAD) {
            methods.push(Method::HEAD);
        }
        methods
    }

    /// Returns `true` when no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
