//! Radix tree node implementation.

use http::Method;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "item", "view")
    Static,
    /// Named parameter (e.g., "{id}")
    Param(String),
    /// Catch-all wildcard (e.g., "*path")
    Wildcard(String),
}

/// A node in the radix tree.
///
/// Each node represents one path segment. Nodes that terminate a registered
/// pattern carry a [`MethodRouter`].
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment (static, param, or wildcard)
    pub kind: SegmentKind,

    /// Method router for this node (if it's a route endpoint)
    pub methods: Option<MethodRouter<T>>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node<T>>,

    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node<T>>>,

    /// Wildcard child (at most one per node, always a leaf)
    pub wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind(String::new(), SegmentKind::Static)
    }

    /// Inserts `value` for `method` at `pattern`.
    pub fn insert(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouteError> {
        let segments = parse_pattern(pattern)?;
        let leaf = self.descend(pattern, &segments)?;
        let methods = leaf.methods.get_or_insert_with(MethodRouter::new);
        methods
            .insert(method.clone(), value)
            .map_err(|_| RouteError::Duplicate {
                method,
                pattern: pattern.to_string(),
            })
    }

    /// Walks (creating as needed) to the node for `segments`.
    fn descend(
        &mut self,
        pattern: &str,
        segments: &[(String, SegmentKind)],
    ) -> Result<&mut Self, RouteError> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return Ok(self);
        };

        match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        let child = Self::with_kind(segment.clone(), SegmentKind::Static);
                        self.static_children.insert(index, child);
                        index
                    }
                };
                self.static_children[index].descend(pattern, remaining)
            }
            SegmentKind::Param(name) => {
                let child = self.param_child.get_or_insert_with(|| {
                    Box::new(Self::with_kind(segment.clone(), kind.clone()))
                });
                if child.kind != *kind {
                    return Err(RouteError::invalid(
                        pattern,
                        format!(
                            "parameter {{{name}}} conflicts with existing {}",
                            child.segment
                        ),
                    ));
                }
                child.descend(pattern, remaining)
            }
            SegmentKind::Wildcard(name) => {
                if !remaining.is_empty() {
                    return Err(RouteError::invalid(
                        pattern,
                        "wildcard must be the last segment",
                    ));
                }
                let child = self.wildcard_child.get_or_insert_with(|| {
                    Box::new(Self::with_kind(segment.clone(), kind.clone()))
                });
                if child.kind != *kind {
                    return Err(RouteError::invalid(
                        pattern,
                        format!("wildcard *{name} conflicts with existing {}", child.segment),
                    ));
                }
                Ok(child.as_mut())
            }
        }
    }

    /// Matches a request path against the tree.
    ///
    /// Returns the method router and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), *segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                params.push(name.clone(), segments.join("/"));
                return child.methods.as_ref();
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Self> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Splits a pattern into typed segments.
fn parse_pattern(pattern: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
    if !pattern.starts_with('/') {
        return Err(RouteError::invalid(pattern, "pattern must start with '/'"));
    }

    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let kind = if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if name.is_empty() {
                    return Err(RouteError::invalid(pattern, "empty parameter name"));
                }
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                if name.is_empty() {
                    return Err(RouteError::invalid(pattern, "empty wildcard name"));
                }
                SegmentKind::Wildcard(name.to_string())
            } else {
                SegmentKind::Static
            };
            Ok((s.to_string(), kind))
        })
        .collect()
}
