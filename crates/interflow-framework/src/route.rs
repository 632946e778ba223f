//! Route table and route resolution.
//!
//! A route binds a path to an ordered middleware chain. Paths come in two
//! shapes:
//!
//! - a plain name, e.g. `"settings"`
//! - a composite `"<name>:<value1>:<value2>..."` matched against the values
//!   chosen in a select menu, with `"<name>:*"` matching any choice
//!
//! The reserved path [`FALLBACK_PATH`] (`"*"`) marks the fallback route. It is
//! always stored first in its table.
//!
//! # Resolution order
//!
//! 1. For a select menu with chosen values: the exact composite path, then the
//!    `"<name>:*"` form.
//! 2. The plain name.
//! 3. The fallback route, unless [`MatchMode::Exact`] was requested.

use std::collections::HashMap;
use std::fmt;

use crate::error::BuildError;
use crate::middleware::BoxedMiddleware;

/// The reserved path of the fallback route.
pub const FALLBACK_PATH: &str = "*";

/// Separator between a name and select values in a composite path.
pub const VALUE_SEPARATOR: char = ':';

/// Separator between a path and a session token; reserved in paths.
pub const TOKEN_SEPARATOR: char = ';';

/// Whether resolution may fall back to the fallback route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Only routes whose path matches are considered.
    Exact,
    /// The fallback route catches anything that does not match.
    #[default]
    Fallback,
}

/// Builds the composite path `"<id>:<v1>:<v2>..."`.
pub fn composite_path(id: &str, values: &[String]) -> String {
    let mut path = String::from(id);
    for value in values {
        path.push(VALUE_SEPARATOR);
        path.push_str(value);
    }
    path
}

/// Builds the select wildcard path `"<id>:*"`.
pub fn select_wildcard_path(id: &str) -> String {
    format!("{id}{VALUE_SEPARATOR}{FALLBACK_PATH}")
}

/// Checks that `path` can be registered as a route.
pub fn validate_path(path: &str) -> Result<(), BuildError> {
    if path.is_empty() {
        return Err(BuildError::EmptyPath);
    }
    if path.contains(TOKEN_SEPARATOR) {
        return Err(BuildError::ReservedSeparator {
            path: path.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Route
// ============================================================================

/// A path bound to an ordered middleware chain.
pub struct Route<S> {
    path: String,
    middlewares: Vec<BoxedMiddleware<S>>,
}

impl<S> Route<S> {
    /// Creates a route.
    pub fn new(path: impl Into<String>, middlewares: Vec<BoxedMiddleware<S>>) -> Self {
        Self {
            path: path.into(),
            middlewares,
        }
    }

    /// Returns the path of this route.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the middleware chain of this route.
    pub fn middlewares(&self) -> &[BoxedMiddleware<S>] {
        &self.middlewares
    }

    /// Returns `true` if this is the fallback route.
    pub fn is_fallback(&self) -> bool {
        self.path == FALLBACK_PATH
    }
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            middlewares: self.middlewares.clone(),
        }
    }
}

impl<S> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("middleware_count", &self.middlewares.len())
            .finish()
    }
}

// ============================================================================
// RouteTable
// ============================================================================

/// The outcome of a successful resolution.
#[derive(Debug)]
pub struct Resolved<'a, S> {
    /// The matched route.
    pub route: &'a Route<S>,
    /// `true` if the match is the fallback route.
    pub is_wildcard: bool,
}

/// An immutable, ordered set of routes.
pub struct RouteTable<S> {
    routes: Vec<Route<S>>,
    index: HashMap<String, usize>,
}

impl<S> RouteTable<S> {
    /// Builds a table from `routes`.
    ///
    /// Paths are validated and must be unique. The fallback route, if
    /// present, is moved to the front; the others keep their order.
    pub fn new(routes: impl IntoIterator<Item = Route<S>>) -> Result<Self, BuildError> {
        let (mut fallback, mut others): (Vec<Route<S>>, Vec<Route<S>>) =
            routes.into_iter().partition(Route::is_fallback);

        if fallback.len() > 1 {
            return Err(BuildError::DuplicateRoute {
                path: FALLBACK_PATH.to_string(),
            });
        }

        fallback.append(&mut others);
        let routes = fallback;

        let mut index = HashMap::with_capacity(routes.len());
        for (i, route) in routes.iter().enumerate() {
            validate_path(route.path())?;
            if index.insert(route.path.clone(), i).is_some() {
                return Err(BuildError::DuplicateRoute {
                    path: route.path.clone(),
                });
            }
        }

        Ok(Self { routes, index })
    }

    /// Returns the route registered at exactly `path`.
    pub fn get(&self, path: &str) -> Option<&Route<S>> {
        self.index.get(path).map(|&i| &self.routes[i])
    }

    /// Returns the fallback route, if one is registered.
    pub fn fallback(&self) -> Option<&Route<S>> {
        self.routes.first().filter(|route| route.is_fallback())
    }

    /// Returns `true` if a fallback route is registered.
    pub fn has_fallback(&self) -> bool {
        self.fallback().is_some()
    }

    /// Returns all routes, fallback first.
    pub fn routes(&self) -> &[Route<S>] {
        &self.routes
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolves an identifier to a route.
    ///
    /// `selected` holds the values chosen in a select menu and is empty for
    /// every other interaction.
    pub fn resolve(&self, id: &str, selected: &[String], mode: MatchMode) -> Option<Resolved<'_, S>> {
        let by_selection = (!selected.is_empty())
            .then(|| {
                self.get(&composite_path(id, selected))
                    .or_else(|| self.get(&select_wildcard_path(id)))
            })
            .flatten();

        if let Some(route) = by_selection.or_else(|| self.get(id)) {
            return Some(Resolved {
                route,
                is_wildcard: route.is_fallback(),
            });
        }

        match mode {
            MatchMode::Exact => None,
            MatchMode::Fallback => self.fallback().map(|route| Resolved {
                route,
                is_wildcard: true,
            }),
        }
    }
}

impl<S> fmt::Debug for RouteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(Route::path))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str) -> Route<()> {
        Route::new(path, Vec::new())
    }

    fn values(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_exact_match() {
        let table = RouteTable::new([route("ping"), route("pong")]).unwrap();
        let resolved = table.resolve("pong", &[], MatchMode::Fallback).unwrap();
        assert_eq!(resolved.route.path(), "pong");
        assert!(!resolved.is_wildcard);
    }

    #[test]
    fn test_unknown_without_fallback() {
        let table = RouteTable::new([route("ping")]).unwrap();
        assert!(table.resolve("nope", &[], MatchMode::Fallback).is_none());
    }

    #[test]
    fn test_selection_priority() {
        let table =
            RouteTable::new([route("menu"), route("menu:*"), route("menu:a:b")]).unwrap();
        let chosen = values(&["a", "b"]);

        let resolved = table.resolve("menu", &chosen, MatchMode::Fallback).unwrap();
        assert_eq!(resolved.route.path(), "menu:a:b");

        let table = RouteTable::new([route("menu"), route("menu:*")]).unwrap();
        let resolved = table.resolve("menu", &chosen, MatchMode::Fallback).unwrap();
        assert_eq!(resolved.route.path(), "menu:*");

        let table = RouteTable::new([route("menu")]).unwrap();
        let resolved = table.resolve("menu", &chosen, MatchMode::Fallback).unwrap();
        assert_eq!(resolved.route.path(), "menu");
    }

    #[test]
    fn test_selection_ignored_without_values() {
        let table = RouteTable::new([route("menu"), route("menu:*")]).unwrap();
        let resolved = table.resolve("menu", &[], MatchMode::Fallback).unwrap();
        assert_eq!(resolved.route.path(), "menu");
    }

    #[test]
    fn test_fallback_is_first_and_wildcard() {
        let table = RouteTable::new([route("a"), route(FALLBACK_PATH), route("b")]).unwrap();
        assert_eq!(table.routes()[0].path(), FALLBACK_PATH);
        assert_eq!(table.routes()[1].path(), "a");
        assert!(table.has_fallback());

        let resolved = table.resolve("zzz", &[], MatchMode::Fallback).unwrap();
        assert!(resolved.is_wildcard);
        assert!(resolved.route.is_fallback());
    }

    #[test]
    fn test_exact_mode_skips_fallback() {
        let table = RouteTable::new([route(FALLBACK_PATH), route("a")]).unwrap();
        assert!(table.resolve("zzz", &[], MatchMode::Exact).is_none());
        assert!(table.resolve("a", &[], MatchMode::Exact).is_some());
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let table = RouteTable::new([route(FALLBACK_PATH), route("a")]).unwrap();
        let first = table.resolve("a", &[], MatchMode::Fallback).unwrap().route;
        let second = table.resolve("a", &[], MatchMode::Fallback).unwrap().route;
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_invalid_tables() {
        assert_eq!(
            RouteTable::new([route("a"), route("a")]).unwrap_err(),
            BuildError::DuplicateRoute { path: "a".into() }
        );
        assert_eq!(
            RouteTable::new([route(FALLBACK_PATH), route(FALLBACK_PATH)]).unwrap_err(),
            BuildError::DuplicateRoute {
                path: FALLBACK_PATH.into()
            }
        );
        assert_eq!(
            RouteTable::new([route("a;b")]).unwrap_err(),
            BuildError::ReservedSeparator { path: "a;b".into() }
        );
        assert_eq!(RouteTable::new([route("")]).unwrap_err(), BuildError::EmptyPath);
    }

    #[test]
    fn test_composite_paths() {
        assert_eq!(composite_path("menu", &values(&["x", "y"])), "menu:x:y");
        assert_eq!(select_wildcard_path("menu"), "menu:*");
    }
}
