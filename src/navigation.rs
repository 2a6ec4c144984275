//! Routes, route state and the navigator seam.
//!
//! A navigation pushes a [`Route`] together with optional [`RouteState`]. The
//! state carries a full, already fetched record (the fast path) so the target
//! view can render without resolving identity from the bare route id.

use crate::error::{Error, Result};
use crate::models::{Article, Story};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Mutex;
use tracing::info;

static ROUTE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(login|blogdetails|newsdetails|tag|category)(?:/([^/?#]+))?/?$")
        .expect("route pattern is valid")
});

/// A location in the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    BlogDetails { id: String },
    NewsDetails { id: String },
    Tag { tag_id: String },
    /// Category listing; `name` is the display name, encoded when rendered.
    Category { name: String },
}

impl Route {
    /// The path form of the route, percent-encoding the category name.
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::BlogDetails { id } => format!("/blogdetails/{}", id),
            Route::NewsDetails { id } => format!("/newsdetails/{}", id),
            Route::Tag { tag_id } => format!("/tag/{}", tag_id),
            Route::Category { name } => format!("/category/{}", urlencoding::encode(name)),
        }
    }

    /// Parse a path such as `/newsdetails/abc123` back into a route.
    ///
    /// Any query string or fragment on a shared link is ignored.
    pub fn parse(path: &str) -> Result<Route> {
        let bare = path.split(['?', '#']).next().unwrap_or(path);
        let caps = ROUTE_PATTERN
            .captures(bare)
            .ok_or_else(|| Error::Route(path.to_string()))?;
        let param = caps.get(2).map(|m| m.as_str().to_string());

        let route = match (&caps[1], param) {
            ("login", None) => Route::Login,
            ("blogdetails", Some(id)) => Route::BlogDetails { id },
            ("newsdetails", Some(id)) => Route::NewsDetails { id },
            ("tag", Some(tag_id)) => Route::Tag { tag_id },
            ("category", Some(raw)) => Route::Category {
                name: urlencoding::decode(&raw)
                    .map_err(|_| Error::Route(path.to_string()))?
                    .into_owned(),
            },
            _ => return Err(Error::Route(path.to_string())),
        };
        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// State carried along with a route push.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RouteState {
    #[default]
    None,
    Article(Article),
    Story(Story),
    /// Identifiers for a tag listing, or for a story lookup without a record.
    Ids {
        category_id: Option<String>,
        tag_id: Option<String>,
        news_id: Option<String>,
    },
}

/// How a scroll reset moves the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animate to the target position.
    Smooth,
    /// Jump straight to the target position.
    Instant,
}

/// Something that can change the current route and scroll position.
///
/// Every push adds a history entry; pushing the same route twice yields two
/// entries.
pub trait Navigator {
    /// Push `route`, carrying `state` to the target view.
    fn navigate(&self, route: Route, state: RouteState);
    /// Scroll the page back to the top.
    fn scroll_to_top(&self, behavior: ScrollBehavior);
}

/// One recorded navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub route: Route,
    pub state: RouteState,
}

/// A navigator that records pushes and scroll resets.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<HistoryEntry>>,
    scrolls: Mutex<Vec<ScrollBehavior>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Scroll-to-top resets requested so far, oldest first.
    pub fn scrolls(&self) -> Vec<ScrollBehavior> {
        self.scrolls.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<HistoryEntry> {
        self.entries.lock().ok().and_then(|e| e.last().cloned())
    }

    /// Number of times `route` was pushed.
    pub fn count(&self, route: &Route) -> usize {
        self.entries
            .lock()
            .map(|e| e.iter().filter(|h| &h.route == route).count())
            .unwrap_or(0)
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route, state: RouteState) {
        info!(route = %route, "Navigating");
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(HistoryEntry { route, state });
        }
    }

    fn scroll_to_top(&self, behavior: ScrollBehavior) {
        if let Ok(mut scrolls) = self.scrolls.lock() {
            scrolls.push(behavior);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(
            Route::NewsDetails { id: "s1".to_string() }.path(),
            "/newsdetails/s1"
        );
        assert_eq!(
            Route::Category {
                name: "Science & Tech".to_string()
            }
            .path(),
            "/category/Science%20%26%20Tech"
        );
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/login").unwrap(), Route::Login);
        assert_eq!(
            Route::parse("/blogdetails/a1").unwrap(),
            Route::BlogDetails { id: "a1".to_string() }
        );
        assert_eq!(
            Route::parse("/newsdetails/s9/").unwrap(),
            Route::NewsDetails { id: "s9".to_string() }
        );
        assert_eq!(
            Route::parse("/category/Science%20%26%20Tech").unwrap(),
            Route::Category {
                name: "Science & Tech".to_string()
            }
        );
    }

    #[test]
    fn test_route_parse_ignores_query_and_fragment() {
        assert_eq!(
            Route::parse("/newsdetails/abc?utm_source=x").unwrap(),
            Route::NewsDetails { id: "abc".to_string() }
        );
        assert_eq!(
            Route::parse("/blogdetails/a1/#comments").unwrap(),
            Route::BlogDetails { id: "a1".to_string() }
        );
        assert_eq!(Route::parse("/login?next=%2Fblogdetails%2Fa1").unwrap(), Route::Login);
        assert!(Route::parse("/?page=2").is_err());
    }

    #[test]
    fn test_route_parse_rejects_unknown() {
        assert!(Route::parse("/").is_err());
        assert!(Route::parse("/newsdetails").is_err());
        assert!(Route::parse("/login/extra").is_err());
        assert!(Route::parse("/admin/1").is_err());
    }

    #[test]
    fn test_history_records_every_push() {
        let history = History::new();
        let route = Route::NewsDetails { id: "s1".to_string() };
        history.navigate(route.clone(), RouteState::None);
        history.navigate(route.clone(), RouteState::None);
        history.scroll_to_top(ScrollBehavior::Instant);

        assert_eq!(history.count(&route), 2);
        assert_eq!(history.entries().len(), 2);
        assert_eq!(history.scrolls(), vec![ScrollBehavior::Instant]);
        assert_eq!(history.current().unwrap().route, route);
    }
}
