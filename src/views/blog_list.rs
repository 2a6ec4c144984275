//! Blog article page.
//!
//! The hero article renders straight from navigation state, so it never waits
//! on the network. The trending sidebar and the related grid come from a
//! single `/blog/all` fetch issued on mount; only the grid shows a loading
//! indicator while that fetch is in flight.

use super::{AdSlot, LOADING, write_image, write_link};
use crate::api::NewsApi;
use crate::models::Article;
use crate::navigation::{Navigator, Route, RouteState, ScrollBehavior};
use crate::scope::MountScope;
use crate::utils::{
    GRID_WINDOW, LABEL_MAX, SIDEBAR_WINDOW, asset_url, format_display_date, truncate_text, window,
};
use std::fmt::{self, Write};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

/// Observable state of the article list.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogListSnapshot {
    pub loading: bool,
    pub articles: Vec<Article>,
}

impl Default for BlogListSnapshot {
    fn default() -> Self {
        Self {
            loading: true,
            articles: Vec::new(),
        }
    }
}

/// The blog article page for `/blogdetails/:id`.
pub struct BlogListView<'a, A, N> {
    api: &'a A,
    nav: &'a N,
    base_url: String,
    hero: Option<Article>,
    route_id: Option<String>,
    scope: MountScope,
    state: watch::Sender<BlogListSnapshot>,
}

impl<'a, A: NewsApi, N: Navigator> BlogListView<'a, A, N> {
    /// Create the view for a navigation to `/blogdetails/:id`.
    ///
    /// An [`RouteState::Article`] becomes the hero immediately. Without one,
    /// the hero is looked up by `route_id` once the list has loaded.
    pub fn new(
        api: &'a A,
        nav: &'a N,
        base_url: impl Into<String>,
        state: &RouteState,
        route_id: Option<&str>,
    ) -> Self {
        let hero = match state {
            RouteState::Article(article) => Some(article.clone()),
            _ => None,
        };
        let (tx, _rx) = watch::channel(BlogListSnapshot::default());
        Self {
            api,
            nav,
            base_url: base_url.into(),
            hero,
            route_id: route_id.map(str::to_string),
            scope: MountScope::new(),
            state: tx,
        }
    }

    /// Fetch the article collection once. Failures leave an empty list.
    #[instrument(level = "info", skip_all)]
    pub async fn mount(&self) {
        self.state.send_modify(|s| s.loading = true);

        let mut token = self.scope.token();
        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!("View unmounted; dropping article fetch");
                return;
            }
            r = self.api.fetch_blogs() => r,
        };
        if !token.is_active() {
            debug!("View unmounted; discarding articles");
            return;
        }

        let articles = match result {
            Ok(articles) => {
                info!(count = articles.len(), "Articles loaded");
                articles
            }
            Err(e) => {
                error!(error = %e, "Error fetching articles");
                Vec::new()
            }
        };
        self.state.send_modify(|s| {
            s.articles = articles;
            s.loading = false;
        });
    }

    /// Invalidate outstanding fetches; their results will be dropped.
    pub fn unmount(&self) {
        self.scope.cancel();
    }

    /// Watch every published change to the article list.
    pub fn subscribe(&self) -> watch::Receiver<BlogListSnapshot> {
        self.state.subscribe()
    }

    /// A copy of the current article list state.
    pub fn snapshot(&self) -> BlogListSnapshot {
        self.state.borrow().clone()
    }

    /// The hero article: navigation state first, then the fetched list by id.
    pub fn hero(&self) -> Option<Article> {
        if let Some(hero) = &self.hero {
            return Some(hero.clone());
        }
        let id = self.route_id.as_deref()?;
        self.state.borrow().articles.iter().find(|a| a.id == id).cloned()
    }

    /// Up to six articles for the sidebar, in fetch order.
    pub fn sidebar(&self) -> Vec<Article> {
        window(&self.state.borrow().articles, SIDEBAR_WINDOW).to_vec()
    }

    /// Up to four articles for the bottom grid, or `None` while loading.
    pub fn grid(&self) -> Option<Vec<Article>> {
        let state = self.state.borrow();
        if state.loading {
            None
        } else {
            Some(window(&state.articles, GRID_WINDOW).to_vec())
        }
    }

    /// Open `article` on its own page, carrying it as route state.
    pub fn handle_blog_navigate(&self, article: &Article) {
        self.nav.navigate(
            Route::BlogDetails {
                id: article.id.clone(),
            },
            RouteState::Article(article.clone()),
        );
        self.nav.scroll_to_top(ScrollBehavior::Smooth);
    }

    /// Render the page as Markdown.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Err(e) = self.write_page(&mut out) {
            error!(error = %e, "Failed to render blog page");
        }
        out
    }

    fn write_page(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "{}\n", AdSlot::BANNER)?;
        writeln!(out, "**BLOG**\n")?;

        if let Some(article) = self.hero() {
            writeln!(out, "# {}\n", article.title)?;
            writeln!(out, "_{}_\n", format_display_date(article.created_at.as_deref()))?;
            write_image(out, &article.title, &self.image_url(&article))?;
            writeln!(out)?;
            for block in &article.content {
                writeln!(out, "{}\n", block.text)?;
            }
        }
        writeln!(out, "{}\n", AdSlot::BANNER)?;

        writeln!(out, "## Trending Stories\n")?;
        writeln!(out, "{}\n", AdSlot::BANNER)?;
        for article in self.sidebar() {
            write_link(
                out,
                "- ",
                &truncate_text(&article.title, LABEL_MAX),
                &Route::BlogDetails { id: article.id.clone() }.path(),
            )?;
        }
        writeln!(out, "\n{}\n", AdSlot::BANNER)?;

        writeln!(out, "---\n")?;
        match self.grid() {
            None => writeln!(out, "{}", LOADING)?,
            Some(cards) => {
                for article in cards {
                    write_image(out, &article.title, &self.image_url(&article))?;
                    writeln!(out, "_{}_  ", format_display_date(article.created_at.as_deref()))?;
                    write_link(
                        out,
                        "",
                        &article.title,
                        &Route::BlogDetails { id: article.id.clone() }.path(),
                    )?;
                    writeln!(out)?;
                }
            }
        }
        Ok(())
    }

    fn image_url(&self, article: &Article) -> String {
        asset_url(&self.base_url, article.image.as_deref())
    }
}
