//! Story detail page.
//!
//! Requires a signed-in session. On mount the view checks the session before
//! issuing any request, then resolves the full story and the category listing
//! concurrently through a [`StoryLoader`]. The trending sidebar and related
//! grid are derived from both.
//!
//! ```text
//! no session              -> Redirected (to /login, no message)
//! session, nothing loaded -> Loading
//! Loading                 -> Loaded (story resolved) | Empty (lookup failed)
//! any + backend 401       -> Redirected (message shown, session cleared)
//! ```

use super::{AdSlot, LOADING, write_image, write_link};
use crate::api::NewsApi;
use crate::loader::{DetailSnapshot, FetchOutcome, PrimaryState, StoryLoader, StoryRef};
use crate::models::{ContentBlock, Story};
use crate::navigation::{Navigator, Route, RouteState, ScrollBehavior};
use crate::scope::MountScope;
use crate::session::SessionStore;
use crate::utils::{
    GRID_WINDOW, LABEL_MAX, asset_url, format_display_date, truncate_text, window,
};
use std::cell::{Cell, RefCell};
use std::fmt::{self, Write};
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// Shown above the page once the backend rejects the session.
pub const SESSION_EXPIRED_MESSAGE: &str =
    "Your session has expired. Please log in again to continue.";

/// Where the story page is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    /// Sent to login, either before fetching or after the session expired.
    Redirected,
    /// Waiting on the story lookup.
    Loading,
    /// The full story is available.
    Loaded,
    /// The lookup failed; nothing to show.
    Empty,
}

/// The story detail page for `/newsdetails/:id`.
pub struct NewsDetailsView<'a, A, S, N> {
    api: &'a A,
    sessions: &'a S,
    nav: &'a N,
    base_url: String,
    target: StoryRef,
    scope: MountScope,
    state: watch::Sender<DetailSnapshot>,
    message: RefCell<Option<String>>,
    redirected: Cell<bool>,
}

impl<'a, A, S, N> NewsDetailsView<'a, A, S, N>
where
    A: NewsApi,
    S: SessionStore,
    N: Navigator,
{
    /// Create the view for a navigation to `/newsdetails/:id`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Asset root that image paths are joined onto
    /// * `state` - Route state; a [`RouteState::Story`] skips identity resolution
    /// * `route_id` - The `:id` route parameter, used on the slow path
    pub fn new(
        api: &'a A,
        sessions: &'a S,
        nav: &'a N,
        base_url: impl Into<String>,
        state: &RouteState,
        route_id: Option<&str>,
    ) -> Self {
        let (tx, _rx) = watch::channel(DetailSnapshot::default());
        Self {
            api,
            sessions,
            nav,
            base_url: base_url.into(),
            target: StoryRef::from_route(state, route_id),
            scope: MountScope::new(),
            state: tx,
            message: RefCell::new(None),
            redirected: Cell::new(false),
        }
    }

    /// Check the session, then load the story and the category listing.
    #[instrument(level = "info", skip_all)]
    pub async fn mount(&self) {
        self.nav.scroll_to_top(ScrollBehavior::Smooth);

        let Some(session) = self.sessions.load() else {
            info!("No session; redirecting to login");
            self.redirected.set(true);
            self.nav.navigate(Route::Login, RouteState::None);
            return;
        };

        let loader = StoryLoader::new(self.api, Some(session), self.scope.token(), &self.state);
        let primary = async {
            if loader.load_primary(&self.target).await == FetchOutcome::SessionExpired {
                self.expire_session();
            }
        };
        let related = async {
            if loader.load_related().await == FetchOutcome::SessionExpired {
                self.expire_session();
            }
        };
        futures::join!(primary, related);
    }

    /// Invalidate outstanding fetches; their results will be dropped.
    pub fn unmount(&self) {
        self.scope.cancel();
    }

    /// Clear the session and send the user to login, at most once per mount.
    fn expire_session(&self) {
        if self.redirected.replace(true) {
            return;
        }
        warn!("Session expired; redirecting to login");
        *self.message.borrow_mut() = Some(SESSION_EXPIRED_MESSAGE.to_string());
        self.nav.navigate(Route::Login, RouteState::None);
        if let Err(e) = self.sessions.clear() {
            error!(error = %e, "Failed to clear expired session");
        }
    }

    /// Current lifecycle phase. A redirect overrides whatever has loaded.
    pub fn phase(&self) -> DetailPhase {
        if self.redirected.get() {
            return DetailPhase::Redirected;
        }
        match self.state.borrow().primary {
            PrimaryState::Loading => DetailPhase::Loading,
            PrimaryState::Loaded => DetailPhase::Loaded,
            PrimaryState::Failed => DetailPhase::Empty,
        }
    }

    /// Watch every published change to the page state.
    pub fn subscribe(&self) -> watch::Receiver<DetailSnapshot> {
        self.state.subscribe()
    }

    /// A copy of the current page state.
    pub fn snapshot(&self) -> DetailSnapshot {
        self.state.borrow().clone()
    }

    /// The session-expired message, once expiry has been handled.
    pub fn message(&self) -> Option<String> {
        self.message.borrow().clone()
    }

    pub fn story(&self) -> Option<Story> {
        self.state.borrow().story.clone()
    }

    /// Sidebar stories: same category, current story excluded, at most six.
    pub fn trending(&self) -> Vec<Story> {
        self.state.borrow().trending.clone()
    }

    /// The first four trending stories, or `None` while the listing loads.
    pub fn related_grid(&self) -> Option<Vec<Story>> {
        let state = self.state.borrow();
        if state.related_loading() {
            None
        } else {
            Some(window(&state.trending, GRID_WINDOW).to_vec())
        }
    }

    /// Open another story, carrying it as route state.
    pub fn handle_navigate(&self, story: &Story) {
        self.nav.navigate(
            Route::NewsDetails {
                id: story.id.clone(),
            },
            RouteState::Story(story.clone()),
        );
        self.nav.scroll_to_top(ScrollBehavior::Smooth);
    }

    /// Open a tag listing scoped to `category_id`.
    pub fn handle_navigate_tag(&self, tag_id: &str, category_id: Option<&str>) {
        self.nav.navigate(
            Route::Tag {
                tag_id: tag_id.to_string(),
            },
            RouteState::Ids {
                category_id: category_id.map(str::to_string),
                tag_id: Some(tag_id.to_string()),
                news_id: None,
            },
        );
        self.nav.scroll_to_top(ScrollBehavior::Smooth);
    }

    /// Open the listing of the current story's category, once it is known.
    pub fn handle_navigate_category(&self) {
        let Some(name) = self.story().and_then(|s| s.category_name().map(str::to_string)) else {
            return;
        };
        self.nav.navigate(Route::Category { name }, RouteState::None);
    }

    /// Render the page as Markdown.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Err(e) = self.write_page(&mut out) {
            error!(error = %e, "Failed to render story page");
        }
        out
    }

    fn write_page(&self, out: &mut String) -> fmt::Result {
        if let Some(message) = self.message() {
            writeln!(out, "**{}**\n", message)?;
        }
        writeln!(out, "{}\n", AdSlot::BANNER)?;

        let snap = self.snapshot();
        match (&snap.story, self.phase()) {
            (Some(story), _) => self.write_story(out, story)?,
            (None, DetailPhase::Empty) => writeln!(out, "_Story unavailable._\n")?,
            (None, _) => writeln!(out, "{}\n", LOADING)?,
        }

        writeln!(out, "## Trending Stories\n")?;
        writeln!(out, "{}\n", AdSlot::SIDEBAR)?;
        if snap.related_loading() {
            writeln!(out, "{}", LOADING)?;
        } else {
            for story in &snap.trending {
                write_link(
                    out,
                    "- ",
                    &truncate_text(&story.title, LABEL_MAX),
                    &Route::NewsDetails { id: story.id.clone() }.path(),
                )?;
            }
        }
        writeln!(out, "\n{}\n", AdSlot::SIDEBAR)?;

        writeln!(out, "---\n")?;
        let category_id = snap
            .story
            .as_ref()
            .and_then(|s| s.category_details.as_ref())
            .map(|c| c.id.clone());
        match self.related_grid() {
            None => writeln!(out, "{}", LOADING)?,
            Some(cards) => {
                for story in cards {
                    write_image(out, &story.title, &self.image_url(story.hero_image.as_deref()))?;
                    writeln!(out, "_{}_  ", format_display_date(story.created_at.as_deref()))?;
                    write_link(
                        out,
                        "",
                        &story.title,
                        &Route::NewsDetails { id: story.id.clone() }.path(),
                    )?;
                    if let Some(tag) = &story.tag_details {
                        let mut target = Route::Tag { tag_id: tag.id.clone() }.path();
                        if let Some(cid) = &category_id {
                            target = format!("{}?categoryId={}", target, urlencoding::encode(cid));
                        }
                        write_link(out, "", &tag.tag.to_uppercase(), &target)?;
                    }
                    writeln!(out)?;
                }
            }
        }
        Ok(())
    }

    fn write_story(&self, out: &mut String, story: &Story) -> fmt::Result {
        if let Some(name) = story.category_name() {
            write_link(
                out,
                "",
                &format!("**{}**", name.to_uppercase()),
                &Route::Category { name: name.to_string() }.path(),
            )?;
            writeln!(out)?;
        }
        writeln!(out, "# {}\n", story.title)?;
        writeln!(out, "_{}_\n", format_display_date(story.created_at.as_deref()))?;
        write_image(out, &story.title, &self.image_url(story.hero_image.as_deref()))?;
        writeln!(out)?;

        writeln!(out, "> **Summary**")?;
        for item in &story.summary {
            writeln!(out, "> - {}", item.text)?;
        }
        writeln!(out)?;

        if let Some(heading) = &story.heading {
            writeln!(out, "## {}\n", heading)?;
        }
        let sections: [(&[ContentBlock], Option<&str>); 3] = [
            (&story.content_1, story.image_2.as_deref()),
            (&story.content_2, story.image_3.as_deref()),
            (&story.content_3, None),
        ];
        for (blocks, image_after) in sections {
            for block in blocks {
                writeln!(out, "{}\n", block.text)?;
            }
            if let Some(path) = image_after {
                write_image(out, &story.title, &self.image_url(Some(path)))?;
                writeln!(out)?;
            }
        }
        writeln!(out, "{}\n", AdSlot::BANNER)
    }

    fn image_url(&self, path: Option<&str>) -> String {
        asset_url(&self.base_url, path)
    }
}
