//! Story loading and the derived "trending" subset.
//!
//! A [`StoryLoader`] resolves one full story plus the category-bucketed
//! listing and publishes every change as a [`DetailSnapshot`] on a watch
//! channel. Whenever either input lands, the trending subset is recomputed,
//! but only once both inputs are present.
//!
//! Failures never escape: they are logged, the snapshot degrades (empty
//! related list, or a failed primary), and the caller gets a [`FetchOutcome`]
//! telling it whether the session expired.

use crate::api::NewsApi;
use crate::error::ApiError;
use crate::models::{CategoryBucket, IdRef, Story, StoryLookupRequest};
use crate::navigation::RouteState;
use crate::scope::ScopeToken;
use crate::session::Session;
use crate::utils::SIDEBAR_WINDOW;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// What the caller knows about the story to show.
///
/// The fast path carries a (possibly partial) story from navigation state;
/// the slow path only has the id from the URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryRef {
    pub story: Option<Story>,
    pub category_id: Option<String>,
    pub tag_id: Option<String>,
    pub news_id: Option<String>,
    pub route_id: Option<String>,
}

impl StoryRef {
    /// Build a reference from route state plus the `:id` route parameter.
    pub fn from_route(state: &RouteState, route_id: Option<&str>) -> Self {
        let route_id = route_id.map(str::to_string);
        match state {
            RouteState::Story(story) => StoryRef {
                story: Some(story.clone()),
                route_id,
                ..Default::default()
            },
            RouteState::Ids {
                category_id,
                tag_id,
                news_id,
            } => StoryRef {
                category_id: category_id.clone(),
                tag_id: tag_id.clone(),
                news_id: news_id.clone(),
                route_id,
                ..Default::default()
            },
            RouteState::None | RouteState::Article(_) => StoryRef {
                route_id,
                ..Default::default()
            },
        }
    }

    /// The composite key for the lookup call.
    ///
    /// Each id prefers the story's nested reference, then its flat id, then
    /// ids passed in route state. The news id falls back to the route id.
    pub fn lookup_request(&self) -> StoryLookupRequest {
        let story = self.story.as_ref();
        let pick = |field: Option<&IdRef>, fallback: &Option<String>| {
            field
                .and_then(|r| r.nested_id().or_else(|| r.flat_id()))
                .map(str::to_string)
                .or_else(|| fallback.clone())
        };

        StoryLookupRequest {
            category_id: pick(story.and_then(|s| s.category_id.as_ref()), &self.category_id),
            tag_id: pick(story.and_then(|s| s.tag_id.as_ref()), &self.tag_id),
            news_id: story
                .map(|s| s.id.clone())
                .or_else(|| self.news_id.clone())
                .or_else(|| self.route_id.clone()),
        }
    }
}

/// Same-category stories excluding `current`, capped at the sidebar window.
///
/// Returns an empty list when no bucket matches the story's category.
pub fn derive_trending(current: &Story, buckets: &[CategoryBucket]) -> Vec<Story> {
    let Some(category) = current.category_name() else {
        return Vec::new();
    };
    buckets
        .iter()
        .find(|b| b.category_name == category)
        .map(|bucket| {
            bucket
                .news
                .iter()
                .filter(|s| s.id != current.id)
                .take(SIDEBAR_WINDOW)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Progress of the full-story lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryState {
    /// No answer yet.
    #[default]
    Loading,
    /// The story resolved and is in the snapshot.
    Loaded,
    /// The lookup failed and no story was ever resolved.
    Failed,
}

/// Observable state of a story detail page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailSnapshot {
    pub primary: PrimaryState,
    pub story: Option<Story>,
    /// `None` until the related listing has answered (or failed).
    pub buckets: Option<Vec<CategoryBucket>>,
    pub trending: Vec<Story>,
}

impl DetailSnapshot {
    /// Whether the category listing is still outstanding.
    pub fn related_loading(&self) -> bool {
        self.buckets.is_none()
    }

    fn recompute_trending(&mut self) {
        if let (Some(story), Some(buckets)) = (&self.story, &self.buckets) {
            self.trending = derive_trending(story, buckets);
            debug!(count = self.trending.len(), "Recomputed trending stories");
        }
    }
}

/// How a single fetch ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was published to the snapshot.
    Applied,
    /// Failed for a non-session reason; the snapshot was degraded.
    Degraded,
    /// The backend rejected the session.
    SessionExpired,
    /// The owning view unmounted first; nothing was applied.
    Discarded,
}

/// Loads the primary story and the related listing into a snapshot channel.
pub struct StoryLoader<'a, A> {
    api: &'a A,
    session: Option<Session>,
    token: ScopeToken,
    state: &'a watch::Sender<DetailSnapshot>,
}

impl<'a, A: NewsApi> StoryLoader<'a, A> {
    /// Create a loader bound to one mounted view.
    ///
    /// # Arguments
    ///
    /// * `api` - Backend used for both fetches
    /// * `session` - Signed-in session, forwarded as the Authorization token
    /// * `token` - Scope token; responses arriving after it ends are dropped
    /// * `state` - Channel every applied response is published on
    pub fn new(
        api: &'a A,
        session: Option<Session>,
        token: ScopeToken,
        state: &'a watch::Sender<DetailSnapshot>,
    ) -> Self {
        Self {
            api,
            session,
            token,
            state,
        }
    }

    /// Resolve the full story for `target` and publish it.
    ///
    /// # Returns
    ///
    /// [`FetchOutcome::SessionExpired`] when the backend rejected the session,
    /// [`FetchOutcome::Discarded`] when the view unmounted first.
    #[instrument(level = "info", skip_all)]
    pub async fn load_primary(&self, target: &StoryRef) -> FetchOutcome {
        let request = target.lookup_request();
        debug!(?request, "Resolving story");

        let mut token = self.token.clone();
        let result = tokio::select! {
            _ = token.cancelled() => return self.discard("story lookup"),
            r = self.api.fetch_story(&request, self.session.as_ref()) => r,
        };
        if !self.token.is_active() {
            return self.discard("story lookup");
        }

        match result {
            Ok(story) => {
                info!(story_id = %story.id, "Story loaded");
                self.state.send_modify(|snap| {
                    snap.story = Some(story);
                    snap.primary = PrimaryState::Loaded;
                    snap.recompute_trending();
                });
                FetchOutcome::Applied
            }
            Err(e) => {
                self.state.send_modify(|snap| {
                    if snap.story.is_none() {
                        snap.primary = PrimaryState::Failed;
                    }
                });
                Self::classify(e, "Error fetching story")
            }
        }
    }

    /// Fetch the category-bucketed listing and publish it.
    #[instrument(level = "info", skip_all)]
    pub async fn load_related(&self) -> FetchOutcome {
        let mut token = self.token.clone();
        let result = tokio::select! {
            _ = token.cancelled() => return self.discard("category listing"),
            r = self.api.fetch_category_news(self.session.as_ref()) => r,
        };
        if !self.token.is_active() {
            return self.discard("category listing");
        }

        let (buckets, outcome) = match result {
            Ok(buckets) => (buckets, FetchOutcome::Applied),
            Err(e) => (Vec::new(), Self::classify(e, "Error fetching category-wise news")),
        };
        self.state.send_modify(|snap| {
            snap.buckets = Some(buckets);
            snap.recompute_trending();
        });
        outcome
    }

    fn discard(&self, what: &str) -> FetchOutcome {
        debug!(what, "View unmounted; discarding response");
        FetchOutcome::Discarded
    }

    fn classify(e: ApiError, context: &str) -> FetchOutcome {
        if e.is_unauthorized() {
            warn!(error = %e, "{}", context);
            FetchOutcome::SessionExpired
        } else {
            error!(error = %e, "{}", context);
            FetchOutcome::Degraded
        }
    }
}
