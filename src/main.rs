//! # News Views
//!
//! Renders the blog article page and the story detail page of a news site
//! from its backend API, as Markdown.
//!
//! ## Usage
//!
//! ```sh
//! news_views session set --user-id 665a --token "$TOKEN"
//! news_views open /newsdetails/6650f1
//! ```
//!
//! ## Architecture
//!
//! 1. **Config**: defaults, optional YAML file, then CLI flags
//! 2. **Mount**: the chosen view fetches through `HttpNewsApi`
//! 3. **Derive**: trending and related subsets computed from fetched data
//! 4. **Render**: Markdown to stdout or a file; navigations are logged

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_views::api::HttpNewsApi;
use news_views::cli::{Cli, Command, OutputArgs, SessionCommand};
use news_views::config::AppConfig;
use news_views::error;
use news_views::navigation::{History, Route, RouteState};
use news_views::session::{FileSessionStore, Session, SessionStore};
use news_views::views::blog_list::BlogListView;
use news_views::views::news_details::NewsDetailsView;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = AppConfig::resolve(
        args.config.as_deref(),
        args.base_url.as_deref(),
        args.session_file.as_deref(),
    )?;
    let sessions = FileSessionStore::new(&config.session_file);
    let api = HttpNewsApi::new(
        config.base_url.clone(),
        config.request_timeout,
        config.auth_scheme.clone(),
    )?;
    info!(base_url = %config.base_url, "news_views starting up");

    match args.command {
        Command::Session(cmd) => run_session(cmd, &sessions)?,
        Command::Blog { article, id, output } => {
            let state = match article {
                Some(path) => RouteState::Article(read_record(&path).await?),
                None => RouteState::None,
            };
            let page = show_blog(&api, &config, &state, id.as_deref()).await;
            write_page(&output, &page).await?;
        }
        Command::News {
            id,
            category_id,
            tag_id,
            story,
            output,
        } => {
            let state = match story {
                Some(path) => RouteState::Story(read_record(&path).await?),
                None if category_id.is_some() || tag_id.is_some() => RouteState::Ids {
                    category_id,
                    tag_id,
                    news_id: id.clone(),
                },
                None => RouteState::None,
            };
            let page = show_story(&api, &sessions, &config, &state, id.as_deref()).await;
            write_page(&output, &page).await?;
        }
        Command::Open { route, output } => {
            let page = match Route::parse(&route)? {
                Route::BlogDetails { id } => {
                    show_blog(&api, &config, &RouteState::None, Some(&id)).await
                }
                Route::NewsDetails { id } => {
                    show_story(&api, &sessions, &config, &RouteState::None, Some(&id)).await
                }
                other => return Err(error::Error::Route(other.path()).into()),
            };
            write_page(&output, &page).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, millis = elapsed.as_millis() as u64, "Execution complete");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(route_id = route_id))]
async fn show_blog(
    api: &HttpNewsApi,
    config: &AppConfig,
    state: &RouteState,
    route_id: Option<&str>,
) -> String {
    let history = History::new();
    let view = BlogListView::new(api, &history, config.base_url.as_str(), state, route_id);
    view.mount().await;
    let page = view.render();
    view.unmount();
    page
}

#[instrument(level = "info", skip_all, fields(route_id = route_id))]
async fn show_story(
    api: &HttpNewsApi,
    sessions: &FileSessionStore,
    config: &AppConfig,
    state: &RouteState,
    route_id: Option<&str>,
) -> String {
    let history = History::new();
    let view = NewsDetailsView::new(
        api,
        sessions,
        &history,
        config.base_url.as_str(),
        state,
        route_id,
    );
    view.mount().await;
    let page = view.render();
    view.unmount();

    if let Some(entry) = history.current() {
        warn!(route = %entry.route, phase = ?view.phase(), "View redirected");
        if let Some(message) = view.message() {
            warn!(%message, "Session expired");
        }
    }
    page
}

fn run_session(cmd: SessionCommand, sessions: &FileSessionStore) -> error::Result<()> {
    match cmd {
        SessionCommand::Set { user_id, token } => sessions.save(&Session::new(user_id, token)),
        SessionCommand::Clear => sessions.clear(),
        SessionCommand::Show => {
            match sessions.load() {
                Some(s) => println!("{}", s.user_id()),
                None => println!("signed out"),
            }
            Ok(())
        }
    }
}

/// Read a JSON record passed in as navigation state.
async fn read_record<T: serde::de::DeserializeOwned>(path: &Path) -> error::Result<T> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[instrument(level = "info", skip_all, fields(output = ?output.output))]
async fn write_page(output: &OutputArgs, page: &str) -> error::Result<()> {
    match &output.output {
        Some(path) => {
            tokio::fs::write(path, page).await?;
            info!(path = %path.display(), bytes = page.len(), "Wrote page");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(page.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
