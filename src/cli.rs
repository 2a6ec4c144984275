//! Command-line interface definitions.
//!
//! Global options select the backend and the session file; subcommands mount
//! one of the two views or manage the stored session.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Render news pages from the backend as Markdown.
///
/// # Examples
///
/// ```sh
/// # Article page with the hero resolved from the fetched list
/// news_views blog --id 6650f1
///
/// # Story page through a shared link
/// news_views open /newsdetails/6650f1 -o story.md
///
/// # Against a local backend
/// news_views --base-url http://localhost:5000 news --id 6650f1
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, env = "NEWS_API_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Where the session (user + token) is persisted
    #[arg(long, env = "NEWS_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the blog article page
    Blog {
        /// JSON file holding the article to show as hero
        #[arg(long)]
        article: Option<PathBuf>,

        /// Article id from the route
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show a story detail page
    News {
        /// Story id from the route
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        category_id: Option<String>,

        #[arg(long)]
        tag_id: Option<String>,

        /// JSON file holding a (partial) story passed through navigation
        #[arg(long)]
        story: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Open a route path such as /newsdetails/<id> or /blogdetails/<id>
    Open {
        route: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage the stored session
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Store a session for subsequent runs
    Set {
        #[arg(long)]
        user_id: String,

        #[arg(long, env = "NEWS_SESSION_TOKEN")]
        token: String,
    },
    /// Remove the stored session
    Clear,
    /// Print the signed-in user id, if any
    Show,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the rendered Markdown here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
