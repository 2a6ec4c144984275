//! Blog article and story detail views over a news backend API.
//!
//! Each view fetches into local state on mount, derives its sidebar and grid
//! windows from what arrived, and renders Markdown. The backend, session
//! storage and navigation are reached through the [`api::NewsApi`],
//! [`session::SessionStore`] and [`navigation::Navigator`] seams.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod navigation;
pub mod scope;
pub mod session;
pub mod utils;
pub mod views;
