//! The two page views and the Markdown pieces they share.
//!
//! # Views
//!
//! - [`blog_list`]: hero article, trending sidebar and related grid over `/blog/all`
//! - [`news_details`]: session-gated story page with trending and related stories
//!
//! Both follow the same lifecycle: create, `mount` (fetch into local state),
//! `render` as often as needed, `unmount`. Nothing is cached across mounts.

pub mod blog_list;
pub mod news_details;

use std::fmt::{self, Write};

/// Placeholder for an ad slot; ad serving is handled outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdSlot {
    pub width: &'static str,
    pub height: &'static str,
}

impl AdSlot {
    pub const BANNER: AdSlot = AdSlot {
        width: "100%",
        height: "60px",
    };
    pub const SIDEBAR: AdSlot = AdSlot {
        width: "100%",
        height: "90px",
    };
}

impl fmt::Display for AdSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!-- ad slot {} x {} -->", self.width, self.height)
    }
}

/// Spinner shown while a section is waiting on the network.
pub const LOADING: &str = "_Loading..._";

/// Write an image line, `![alt](url)`.
pub(crate) fn write_image(out: &mut String, alt: &str, url: &str) -> fmt::Result {
    writeln!(out, "![{}]({})", alt, url)
}

/// Write a Markdown link whose target is a route path.
pub(crate) fn write_link(out: &mut String, prefix: &str, text: &str, target: &str) -> fmt::Result {
    writeln!(out, "{}[{}]({})", prefix, text, target)
}
