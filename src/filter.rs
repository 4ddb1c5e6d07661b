use std::sync::OnceLock;

use regex::Regex;

use crate::{already_processed::AlreadyProcessed, skip::Skip, types::Post};

/// Links to a clip on the clip host, whatever the scheme or letter case
const CLIP_URL: &str = r#"(?i)^https?://clips\.twitch\.tv/\S+"#;

static CLIP_URL_RE: OnceLock<Regex> = OnceLock::new();

fn clip_url_re() -> &'static Regex {
    CLIP_URL_RE.get_or_init(|| Regex::new(CLIP_URL).unwrap())
}

/// Check that the post links to a clip that has not been processed yet
pub fn check(post: &Post, processed: &AlreadyProcessed) -> Result<(), Skip> {
    if !clip_url_re().is_match(&post.url) {
        Err(Skip::UnsupportedUrl)
    } else if processed.contains(&post.url) {
        Err(Skip::AlreadyProcessed)
    } else {
        Ok(())
    }
}

#[cfg(test)]
pub fn accepts(post: &Post, processed: &AlreadyProcessed) -> bool {
    check(post, processed).is_ok()
}
