use std::path::{Path, PathBuf};

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;

/// Community tags put in front of every upload
pub const BASE_TAGS: [&str; 3] = ["lsf", "livestreamfails", "twitch"];

/// Description of a clip, as reported by the downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipMetadata {
    pub channel: String,
    pub game: String,
    pub source_url: String,
    /// File extension of the source, with the leading dot.
    /// Empty if the source has none.
    pub suffix: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInfo {
    video_qualities: Vec<RawQuality>,
    broadcaster: Option<RawBroadcaster>,
    game: Option<RawGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuality {
    #[serde(rename = "sourceURL")]
    source_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBroadcaster {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RawGame {
    name: String,
}

impl ClipMetadata {
    /// Parse the JSON printed by `twitch-dl info --json`.
    ///
    /// The second quality variant is the one the suffix is taken from.
    pub fn from_info_json(json: &str) -> Result<Self> {
        let info: RawInfo = serde_json::from_str(json)
            .into_diagnostic()
            .wrap_err("Could not parse the clip info")?;

        let quality = info
            .video_qualities
            .get(1)
            .ok_or_else(|| miette!("Only {} quality variants", info.video_qualities.len()))?;
        let channel = info
            .broadcaster
            .ok_or_else(|| miette!("No broadcaster"))?
            .display_name;
        let game = info.game.ok_or_else(|| miette!("No game"))?.name;

        Ok(Self {
            channel,
            game,
            suffix: url_suffix(&quality.source_url),
            source_url: quality.source_url.clone(),
        })
    }

    /// File name of the downloaded clip: `(Clip) <channel> - <title><suffix>`
    pub fn file_name(&self, title: &str) -> String {
        format!(
            "(Clip) {} - {}{}",
            single_component(&self.channel),
            single_component(title),
            self.suffix
        )
    }

    /// Tags of the upload, the channel and game are always the last two
    pub fn tags(&self) -> Vec<String> {
        BASE_TAGS
            .iter()
            .map(|tag| tag.to_string())
            .chain([self.channel.clone(), self.game.clone()])
            .collect()
    }
}

/// Extension of the path part of an URL, ignoring the query and fragment
fn url_suffix(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Replace the path separators so that the text stays one path component
fn single_component(text: &str) -> String {
    text.replace(['/', '\\'], "-")
}

/// A downloaded clip, ready to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// The post URL the clip comes from
    pub url: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
}

impl Clip {
    /// The upload title: the file name without its extension
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The channel the clip was streamed on
    pub fn channel(&self) -> &str {
        self.tags
            .len()
            .checked_sub(2)
            .and_then(|idx| self.tags.get(idx))
            .map(String::as_str)
            .unwrap_or_default()
    }
}
