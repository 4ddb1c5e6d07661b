use std::fmt::Display;

/// Why a post was not turned into an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// The post does not link to a clip
    UnsupportedUrl,

    /// The clip has been uploaded by a previous run
    AlreadyProcessed,

    /// The downloader exited with an error
    DownloaderFailed(String),

    /// The downloader metadata lacks a needed field
    MalformedMetadata(String),
}

impl Skip {
    /// Whether the skip is expected on every run and not worth reporting.
    ///
    /// Other skips point at a clip that could not be handled and are reported.
    pub fn is_routine(&self) -> bool {
        matches!(self, Skip::UnsupportedUrl | Skip::AlreadyProcessed)
    }
}

impl Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Skip::UnsupportedUrl => write!(f, "not a clip link"),
            Skip::AlreadyProcessed => write!(f, "already processed"),
            Skip::DownloaderFailed(reason) => write!(f, "downloader failed: {reason}"),
            Skip::MalformedMetadata(reason) => write!(f, "malformed metadata: {reason}"),
        }
    }
}
