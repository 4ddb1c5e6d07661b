use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    outside::ClipDownloader,
    skip::Skip,
    types::{Clip, ClipMetadata, Post},
};

/// Turn accepted posts into clips on disk
pub struct ClipFetcher<D> {
    downloader: D,
    out_dir: PathBuf,
}

impl<D: ClipDownloader> ClipFetcher<D> {
    pub fn new(downloader: D, out_dir: &Path) -> Self {
        Self {
            downloader,
            out_dir: out_dir.to_path_buf(),
        }
    }

    #[cfg(test)]
    pub(crate) fn downloader(&self) -> &D {
        &self.downloader
    }

    /// Query the metadata of the post clip then download it.
    ///
    /// Any downloader error makes the post skipped.
    pub fn fetch(&self, post: &Post) -> Result<Clip, Skip> {
        let info = self
            .downloader
            .get_info(&post.url)
            .map_err(|err| Skip::DownloaderFailed(format!("{err:?}")))?;

        let metadata = ClipMetadata::from_info_json(&info)
            .map_err(|err| Skip::MalformedMetadata(format!("{err:?}")))?;
        debug!("channel = {}", metadata.channel);
        debug!("game    = {}", metadata.game);
        debug!("source  = {}", metadata.source_url);

        let path = self.out_dir.join(metadata.file_name(&post.title));

        info!("Downloading: {}", post.url);
        self.downloader
            .download(&post.url, &path)
            .map_err(|err| Skip::DownloaderFailed(format!("{err:?}")))?;
        info!("Downloaded: {}", path.display());

        Ok(Clip {
            url: post.url.clone(),
            path,
            tags: metadata.tags(),
        })
    }
}
