//! Two-phase materialization of a [`DedupIndex`] onto disk.
//!
//! Phase one creates every parent directory sequentially. Phase two runs one
//! task per content group, bounded by a semaphore: the group's first path is
//! downloaded and every other path receives a local copy of it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bindrop_fetch::{Downloader, HttpClient};
use bindrop_manifest::{ContentGroup, DedupIndex};
use futures_util::{StreamExt, stream::FuturesUnordered};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::error::{DropError, FailureKind, GroupFailure, MaterializeError};
use crate::options::MaterializeOptions;

const PROGRESS_INTERVAL: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    /// Distinct paths written.
    pub files: usize,
    /// Distinct content groups.
    pub unique: usize,
    /// Groups whose content was downloaded.
    pub downloaded: usize,
    /// Paths filled by a local copy instead of a download.
    pub copied: usize,
}

/// Counts finished content groups and logs every `PROGRESS_INTERVAL`th.
struct Progress {
    completed: AtomicUsize,
    total: usize,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one finished group. Returns `true` if a progress line was logged.
    fn finish_one(&self) -> bool {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let report = done % PROGRESS_INTERVAL == 0;
        if report {
            info!("processed {done} of {} unique files", self.total);
        }
        report
    }

    fn completed(&self) -> usize { self.completed.load(Ordering::Relaxed) }
}

pub struct Materializer<C: HttpClient> {
    downloader: Arc<Downloader<C>>,
    options: MaterializeOptions,
}

impl<C: HttpClient + 'static> Materializer<C> {
    pub fn new(client: C) -> Self {
        Self {
            downloader: Arc::new(Downloader::new(client)),
            options: MaterializeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MaterializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn downloader(&self) -> &Downloader<C> { &self.downloader }

    pub fn options(&self) -> MaterializeOptions { self.options }

    pub async fn run(
        &self,
        index: Arc<DedupIndex>,
        destination: &Path,
    ) -> Result<MaterializeSummary, DropError> {
        prepare_directories(&index, destination).await?;
        Ok(self.materialize_groups(index, destination).await?)
    }

    async fn materialize_groups(
        &self,
        index: Arc<DedupIndex>,
        destination: &Path,
    ) -> Result<MaterializeSummary, MaterializeError> {
        let total = index.unique_count();
        let semaphore = Arc::new(Semaphore::new(self.options.get_max_concurrent()));
        let progress = Arc::new(Progress::new(total));
        let mut tasks = FuturesUnordered::new();

        for position in 0..total {
            let index = Arc::clone(&index);
            let downloader = Arc::clone(&self.downloader);
            let semaphore = Arc::clone(&semaphore);
            let progress = Arc::clone(&progress);
            let destination = destination.to_path_buf();
            let content_id = index.blobs().groups()[position].content_id().to_string();

            let handle = tokio::spawn(async move {
                let group = &index.blobs().groups()[position];
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => materialize_group(&downloader, group, &destination).await,
                    Err(e) => Err(FailureKind::Aborted(e.to_string())),
                };

                progress.finish_one();
                result
            });
            tasks.push(async move { (content_id, handle.await) });
        }

        let mut summary = MaterializeSummary {
            files: index.file_count(),
            unique: total,
            ..MaterializeSummary::default()
        };
        let mut failures = Vec::new();

        while let Some((content_id, joined)) = tasks.next().await {
            let kind = match joined {
                Ok(Ok(copies)) => {
                    summary.downloaded += 1;
                    summary.copied += copies;
                    continue;
                }
                Ok(Err(kind)) => kind,
                Err(e) => FailureKind::Aborted(e.to_string()),
            };
            error!(content_id = %content_id, error = %kind, "content group failed");
            failures.push(GroupFailure { content_id, kind });
        }

        debug!(completed = progress.completed(), total, "all content groups finished");
        if failures.is_empty() {
            info!(
                files = summary.files,
                unique = summary.unique,
                copied = summary.copied,
                "materialization complete"
            );
            Ok(summary)
        } else {
            Err(MaterializeError { total, failures })
        }
    }
}

async fn prepare_directories(index: &DedupIndex, destination: &Path) -> Result<(), DropError> {
    for (path, _) in index.paths().iter() {
        let local = path.local(destination);
        bindrop_fs::ensure_parent_dir(&local)
            .await
            .map_err(|source| DropError::CreateDirectory { path: local, source })?;
    }
    debug!(paths = index.file_count(), "prepared destination directories");
    Ok(())
}

/// Download the group's first path, then copy it to the rest.
/// Returns the number of copies made.
async fn materialize_group<C: HttpClient>(
    downloader: &Downloader<C>,
    group: &ContentGroup,
    destination: &Path,
) -> Result<usize, FailureKind> {
    let Some((primary, duplicates)) = group.paths().split_first() else {
        return Err(FailureKind::EmptyContentGroup);
    };

    let primary_local = primary.local(destination);
    downloader
        .download(group.canonical_url(), &primary_local)
        .await
        .map_err(FailureKind::DownloadFailed)?;

    for other in duplicates {
        let local = other.local(destination);
        copy_duplicate(&primary_local, &local).await?;
    }

    Ok(duplicates.len())
}

async fn copy_duplicate(from: &Path, to: &Path) -> Result<(), FailureKind> {
    bindrop_fs::copy_new(from, to)
        .await
        .map(|_| ())
        .map_err(|source| FailureKind::LocalCopyFailed {
            from: PathBuf::from(from),
            to: PathBuf::from(to),
            source,
        })
}
