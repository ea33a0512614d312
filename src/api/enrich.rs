//! 配文补全任务的对外入口

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use log::info;

use crate::core::batch::{BatchDriver, EnrichError, RunConfig, RunSummary, SnapshotStore};
use crate::core::caption::CaptionEngine;

/// 一次配文补全运行
///
/// ```ignore
/// let engine = CaptionEngine::new(
///     Box::new(HttpFetcher::new()),
///     RecognitionAdapter::new(ocr, speech, audio),
///     Box::new(opener),
/// );
/// let job = EnrichmentJob::new("posts.json", engine);
/// let summary = job.run(&RunConfig::default(), &cancel_flag)?;
/// ```
pub struct EnrichmentJob {
    driver: BatchDriver,
}

impl EnrichmentJob {
    pub fn new(snapshot_path: impl Into<PathBuf>, engine: CaptionEngine) -> Self {
        let store = SnapshotStore::new(snapshot_path);
        info!("📋 EnrichmentJob: snapshot at {}", store.path().display());
        Self {
            driver: BatchDriver::new(store, engine),
        }
    }

    /// 同步跑完整个批次。`cancel` 置位后会在当前记录处理完后停下、
    /// 保存进度并以 [`EnrichError::Interrupted`] 返回。
    pub fn run(&self, config: &RunConfig, cancel: &AtomicBool) -> Result<RunSummary, EnrichError> {
        self.driver.run(config, cancel)
    }
}
