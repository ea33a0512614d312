//! 批处理驱动：遍历记录集合、调用配文引擎、保证中断安全

pub mod driver;
pub mod store;

use thiserror::Error;

pub use driver::{BatchDriver, RunConfig, RunSummary};
pub use store::SnapshotStore;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("快照 IO 失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("快照 JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("目标记录不存在: {0}")]
    TargetMissing(String),
    #[error("批处理被中断（进度已保存: {persisted}）")]
    Interrupted { persisted: bool },
}
