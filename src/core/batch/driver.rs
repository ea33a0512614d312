//! 批处理驱动
//!
//! 整个运行是一个状态机：LOADED → PROCESSING → {COMPLETED | INTERRUPTED}
//! → PERSISTED。取消信号只在记录之间检查，不会打断单条记录的处理。

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};

use super::store::SnapshotStore;
use super::EnrichError;
use crate::core::caption::CaptionEngine;
use crate::models::PostRecord;

/// 运行范围配置
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// 跳过决策表，强制重跑识别
    pub force_reprocess: bool,
    /// 最多处理多少条记录，0 = 不限
    pub test_limit: usize,
    /// 只处理这一条记录；不存在则在处理开始前报错
    pub target_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub processed: usize,
    pub updated: usize,
    pub persisted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RunState {
    Loaded,
    Processing,
    Completed,
    Interrupted,
    Persisted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Loaded => "LOADED",
            RunState::Processing => "PROCESSING",
            RunState::Completed => "COMPLETED",
            RunState::Interrupted => "INTERRUPTED",
            RunState::Persisted => "PERSISTED",
        };
        f.write_str(name)
    }
}

pub struct BatchDriver {
    store: SnapshotStore,
    engine: CaptionEngine,
}

impl BatchDriver {
    pub fn new(store: SnapshotStore, engine: CaptionEngine) -> Self {
        Self { store, engine }
    }

    /// 跑完整个批次。中断时先持久化再把中断重新抛给调用方。
    pub fn run(&self, config: &RunConfig, cancel: &AtomicBool) -> Result<RunSummary, EnrichError> {
        let mut records = self.store.load()?;
        let baseline = fingerprint(&records)?;
        let mut state = RunState::Loaded;
        info!("🚦 {} ({} records)", state, records.len());

        let indices: Vec<usize> = match &config.target_identifier {
            Some(target) => {
                let idx = records
                    .iter()
                    .position(|r| r.ident() == *target)
                    .ok_or_else(|| EnrichError::TargetMissing(target.clone()))?;
                vec![idx]
            }
            None => (0..records.len()).collect(),
        };

        state = RunState::Processing;
        info!("🚦 {} ({} targets)", state, indices.len());

        let mut processed = 0usize;
        let mut updated = 0usize;
        let mut interrupted = false;

        for idx in indices {
            if cancel.load(Ordering::SeqCst) {
                interrupted = true;
                break;
            }
            if config.test_limit > 0 && processed >= config.test_limit {
                debug!("🧪 test_limit {} reached", config.test_limit);
                break;
            }

            let ident = records[idx].ident();
            match self
                .engine
                .process_target_post(&mut records[idx], config.force_reprocess)
            {
                Ok(true) => {
                    updated += 1;
                    info!("✅ {}: caption updated", ident);
                }
                Ok(false) => debug!("⏭️ {}: unchanged", ident),
                Err(e) => error!("❌ 记录 {} 处理失败，跳过: {}", ident, e),
            }
            processed += 1;
        }

        if interrupted {
            state = RunState::Interrupted;
            warn!("🚦 {} after {} records", state, processed);

            // 计数器可能少报（记录被顺带改动）也可能多报，
            // 结构化对比才是脏判定的依据
            let dirty = updated > 0 || fingerprint(&records)? != baseline;
            if dirty {
                self.store.save(&records)?;
                info!("🚦 {}", RunState::Persisted);
            }
            return Err(EnrichError::Interrupted { persisted: dirty });
        }

        state = RunState::Completed;
        info!("🚦 {}: {} processed, {} updated", state, processed, updated);

        let persisted = updated > 0;
        if persisted {
            self.store.save(&records)?;
            info!("🚦 {}", RunState::Persisted);
        } else {
            info!("📭 Nothing updated, skipping snapshot write");
        }

        Ok(RunSummary {
            processed,
            updated,
            persisted,
        })
    }
}

/// 集合的结构化指纹：按（标识, 序列化内容）整体排序后对比，
/// 与记录顺序无关，同标识的重复记录按多重集合处理
fn fingerprint(records: &[PostRecord]) -> Result<Vec<(String, String)>, EnrichError> {
    let mut items = records
        .iter()
        .map(|r| Ok((r.ident(), serde_json::to_string(r)?)))
        .collect::<Result<Vec<_>, EnrichError>>()?;
    items.sort();
    Ok(items)
}
