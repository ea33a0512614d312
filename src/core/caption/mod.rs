//! 配文决策引擎
//!
//! 决定一条记录是否值得重跑昂贵的识别，以及新候选配文如何与已有值合并
//! 而不让质量回退。

pub mod decision;
pub mod engine;
pub mod merge;

use once_cell::sync::Lazy;
use regex::Regex;

pub use decision::{should_run_ocr, MIN_CAPTION_LEN};
pub use engine::{CaptionEngine, ProcessError};
pub use merge::choose_media_caption;

/// 身份 token 启发式：`ID123` / `id: 4567` 或 `@某个账号名`。
/// 命中说明识别出了结构化、大概率正确的文本，视为高质量信号。
static IDENTITY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bid[:：]?\s*\d{2,}|@[A-Za-z0-9_]{2,}").unwrap());

pub fn has_identity(text: &str) -> bool {
    IDENTITY_PATTERN.is_match(text)
}
