//! 新旧配文合并策略
//!
//! 不变量：信息量单调不减。非空配文绝不被空候选覆盖；非空换非空只在显式
//! 质量规则下发生（身份 token 优先，其次严格更长）。

use super::has_identity;

/// 纯函数。返回 `(选中的配文, 是否替换了已有值)`，优先级自上而下：
///
/// 1. 双方为空 → `("", false)`
/// 2. 已有为空、候选非空 → 候选
/// 3. 已有非空、候选为空 → 保留已有
/// 4. 候选含身份 token 而已有不含 → 候选
/// 5. 已有含身份 token 而候选不含 → 保留已有
/// 6. 其余 → 严格更长者胜，等长保留已有
pub fn choose_media_caption(existing: &str, candidate: &str) -> (String, bool) {
    let existing_empty = existing.trim().is_empty();
    let candidate_empty = candidate.trim().is_empty();

    if existing_empty && candidate_empty {
        return (String::new(), false);
    }
    if existing_empty {
        return (candidate.to_string(), true);
    }
    if candidate_empty {
        return (existing.to_string(), false);
    }

    let existing_id = has_identity(existing);
    let candidate_id = has_identity(candidate);
    if candidate_id && !existing_id {
        return (candidate.to_string(), true);
    }
    if existing_id && !candidate_id {
        return (existing.to_string(), false);
    }

    if candidate.chars().count() > existing.chars().count() {
        (candidate.to_string(), true)
    } else {
        (existing.to_string(), false)
    }
}
