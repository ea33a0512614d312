//! 是否重跑 OCR 的决策表

use super::has_identity;

/// 低于此长度的配文视为信息量不足
pub const MIN_CAPTION_LEN: usize = 20;

/// 决策表按行求值，首个命中生效：
///
/// 1. force → 跑
/// 2. 没有媒体 URL → 不跑
/// 3. 已有配文非空且非纯空白 → 不跑（成本控制捷径，见 DESIGN.md）
/// 4. 配文为空 → 跑
/// 5. 配文短于阈值 → 跑
/// 6. 无身份标记 且 配文不含身份 token → 跑
/// 7. 其余 → 不跑
pub fn should_run_ocr(
    existing: Option<&str>,
    identity_marker: Option<&str>,
    media_urls: &[String],
    force: bool,
) -> bool {
    if force {
        return true;
    }
    if media_urls.is_empty() {
        return false;
    }

    let caption = existing.unwrap_or("");
    if !caption.trim().is_empty() {
        return false;
    }
    if caption.is_empty() {
        return true;
    }
    if caption.chars().count() < MIN_CAPTION_LEN {
        return true;
    }

    let marker_missing = identity_marker.map_or(true, |m| m.trim().is_empty());
    if marker_missing && !has_identity(caption) {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://cdn/{}.jpg", i)).collect()
    }

    #[test]
    fn test_force_always_runs() {
        assert!(should_run_ocr(Some("已有很长的一段配文内容在这里"), Some("123"), &[], true));
    }

    #[test]
    fn test_no_urls_never_runs() {
        assert!(!should_run_ocr(None, None, &[], false));
        assert!(!should_run_ocr(Some(""), None, &[], false));
    }

    #[test]
    fn test_empty_caption_runs() {
        assert!(should_run_ocr(None, None, &urls(1), false));
        assert!(should_run_ocr(Some(""), None, &urls(1), false));
    }

    #[test]
    fn test_nonempty_caption_short_circuits() {
        // 非空配文直接视为已充实，后面的长度/身份细则不再生效
        assert!(!should_run_ocr(Some("短"), None, &urls(1), false));
        assert!(!should_run_ocr(Some("没有身份标记的长配文但依然不会重跑识别"), None, &urls(1), false));
    }

    #[test]
    fn test_whitespace_caption_runs() {
        assert!(should_run_ocr(Some("   "), None, &urls(1), false));
        assert!(should_run_ocr(Some("\n\t"), Some("123"), &urls(1), false));
    }

    #[test]
    fn test_decision_table_combinations() {
        // {force, 无URL, 配文空, 配文短, 无身份标记} 的组合逐一核对
        let cases: &[(bool, usize, Option<&str>, Option<&str>, bool)] = &[
            // force 优先于一切
            (true, 0, None, None, true),
            (true, 2, Some("完整且足够长的配文内容已经存在了"), Some("1"), true),
            // 无 URL 时除 force 外都不跑
            (false, 0, None, None, false),
            (false, 0, Some(""), None, false),
            // 空配文跑
            (false, 1, None, None, true),
            (false, 1, Some(""), Some("123"), true),
            // 非空非空白配文不跑，无论长短、有无身份标记
            (false, 1, Some("abc"), None, false),
            (false, 3, Some("一段没有任何身份信息但足够长的描述文字"), None, false),
        ];

        for (i, (force, n, caption, marker, expected)) in cases.iter().enumerate() {
            let got = should_run_ocr(*caption, *marker, &urls(*n), *force);
            assert_eq!(got, *expected, "case #{} 失败: {:?}", i, cases[i]);
        }
    }
}
