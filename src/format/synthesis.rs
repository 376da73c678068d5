//! # 合成格式判定
//!
//! ## 设计思路
//!
//! 应用放入剪贴板的某些格式，系统会在枚举时自动派生出其他格式
//! （例如放入 `CF_DIB` 后，`CF_BITMAP` 与 `CF_PALETTE` 通常由系统合成）。
//! 展示层需要提示用户哪些条目“可能不是源程序放入的”。
//!
//! 判定依据是一张固定的“来源 → 可合成目标”表，加上枚举顺序：
//! 系统按放入优先级枚举格式，合成格式聚集在列表末尾。
//!
//! ## 实现思路
//!
//! - 从列表末尾向前扫描。
//! - 总是视为合成的格式（`CF_LOCALE`，系统在存在文本时会重新生成）优先处理。
//! - 遇到不可能被合成的格式即停止扫描。
//! - 其余格式只有在某个来源格式出现在它**之前**时才标记为合成。
//! - 结果只是展示用的提示，不影响采集到的字节。

use std::collections::BTreeSet;

use super::standard::{
    CF_BITMAP, CF_DIB, CF_DIBV5, CF_ENHMETAFILE, CF_LOCALE, CF_METAFILEPICT, CF_OEMTEXT,
    CF_PALETTE, CF_TEXT, CF_UNICODETEXT,
};

/// 一条合成规则：`origin` 存在时系统可能派生出 `targets`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisRule {
    pub origin: u32,
    pub targets: &'static [u32],
}

pub static SYNTHESIS_RULES: &[SynthesisRule] = &[
    SynthesisRule { origin: CF_DIB, targets: &[CF_BITMAP, CF_PALETTE, CF_DIBV5] },
    SynthesisRule { origin: CF_DIBV5, targets: &[CF_BITMAP, CF_DIB, CF_PALETTE] },
    SynthesisRule { origin: CF_BITMAP, targets: &[CF_DIBV5] },
    SynthesisRule { origin: CF_ENHMETAFILE, targets: &[CF_METAFILEPICT] },
    SynthesisRule { origin: CF_METAFILEPICT, targets: &[CF_ENHMETAFILE] },
    SynthesisRule { origin: CF_TEXT, targets: &[CF_OEMTEXT, CF_UNICODETEXT] },
    SynthesisRule { origin: CF_OEMTEXT, targets: &[CF_TEXT, CF_UNICODETEXT] },
    SynthesisRule { origin: CF_UNICODETEXT, targets: &[CF_TEXT, CF_OEMTEXT] },
];

/// 无论顺序如何都视为合成的格式
pub const ALWAYS_SYNTHESIZED: &[u32] = &[CF_LOCALE];

/// 是否可能由系统合成
pub fn is_synthesis_target(id: u32) -> bool {
    SYNTHESIS_RULES.iter().any(|rule| rule.targets.contains(&id))
}

/// 可以合成 `target` 的所有来源格式
pub fn origins_of(target: u32) -> impl Iterator<Item = u32> {
    SYNTHESIS_RULES
        .iter()
        .filter(move |rule| rule.targets.contains(&target))
        .map(|rule| rule.origin)
}

/// 按枚举顺序判定哪些格式可能是系统合成的
pub fn classify(order: &[u32]) -> BTreeSet<u32> {
    let mut synthesized = BTreeSet::new();

    for (index, &id) in order.iter().enumerate().rev() {
        if ALWAYS_SYNTHESIZED.contains(&id) {
            synthesized.insert(id);
            continue;
        }
        if !is_synthesis_target(id) {
            break;
        }

        let earlier = &order[..index];
        if origins_of(id).any(|origin| earlier.contains(&origin)) {
            synthesized.insert(id);
        }
    }

    log::debug!("合成格式判定：{:?} → {:?}", order, synthesized);
    synthesized
}
