//! # 解码选项
//!
//! 句柄宽度默认跟随当前平台（`target_pointer_width`），
//! 检查来自 32 位进程的剪贴板转储时可以手动指定为 4 字节。

use serde::{Deserialize, Serialize};

/// 指针/句柄宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerWidth {
    Four,
    Eight,
}

impl PointerWidth {
    pub fn native() -> Self {
        if cfg!(target_pointer_width = "32") {
            Self::Four
        } else {
            Self::Eight
        }
    }

    pub fn from_bytes(bytes: u8) -> Option<Self> {
        match bytes {
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// 结构内偏移 `offset` 处的句柄前需要的填充字节数（句柄按自身宽度对齐）
    pub fn padding_at(self, offset: usize) -> usize {
        let width = self.bytes();
        (width - offset % width) % width
    }
}

impl Default for PointerWidth {
    fn default() -> Self {
        Self::native()
    }
}

/// 一次顶层解码的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub pointer_width: PointerWidth,
    /// 字段与结构都未给出上限时，字符串的最大字符数；`None` 表示读到缓冲区末尾
    pub default_max_string_chars: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_width_from_bytes() {
        assert_eq!(PointerWidth::from_bytes(4), Some(PointerWidth::Four));
        assert_eq!(PointerWidth::from_bytes(8), Some(PointerWidth::Eight));
        assert_eq!(PointerWidth::from_bytes(2), None);
    }

    #[test]
    fn native_width_matches_usize() {
        assert_eq!(PointerWidth::native().bytes(), std::mem::size_of::<usize>());
    }

    #[test]
    fn handle_padding_follows_width() {
        assert_eq!(PointerWidth::Eight.padding_at(12), 4);
        assert_eq!(PointerWidth::Eight.padding_at(16), 0);
        assert_eq!(PointerWidth::Four.padding_at(12), 0);
        assert_eq!(PointerWidth::Four.padding_at(6), 2);
    }
}
