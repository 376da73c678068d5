//! 剪贴板格式模块
//!
//! # 设计思路
//!
//! 与“格式号”有关的领域知识集中在这里，解码核心只认识结构描述：
//! - `standard`：预定义 `CF_*` 格式号、名称，以及格式到结构描述的映射
//! - `synthesis`：按枚举顺序判定系统合成的格式
//! - `entry`：一次剪贴板快照及其条目
//! - `hdrop`：`CF_HDROP` 中的文件路径列表

pub mod entry;
pub mod hdrop;
pub mod standard;
pub mod synthesis;

pub use entry::{CapturedFormat, ClipboardFormatEntry, ClipboardSnapshot};
pub use hdrop::drop_file_paths;
pub use standard::{FormatKind, descriptor_for_format, format_display_name, format_kind, standard_format_name};
pub use synthesis::{ALWAYS_SYNTHESIZED, SYNTHESIS_RULES, SynthesisRule, classify, is_synthesis_target};
