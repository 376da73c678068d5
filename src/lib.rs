//! # 剪贴板结构检查器 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │           剪贴板采集方（外部：格式号 + 名称 + 原始字节）   │
//! └───────┬───────────────────────────────┬──────────────────┘
//!         ↓ 原始字节 + 结构描述            ↓ 格式号的枚举顺序
//! ┌───────┼───────────────────────────────┼──────────────────┐
//! │       ↓                               ↓                  │
//! │  ┌─ schema ──── 结构描述 / 语义类型   format             │
//! │  │   └─ catalog  内置 Windows 结构      ├─ synthesis      │
//! │  │                                     │   合成格式判定    │
//! │  ├─ codec ───── 对象构建器             ├─ standard        │
//! │  │   ├─ field    字段编解码            │   CF_* 与映射     │
//! │  │   ├─ cursor   共享游标              ├─ entry  快照      │
//! │  │   └─ typed    强类型视图            └─ hdrop  文件列表  │
//! │  │                                                       │
//! │  ├─ docs ────── 结构与格式的文档链接                     │
//! │  ├─ render ──── 缩进文本输出                             │
//! │  ├─ settings ── JSON 配置                                │
//! │  └─ error ───── CodecError / AppError                    │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ 对象图 + 合成标记
//!   展示层（命令行 / 外部界面）
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 解码错误 `CodecError` 与应用错误 `AppError` |
//! | [`schema`] | 静态结构描述、字段枚举、内置结构目录 |
//! | [`codec`] | 字段编解码、对象构建器、对象图、类型化解码 |
//! | [`format`] | 标准格式号、合成格式判定、剪贴板快照、CF_HDROP 文件列表 |
//! | [`docs`] | 结构名与格式号的说明和文档链接 |
//! | [`render`] | 对象图的缩进文本渲染 |
//! | [`settings`] | 配置文件读写与解码选项 |

pub mod codec;
pub mod docs;
pub mod error;
pub mod format;
pub mod render;
pub mod schema;
pub mod settings;

pub use codec::{DecodeOptions, DecodedStruct, ObjectBuilder, PointerWidth, Value, build, decode};
pub use error::{AppError, CodecError};
pub use format::{ClipboardSnapshot, classify};
pub use schema::{Catalog, StructDescriptor};
