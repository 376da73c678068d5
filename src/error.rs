//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 错误分两层：
//! - `CodecError`：解码核心内部的错误。其中 `InsufficientData` 是**可恢复**的预期情况
//!   （剪贴板数据普遍比名义结构短），由对象构建器就地吸收；其余变体都表示
//!   结构描述本身写错了，属于致命错误，必须带着字段名和类型名向上抛出。
//! - `AppError`：应用层（命令行、配置文件）的统一错误，解码错误通过 `From` 自动上转。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - `AppError` 实现 `Serialize`，序列化为人类可读字符串，便于 JSON 输出。

use serde::Serialize;

/// 解码核心错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// 剩余字节不足以读取当前字段（可恢复）
    #[error("数据不足：偏移 {offset} 处需要 {needed} 字节，仅剩 {remaining} 字节")]
    InsufficientData {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// 字段声明了无法解码的语义类型（结构描述错误）
    #[error("不支持的结构类型：{structure}.{field} 的类型 {type_name} 没有解码规则")]
    UnsupportedSchemaType {
        structure: &'static str,
        field: &'static str,
        type_name: String,
    },

    /// 按名称查找结构描述失败
    #[error("未知的结构描述：{0}")]
    UnknownStructure(String),

    /// 数组长度引用的兄弟字段不存在或不是整数（结构描述错误）
    #[error("无法解析数组长度：{structure}.{field} 引用的字段 {sibling} 未在此前解码或不是整数")]
    UnresolvedCount {
        structure: &'static str,
        field: &'static str,
        sibling: &'static str,
    },
}

impl CodecError {
    /// 是否为可恢复的“数据不足”
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    /// 为字段级编解码器产生的结构描述错误补上结构名与字段名
    pub(crate) fn at(self, structure: &'static str, field: &'static str) -> Self {
        match self {
            Self::UnsupportedSchemaType {
                structure: "",
                field: "",
                type_name,
            } => Self::UnsupportedSchemaType {
                structure,
                field,
                type_name,
            },
            other => other,
        }
    }
}

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 解码失败（仅致命的结构描述错误会到达这里）
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件内容无效
    #[error("配置错误: {0}")]
    Config(String),

    /// 命令行参数无效
    #[error("参数无效: {0}")]
    InvalidArgument(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
