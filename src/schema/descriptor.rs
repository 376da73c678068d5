//! # 结构描述与字段枚举
//!
//! ## 设计思路
//!
//! 每个 Windows 剪贴板结构对应一个静态的 `StructDescriptor`：
//! 有序字段表 + 两个结构级策略（尾随零长数组是否填满剩余字节、字符串默认最大长度）。
//! 字段顺序就是字节布局顺序，也就是解析顺序，不能随意调整。
//!
//! ## 实现思路
//!
//! - 字段表在编译期写成 `static` 数组，不依赖任何运行期反射。
//! - `enumerate_fields` 把字段表展开为 `FieldInfo`，为数组字段附上长度标记，
//!   构建器只需要消费这份列表。

use super::types::{Count, SemanticType};

/// 结构中的一个字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: SemanticType,
    /// 标记为“不处理”：只占位，不消耗字节，由展示层另行提供数据
    pub skip: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, ty: SemanticType) -> Self {
        Self { name, ty, skip: false }
    }

    pub const fn skipped(self) -> Self {
        Self { skip: true, ..self }
    }
}

/// 一个 Windows 剪贴板结构的模式
#[derive(Debug, PartialEq, Eq)]
pub struct StructDescriptor {
    /// 稳定名称，用于文档查找与错误信息
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
    /// 尾随零长数组是否改为消费剩余全部字节
    pub fill_trailing: bool,
    /// 字段未给出长度时，字符串的默认最大字符数
    pub max_string_chars: Option<usize>,
}

impl StructDescriptor {
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self {
            name,
            fields,
            fill_trailing: false,
            max_string_chars: None,
        }
    }

    pub const fn fill_trailing(self) -> Self {
        Self { fill_trailing: true, ..self }
    }

    pub const fn max_string_chars(self, chars: usize) -> Self {
        Self {
            max_string_chars: Some(chars),
            ..self
        }
    }

    /// 按名称查找字段下标
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// 数组字段的长度标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMarker {
    /// 固定正整数个元素
    Fixed(usize),
    /// 零：构建时按结构策略决定跳过或填满
    Zero,
    /// 由此前已解码的兄弟字段决定
    Sibling { field: &'static str, extra: usize },
    /// 无可解析长度，读到数据不足为止
    Unbounded,
}

/// 字段枚举结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub ty: &'static SemanticType,
    /// 仅数组字段有长度标记
    pub size: Option<SizeMarker>,
    pub skip: bool,
}

impl FieldInfo {
    fn from_descriptor(field: &'static FieldDescriptor) -> Self {
        let size = match field.ty {
            SemanticType::FixedArray { len: 0, .. } | SemanticType::TrailingArray { .. } => {
                Some(SizeMarker::Zero)
            }
            SemanticType::FixedArray { len, .. } => Some(SizeMarker::Fixed(len)),
            SemanticType::VariableArray {
                count: Count::Field { name, extra },
                ..
            } => Some(SizeMarker::Sibling { field: name, extra }),
            SemanticType::VariableArray {
                count: Count::Open, ..
            } => Some(SizeMarker::Unbounded),
            _ => None,
        };

        Self {
            name: field.name,
            ty: &field.ty,
            size,
            skip: field.skip,
        }
    }

    /// 字段在数据耗尽时是否仍“欠着”字节
    ///
    /// 跳过字段、尾随数组与开放列表在空数据下都是合法的空值。
    pub fn requires_bytes(&self) -> bool {
        !self.skip && !matches!(self.size, Some(SizeMarker::Zero | SizeMarker::Unbounded))
    }
}

/// 按声明顺序枚举字段
pub fn enumerate_fields(descriptor: &'static StructDescriptor) -> impl Iterator<Item = FieldInfo> {
    descriptor.fields.iter().map(FieldInfo::from_descriptor)
}
