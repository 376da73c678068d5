//! # 语义类型
//!
//! ## 设计思路
//!
//! 语义类型描述“一段字节如何映射成一个值”，与任何宿主语言的类型系统无关。
//! 所有分支在编写结构描述时就已确定（封闭的和类型），构建器只需对有限的标签做 `match`，
//! 不存在运行期类型探测。
//!
//! ## 实现思路
//!
//! - 所有类型都是 `Copy` 且只持有 `&'static` 引用，可直接写进 `static` 表。
//! - 嵌套结构按名称引用（`Struct("RGBQUAD")`），由 `Catalog` 在解码时解析；
//!   名称解析失败即视为结构描述错误。

use std::fmt;

/// 固定布局的基础值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    /// 4 字节定点数（FXPT2DOT30：2 位整数 + 30 位小数）
    Fixed2Dot30,
    /// 指针宽度的不透明句柄（4 或 8 字节，取决于解码选项）
    Handle,
    /// Windows `BOOL`，4 字节，非零即真
    Bool,
    F64,
    /// UTF-16 字符串，最多 `max_chars` 个代码单元，在此范围内以 NUL 结尾。
    ///
    /// `max_chars` 为 `None` 时使用结构描述的策略上限。
    Utf16 { max_chars: Option<usize> },
}

impl Primitive {
    /// 固定宽度（字节）。句柄与字符串的宽度依赖上下文，返回 `None`。
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::Fixed2Dot30 | Self::Bool => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::Handle | Self::Utf16 { .. } => None,
        }
    }

    /// 是否可以作为枚举的底层整数类型
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::I8 | Self::I16 | Self::I32 | Self::I64
        )
    }

    /// 诊断信息中使用的 Windows 风格类型名
    pub fn type_name(self) -> &'static str {
        match self {
            Self::U8 => "BYTE",
            Self::U16 => "WORD",
            Self::U32 => "DWORD",
            Self::U64 => "ULONGLONG",
            Self::I8 => "CHAR",
            Self::I16 => "SHORT",
            Self::I32 => "LONG",
            Self::I64 => "LONGLONG",
            Self::Fixed2Dot30 => "FXPT2DOT30",
            Self::Handle => "HANDLE",
            Self::Bool => "BOOL",
            Self::F64 => "DOUBLE",
            Self::Utf16 { .. } => "WCHAR[]",
        }
    }
}

/// 由整数支撑的枚举
///
/// 未列出的整数值不会被拒绝：厂商注册格式经常使用未文档化的组合，原值会被保留。
#[derive(Debug, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: &'static str,
    /// 底层整数宽度与符号
    pub backing: Primitive,
    pub variants: &'static [(i64, &'static str)],
    /// 是否按位标志解释
    pub flags: bool,
}

impl EnumSpec {
    /// 精确匹配一个符号名
    pub fn lookup(&self, raw: i64) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|(value, _)| *value == raw)
            .map(|(_, name)| *name)
    }

    /// 按位拆分标志，返回命中的符号名以及无法命名的剩余位
    pub fn split_flags(&self, raw: i64) -> (Vec<&'static str>, u64) {
        let bits = raw as u64;
        if bits == 0 {
            return (self.lookup(0).into_iter().collect(), 0);
        }
        let mut names = Vec::new();
        let mut leftover = bits;
        for (value, name) in self.variants {
            let mask = *value as u64;
            if mask != 0 && bits & mask == mask {
                names.push(*name);
                leftover &= !mask;
            }
        }
        (names, leftover)
    }
}

/// 变长数组的元素个数来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// 同一结构中此前已解码字段的值，再加上 `extra`
    ///
    /// 例如 `CIDA::aoffset` 的个数是 `cidl + 1`。
    Field { name: &'static str, extra: usize },
    /// 没有可解析的长度：一直读到数据不足为止
    Open,
}

/// 字段的语义类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Primitive(Primitive),
    Enum(&'static EnumSpec),
    /// 按名称引用的嵌套结构
    Struct(&'static str),
    /// 固定长度数组；`len == 0` 时与 `TrailingArray` 等价
    FixedArray {
        element: &'static SemanticType,
        len: usize,
    },
    VariableArray {
        element: &'static SemanticType,
        count: Count,
    },
    /// 声明为零长度的尾随数组（`ANYSIZE_ARRAY` 风格），是否填满剩余字节由结构描述决定
    TrailingArray { element: &'static SemanticType },
}

impl SemanticType {
    /// 数组类字段的元素类型
    pub fn element(&self) -> Option<&'static SemanticType> {
        match self {
            Self::FixedArray { element, .. }
            | Self::VariableArray { element, .. }
            | Self::TrailingArray { element } => Some(*element),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(Primitive::Utf16 { max_chars: Some(n) }) => write!(f, "WCHAR[{n}]"),
            Self::Primitive(p) => f.write_str(p.type_name()),
            Self::Enum(spec) => write!(f, "{}({})", spec.name, spec.backing.type_name()),
            Self::Struct(name) => f.write_str(name),
            Self::FixedArray { element, len } => write!(f, "{element}[{len}]"),
            Self::VariableArray { element, count: Count::Field { name, extra: 0 } } => {
                write!(f, "{element}[{name}]")
            }
            Self::VariableArray { element, count: Count::Field { name, extra } } => {
                write!(f, "{element}[{name}+{extra}]")
            }
            Self::VariableArray { element, count: Count::Open } => write!(f, "{element}[..]"),
            Self::TrailingArray { element } => write!(f, "{element}[]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAGS: EnumSpec = EnumSpec {
        name: "TEST_FLAGS",
        backing: Primitive::U32,
        variants: &[(0, "NONE"), (1, "A"), (2, "B"), (0x8000_0000, "HIGH")],
        flags: true,
    };

    #[test]
    fn split_flags_keeps_unknown_bits() {
        let (names, leftover) = FLAGS.split_flags(0x8000_0011);
        assert_eq!(names, vec!["A", "HIGH"]);
        assert_eq!(leftover, 0x10);
    }

    #[test]
    fn split_flags_zero_uses_zero_variant() {
        let (names, leftover) = FLAGS.split_flags(0);
        assert_eq!(names, vec!["NONE"]);
        assert_eq!(leftover, 0);
    }

    #[test]
    fn display_names_array_shapes() {
        const BYTE: SemanticType = SemanticType::Primitive(Primitive::U8);
        let ty = SemanticType::VariableArray {
            element: &BYTE,
            count: Count::Field { name: "cidl", extra: 1 },
        };
        assert_eq!(ty.to_string(), "BYTE[cidl+1]");
        assert_eq!(SemanticType::TrailingArray { element: &BYTE }.to_string(), "BYTE[]");
    }
}
