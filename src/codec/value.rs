//! # 解码结果（对象图）
//!
//! ## 设计思路
//!
//! 对象图的形状与结构描述一一对应：每个字段都有一个槽位，
//! 数据耗尽、被截断或标记为“不处理”的字段槽位为空，而不是被悄悄丢掉。
//! 对象图构建完成后按约定只读，展示相关的缓存由展示层自行维护。
//!
//! ## 实现思路
//!
//! - `Value` 是封闭的和类型；`serde` 以无标签形式输出，便于 JSON 展示。
//! - `DecodedStruct` 提供按名称取值和整数转换的便捷方法，供类型化视图使用。

use std::fmt;

use serde::{Serialize, Serializer};

use crate::schema::{EnumSpec, StructDescriptor};

/// 4 字节定点数（FXPT2DOT30）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint(pub i32);

impl FixedPoint {
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(1u32 << 30)
    }
}

impl Serialize for FixedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

/// 枚举值：保留原始整数，未知值不丢弃
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub raw: i64,
    /// 命中的符号名；标志枚举可能有多个，未知值为空
    pub names: Vec<&'static str>,
    /// 标志枚举中无法命名的剩余位
    #[serde(skip_serializing_if = "is_zero")]
    pub unknown_bits: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl EnumValue {
    pub fn new(spec: &'static EnumSpec, raw: i64) -> Self {
        if spec.flags {
            let (names, unknown_bits) = spec.split_flags(raw);
            Self {
                type_name: spec.name,
                raw,
                names,
                unknown_bits,
            }
        } else {
            Self {
                type_name: spec.name,
                raw,
                names: spec.lookup(raw).into_iter().collect(),
                unknown_bits: 0,
            }
        }
    }

    pub fn is_known(&self) -> bool {
        !self.names.is_empty() && self.unknown_bits == 0
    }

    pub fn has(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.is_empty() {
            return write!(f, "{} (0x{:X})", self.raw, self.raw);
        }
        f.write_str(&self.names.join(" | "))?;
        if self.unknown_bits != 0 {
            write!(f, " | 0x{:X}", self.unknown_bits)?;
        }
        Ok(())
    }
}

/// 对象图中的一个节点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Fixed(FixedPoint),
    Handle(u64),
    Bool(bool),
    F64(f64),
    Str(String),
    Enum(EnumValue),
    Struct(DecodedStruct),
    List(Vec<Value>),
}

impl Value {
    /// 整数类值（含句柄与枚举原值）统一转为 `i128`
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::U8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::U64(v) | Self::Handle(v) => Some(i128::from(*v)),
            Self::I8(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::Enum(e) => Some(i128::from(e.raw)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&DecodedStruct> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// 结构中的一个字段槽位
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedField {
    pub name: &'static str,
    /// 未解码（数据耗尽、被截断、或按策略跳过）时为空
    pub value: Option<Value>,
    /// 结构描述标记为“不处理”
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

/// 一个结构的解码结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedStruct {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub fields: Vec<DecodedField>,
    /// 数据在需要字节的字段之前耗尽或不足
    pub truncated: bool,
}

impl DecodedStruct {
    /// 按结构描述生成全部为空的槽位
    pub fn empty(descriptor: &'static StructDescriptor) -> Self {
        Self {
            type_name: descriptor.name,
            fields: descriptor
                .fields
                .iter()
                .map(|field| DecodedField {
                    name: field.name,
                    value: None,
                    skipped: field.skip,
                })
                .collect(),
            truncated: false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .and_then(|field| field.value.as_ref())
    }

    /// 取整数字段并转换到目标宽度；缺失或越界时为 `None`
    pub fn integer<T: TryFrom<i128>>(&self, name: &str) -> Option<T> {
        self.get(name)?
            .as_i128()
            .and_then(|v| T::try_from(v).ok())
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    pub fn nested(&self, name: &str) -> Option<&DecodedStruct> {
        self.get(name)?.as_struct()
    }

    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name)?.as_list()
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumValue> {
        self.get(name)?.as_enum()
    }

    /// 已填充的字段数
    pub fn populated(&self) -> usize {
        self.fields.iter().filter(|field| field.value.is_some()).count()
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.fields.get_mut(index) {
            slot.value = Some(value);
        }
    }
}
