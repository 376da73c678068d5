//! # 字段编解码
//!
//! ## 设计思路
//!
//! 从游标读取一个声明类型的基础值，并向前移动游标。
//! 每次定宽读取都先检查剩余字节，不足时返回 `InsufficientData`，游标保持不动，
//! 由调用方（对象构建器）决定是截断结构还是结束列表。
//!
//! ## 实现思路
//!
//! - 所有整数均按小端读取。
//! - 字符串始终按 UTF-16 解释，消费 `min(上限, 剩余字节 / 2) * 2` 字节，
//!   在第一个 NUL 处截断，结果中绝不含 NUL。
//! - 枚举先按底层宽度读整数，再映射到符号；未知值保留原值。
//! - 句柄宽度由解码选项决定，只作为不透明数值，从不解引用。

use super::cursor::ByteCursor;
use super::options::PointerWidth;
use super::value::{EnumValue, FixedPoint, Value};
use crate::error::CodecError;
use crate::schema::{EnumSpec, Primitive};

/// 读取单个字段时需要的上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldContext {
    /// 字段自身未声明上限时的字符串最大字符数
    pub max_string_chars: Option<usize>,
    pub pointer_width: PointerWidth,
}

impl Default for FieldContext {
    fn default() -> Self {
        Self {
            max_string_chars: None,
            pointer_width: PointerWidth::native(),
        }
    }
}

/// 读取一个基础值
pub fn read_primitive(
    cursor: &mut ByteCursor<'_>,
    primitive: Primitive,
    ctx: &FieldContext,
) -> Result<Value, CodecError> {
    let value = match primitive {
        Primitive::U8 => Value::U8(u8::from_le_bytes(cursor.take_array()?)),
        Primitive::U16 => Value::U16(u16::from_le_bytes(cursor.take_array()?)),
        Primitive::U32 => Value::U32(u32::from_le_bytes(cursor.take_array()?)),
        Primitive::U64 => Value::U64(u64::from_le_bytes(cursor.take_array()?)),
        Primitive::I8 => Value::I8(i8::from_le_bytes(cursor.take_array()?)),
        Primitive::I16 => Value::I16(i16::from_le_bytes(cursor.take_array()?)),
        Primitive::I32 => Value::I32(i32::from_le_bytes(cursor.take_array()?)),
        Primitive::I64 => Value::I64(i64::from_le_bytes(cursor.take_array()?)),
        Primitive::Fixed2Dot30 => {
            Value::Fixed(FixedPoint(i32::from_le_bytes(cursor.take_array()?)))
        }
        Primitive::Bool => Value::Bool(u32::from_le_bytes(cursor.take_array()?) != 0),
        Primitive::F64 => Value::F64(f64::from_le_bytes(cursor.take_array()?)),
        Primitive::Handle => Value::Handle(read_handle(cursor, ctx.pointer_width)?),
        Primitive::Utf16 { max_chars } => {
            Value::Str(read_utf16(cursor, max_chars.or(ctx.max_string_chars)))
        }
    };
    log::trace!("读取 {} 完成，游标位于 {}", primitive.type_name(), cursor.position());
    Ok(value)
}

fn read_handle(cursor: &mut ByteCursor<'_>, width: PointerWidth) -> Result<u64, CodecError> {
    match width {
        PointerWidth::Four => Ok(u64::from(u32::from_le_bytes(cursor.take_array()?))),
        PointerWidth::Eight => Ok(u64::from_le_bytes(cursor.take_array()?)),
    }
}

/// 读取底层整数并统一为 `i64`；非整数底层类型返回 `None`
fn read_integer(cursor: &mut ByteCursor<'_>, backing: Primitive) -> Result<Option<i64>, CodecError> {
    let raw = match backing {
        Primitive::U8 => i64::from(u8::from_le_bytes(cursor.take_array()?)),
        Primitive::U16 => i64::from(u16::from_le_bytes(cursor.take_array()?)),
        Primitive::U32 => i64::from(u32::from_le_bytes(cursor.take_array()?)),
        Primitive::U64 => u64::from_le_bytes(cursor.take_array()?) as i64,
        Primitive::I8 => i64::from(i8::from_le_bytes(cursor.take_array()?)),
        Primitive::I16 => i64::from(i16::from_le_bytes(cursor.take_array()?)),
        Primitive::I32 => i64::from(i32::from_le_bytes(cursor.take_array()?)),
        Primitive::I64 => i64::from_le_bytes(cursor.take_array()?),
        _ => return Ok(None),
    };
    Ok(Some(raw))
}

/// 读取一个枚举值。
///
/// 底层类型不是整数属于结构描述错误，返回 `UnsupportedSchemaType`，
/// 结构名与字段名由构建器补全。
pub fn read_enum(
    cursor: &mut ByteCursor<'_>,
    spec: &'static EnumSpec,
) -> Result<EnumValue, CodecError> {
    match read_integer(cursor, spec.backing)? {
        Some(raw) => Ok(EnumValue::new(spec, raw)),
        None => Err(CodecError::UnsupportedSchemaType {
            structure: "",
            field: "",
            type_name: format!("{}({})", spec.name, spec.backing.type_name()),
        }),
    }
}

/// 读取 UTF-16 字符串
///
/// `max_chars` 为 `None` 时读到缓冲区末尾。奇数的最后一个字节不会被消费。
pub fn read_utf16(cursor: &mut ByteCursor<'_>, max_chars: Option<usize>) -> String {
    let available = cursor.remaining() / 2;
    let chars = max_chars.map_or(available, |max| max.min(available));
    let bytes = cursor.take_up_to(chars * 2);

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();

    let mut text = String::from_utf16_lossy(&units);
    // 有损解码不会产生 NUL，这里保证结果不含 NUL
    text.retain(|c| c != '\0');
    text
}
