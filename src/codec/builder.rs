//! # 对象构建器
//!
//! ## 设计思路
//!
//! 递归下降、单次前向扫描、不回溯：对一个顶层缓冲区只维护一个共享游标，
//! 按字段枚举的顺序把字节物化为对象图。
//!
//! Windows 剪贴板结构没有统一的长度前缀，很多实际数据比名义结构短，
//! 因此“数据不足”不是错误而是降级：
//! - 字段开始前数据已耗尽：停止处理本结构，返回已填充的部分；
//! - 定宽字段读取不足：中止**所在**结构，把部分结果逐层返回；
//! - 开放列表 / 填满剩余字节的数组：读到不足为止，残余字节丢弃。
//!
//! 只有结构描述本身的错误（未知类型、无法解析的长度引用）才会让顶层解码失败。
//!
//! ## 实现思路
//!
//! - `decode_field` 返回 `Step`：完整值、部分值（之后中止所在结构）或不存在。
//! - 数组元素是“全有或全无”：嵌套结构元素被截断时视为数据不足，不会当作损坏的元素加入列表。
//! - 嵌套深度上限用来防止自引用的结构描述无限递归。
//! - 句柄字段相对所在结构的起点按指针宽度对齐，与 Windows SDK 的默认对齐一致。
//! - 数组元素没有消费任何字节时立即结束数组，解码量始终受缓冲区长度约束。

use super::cursor::ByteCursor;
use super::field::{FieldContext, read_enum, read_primitive};
use super::options::DecodeOptions;
use super::value::{DecodedStruct, Value};
use crate::error::CodecError;
use crate::schema::catalog::MAX_NESTING;
use crate::schema::{
    Catalog, FieldInfo, Primitive, SemanticType, SizeMarker, StructDescriptor, enumerate_fields,
};

/// 单个字段的解码结果
enum Step {
    Complete(Value),
    /// 字段只解出一部分；所在结构应就此停止
    Partial(Value),
    /// 零长数组且结构不要求填满：不分配、不消费
    Absent,
}

/// 基于结构目录的对象构建器
#[derive(Debug, Clone, Copy)]
pub struct ObjectBuilder<'c> {
    catalog: &'c Catalog,
    options: DecodeOptions,
}

impl ObjectBuilder<'static> {
    /// 使用内置目录与默认选项
    pub fn builtin() -> Self {
        Self::new(Catalog::builtin(), DecodeOptions::default())
    }
}

impl<'c> ObjectBuilder<'c> {
    pub fn new(catalog: &'c Catalog, options: DecodeOptions) -> Self {
        Self { catalog, options }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// 把一个缓冲区解码为指定结构的对象图
    ///
    /// 截断的输入永远不会失败，只返回尽力而为的部分结果。
    pub fn build(
        &self,
        descriptor: &'static StructDescriptor,
        buf: &[u8],
    ) -> Result<DecodedStruct, CodecError> {
        let mut cursor = ByteCursor::new(buf);
        let decoded = self.decode_struct(descriptor, &mut cursor)?;

        log::debug!(
            "🧩 解码 {} 完成：缓冲区 {} 字节，消费 {} 字节{}",
            descriptor.name,
            buf.len(),
            cursor.position(),
            if decoded.truncated { "（数据截断）" } else { "" }
        );
        Ok(decoded)
    }

    /// 按结构名称解码
    pub fn build_named(&self, name: &str, buf: &[u8]) -> Result<DecodedStruct, CodecError> {
        let descriptor = self.catalog.resolve(name)?;
        self.build(descriptor, buf)
    }

    /// 从给定游标位置解码一个结构，游标随之前移
    pub fn decode_struct(
        &self,
        descriptor: &'static StructDescriptor,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<DecodedStruct, CodecError> {
        self.decode_struct_at_depth(descriptor, cursor, 0)
    }

    fn decode_struct_at_depth(
        &self,
        descriptor: &'static StructDescriptor,
        cursor: &mut ByteCursor<'_>,
        depth: usize,
    ) -> Result<DecodedStruct, CodecError> {
        if depth > MAX_NESTING {
            return Err(CodecError::UnsupportedSchemaType {
                structure: descriptor.name,
                field: "",
                type_name: format!("嵌套深度超过 {MAX_NESTING}"),
            });
        }

        let start = cursor.position();
        let mut node = DecodedStruct::empty(descriptor);

        for (index, info) in enumerate_fields(descriptor).enumerate() {
            if cursor.is_exhausted() {
                node.truncated = enumerate_fields(descriptor)
                    .skip(index)
                    .any(|field| field.requires_bytes() && !Self::counted_empty(&field, &node));
                if node.truncated {
                    log::debug!("{} 在字段 {} 之前数据耗尽", descriptor.name, info.name);
                }
                break;
            }

            if info.skip {
                log::trace!("跳过字段 {}.{}", descriptor.name, info.name);
                continue;
            }

            let step = self
                .align_handle(&info, cursor, start)
                .and_then(|()| self.decode_field(descriptor, &info, cursor, &node, depth));
            match step {
                Ok(Step::Complete(value)) => node.set(index, value),
                Ok(Step::Partial(value)) => {
                    node.set(index, value);
                    node.truncated = true;
                    log::debug!("{}.{} 只解出部分数据，停止本结构", descriptor.name, info.name);
                    break;
                }
                Ok(Step::Absent) => {}
                Err(err) if err.is_insufficient() => {
                    node.truncated = true;
                    log::debug!("{}.{} 数据不足：{}", descriptor.name, info.name, err);
                    break;
                }
                Err(err) => {
                    log::warn!("结构描述错误，终止解码：{}", err);
                    return Err(err);
                }
            }
        }

        Ok(node)
    }

    fn decode_field(
        &self,
        descriptor: &'static StructDescriptor,
        info: &FieldInfo,
        cursor: &mut ByteCursor<'_>,
        node: &DecodedStruct,
        depth: usize,
    ) -> Result<Step, CodecError> {
        let (Some(size), Some(element)) = (info.size, info.ty.element()) else {
            return self.decode_scalar(descriptor, info, cursor, depth);
        };

        match size {
            SizeMarker::Fixed(len) => {
                self.decode_counted(descriptor, info.name, element, len, cursor, depth)
            }
            SizeMarker::Sibling { field, extra } => {
                let raw = node
                    .get(field)
                    .and_then(Value::as_i128)
                    .ok_or(CodecError::UnresolvedCount {
                        structure: descriptor.name,
                        field: info.name,
                        sibling: field,
                    })?;
                // 负数长度按 0 处理
                let count = usize::try_from(raw.max(0))
                    .unwrap_or(usize::MAX)
                    .saturating_add(extra);
                self.decode_counted(descriptor, info.name, element, count, cursor, depth)
            }
            SizeMarker::Zero if descriptor.fill_trailing => {
                self.decode_repeated(descriptor, info.name, element, cursor, depth, true)
            }
            SizeMarker::Zero => Ok(Step::Absent),
            SizeMarker::Unbounded => {
                self.decode_repeated(descriptor, info.name, element, cursor, depth, false)
            }
        }
    }

    /// 非数组字段：基础值、枚举或嵌套结构
    fn decode_scalar(
        &self,
        descriptor: &'static StructDescriptor,
        info: &FieldInfo,
        cursor: &mut ByteCursor<'_>,
        depth: usize,
    ) -> Result<Step, CodecError> {
        match *info.ty {
            SemanticType::Struct(name) => {
                let nested = self.resolve_nested(descriptor, info.name, name)?;
                let decoded = self.decode_struct_at_depth(nested, cursor, depth + 1)?;
                if decoded.truncated {
                    Ok(Step::Partial(Value::Struct(decoded)))
                } else {
                    Ok(Step::Complete(Value::Struct(decoded)))
                }
            }
            SemanticType::Primitive(_) | SemanticType::Enum(_) => self
                .decode_element(descriptor, info.name, info.ty, cursor, depth)
                .map(Step::Complete),
            _ => Err(CodecError::UnsupportedSchemaType {
                structure: descriptor.name,
                field: info.name,
                type_name: info.ty.to_string(),
            }),
        }
    }

    /// 解码一个完整的值；嵌套结构被截断时按数据不足处理
    fn decode_element(
        &self,
        descriptor: &'static StructDescriptor,
        field: &'static str,
        ty: &SemanticType,
        cursor: &mut ByteCursor<'_>,
        depth: usize,
    ) -> Result<Value, CodecError> {
        match *ty {
            SemanticType::Primitive(primitive) => {
                read_primitive(cursor, primitive, &self.field_context(descriptor))
            }
            SemanticType::Enum(spec) => read_enum(cursor, spec)
                .map(Value::Enum)
                .map_err(|err| err.at(descriptor.name, field)),
            SemanticType::Struct(name) => {
                let start = cursor.position();
                let nested = self.resolve_nested(descriptor, field, name)?;
                let decoded = self.decode_struct_at_depth(nested, cursor, depth + 1)?;
                if decoded.truncated {
                    let needed = self
                        .catalog
                        .fixed_size(nested, self.options.pointer_width)
                        .unwrap_or(cursor.position() - start + 1);
                    return Err(CodecError::InsufficientData {
                        offset: start,
                        needed,
                        remaining: cursor.len() - start,
                    });
                }
                Ok(Value::Struct(decoded))
            }
            SemanticType::FixedArray { element, len } if len > 0 => {
                let mut items = Vec::with_capacity(len.min(cursor.remaining()));
                for _ in 0..len {
                    items.push(self.decode_element(descriptor, field, element, cursor, depth)?);
                }
                Ok(Value::List(items))
            }
            _ => Err(CodecError::UnsupportedSchemaType {
                structure: descriptor.name,
                field,
                type_name: ty.to_string(),
            }),
        }
    }

    /// 已知元素个数的数组：中途不足时返回部分列表
    fn decode_counted(
        &self,
        descriptor: &'static StructDescriptor,
        field: &'static str,
        element: &SemanticType,
        count: usize,
        cursor: &mut ByteCursor<'_>,
        depth: usize,
    ) -> Result<Step, CodecError> {
        let mut items = Vec::with_capacity(count.min(cursor.remaining()));

        while items.len() < count {
            let before = cursor.position();
            match self.decode_element(descriptor, field, element, cursor, depth) {
                Ok(_) if cursor.position() == before => {
                    log::debug!(
                        "{}.{} 的元素不消费字节，在 {}/{} 项处结束",
                        descriptor.name,
                        field,
                        items.len(),
                        count
                    );
                    return Ok(Step::Partial(Value::List(items)));
                }
                Ok(value) => items.push(value),
                Err(err) if err.is_insufficient() => {
                    return Ok(Step::Partial(Value::List(items)));
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Step::Complete(Value::List(items)))
    }

    /// 没有固定个数的数组：重复解码直到数据不足（或耗尽），残余字节丢弃
    fn decode_repeated(
        &self,
        descriptor: &'static StructDescriptor,
        field: &'static str,
        element: &SemanticType,
        cursor: &mut ByteCursor<'_>,
        depth: usize,
        stop_at_end: bool,
    ) -> Result<Step, CodecError> {
        let mut items = Vec::new();

        loop {
            if stop_at_end && cursor.is_exhausted() {
                break;
            }
            let before = cursor.position();
            match self.decode_element(descriptor, field, element, cursor, depth) {
                Ok(_) if cursor.position() == before => break,
                Ok(value) => items.push(value),
                Err(err) if err.is_insufficient() => {
                    log::trace!(
                        "{}.{} 在 {} 个元素后结束，丢弃 {} 字节",
                        descriptor.name,
                        field,
                        items.len(),
                        cursor.remaining()
                    );
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Step::Complete(Value::List(items)))
    }

    /// 句柄字段前跳过对齐填充；填充本身不足时按数据不足处理
    fn align_handle(
        &self,
        info: &FieldInfo,
        cursor: &mut ByteCursor<'_>,
        start: usize,
    ) -> Result<(), CodecError> {
        if matches!(info.ty, SemanticType::Primitive(Primitive::Handle)) {
            let padding = self.options.pointer_width.padding_at(cursor.position() - start);
            cursor.take(padding)?;
        }
        Ok(())
    }

    /// 长度由兄弟字段给出且解析为 0（或负数）的数组，不需要任何字节
    fn counted_empty(info: &FieldInfo, node: &DecodedStruct) -> bool {
        match info.size {
            Some(SizeMarker::Sibling { field, extra: 0 }) => node
                .get(field)
                .and_then(Value::as_i128)
                .is_some_and(|count| count <= 0),
            _ => false,
        }
    }

    fn resolve_nested(
        &self,
        descriptor: &'static StructDescriptor,
        field: &'static str,
        name: &'static str,
    ) -> Result<&'static StructDescriptor, CodecError> {
        self.catalog
            .get(name)
            .ok_or_else(|| CodecError::UnsupportedSchemaType {
                structure: descriptor.name,
                field,
                type_name: name.to_string(),
            })
    }

    fn field_context(&self, descriptor: &StructDescriptor) -> FieldContext {
        FieldContext {
            max_string_chars: descriptor
                .max_string_chars
                .or(self.options.default_max_string_chars),
            pointer_width: self.options.pointer_width,
        }
    }
}

/// 使用内置目录与默认选项解码
pub fn build(descriptor: &'static StructDescriptor, buf: &[u8]) -> Result<DecodedStruct, CodecError> {
    ObjectBuilder::builtin().build(descriptor, buf)
}

/// 使用内置目录按名称解码
pub fn build_named(name: &str, buf: &[u8]) -> Result<DecodedStruct, CodecError> {
    ObjectBuilder::builtin().build_named(name, buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PointerWidth;
    use crate::schema::catalog::{BITMAPINFO, CIDA, DROPFILES, ENHMETAHEADER, LOGPALETTE, METAFILEPICT};
    use crate::schema::{Count, FieldDescriptor, Primitive};

    fn le32(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn dropfiles_header_decodes_fully() {
        let data = le32(&[20, 5, 7, 0, 1]);
        let decoded = build(&DROPFILES, &data).expect("decode");
        assert!(!decoded.truncated);
        assert_eq!(decoded.integer::<u32>("pFiles"), Some(20));
        let pt = decoded.nested("pt").expect("pt");
        assert_eq!(pt.integer::<i32>("x"), Some(5));
        assert_eq!(pt.integer::<i32>("y"), Some(7));
        assert_eq!(decoded.bool("fNC"), Some(false));
        assert_eq!(decoded.bool("fWide"), Some(true));
    }

    #[test]
    fn bitmapinfo_skips_color_table() {
        let mut data = le32(&[40, 2, 2]);
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&8u16.to_le_bytes());
        data.extend(le32(&[0, 0, 0, 0, 256, 0]));
        data.extend_from_slice(&[0xAA; 64]);

        let decoded = build(&BITMAPINFO, &data).expect("decode");
        let header = decoded.nested("bmiHeader").expect("header");
        assert_eq!(header.integer::<u16>("biBitCount"), Some(8));
        assert_eq!(
            header.enumeration("biCompression").map(|e| e.names.clone()),
            Some(vec!["BI_RGB"])
        );
        assert!(decoded.get("bmiColors").is_none());
        assert!(decoded.fields[1].skipped);
        assert!(!decoded.truncated);
    }

    #[test]
    fn truncated_nested_struct_stops_outer() {
        // pFiles + 半个 POINT
        let data = le32(&[20, 5]);
        let decoded = build(&DROPFILES, &data).expect("decode");
        assert!(decoded.truncated);
        assert_eq!(decoded.integer::<u32>("pFiles"), Some(20));
        let pt = decoded.nested("pt").expect("partial pt");
        assert_eq!(pt.integer::<i32>("x"), Some(5));
        assert!(pt.get("y").is_none());
        assert!(decoded.get("fNC").is_none());
    }

    #[test]
    fn enhmetaheader_tail_is_optional() {
        let data = vec![0u8; 88];
        let decoded = build(&ENHMETAHEADER, &data).expect("decode");
        assert!(decoded.truncated);
        assert!(decoded.get("nPalEntries").is_some());
        assert!(decoded.get("cbPixelFormat").is_none());
        assert!(decoded.get("szlMicrometers").is_none());
    }

    #[test]
    fn palette_uses_sibling_count() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x300u16.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 0, 4, 5, 6, 4]);
        data.extend_from_slice(&[9, 9, 9, 9]);

        let decoded = build(&LOGPALETTE, &data).expect("decode");
        let entries = decoded.list("palPalEntry").expect("entries");
        assert_eq!(entries.len(), 2);
        let second = entries[1].as_struct().expect("struct");
        assert_eq!(second.integer::<u8>("peBlue"), Some(6));
        assert!(second.enumeration("peFlags").expect("flags").has("PC_NOCOLLAPSE"));
        assert!(!decoded.truncated);
    }

    #[test]
    fn cida_offsets_include_parent_entry() {
        let data = le32(&[2, 12, 20, 30, 0xDEAD]);
        let decoded = build(&CIDA, &data).expect("decode");
        let offsets: Vec<_> = decoded
            .list("aoffset")
            .expect("offsets")
            .iter()
            .filter_map(Value::as_i128)
            .collect();
        assert_eq!(offsets, vec![12, 20, 30]);
    }

    #[test]
    fn short_counted_array_is_partial() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x300u16.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 0, 4, 5]);

        let decoded = build(&LOGPALETTE, &data).expect("decode");
        assert!(decoded.truncated);
        assert_eq!(decoded.list("palPalEntry").map(<[Value]>::len), Some(1));
    }

    #[test]
    fn handle_width_comes_from_options() {
        let mut data = le32(&[8, 100, 200]);
        data.extend_from_slice(&0x1122_3344u32.to_le_bytes());

        let catalog = Catalog::builtin();
        let narrow = ObjectBuilder::new(
            catalog,
            DecodeOptions { pointer_width: PointerWidth::Four, ..DecodeOptions::default() },
        );
        let decoded = narrow.build(&METAFILEPICT, &data).expect("decode");
        assert_eq!(decoded.get("hMF"), Some(&Value::Handle(0x1122_3344)));
        assert!(!decoded.truncated);
        assert_eq!(
            decoded.enumeration("mm").map(|e| e.names.clone()),
            Some(vec!["MM_ANISOTROPIC"])
        );

        let wide = ObjectBuilder::new(
            catalog,
            DecodeOptions { pointer_width: PointerWidth::Eight, ..DecodeOptions::default() },
        );
        let decoded = wide.build(&METAFILEPICT, &data).expect("decode");
        assert!(decoded.get("hMF").is_none());
        assert!(decoded.truncated);
    }

    #[test]
    fn metafilepict_handle_is_aligned_on_x64() {
        let mut data = le32(&[8, 100, 200, 0xCCCC_CCCC]);
        data.extend_from_slice(&0x0000_7FF0_1122_3344u64.to_le_bytes());
        assert_eq!(data.len(), 24);

        let wide = ObjectBuilder::new(
            Catalog::builtin(),
            DecodeOptions { pointer_width: PointerWidth::Eight, ..DecodeOptions::default() },
        );
        let mut cursor = ByteCursor::new(&data);
        let decoded = wide.decode_struct(&METAFILEPICT, &mut cursor).expect("decode");
        assert_eq!(decoded.get("hMF"), Some(&Value::Handle(0x0000_7FF0_1122_3344)));
        assert_eq!(decoded.integer::<i32>("yExt"), Some(200));
        assert!(!decoded.truncated);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn zero_width_elements_do_not_follow_huge_counts() {
        const DWORD: SemanticType = SemanticType::Primitive(Primitive::U32);
        static HOLLOW: StructDescriptor = StructDescriptor::new(
            "HOLLOW",
            &[FieldDescriptor::new("tail", SemanticType::TrailingArray { element: &DWORD })],
        );
        static HOLLOW_LIST: StructDescriptor = StructDescriptor::new(
            "HOLLOW_LIST",
            &[
                FieldDescriptor::new("count", DWORD),
                FieldDescriptor::new(
                    "items",
                    SemanticType::VariableArray {
                        element: &SemanticType::Struct("HOLLOW"),
                        count: Count::Field { name: "count", extra: 0 },
                    },
                ),
            ],
        );
        let catalog = Catalog::new().with(&HOLLOW).with(&HOLLOW_LIST);
        catalog.validate().expect("valid schema");

        let mut data = 2_000_000u32.to_le_bytes().to_vec();
        data.push(0xAA);
        let decoded = ObjectBuilder::new(&catalog, DecodeOptions::default())
            .build(&HOLLOW_LIST, &data)
            .expect("decode");
        assert_eq!(decoded.list("items").map(<[Value]>::len), Some(0));
        assert!(decoded.truncated);
    }

    #[test]
    fn recursive_struct_does_not_overflow() {
        const DWORD: SemanticType = SemanticType::Primitive(Primitive::U32);
        static NODE: StructDescriptor = StructDescriptor::new(
            "NODE",
            &[
                FieldDescriptor::new("v", DWORD),
                FieldDescriptor::new(
                    "kids",
                    SemanticType::FixedArray { element: &SemanticType::Struct("NODE"), len: 2 },
                ),
            ],
        );
        let catalog = Catalog::new().with(&NODE);
        let builder = ObjectBuilder::new(&catalog, DecodeOptions::default());

        let decoded = builder.build(&NODE, &[1, 0, 0, 0, 2, 0]).expect("decode");
        assert_eq!(decoded.integer::<u32>("v"), Some(1));
        assert!(decoded.truncated);

        let err = builder.build(&NODE, &[0u8; 4096]).expect_err("depth limit");
        assert!(matches!(err, CodecError::UnsupportedSchemaType { .. }));
    }

    #[test]
    fn unknown_nested_struct_is_fatal() {
        static BROKEN: StructDescriptor = StructDescriptor::new(
            "BROKEN",
            &[FieldDescriptor::new("inner", SemanticType::Struct("NOPE"))],
        );
        let err = build(&BROKEN, &[0u8; 8]).expect_err("schema error");
        assert_eq!(
            err,
            CodecError::UnsupportedSchemaType {
                structure: "BROKEN",
                field: "inner",
                type_name: "NOPE".to_string(),
            }
        );
    }

    #[test]
    fn missing_count_sibling_is_fatal() {
        const DWORD: SemanticType = SemanticType::Primitive(Primitive::U32);
        static ORPHAN: StructDescriptor = StructDescriptor::new(
            "ORPHAN",
            &[
                FieldDescriptor::new("count", DWORD).skipped(),
                FieldDescriptor::new(
                    "items",
                    SemanticType::VariableArray {
                        element: &DWORD,
                        count: Count::Field { name: "count", extra: 0 },
                    },
                ),
            ],
        );
        let err = build(&ORPHAN, &le32(&[1, 2])).expect_err("schema error");
        assert!(matches!(err, CodecError::UnresolvedCount { sibling: "count", .. }));
    }

    #[test]
    fn empty_buffer_yields_empty_node() {
        let decoded = build(&DROPFILES, &[]).expect("decode");
        assert_eq!(decoded.populated(), 0);
        assert!(decoded.truncated);
    }
}
