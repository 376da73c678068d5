use clipboard_inspector::codec::{
    ByteCursor, DecodeOptions, FieldContext, ObjectBuilder, Value, build, read_primitive,
};
use clipboard_inspector::format::classify;
use clipboard_inspector::format::standard::{CF_BITMAP, CF_DIB, CF_PALETTE};
use clipboard_inspector::schema::catalog::BITMAPINFOHEADER;
use clipboard_inspector::schema::{
    Catalog, Count, FieldDescriptor, Primitive, SemanticType, StructDescriptor,
};
use proptest::prelude::*;

const DWORD: SemanticType = SemanticType::Primitive(Primitive::U32);
const WORD: SemanticType = SemanticType::Primitive(Primitive::U16);

static ENTRY: StructDescriptor = StructDescriptor::new(
    "ENTRY",
    &[FieldDescriptor::new("a", DWORD), FieldDescriptor::new("b", DWORD)],
);

static OPEN_LIST: StructDescriptor = StructDescriptor::new(
    "OPEN_LIST",
    &[FieldDescriptor::new(
        "items",
        SemanticType::VariableArray {
            element: &SemanticType::Struct("ENTRY"),
            count: Count::Open,
        },
    )],
);

static COUNTED: StructDescriptor = StructDescriptor::new(
    "COUNTED",
    &[
        FieldDescriptor::new("count", DWORD),
        FieldDescriptor::new(
            "entries",
            SemanticType::VariableArray {
                element: &SemanticType::Struct("ENTRY"),
                count: Count::Field { name: "count", extra: 0 },
            },
        ),
    ],
);

const TRAILING_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("header", WORD),
    FieldDescriptor::new("tail", SemanticType::FixedArray { element: &WORD, len: 0 }),
];

static FILLING: StructDescriptor = StructDescriptor::new("FILLING", TRAILING_FIELDS).fill_trailing();
static NOT_FILLING: StructDescriptor = StructDescriptor::new("NOT_FILLING", TRAILING_FIELDS);

fn test_catalog() -> Catalog {
    Catalog::new()
        .with(&ENTRY)
        .with(&OPEN_LIST)
        .with(&COUNTED)
        .with(&FILLING)
        .with(&NOT_FILLING)
}

fn entry_bytes(a: u32, b: u32) -> Vec<u8> {
    let mut bytes = a.to_le_bytes().to_vec();
    bytes.extend_from_slice(&b.to_le_bytes());
    bytes
}

fn decode_one(bytes: &[u8], primitive: Primitive) -> Value {
    let mut cursor = ByteCursor::new(bytes);
    let value = read_primitive(&mut cursor, primitive, &FieldContext::default()).expect("decode");
    assert!(cursor.is_exhausted(), "{primitive:?} 没有消费全部字节");
    value
}

// ---------------------------------------------------------------------------
// 基础值往返
// ---------------------------------------------------------------------------

#[test]
fn primitive_round_trip_at_extremes() {
    assert_eq!(decode_one(&u8::MAX.to_le_bytes(), Primitive::U8), Value::U8(u8::MAX));
    assert_eq!(decode_one(&u16::MAX.to_le_bytes(), Primitive::U16), Value::U16(u16::MAX));
    assert_eq!(decode_one(&u32::MAX.to_le_bytes(), Primitive::U32), Value::U32(u32::MAX));
    assert_eq!(decode_one(&u64::MAX.to_le_bytes(), Primitive::U64), Value::U64(u64::MAX));
    assert_eq!(decode_one(&i8::MIN.to_le_bytes(), Primitive::I8), Value::I8(i8::MIN));
    assert_eq!(decode_one(&i16::MIN.to_le_bytes(), Primitive::I16), Value::I16(i16::MIN));
    assert_eq!(decode_one(&i32::MIN.to_le_bytes(), Primitive::I32), Value::I32(i32::MIN));
    assert_eq!(decode_one(&i64::MIN.to_le_bytes(), Primitive::I64), Value::I64(i64::MIN));
    assert_eq!(decode_one(&0u32.to_le_bytes(), Primitive::Bool), Value::Bool(false));
}

proptest! {
    #[test]
    fn integers_round_trip(a in any::<u16>(), b in any::<i32>(), c in any::<u64>(), d in any::<i8>()) {
        prop_assert_eq!(decode_one(&a.to_le_bytes(), Primitive::U16), Value::U16(a));
        prop_assert_eq!(decode_one(&b.to_le_bytes(), Primitive::I32), Value::I32(b));
        prop_assert_eq!(decode_one(&c.to_le_bytes(), Primitive::U64), Value::U64(c));
        prop_assert_eq!(decode_one(&d.to_le_bytes(), Primitive::I8), Value::I8(d));
    }

    #[test]
    fn doubles_round_trip(x in any::<f64>().prop_filter("NaN 不等于自身", |x| !x.is_nan())) {
        prop_assert_eq!(decode_one(&x.to_le_bytes(), Primitive::F64), Value::F64(x));
    }

    #[test]
    fn fixed_point_round_trip(raw in any::<i32>()) {
        match decode_one(&raw.to_le_bytes(), Primitive::Fixed2Dot30) {
            Value::Fixed(fixed) => prop_assert_eq!(fixed.0, raw),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // 截断降级
    // -----------------------------------------------------------------------

    #[test]
    fn truncated_header_keeps_prefix_fields(
        values in proptest::collection::vec(any::<u32>(), 11),
        len in 0usize..=40,
    ) {
        const WIDTHS: [usize; 11] = [4, 4, 4, 2, 2, 4, 4, 4, 4, 4, 4];
        let mut full = Vec::new();
        let mut expected = Vec::new();
        for (value, width) in values.iter().zip(WIDTHS) {
            let bytes = value.to_le_bytes();
            full.extend_from_slice(&bytes[..width]);
            let mut padded = [0u8; 4];
            padded[..width].copy_from_slice(&bytes[..width]);
            expected.push((padded, width));
        }

        let decoded = build(&BITMAPINFOHEADER, &full[..len]).expect("never fails on truncation");
        prop_assert_eq!(decoded.truncated, len < 40);

        let mut end = 0;
        for (field, (bytes, width)) in decoded.fields.iter().zip(expected) {
            end += width;
            let got = field.value.as_ref().and_then(Value::as_i128);
            if end <= len {
                let want = match (field.name, width) {
                    (_, 2) => i128::from(u16::from_le_bytes([bytes[0], bytes[1]])),
                    ("biWidth" | "biHeight" | "biXPelsPerMeter" | "biYPelsPerMeter", _) => {
                        i128::from(i32::from_le_bytes(bytes))
                    }
                    _ => i128::from(u32::from_le_bytes(bytes)),
                };
                prop_assert_eq!(got, Some(want), "field {}", field.name);
            } else {
                prop_assert_eq!(got, None, "field {}", field.name);
            }
        }
    }

    // -----------------------------------------------------------------------
    // 开放列表与尾随数组
    // -----------------------------------------------------------------------

    #[test]
    fn open_list_ignores_partial_trailing_element(n in 0usize..12, leftover in 1usize..8) {
        let catalog = test_catalog();
        let builder = ObjectBuilder::new(&catalog, DecodeOptions::default());
        let mut data: Vec<u8> = (0..n).flat_map(|i| entry_bytes(i as u32, 7)).collect();
        data.extend(std::iter::repeat_n(0xAB, leftover));

        let decoded = builder.build(&OPEN_LIST, &data).expect("decode");
        let items = decoded.list("items").expect("items");
        prop_assert_eq!(items.len(), n);
        prop_assert!(!decoded.truncated);
    }

    #[test]
    fn fill_policy_consumes_all_remaining_bytes(elements in 0usize..32) {
        let catalog = test_catalog();
        let builder = ObjectBuilder::new(&catalog, DecodeOptions::default());
        let data: Vec<u8> = (0..=elements as u16).flat_map(u16::to_le_bytes).collect();

        let mut cursor = ByteCursor::new(&data);
        let filled = builder.decode_struct(&FILLING, &mut cursor).expect("decode");
        prop_assert!(cursor.is_exhausted());
        // 头部之后没有字节时，尾随数组字段保持为空
        prop_assert_eq!(filled.list("tail").map_or(0, <[Value]>::len), elements);
        prop_assert!(!filled.truncated);

        let mut cursor = ByteCursor::new(&data);
        let skipped = builder.decode_struct(&NOT_FILLING, &mut cursor).expect("decode");
        prop_assert_eq!(cursor.position(), 2);
        prop_assert!(skipped.get("tail").is_none());
    }
}

// ---------------------------------------------------------------------------
// 字符串
// ---------------------------------------------------------------------------

#[test]
fn utf16_string_stops_at_embedded_null() {
    static NAMED: StructDescriptor = StructDescriptor::new(
        "NAMED",
        &[FieldDescriptor::new("name", SemanticType::Primitive(Primitive::Utf16 { max_chars: None }))],
    )
    .max_string_chars(8);

    let data: Vec<u8> = "AB\0CD".encode_utf16().flat_map(u16::to_le_bytes).collect();
    let catalog = Catalog::new().with(&NAMED);
    let decoded = ObjectBuilder::new(&catalog, DecodeOptions::default())
        .build(&NAMED, &data)
        .expect("decode");
    assert_eq!(decoded.string("name"), Some("AB"));
}

// ---------------------------------------------------------------------------
// 合成格式判定
// ---------------------------------------------------------------------------

#[test]
fn synthesis_scenario() {
    let flagged = classify(&[CF_DIB, CF_BITMAP, CF_PALETTE]);
    assert!(flagged.contains(&CF_BITMAP));
    assert!(flagged.contains(&CF_PALETTE));
    assert!(!flagged.contains(&CF_DIB));

    let reversed = classify(&[CF_BITMAP, CF_DIB]);
    assert!(!reversed.contains(&CF_BITMAP));
    assert!(!reversed.contains(&CF_DIB));
}

// ---------------------------------------------------------------------------
// 兄弟字段决定的数组长度
// ---------------------------------------------------------------------------

#[test]
fn sibling_count_bounds_the_array() {
    let catalog = test_catalog();
    let builder = ObjectBuilder::new(&catalog, DecodeOptions::default());

    let mut data = 3u32.to_le_bytes().to_vec();
    for i in 0..3 {
        data.extend(entry_bytes(i, i * 10));
    }
    data.extend_from_slice(&[0xFF; 13]);

    let decoded = builder.build(&COUNTED, &data).expect("decode");
    let entries = decoded.list("entries").expect("entries");
    assert_eq!(entries.len(), 3);
    assert!(!decoded.truncated);

    let last = entries[2].as_struct().expect("struct");
    assert_eq!(last.integer::<u32>("a"), Some(2));
    assert_eq!(last.integer::<u32>("b"), Some(20));
}
