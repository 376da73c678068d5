//! 文本展示模块
//!
//! 把对象图渲染为缩进文本，供命令行输出。展示字符串在这里即时生成，不缓存在对象图上。
//!
//! - 数据不足的字段显示为 `<缺失>`，结构描述标记为不处理的字段显示为 `<未处理>`
//! - 被截断的结构在类型名后标注 `（截断）`
//! - 长列表只展示前 `MAX_LIST_ITEMS` 项

use crate::codec::{DecodedStruct, Value};

const INDENT: &str = "  ";
const MAX_LIST_ITEMS: usize = 64;

/// 渲染一个结构
pub fn render_struct(decoded: &DecodedStruct) -> String {
    let mut out = String::new();
    write_struct_header(&mut out, decoded);
    out.push('\n');
    write_fields(&mut out, decoded, 1);
    out
}

fn write_struct_header(out: &mut String, decoded: &DecodedStruct) {
    out.push_str(decoded.type_name);
    if decoded.truncated {
        out.push_str("（截断）");
    }
}

fn write_fields(out: &mut String, decoded: &DecodedStruct, depth: usize) {
    for field in &decoded.fields {
        push_indent(out, depth);
        out.push_str(&format!("{}: ", field.name));
        match &field.value {
            Some(value) => write_value(out, value, depth),
            None if field.skipped => out.push_str("<未处理>\n"),
            None => out.push_str("<缺失>\n"),
        }
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Struct(nested) => {
            write_struct_header(out, nested);
            out.push('\n');
            write_fields(out, nested, depth + 1);
        }
        Value::List(items) => {
            out.push_str(&format!("[{} 项]\n", items.len()));
            for (index, item) in items.iter().take(MAX_LIST_ITEMS).enumerate() {
                push_indent(out, depth + 1);
                out.push_str(&format!("[{index}] "));
                write_value(out, item, depth + 1);
            }
            if items.len() > MAX_LIST_ITEMS {
                push_indent(out, depth + 1);
                out.push_str(&format!("…（省略 {} 项）\n", items.len() - MAX_LIST_ITEMS));
            }
        }
        other => {
            out.push_str(&format_scalar(other));
            out.push('\n');
        }
    }
}

/// 标量值的单行文本
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::Fixed(v) => format!("{:.6}", v.to_f64()),
        Value::Handle(v) => format!("0x{v:X}"),
        Value::Bool(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Str(s) => format!("{s:?}"),
        Value::Enum(e) => e.to_string(),
        Value::Struct(s) => s.type_name.to_string(),
        Value::List(items) => format!("[{} 项]", items.len()),
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::build;
    use crate::schema::catalog::{DROPFILES, LOGPALETTE};

    #[test]
    fn renders_nested_struct_and_missing_fields() {
        let mut data = Vec::new();
        data.extend_from_slice(&20u32.to_le_bytes());
        data.extend_from_slice(&5i32.to_le_bytes());
        data.extend_from_slice(&(-7i32).to_le_bytes());
        let decoded = build(&DROPFILES, &data).expect("decode");

        let text = render_struct(&decoded);
        assert!(text.starts_with("DROPFILES（截断）\n"));
        assert!(text.contains("  pFiles: 20\n"));
        assert!(text.contains("  pt: POINT\n    x: 5\n    y: -7\n"));
        assert!(text.contains("  fWide: <缺失>\n"));
    }

    #[test]
    fn renders_list_items_with_index() {
        let data = [0x00, 0x03, 0x01, 0x00, 0x10, 0x20, 0x30, 0x00];
        let decoded = build(&LOGPALETTE, &data).expect("decode");
        let text = render_struct(&decoded);
        assert!(text.contains("palPalEntry: [1 项]\n"));
        assert!(text.contains("    [0] PALETTEENTRY\n"));
        assert!(text.contains("peRed: 16\n"));
    }

    #[test]
    fn long_lists_are_capped() {
        let mut data = vec![0x00, 0x03];
        data.extend_from_slice(&70u16.to_le_bytes());
        data.extend(std::iter::repeat_n(0u8, 70 * 4));
        let decoded = build(&LOGPALETTE, &data).expect("decode");
        let text = render_struct(&decoded);
        assert!(text.contains("palPalEntry: [70 项]\n"));
        assert!(text.contains("[63] PALETTEENTRY\n"));
        assert!(!text.contains("[64] "));
        assert!(text.contains("…（省略 6 项）\n"));
    }
}
