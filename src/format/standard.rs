//! # 标准剪贴板格式
//!
//! Windows 预定义的 `CF_*` 格式号、格式号区间的名称，
//! 以及“格式 → 结构描述”的映射（决定某个剪贴板条目能否被结构化解码）。

use crate::schema::StructDescriptor;
use crate::schema::catalog::{
    BITMAPINFO, BITMAPV5HEADER, CIDA, DROPEFFECT, DROPFILES, FILEGROUPDESCRIPTORW, LOCALE,
    METAFILEPICT,
};

pub const CF_TEXT: u32 = 1;
pub const CF_BITMAP: u32 = 2;
pub const CF_METAFILEPICT: u32 = 3;
pub const CF_SYLK: u32 = 4;
pub const CF_DIF: u32 = 5;
pub const CF_TIFF: u32 = 6;
pub const CF_OEMTEXT: u32 = 7;
pub const CF_DIB: u32 = 8;
pub const CF_PALETTE: u32 = 9;
pub const CF_PENDATA: u32 = 10;
pub const CF_RIFF: u32 = 11;
pub const CF_WAVE: u32 = 12;
pub const CF_UNICODETEXT: u32 = 13;
pub const CF_ENHMETAFILE: u32 = 14;
pub const CF_HDROP: u32 = 15;
pub const CF_LOCALE: u32 = 16;
pub const CF_DIBV5: u32 = 17;
pub const CF_OWNERDISPLAY: u32 = 0x0080;
pub const CF_DSPTEXT: u32 = 0x0081;
pub const CF_DSPBITMAP: u32 = 0x0082;
pub const CF_DSPMETAFILEPICT: u32 = 0x0083;
pub const CF_DSPENHMETAFILE: u32 = 0x008E;

const CF_PRIVATEFIRST: u32 = 0x0200;
const CF_PRIVATELAST: u32 = 0x02FF;
const CF_GDIOBJFIRST: u32 = 0x0300;
const CF_GDIOBJLAST: u32 = 0x03FF;
const REGISTERED_FIRST: u32 = 0xC000;
const REGISTERED_LAST: u32 = 0xFFFF;

const STANDARD_NAMES: &[(u32, &str)] = &[
    (CF_TEXT, "CF_TEXT"),
    (CF_BITMAP, "CF_BITMAP"),
    (CF_METAFILEPICT, "CF_METAFILEPICT"),
    (CF_SYLK, "CF_SYLK"),
    (CF_DIF, "CF_DIF"),
    (CF_TIFF, "CF_TIFF"),
    (CF_OEMTEXT, "CF_OEMTEXT"),
    (CF_DIB, "CF_DIB"),
    (CF_PALETTE, "CF_PALETTE"),
    (CF_PENDATA, "CF_PENDATA"),
    (CF_RIFF, "CF_RIFF"),
    (CF_WAVE, "CF_WAVE"),
    (CF_UNICODETEXT, "CF_UNICODETEXT"),
    (CF_ENHMETAFILE, "CF_ENHMETAFILE"),
    (CF_HDROP, "CF_HDROP"),
    (CF_LOCALE, "CF_LOCALE"),
    (CF_DIBV5, "CF_DIBV5"),
    (CF_OWNERDISPLAY, "CF_OWNERDISPLAY"),
    (CF_DSPTEXT, "CF_DSPTEXT"),
    (CF_DSPBITMAP, "CF_DSPBITMAP"),
    (CF_DSPMETAFILEPICT, "CF_DSPMETAFILEPICT"),
    (CF_DSPENHMETAFILE, "CF_DSPENHMETAFILE"),
];

/// 格式号所属的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Standard,
    /// `CF_PRIVATEFIRST..=CF_PRIVATELAST`，数据随剪贴板清空而释放
    Private,
    /// `CF_GDIOBJFIRST..=CF_GDIOBJLAST`，数据是 GDI 对象句柄
    GdiObject,
    /// `RegisterClipboardFormat` 注册的格式
    Registered,
    Unknown,
}

pub fn format_kind(id: u32) -> FormatKind {
    match id {
        _ if STANDARD_NAMES.iter().any(|(known, _)| *known == id) => FormatKind::Standard,
        CF_PRIVATEFIRST..=CF_PRIVATELAST => FormatKind::Private,
        CF_GDIOBJFIRST..=CF_GDIOBJLAST => FormatKind::GdiObject,
        REGISTERED_FIRST..=REGISTERED_LAST => FormatKind::Registered,
        _ => FormatKind::Unknown,
    }
}

/// 预定义格式的常量名；私有与 GDI 区间给出相对区间起点的编号。
///
/// 注册格式的名称只能由系统查询得到，这里返回 `None`。
pub fn standard_format_name(id: u32) -> Option<String> {
    if let Some((_, name)) = STANDARD_NAMES.iter().find(|(known, _)| *known == id) {
        return Some((*name).to_string());
    }
    match format_kind(id) {
        FormatKind::Private => Some(format!("CF_PRIVATEFIRST+{}", id - CF_PRIVATEFIRST)),
        FormatKind::GdiObject => Some(format!("CF_GDIOBJFIRST+{}", id - CF_GDIOBJFIRST)),
        _ => None,
    }
}

/// 展示用名称：优先使用采集时得到的名称
pub fn format_display_name(id: u32, captured: Option<&str>) -> String {
    match captured.filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => standard_format_name(id).unwrap_or_else(|| format!("0x{id:04X}")),
    }
}

/// 找出可以解码该格式数据的结构描述。
///
/// 预定义格式按格式号匹配，注册格式按名称匹配（名称大小写不敏感）。
pub fn descriptor_for_format(id: u32, name: Option<&str>) -> Option<&'static StructDescriptor> {
    let by_id = match id {
        CF_DIB => Some(&BITMAPINFO),
        CF_DIBV5 => Some(&BITMAPV5HEADER),
        CF_HDROP => Some(&DROPFILES),
        CF_LOCALE => Some(&LOCALE),
        CF_METAFILEPICT => Some(&METAFILEPICT),
        _ => None,
    };
    if by_id.is_some() || format_kind(id) != FormatKind::Registered {
        return by_id;
    }

    let name = name?;
    let registered: &[(&str, &'static StructDescriptor)] = &[
        ("FileGroupDescriptorW", &FILEGROUPDESCRIPTORW),
        ("Shell IDList Array", &CIDA),
        ("Preferred DropEffect", &DROPEFFECT),
        ("Performed DropEffect", &DROPEFFECT),
        ("Paste Succeeded", &DROPEFFECT),
    ];
    registered
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, descriptor)| *descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cover_ranges() {
        assert_eq!(standard_format_name(CF_DIB).as_deref(), Some("CF_DIB"));
        assert_eq!(standard_format_name(0x0203).as_deref(), Some("CF_PRIVATEFIRST+3"));
        assert_eq!(standard_format_name(0x0300).as_deref(), Some("CF_GDIOBJFIRST+0"));
        assert_eq!(standard_format_name(0xC123), None);
        assert_eq!(format_kind(0xC123), FormatKind::Registered);
        assert_eq!(format_kind(0x0100), FormatKind::Unknown);
    }

    #[test]
    fn display_name_prefers_captured_name() {
        assert_eq!(format_display_name(0xC0F1, Some("HTML Format")), "HTML Format");
        assert_eq!(format_display_name(0xC0F1, None), "0xC0F1");
        assert_eq!(format_display_name(CF_HDROP, Some("")), "CF_HDROP");
    }

    #[test]
    fn descriptors_by_id_and_name() {
        assert_eq!(descriptor_for_format(CF_DIB, None).map(|d| d.name), Some("BITMAPINFO"));
        assert_eq!(descriptor_for_format(CF_TEXT, None), None);
        assert_eq!(
            descriptor_for_format(0xC0A1, Some("filegroupdescriptorw")).map(|d| d.name),
            Some("FILEGROUPDESCRIPTORW")
        );
        // 预定义格式号不受名称影响
        assert_eq!(descriptor_for_format(CF_TEXT, Some("Shell IDList Array")), None);
    }
}
