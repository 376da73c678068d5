//! 文档查询模块
//!
//! # 设计思路
//!
//! 展示层需要给结构名与格式号附上一句说明和 Microsoft 文档链接。
//! 这是纯静态数据，首次访问时用 `once_cell::sync::Lazy` 建立索引，之后只读。

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::format::standard::{
    CF_BITMAP, CF_DIB, CF_DIBV5, CF_DIF, CF_DSPBITMAP, CF_DSPENHMETAFILE, CF_DSPMETAFILEPICT,
    CF_DSPTEXT, CF_ENHMETAFILE, CF_HDROP, CF_LOCALE, CF_METAFILEPICT, CF_OEMTEXT,
    CF_OWNERDISPLAY, CF_PALETTE, CF_PENDATA, CF_RIFF, CF_SYLK, CF_TEXT, CF_TIFF, CF_UNICODETEXT,
    CF_WAVE,
};
use crate::format::standard_format_name;

/// 一条文档记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocEntry {
    pub description: &'static str,
    pub url: &'static str,
}

const STANDARD_FORMATS_URL: &str =
    "https://learn.microsoft.com/en-us/windows/win32/dataxchg/standard-clipboard-formats";
const SHELL_FORMATS_URL: &str =
    "https://learn.microsoft.com/en-us/windows/win32/shell/clipboard";

static STRUCT_DOCS: Lazy<HashMap<&'static str, DocEntry>> = Lazy::new(|| {
    [
        (
            "BITMAPINFOHEADER",
            "设备无关位图（DIB）的尺寸与颜色格式",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-bitmapinfoheader",
        ),
        (
            "BITMAPINFO",
            "DIB 信息头加颜色表",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-bitmapinfo",
        ),
        (
            "BITMAPV5HEADER",
            "扩展的 DIB 信息头，含颜色掩码与色彩空间",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-bitmapv5header",
        ),
        (
            "RGBQUAD",
            "颜色表中的一项（蓝、绿、红、保留）",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-rgbquad",
        ),
        (
            "CIEXYZ",
            "CIE XYZ 色彩空间中的一个点（FXPT2DOT30）",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-ciexyz",
        ),
        (
            "CIEXYZTRIPLE",
            "红绿蓝三个端点的 CIEXYZ 坐标",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-ciexyztriple",
        ),
        (
            "PALETTEENTRY",
            "逻辑调色板中的一种颜色",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-paletteentry",
        ),
        (
            "LOGPALETTE",
            "逻辑调色板",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-logpalette",
        ),
        (
            "ENHMETAHEADER",
            "增强型图元文件的文件头记录",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-enhmetaheader",
        ),
        (
            "LOGCOLORSPACEW",
            "逻辑色彩空间",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-logcolorspacew",
        ),
        (
            "METAFILEPICT",
            "CF_METAFILEPICT 的图元文件图片描述",
            "https://learn.microsoft.com/en-us/windows/win32/api/wingdi/ns-wingdi-metafilepict",
        ),
        (
            "DROPFILES",
            "CF_HDROP 数据头，后接文件路径列表",
            "https://learn.microsoft.com/en-us/windows/win32/api/shlobj_core/ns-shlobj_core-dropfiles",
        ),
        (
            "POINT",
            "点的 x、y 坐标",
            "https://learn.microsoft.com/en-us/windows/win32/api/windef/ns-windef-point",
        ),
        (
            "POINTL",
            "点的 x、y 坐标（LONG）",
            "https://learn.microsoft.com/en-us/windows/win32/api/windef/ns-windef-pointl",
        ),
        (
            "RECTL",
            "矩形的左上角与右下角坐标",
            "https://learn.microsoft.com/en-us/windows/win32/api/windef/ns-windef-rectl",
        ),
        (
            "SIZEL",
            "矩形的宽与高",
            "https://learn.microsoft.com/en-us/windows/win32/api/windef/ns-windef-size",
        ),
        (
            "GUID",
            "128 位全局唯一标识符",
            "https://learn.microsoft.com/en-us/windows/win32/api/guiddef/ns-guiddef-guid",
        ),
        (
            "FILETIME",
            "自 1601-01-01（UTC）起的 100 纳秒计数",
            "https://learn.microsoft.com/en-us/windows/win32/api/minwinbase/ns-minwinbase-filetime",
        ),
        (
            "FILEDESCRIPTORW",
            "虚拟文件的属性描述",
            "https://learn.microsoft.com/en-us/windows/win32/api/shlobj_core/ns-shlobj_core-filedescriptorw",
        ),
        (
            "FILEGROUPDESCRIPTORW",
            "FileGroupDescriptorW 格式：一组虚拟文件描述",
            "https://learn.microsoft.com/en-us/windows/win32/api/shlobj_core/ns-shlobj_core-filegroupdescriptorw",
        ),
        (
            "CIDA",
            "Shell IDList Array 格式：父文件夹与各项 ITEMIDLIST 的偏移",
            "https://learn.microsoft.com/en-us/windows/win32/api/shlobj_core/ns-shlobj_core-cida",
        ),
        ("DROPEFFECT", "拖放或剪切粘贴的效果标志", SHELL_FORMATS_URL),
        ("LOCALE", "与文本关联的区域标识（LCID）", STANDARD_FORMATS_URL),
    ]
    .into_iter()
    .map(|(name, description, url)| (name, DocEntry { description, url }))
    .collect()
});

static FORMAT_DOCS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (CF_TEXT, "ANSI 文本，以 NUL 结尾"),
        (CF_BITMAP, "位图句柄（HBITMAP）"),
        (CF_METAFILEPICT, "METAFILEPICT 结构描述的图元文件图片"),
        (CF_SYLK, "Microsoft Symbolic Link 格式"),
        (CF_DIF, "Software Arts 数据交换格式"),
        (CF_TIFF, "TIFF 图像"),
        (CF_OEMTEXT, "OEM 字符集文本"),
        (CF_DIB, "BITMAPINFO 结构加位图数据"),
        (CF_PALETTE, "调色板句柄"),
        (CF_PENDATA, "笔输入扩展数据"),
        (CF_RIFF, "比 CF_WAVE 更复杂的音频数据"),
        (CF_WAVE, "标准 wave 格式音频"),
        (CF_UNICODETEXT, "UTF-16 文本，以 NUL 结尾"),
        (CF_ENHMETAFILE, "增强型图元文件句柄（HENHMETAFILE）"),
        (CF_HDROP, "文件列表（DROPFILES）"),
        (CF_LOCALE, "文本的区域标识（LCID）"),
        (CF_DIBV5, "BITMAPV5HEADER 结构加颜色掩码与位图数据"),
        (CF_OWNERDISPLAY, "由剪贴板所有者负责显示"),
        (CF_DSPTEXT, "私有格式的文本显示形式"),
        (CF_DSPBITMAP, "私有格式的位图显示形式"),
        (CF_DSPMETAFILEPICT, "私有格式的图元文件显示形式"),
        (CF_DSPENHMETAFILE, "私有格式的增强型图元文件显示形式"),
    ])
});

/// 结构名的文档记录（大小写不敏感）
pub fn struct_doc(name: &str) -> Option<DocEntry> {
    STRUCT_DOCS
        .get(name)
        .or_else(|| STRUCT_DOCS.get(name.to_ascii_uppercase().as_str()))
        .copied()
}

/// 预定义格式号的文档记录；私有与 GDI 区间给出区间说明
pub fn format_doc(id: u32) -> Option<DocEntry> {
    if let Some(description) = FORMAT_DOCS.get(&id).copied() {
        return Some(DocEntry { description, url: STANDARD_FORMATS_URL });
    }
    let name = standard_format_name(id)?;
    let description = if name.starts_with("CF_PRIVATEFIRST") {
        "应用私有格式，数据随剪贴板清空而释放"
    } else {
        "应用私有的 GDI 对象格式"
    };
    Some(DocEntry { description, url: STANDARD_FORMATS_URL })
}

/// 按名称查询：先查结构名，再查 `CF_*` 常量名，最后尝试把名称解析为格式号
pub fn lookup(name: &str) -> Option<DocEntry> {
    if let Some(entry) = struct_doc(name) {
        return Some(entry);
    }
    if let Some((id, _)) = FORMAT_DOCS
        .keys()
        .filter_map(|id| standard_format_name(*id).map(|known| (*id, known)))
        .find(|(_, known)| known.eq_ignore_ascii_case(name))
    {
        return format_doc(id);
    }
    parse_format_id(name).and_then(format_doc)
}

/// 解析十进制或 `0x` 前缀的十六进制格式号
pub fn parse_format_id(text: &str) -> Option<u32> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Catalog;

    #[test]
    fn every_builtin_struct_is_documented() {
        for name in Catalog::builtin().names() {
            let doc = struct_doc(name).unwrap_or_else(|| panic!("{name} 缺少文档"));
            assert!(doc.url.starts_with("https://learn.microsoft.com/"));
        }
    }

    #[test]
    fn lookup_by_struct_or_format_name() {
        assert!(lookup("bitmapinfoheader").expect("struct").url.contains("bitmapinfoheader"));
        assert_eq!(lookup("CF_HDROP").map(|d| d.description), Some("文件列表（DROPFILES）"));
        assert_eq!(lookup("0x0201").map(|d| d.url), Some(STANDARD_FORMATS_URL));
        assert_eq!(lookup("no-such-thing"), None);
    }

    #[test]
    fn parses_decimal_and_hex_ids() {
        assert_eq!(parse_format_id("15"), Some(15));
        assert_eq!(parse_format_id("0xC001"), Some(0xC001));
        assert_eq!(parse_format_id("zz"), None);
    }
}
