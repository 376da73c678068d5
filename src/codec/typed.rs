//! # 类型化视图
//!
//! ## 设计思路
//!
//! 对象图是通用的树，展示层可以直接遍历；但调用方经常只关心几个常见结构的几个字段。
//! `decode::<T>()` 在对象图之上提供强类型视图：每个字段都是 `Option`，
//! 截断的输入自然映射为 `None`，不需要调用方再判断对象图的形状。

use chrono::{DateTime, Utc};

use super::builder::ObjectBuilder;
use super::value::{DecodedStruct, EnumValue, Value};
use crate::error::CodecError;
use crate::schema::StructDescriptor;
use crate::schema::catalog::{BITMAPINFOHEADER, DROPFILES, FILEGROUPDESCRIPTORW, LOGPALETTE};

/// 可以从对象图构造的类型化结构
pub trait ClipboardStruct: Sized {
    fn descriptor() -> &'static StructDescriptor;

    fn from_decoded(decoded: &DecodedStruct) -> Self;
}

/// 使用内置目录解码为类型化结构
pub fn decode<T: ClipboardStruct>(buf: &[u8]) -> Result<T, CodecError> {
    decode_with(&ObjectBuilder::builtin(), buf)
}

pub fn decode_with<T: ClipboardStruct>(
    builder: &ObjectBuilder<'_>,
    buf: &[u8],
) -> Result<T, CodecError> {
    let decoded = builder.build(T::descriptor(), buf)?;
    Ok(T::from_decoded(&decoded))
}

/// FILETIME（1601-01-01 起的 100 纳秒计数）转换为 UTC 时间；全零视为未设置
pub fn filetime_to_datetime(low: u32, high: u32) -> Option<DateTime<Utc>> {
    const TICKS_PER_SECOND: u64 = 10_000_000;
    const SECONDS_1601_TO_1970: i64 = 11_644_473_600;

    let ticks = (u64::from(high) << 32) | u64::from(low);
    if ticks == 0 {
        return None;
    }
    let seconds = i64::try_from(ticks / TICKS_PER_SECOND).ok()? - SECONDS_1601_TO_1970;
    let nanos = u32::try_from((ticks % TICKS_PER_SECOND) * 100).ok()?;
    DateTime::<Utc>::from_timestamp(seconds, nanos)
}

// ============================================================================
// BITMAPINFOHEADER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitmapInfoHeader {
    pub size: Option<u32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub planes: Option<u16>,
    pub bit_count: Option<u16>,
    pub compression: Option<EnumValue>,
    pub size_image: Option<u32>,
    pub x_pels_per_meter: Option<i32>,
    pub y_pels_per_meter: Option<i32>,
    pub clr_used: Option<u32>,
    pub clr_important: Option<u32>,
}

impl BitmapInfoHeader {
    /// 信息头之后颜色表的 `RGBQUAD` 项数（含 `BI_BITFIELDS` 的三个颜色掩码）
    pub fn color_table_entries(&self) -> usize {
        let masks = match (&self.compression, self.size) {
            (Some(c), Some(40)) if c.has("BI_BITFIELDS") => 3,
            _ => 0,
        };
        let palette = match (self.clr_used, self.bit_count) {
            (Some(used), _) if used > 0 => used as usize,
            (_, Some(bits)) if bits > 0 && bits <= 8 => 1usize << bits,
            _ => 0,
        };
        masks + palette
    }

    /// 高度为负表示自上而下的位图
    pub fn is_top_down(&self) -> bool {
        self.height.is_some_and(|h| h < 0)
    }
}

impl ClipboardStruct for BitmapInfoHeader {
    fn descriptor() -> &'static StructDescriptor {
        &BITMAPINFOHEADER
    }

    fn from_decoded(decoded: &DecodedStruct) -> Self {
        Self {
            size: decoded.integer("biSize"),
            width: decoded.integer("biWidth"),
            height: decoded.integer("biHeight"),
            planes: decoded.integer("biPlanes"),
            bit_count: decoded.integer("biBitCount"),
            compression: decoded.enumeration("biCompression").cloned(),
            size_image: decoded.integer("biSizeImage"),
            x_pels_per_meter: decoded.integer("biXPelsPerMeter"),
            y_pels_per_meter: decoded.integer("biYPelsPerMeter"),
            clr_used: decoded.integer("biClrUsed"),
            clr_important: decoded.integer("biClrImportant"),
        }
    }
}

// ============================================================================
// DROPFILES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropFiles {
    /// 文件名列表相对结构起点的偏移
    pub files_offset: Option<u32>,
    pub point: Option<(i32, i32)>,
    pub non_client: Option<bool>,
    pub wide: Option<bool>,
}

impl ClipboardStruct for DropFiles {
    fn descriptor() -> &'static StructDescriptor {
        &DROPFILES
    }

    fn from_decoded(decoded: &DecodedStruct) -> Self {
        let point = decoded
            .nested("pt")
            .and_then(|pt| Some((pt.integer("x")?, pt.integer("y")?)));
        Self {
            files_offset: decoded.integer("pFiles"),
            point,
            non_client: decoded.bool("fNC"),
            wide: decoded.bool("fWide"),
        }
    }
}

// ============================================================================
// LOGPALETTE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub flags: Option<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogPalette {
    pub version: Option<u16>,
    pub declared_entries: Option<u16>,
    pub entries: Vec<PaletteEntry>,
}

impl ClipboardStruct for LogPalette {
    fn descriptor() -> &'static StructDescriptor {
        &LOGPALETTE
    }

    fn from_decoded(decoded: &DecodedStruct) -> Self {
        let entries = decoded
            .list("palPalEntry")
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_struct)
            .filter_map(|entry| {
                Some(PaletteEntry {
                    red: entry.integer("peRed")?,
                    green: entry.integer("peGreen")?,
                    blue: entry.integer("peBlue")?,
                    flags: entry.enumeration("peFlags").cloned(),
                })
            })
            .collect();

        Self {
            version: decoded.integer("palVersion"),
            declared_entries: decoded.integer("palNumEntries"),
            entries,
        }
    }
}

// ============================================================================
// FILEGROUPDESCRIPTORW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub flags: Option<EnumValue>,
    pub attributes: Option<EnumValue>,
    pub created: Option<DateTime<Utc>>,
    pub last_write: Option<DateTime<Utc>>,
    pub file_size: Option<u64>,
    pub file_name: Option<String>,
}

impl FileDescriptor {
    fn from_decoded(decoded: &DecodedStruct) -> Self {
        let time = |name: &str| {
            let ft = decoded.nested(name)?;
            filetime_to_datetime(ft.integer("dwLowDateTime")?, ft.integer("dwHighDateTime")?)
        };
        let file_size = match (
            decoded.integer::<u32>("nFileSizeHigh"),
            decoded.integer::<u32>("nFileSizeLow"),
        ) {
            (Some(high), Some(low)) => Some((u64::from(high) << 32) | u64::from(low)),
            _ => None,
        };

        Self {
            flags: decoded.enumeration("dwFlags").cloned(),
            attributes: decoded.enumeration("dwFileAttributes").cloned(),
            created: time("ftCreationTime"),
            last_write: time("ftLastWriteTime"),
            file_size,
            file_name: decoded.string("cFileName").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileGroupDescriptor {
    pub declared_items: Option<u32>,
    pub files: Vec<FileDescriptor>,
}

impl ClipboardStruct for FileGroupDescriptor {
    fn descriptor() -> &'static StructDescriptor {
        &FILEGROUPDESCRIPTORW
    }

    fn from_decoded(decoded: &DecodedStruct) -> Self {
        Self {
            declared_items: decoded.integer("cItems"),
            files: decoded
                .list("fgd")
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_struct)
                .map(FileDescriptor::from_decoded)
                .collect(),
        }
    }
}
