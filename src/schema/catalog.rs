//! # 内置结构目录
//!
//! ## 设计思路
//!
//! 按微软公开文档逐字节复刻常见剪贴板结构：位图头、文件拖放头、调色板、
//! 图元文件头、颜色空间、Shell ID 列表等。字段名保持 Windows SDK 原名，
//! 便于对照文档。
//!
//! ## 实现思路
//!
//! - 结构与枚举都是编译期 `static`/`const` 表。
//! - `Catalog` 是名称 → 描述的索引；内置目录通过 `once_cell::sync::Lazy` 在首次使用时建立。
//! - 测试或调用方可以 `clone()` 内置目录后再注册自己的结构。

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::descriptor::{FieldDescriptor, StructDescriptor, enumerate_fields};
use super::types::{Count, EnumSpec, Primitive, SemanticType};
use crate::codec::PointerWidth;
use crate::error::CodecError;

// ============================================================================
// 基础类型简写
// ============================================================================

const BYTE: SemanticType = SemanticType::Primitive(Primitive::U8);
const WORD: SemanticType = SemanticType::Primitive(Primitive::U16);
const DWORD: SemanticType = SemanticType::Primitive(Primitive::U32);
const LONG: SemanticType = SemanticType::Primitive(Primitive::I32);
const BOOL: SemanticType = SemanticType::Primitive(Primitive::Bool);
const HANDLE: SemanticType = SemanticType::Primitive(Primitive::Handle);
const FXPT2DOT30: SemanticType = SemanticType::Primitive(Primitive::Fixed2Dot30);

const MAX_PATH: usize = 260;

/// 嵌套结构的最大层数，构建器与尺寸计算共用
pub(crate) const MAX_NESTING: usize = 32;
const WCHAR_MAX_PATH: SemanticType = SemanticType::Primitive(Primitive::Utf16 {
    max_chars: Some(MAX_PATH),
});

const fn field(name: &'static str, ty: SemanticType) -> FieldDescriptor {
    FieldDescriptor::new(name, ty)
}

const fn nested(name: &'static str, struct_name: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(name, SemanticType::Struct(struct_name))
}

// ============================================================================
// 枚举
// ============================================================================

pub const BITMAP_COMPRESSION: EnumSpec = EnumSpec {
    name: "BitmapCompression",
    backing: Primitive::U32,
    variants: &[
        (0, "BI_RGB"),
        (1, "BI_RLE8"),
        (2, "BI_RLE4"),
        (3, "BI_BITFIELDS"),
        (4, "BI_JPEG"),
        (5, "BI_PNG"),
        (0x0B, "BI_CMYK"),
        (0x0C, "BI_CMYKRLE8"),
        (0x0D, "BI_CMYKRLE4"),
    ],
    flags: false,
};

pub const LOGICAL_COLOR_SPACE: EnumSpec = EnumSpec {
    name: "LogicalColorSpace",
    backing: Primitive::U32,
    variants: &[
        (0, "LCS_CALIBRATED_RGB"),
        (0x7352_4742, "LCS_sRGB"),
        (0x5769_6E20, "LCS_WINDOWS_COLOR_SPACE"),
        (0x4C49_4E4B, "PROFILE_LINKED"),
        (0x4D42_4544, "PROFILE_EMBEDDED"),
    ],
    flags: false,
};

pub const GAMUT_MAPPING_INTENT: EnumSpec = EnumSpec {
    name: "GamutMappingIntent",
    backing: Primitive::U32,
    variants: &[
        (1, "LCS_GM_BUSINESS"),
        (2, "LCS_GM_GRAPHICS"),
        (4, "LCS_GM_IMAGES"),
        (8, "LCS_GM_ABS_COLORIMETRIC"),
    ],
    flags: false,
};

pub const MAPPING_MODE: EnumSpec = EnumSpec {
    name: "MappingMode",
    backing: Primitive::I32,
    variants: &[
        (1, "MM_TEXT"),
        (2, "MM_LOMETRIC"),
        (3, "MM_HIMETRIC"),
        (4, "MM_LOENGLISH"),
        (5, "MM_HIENGLISH"),
        (6, "MM_TWIPS"),
        (7, "MM_ISOTROPIC"),
        (8, "MM_ANISOTROPIC"),
    ],
    flags: false,
};

pub const PALETTE_ENTRY_FLAGS: EnumSpec = EnumSpec {
    name: "PaletteEntryFlags",
    backing: Primitive::U8,
    variants: &[(1, "PC_RESERVED"), (2, "PC_EXPLICIT"), (4, "PC_NOCOLLAPSE")],
    flags: true,
};

pub const FILE_DESCRIPTOR_FLAGS: EnumSpec = EnumSpec {
    name: "FileDescriptorFlags",
    backing: Primitive::U32,
    variants: &[
        (0x0001, "FD_CLSID"),
        (0x0002, "FD_SIZEPOINT"),
        (0x0004, "FD_ATTRIBUTES"),
        (0x0008, "FD_CREATETIME"),
        (0x0010, "FD_ACCESSTIME"),
        (0x0020, "FD_WRITESTIME"),
        (0x0040, "FD_FILESIZE"),
        (0x4000, "FD_PROGRESSUI"),
        (0x8000, "FD_LINKUI"),
        (0x8000_0000, "FD_UNICODE"),
    ],
    flags: true,
};

pub const FILE_ATTRIBUTES: EnumSpec = EnumSpec {
    name: "FileAttributes",
    backing: Primitive::U32,
    variants: &[
        (0x0001, "FILE_ATTRIBUTE_READONLY"),
        (0x0002, "FILE_ATTRIBUTE_HIDDEN"),
        (0x0004, "FILE_ATTRIBUTE_SYSTEM"),
        (0x0010, "FILE_ATTRIBUTE_DIRECTORY"),
        (0x0020, "FILE_ATTRIBUTE_ARCHIVE"),
        (0x0040, "FILE_ATTRIBUTE_DEVICE"),
        (0x0080, "FILE_ATTRIBUTE_NORMAL"),
        (0x0100, "FILE_ATTRIBUTE_TEMPORARY"),
        (0x0200, "FILE_ATTRIBUTE_SPARSE_FILE"),
        (0x0400, "FILE_ATTRIBUTE_REPARSE_POINT"),
        (0x0800, "FILE_ATTRIBUTE_COMPRESSED"),
        (0x1000, "FILE_ATTRIBUTE_OFFLINE"),
        (0x2000, "FILE_ATTRIBUTE_NOT_CONTENT_INDEXED"),
        (0x4000, "FILE_ATTRIBUTE_ENCRYPTED"),
    ],
    flags: true,
};

pub const DROP_EFFECT: EnumSpec = EnumSpec {
    name: "DropEffect",
    backing: Primitive::U32,
    variants: &[
        (0, "DROPEFFECT_NONE"),
        (1, "DROPEFFECT_COPY"),
        (2, "DROPEFFECT_MOVE"),
        (4, "DROPEFFECT_LINK"),
        (0x8000_0000, "DROPEFFECT_SCROLL"),
    ],
    flags: true,
};

// ============================================================================
// 通用小结构
// ============================================================================

pub static POINT: StructDescriptor =
    StructDescriptor::new("POINT", &[field("x", LONG), field("y", LONG)]);

pub static POINTL: StructDescriptor =
    StructDescriptor::new("POINTL", &[field("x", LONG), field("y", LONG)]);

pub static SIZEL: StructDescriptor =
    StructDescriptor::new("SIZEL", &[field("cx", LONG), field("cy", LONG)]);

pub static RECTL: StructDescriptor = StructDescriptor::new(
    "RECTL",
    &[
        field("left", LONG),
        field("top", LONG),
        field("right", LONG),
        field("bottom", LONG),
    ],
);

pub static GUID: StructDescriptor = StructDescriptor::new(
    "GUID",
    &[
        field("Data1", DWORD),
        field("Data2", WORD),
        field("Data3", WORD),
        field("Data4", SemanticType::FixedArray { element: &BYTE, len: 8 }),
    ],
);

pub static FILETIME: StructDescriptor = StructDescriptor::new(
    "FILETIME",
    &[field("dwLowDateTime", DWORD), field("dwHighDateTime", DWORD)],
);

// ============================================================================
// 位图
// ============================================================================

pub static RGBQUAD: StructDescriptor = StructDescriptor::new(
    "RGBQUAD",
    &[
        field("rgbBlue", BYTE),
        field("rgbGreen", BYTE),
        field("rgbRed", BYTE),
        field("rgbReserved", BYTE),
    ],
);

pub static BITMAPINFOHEADER: StructDescriptor = StructDescriptor::new(
    "BITMAPINFOHEADER",
    &[
        field("biSize", DWORD),
        field("biWidth", LONG),
        field("biHeight", LONG),
        field("biPlanes", WORD),
        field("biBitCount", WORD),
        field("biCompression", SemanticType::Enum(&BITMAP_COMPRESSION)),
        field("biSizeImage", DWORD),
        field("biXPelsPerMeter", LONG),
        field("biYPelsPerMeter", LONG),
        field("biClrUsed", DWORD),
        field("biClrImportant", DWORD),
    ],
);

/// `CF_DIB` 的内容：信息头之后是颜色表与像素，颜色表交由展示层按位深单独处理。
pub static BITMAPINFO: StructDescriptor = StructDescriptor::new(
    "BITMAPINFO",
    &[
        nested("bmiHeader", "BITMAPINFOHEADER"),
        field(
            "bmiColors",
            SemanticType::TrailingArray {
                element: &SemanticType::Struct("RGBQUAD"),
            },
        )
        .skipped(),
    ],
);

pub static CIEXYZ: StructDescriptor = StructDescriptor::new(
    "CIEXYZ",
    &[
        field("ciexyzX", FXPT2DOT30),
        field("ciexyzY", FXPT2DOT30),
        field("ciexyzZ", FXPT2DOT30),
    ],
);

pub static CIEXYZTRIPLE: StructDescriptor = StructDescriptor::new(
    "CIEXYZTRIPLE",
    &[
        nested("ciexyzRed", "CIEXYZ"),
        nested("ciexyzGreen", "CIEXYZ"),
        nested("ciexyzBlue", "CIEXYZ"),
    ],
);

pub static BITMAPV5HEADER: StructDescriptor = StructDescriptor::new(
    "BITMAPV5HEADER",
    &[
        field("bV5Size", DWORD),
        field("bV5Width", LONG),
        field("bV5Height", LONG),
        field("bV5Planes", WORD),
        field("bV5BitCount", WORD),
        field("bV5Compression", SemanticType::Enum(&BITMAP_COMPRESSION)),
        field("bV5SizeImage", DWORD),
        field("bV5XPelsPerMeter", LONG),
        field("bV5YPelsPerMeter", LONG),
        field("bV5ClrUsed", DWORD),
        field("bV5ClrImportant", DWORD),
        field("bV5RedMask", DWORD),
        field("bV5GreenMask", DWORD),
        field("bV5BlueMask", DWORD),
        field("bV5AlphaMask", DWORD),
        field("bV5CSType", SemanticType::Enum(&LOGICAL_COLOR_SPACE)),
        nested("bV5Endpoints", "CIEXYZTRIPLE"),
        field("bV5GammaRed", DWORD),
        field("bV5GammaGreen", DWORD),
        field("bV5GammaBlue", DWORD),
        field("bV5Intent", SemanticType::Enum(&GAMUT_MAPPING_INTENT)),
        field("bV5ProfileData", DWORD),
        field("bV5ProfileSize", DWORD),
        field("bV5Reserved", DWORD),
    ],
);

pub static LOGCOLORSPACEW: StructDescriptor = StructDescriptor::new(
    "LOGCOLORSPACEW",
    &[
        field("lcsSignature", DWORD),
        field("lcsVersion", DWORD),
        field("lcsSize", DWORD),
        field("lcsCSType", SemanticType::Enum(&LOGICAL_COLOR_SPACE)),
        field("lcsIntent", SemanticType::Enum(&GAMUT_MAPPING_INTENT)),
        nested("lcsEndpoints", "CIEXYZTRIPLE"),
        field("lcsGammaRed", DWORD),
        field("lcsGammaGreen", DWORD),
        field("lcsGammaBlue", DWORD),
        field("lcsFilename", WCHAR_MAX_PATH),
    ],
);

// ============================================================================
// 调色板
// ============================================================================

pub static PALETTEENTRY: StructDescriptor = StructDescriptor::new(
    "PALETTEENTRY",
    &[
        field("peRed", BYTE),
        field("peGreen", BYTE),
        field("peBlue", BYTE),
        field("peFlags", SemanticType::Enum(&PALETTE_ENTRY_FLAGS)),
    ],
);

pub static LOGPALETTE: StructDescriptor = StructDescriptor::new(
    "LOGPALETTE",
    &[
        field("palVersion", WORD),
        field("palNumEntries", WORD),
        field(
            "palPalEntry",
            SemanticType::VariableArray {
                element: &SemanticType::Struct("PALETTEENTRY"),
                count: Count::Field { name: "palNumEntries", extra: 0 },
            },
        ),
    ],
);

// ============================================================================
// 图元文件
// ============================================================================

/// `CF_METAFILEPICT`。`hMF` 按指针宽度对齐：64 位下前面有 4 字节填充，整个结构 24 字节。
pub static METAFILEPICT: StructDescriptor = StructDescriptor::new(
    "METAFILEPICT",
    &[
        field("mm", SemanticType::Enum(&MAPPING_MODE)),
        field("xExt", LONG),
        field("yExt", LONG),
        field("hMF", HANDLE),
    ],
);

/// 早期版本的头只有 88 或 100 字节，缺失的尾部字段保持为空。
pub static ENHMETAHEADER: StructDescriptor = StructDescriptor::new(
    "ENHMETAHEADER",
    &[
        field("iType", DWORD),
        field("nSize", DWORD),
        nested("rclBounds", "RECTL"),
        nested("rclFrame", "RECTL"),
        field("dSignature", DWORD),
        field("nVersion", DWORD),
        field("nBytes", DWORD),
        field("nRecords", DWORD),
        field("nHandles", WORD),
        field("sReserved", WORD),
        field("nDescription", DWORD),
        field("offDescription", DWORD),
        field("nPalEntries", DWORD),
        nested("szlDevice", "SIZEL"),
        nested("szlMillimeters", "SIZEL"),
        field("cbPixelFormat", DWORD),
        field("offPixelFormat", DWORD),
        field("bOpenGL", BOOL),
        nested("szlMicrometers", "SIZEL"),
    ],
);

// ============================================================================
// Shell 格式
// ============================================================================

/// `CF_HDROP`。文件名列表位于 `pFiles` 偏移处，见 `format::hdrop`。
pub static DROPFILES: StructDescriptor = StructDescriptor::new(
    "DROPFILES",
    &[
        field("pFiles", DWORD),
        nested("pt", "POINT"),
        field("fNC", BOOL),
        field("fWide", BOOL),
    ],
);

pub static FILEDESCRIPTORW: StructDescriptor = StructDescriptor::new(
    "FILEDESCRIPTORW",
    &[
        field("dwFlags", SemanticType::Enum(&FILE_DESCRIPTOR_FLAGS)),
        nested("clsid", "GUID"),
        nested("sizel", "SIZEL"),
        nested("pointl", "POINTL"),
        field("dwFileAttributes", SemanticType::Enum(&FILE_ATTRIBUTES)),
        nested("ftCreationTime", "FILETIME"),
        nested("ftLastAccessTime", "FILETIME"),
        nested("ftLastWriteTime", "FILETIME"),
        field("nFileSizeHigh", DWORD),
        field("nFileSizeLow", DWORD),
        field("cFileName", WCHAR_MAX_PATH),
    ],
);

pub static FILEGROUPDESCRIPTORW: StructDescriptor = StructDescriptor::new(
    "FILEGROUPDESCRIPTORW",
    &[
        field("cItems", DWORD),
        field(
            "fgd",
            SemanticType::VariableArray {
                element: &SemanticType::Struct("FILEDESCRIPTORW"),
                count: Count::Field { name: "cItems", extra: 0 },
            },
        ),
    ],
);

/// `Shell IDList Array`：`aoffset` 有 `cidl + 1` 项，第一项指向父文件夹。
pub static CIDA: StructDescriptor = StructDescriptor::new(
    "CIDA",
    &[
        field("cidl", DWORD),
        field(
            "aoffset",
            SemanticType::VariableArray {
                element: &DWORD,
                count: Count::Field { name: "cidl", extra: 1 },
            },
        ),
    ],
);

/// `Preferred DropEffect` / `Performed DropEffect`
pub static DROPEFFECT: StructDescriptor = StructDescriptor::new(
    "DROPEFFECT",
    &[field("dwEffect", SemanticType::Enum(&DROP_EFFECT))],
);

/// `CF_LOCALE`
pub static LOCALE: StructDescriptor = StructDescriptor::new("LOCALE", &[field("lcid", DWORD)]);

static BUILTIN_DESCRIPTORS: [&StructDescriptor; 23] = [
    &POINT,
    &POINTL,
    &SIZEL,
    &RECTL,
    &GUID,
    &FILETIME,
    &RGBQUAD,
    &BITMAPINFOHEADER,
    &BITMAPINFO,
    &CIEXYZ,
    &CIEXYZTRIPLE,
    &BITMAPV5HEADER,
    &LOGCOLORSPACEW,
    &PALETTEENTRY,
    &LOGPALETTE,
    &METAFILEPICT,
    &ENHMETAHEADER,
    &DROPFILES,
    &FILEDESCRIPTORW,
    &FILEGROUPDESCRIPTORW,
    &CIDA,
    &DROPEFFECT,
    &LOCALE,
];

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    let mut catalog = Catalog::new();
    for descriptor in BUILTIN_DESCRIPTORS {
        catalog.register(descriptor);
    }
    catalog
});

// ============================================================================
// 目录
// ============================================================================

/// 结构名称 → 结构描述的索引
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<&'static str, &'static StructDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置的 Windows 结构目录
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// 注册结构描述，同名时覆盖
    pub fn register(&mut self, descriptor: &'static StructDescriptor) {
        self.entries.insert(descriptor.name, descriptor);
    }

    pub fn with(mut self, descriptor: &'static StructDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&'static StructDescriptor> {
        self.entries.get(name).copied()
    }

    pub fn resolve(&self, name: &str) -> Result<&'static StructDescriptor, CodecError> {
        self.get(name)
            .ok_or_else(|| CodecError::UnknownStructure(name.to_string()))
    }

    /// 按字母序列出所有结构名
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 校验目录中每个结构：嵌套引用可解析且不成环、长度引用指向此前的整数字段、枚举底层为整数。
    pub fn validate(&self) -> Result<(), CodecError> {
        for name in self.names() {
            let descriptor = self.resolve(name)?;
            for (index, info) in enumerate_fields(descriptor).enumerate() {
                self.validate_type(descriptor, info.name, info.ty)?;

                if let SemanticType::VariableArray {
                    count: Count::Field { name: sibling, .. },
                    ..
                } = info.ty
                {
                    let earlier = &descriptor.fields[..index];
                    let is_integer = earlier.iter().any(|f| {
                        f.name == *sibling
                            && match f.ty {
                                SemanticType::Primitive(p) => p.is_integer(),
                                SemanticType::Enum(_) => true,
                                _ => false,
                            }
                    });
                    if !is_integer {
                        return Err(CodecError::UnresolvedCount {
                            structure: descriptor.name,
                            field: info.name,
                            sibling: *sibling,
                        });
                    }
                }
            }
            self.check_cycles(descriptor, &mut Vec::new())?;
        }
        Ok(())
    }

    fn validate_type(
        &self,
        descriptor: &'static StructDescriptor,
        field: &'static str,
        ty: &SemanticType,
    ) -> Result<(), CodecError> {
        let unsupported = |type_name: String| CodecError::UnsupportedSchemaType {
            structure: descriptor.name,
            field,
            type_name,
        };

        match ty {
            SemanticType::Primitive(_) => Ok(()),
            SemanticType::Enum(spec) if spec.backing.is_integer() => Ok(()),
            SemanticType::Enum(_) => Err(unsupported(ty.to_string())),
            SemanticType::Struct(name) => self
                .get(name)
                .map(|_| ())
                .ok_or_else(|| unsupported(name.to_string())),
            SemanticType::FixedArray { element, .. }
            | SemanticType::VariableArray { element, .. }
            | SemanticType::TrailingArray { element } => {
                if matches!(
                    element,
                    SemanticType::VariableArray { .. } | SemanticType::TrailingArray { .. }
                ) {
                    return Err(unsupported(ty.to_string()));
                }
                self.validate_type(descriptor, field, element)
            }
        }
    }

    /// 结构的固定字节长度；包含字符串或变长数组时返回 `None`。
    ///
    /// 句柄字段按指针宽度对齐，与构建器的读取方式一致。循环引用的结构同样返回 `None`。
    pub fn fixed_size(
        &self,
        descriptor: &'static StructDescriptor,
        pointer_width: PointerWidth,
    ) -> Option<usize> {
        self.struct_size(descriptor, pointer_width, 0)
    }

    fn struct_size(
        &self,
        descriptor: &'static StructDescriptor,
        pointer_width: PointerWidth,
        depth: usize,
    ) -> Option<usize> {
        if depth > MAX_NESTING {
            return None;
        }
        let mut offset = 0;
        for field in descriptor.fields.iter().filter(|field| !field.skip) {
            if matches!(field.ty, SemanticType::Primitive(Primitive::Handle)) {
                offset += pointer_width.padding_at(offset);
            }
            offset += self.type_size(&field.ty, pointer_width, depth)?;
        }
        Some(offset)
    }

    fn type_size(
        &self,
        ty: &SemanticType,
        pointer_width: PointerWidth,
        depth: usize,
    ) -> Option<usize> {
        match ty {
            SemanticType::Primitive(Primitive::Handle) => Some(pointer_width.bytes()),
            SemanticType::Primitive(Primitive::Utf16 { max_chars }) => max_chars.map(|n| n * 2),
            SemanticType::Primitive(p) => p.fixed_width(),
            SemanticType::Enum(spec) => spec.backing.fixed_width(),
            SemanticType::Struct(name) => {
                self.struct_size(self.get(name)?, pointer_width, depth + 1)
            }
            SemanticType::FixedArray { element, len } if *len > 0 => {
                Some(self.type_size(element, pointer_width, depth)? * len)
            }
            _ => None,
        }
    }

    /// 沿嵌套引用做深度优先遍历，结构直接或间接引用自身时报错
    fn check_cycles(
        &self,
        descriptor: &'static StructDescriptor,
        path: &mut Vec<&'static str>,
    ) -> Result<(), CodecError> {
        path.push(descriptor.name);
        for field in descriptor.fields.iter().filter(|field| !field.skip) {
            let Some(name) = referenced_struct(&field.ty) else {
                continue;
            };
            if path.contains(&name) {
                return Err(CodecError::UnsupportedSchemaType {
                    structure: descriptor.name,
                    field: field.name,
                    type_name: format!("循环引用 {} → {name}", path.join(" → ")),
                });
            }
            if let Some(nested) = self.get(name) {
                self.check_cycles(nested, path)?;
            }
        }
        path.pop();
        Ok(())
    }
}

/// 字段（或数组元素）引用的嵌套结构名
fn referenced_struct(ty: &SemanticType) -> Option<&'static str> {
    match ty {
        SemanticType::Struct(name) => Some(*name),
        SemanticType::FixedArray { element, .. }
        | SemanticType::VariableArray { element, .. }
        | SemanticType::TrailingArray { element } => referenced_struct(element),
        _ => None,
    }
}
