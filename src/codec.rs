//! 解码核心模块
//!
//! # 设计思路
//!
//! 单次前向扫描把剪贴板原始字节物化为对象图：
//! - `cursor`：持有缓冲区切片与当前位置的游标，所有定宽读取都先检查剩余字节
//! - `field`：字段编解码（基础值、枚举、UTF-16 字符串、句柄）
//! - `builder`：对象构建器，递归下降并吸收“数据不足”
//! - `value`：对象图节点
//! - `typed`：常用结构的强类型视图（`decode::<T>()`）
//! - `options`：句柄宽度与字符串上限
//!
//! 解码是纯 CPU 计算，不做 I/O；游标只属于一次解码调用，结构目录在程序启动后只读，
//! 因此不同缓冲区的解码可以在多个线程上并行，无需同步。

pub mod builder;
pub mod cursor;
pub mod field;
pub mod options;
pub mod typed;
pub mod value;

pub use builder::{ObjectBuilder, build, build_named};
pub use cursor::ByteCursor;
pub use field::{FieldContext, read_enum, read_primitive, read_utf16};
pub use options::{DecodeOptions, PointerWidth};
pub use typed::{
    BitmapInfoHeader, ClipboardStruct, DropFiles, FileDescriptor, FileGroupDescriptor, LogPalette,
    PaletteEntry, decode, decode_with, filetime_to_datetime,
};
pub use value::{DecodedField, DecodedStruct, EnumValue, FixedPoint, Value};
