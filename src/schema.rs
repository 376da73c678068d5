//! 结构模式模块
//!
//! # 设计思路
//!
//! 用静态声明的模式表代替运行期反射：每个 Windows 剪贴板结构是一份有序字段表，
//! 字段的语义类型是封闭的和类型，在编写表时就已确定。
//!
//! - `types`：语义类型标签（基础值、枚举、嵌套结构、三类数组）
//! - `descriptor`：结构描述、字段描述与字段枚举（`enumerate_fields`）
//! - `catalog`：内置 Windows 结构目录与名称索引

pub mod catalog;
pub mod descriptor;
pub mod types;

pub use catalog::Catalog;
pub use descriptor::{FieldDescriptor, FieldInfo, SizeMarker, StructDescriptor, enumerate_fields};
pub use types::{Count, EnumSpec, Primitive, SemanticType};
