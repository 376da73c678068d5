//! # 剪贴板快照
//!
//! ## 设计思路
//!
//! 每次刷新剪贴板都生成一份新的快照：采集到的格式号、名称与原始字节在构造后不可变，
//! “可能为合成”的标记在构造时由合成判定统一计算一次，此后不再修改。
//!
//! ## 实现思路
//!
//! - 原始字节使用 `bytes::Bytes` 保存，克隆条目只增加引用计数。
//! - 没有平坦内存块的格式（GDI 句柄等）`data` 为空，解码时报告为“不可解码”而不是错误。

use std::collections::BTreeSet;

use bytes::Bytes;
use serde::Serialize;

use super::standard::{descriptor_for_format, format_display_name};
use super::synthesis::classify;
use crate::codec::{DecodedStruct, ObjectBuilder};
use crate::error::CodecError;

/// 采集器交给解码核心的一项原始格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFormat {
    pub id: u32,
    pub name: Option<String>,
    pub data: Option<Bytes>,
}

impl CapturedFormat {
    pub fn new(id: u32, name: Option<String>, data: Option<Bytes>) -> Self {
        Self { id, name, data }
    }
}

/// 快照中的一个格式条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardFormatEntry {
    id: u32,
    name: String,
    #[serde(skip)]
    data: Option<Bytes>,
    size: Option<usize>,
    assumed_synthesized: bool,
}

impl ClipboardFormatEntry {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn assumed_synthesized(&self) -> bool {
        self.assumed_synthesized
    }
}

/// 按枚举顺序排列的一次剪贴板快照
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClipboardSnapshot {
    entries: Vec<ClipboardFormatEntry>,
}

impl ClipboardSnapshot {
    /// 由采集结果构造快照，`captured` 的顺序即系统枚举顺序
    pub fn from_captured(captured: Vec<CapturedFormat>) -> Self {
        let order: Vec<u32> = captured.iter().map(|format| format.id).collect();
        let synthesized: BTreeSet<u32> = classify(&order);

        let entries = captured
            .into_iter()
            .map(|format| ClipboardFormatEntry {
                id: format.id,
                name: format_display_name(format.id, format.name.as_deref()),
                size: format.data.as_ref().map(Bytes::len),
                data: format.data,
                assumed_synthesized: synthesized.contains(&format.id),
            })
            .collect::<Vec<_>>();

        log::info!(
            "📋 剪贴板快照：{} 个格式，其中 {} 个可能由系统合成",
            entries.len(),
            synthesized.len()
        );
        Self { entries }
    }

    pub fn entries(&self) -> &[ClipboardFormatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&ClipboardFormatEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn synthesized_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.assumed_synthesized)
            .map(|entry| entry.id)
    }

    /// 用格式对应的结构描述解码一个条目。
    ///
    /// 没有对应描述或没有原始字节时返回 `Ok(None)`。
    pub fn decode_entry(
        &self,
        entry: &ClipboardFormatEntry,
        builder: &ObjectBuilder<'_>,
    ) -> Result<Option<DecodedStruct>, CodecError> {
        let Some(descriptor) = descriptor_for_format(entry.id, Some(entry.name.as_str())) else {
            return Ok(None);
        };
        let Some(data) = entry.data() else {
            log::debug!("{} 没有内存数据，跳过解码", entry.name);
            return Ok(None);
        };
        builder.build(descriptor, data).map(Some)
    }
}
