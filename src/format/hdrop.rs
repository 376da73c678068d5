//! # CF_HDROP 文件列表
//!
//! `DROPFILES` 头之后（从 `pFiles` 偏移处开始）是以 NUL 分隔、以双 NUL 结尾的路径列表。
//! `fWide` 为真时路径是 UTF-16，否则是 ANSI 文本；没有代码页信息，按 Latin-1 解释。

use crate::codec::{DropFiles, decode};
use crate::error::CodecError;

/// 读取 `CF_HDROP` 数据中的全部文件路径。
///
/// 头部不完整或 `pFiles` 越界时返回空列表；列表缺少结尾的双 NUL 时保留已读到的路径。
pub fn drop_file_paths(data: &[u8]) -> Result<Vec<String>, CodecError> {
    let header: DropFiles = decode(data)?;

    let (Some(offset), Some(wide)) = (header.files_offset, header.wide) else {
        log::debug!("DROPFILES 头部不完整（{} 字节），没有文件列表", data.len());
        return Ok(Vec::new());
    };
    let Some(list) = usize::try_from(offset).ok().and_then(|start| data.get(start..)) else {
        log::debug!("pFiles 偏移 {} 超出缓冲区（{} 字节）", offset, data.len());
        return Ok(Vec::new());
    };

    let paths = if wide { split_wide(list) } else { split_narrow(list) };
    log::debug!("📁 CF_HDROP 中读取到 {} 个文件", paths.len());
    Ok(paths)
}

fn split_wide(list: &[u8]) -> Vec<String> {
    let units: Vec<u16> = list
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    units
        .split(|&unit| unit == 0)
        .take_while(|path| !path.is_empty())
        .map(String::from_utf16_lossy)
        .collect()
}

fn split_narrow(list: &[u8]) -> Vec<String> {
    list.split(|&byte| byte == 0)
        .take_while(|path| !path.is_empty())
        .map(|path| path.iter().copied().map(char::from).collect())
        .collect()
}
