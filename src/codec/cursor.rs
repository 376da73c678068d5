//! # 字节游标
//!
//! 持有被解码缓冲区的切片与当前位置，整个顶层解码共享同一个游标，只向前移动。

use crate::error::CodecError;

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// 读取恰好 `n` 字节；不足时返回 `InsufficientData` 且不移动游标。
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(self.insufficient(n));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// 最多读取 `n` 字节，从不失败
    pub fn take_up_to(&mut self, n: usize) -> &'a [u8] {
        let n = n.min(self.remaining());
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        slice
    }

    /// 构造当前位置的“数据不足”错误
    pub fn insufficient(&self, needed: usize) -> CodecError {
        CodecError::InsufficientData {
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }
}
