//! 内存缓冲区的定偏移访问（本机字节序）

use byteorder::{ByteOrder, NativeEndian};

use crate::{MmdError, Result};

/// 在字节切片上按本机字节序顺序读取
pub struct SliceReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    /// 从 `offset` 开始读取恰好 `len` 字节的记录，越界时报错
    pub fn at(buf: &'a [u8], offset: usize, len: usize) -> Result<Self> {
        let end = offset.checked_add(len).filter(|&end| end <= buf.len());
        match end {
            Some(end) => Ok(Self {
                buf: &buf[offset..end],
                pos: 0,
            }),
            None => Err(MmdError::IndexOutOfRange {
                index: offset,
                len: buf.len(),
            }),
        }
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let buf = self.buf;
        let s = &buf[self.pos..self.pos + n];
        self.pos += n;
        s
    }

    pub fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    pub fn u16(&mut self) -> u16 {
        NativeEndian::read_u16(self.take(2))
    }

    pub fn f32(&mut self) -> f32 {
        NativeEndian::read_f32(self.take(4))
    }
}

/// 在可变字节切片上按本机字节序顺序写入
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn at(buf: &'a mut [u8], offset: usize, len: usize) -> Result<Self> {
        let total = buf.len();
        match offset.checked_add(len).filter(|&end| end <= total) {
            Some(end) => Ok(Self {
                buf: &mut buf[offset..end],
                pos: 0,
            }),
            None => Err(MmdError::IndexOutOfRange {
                index: offset,
                len: total,
            }),
        }
    }

    fn take(&mut self, n: usize) -> &mut [u8] {
        let start = self.pos;
        self.pos += n;
        &mut self.buf[start..start + n]
    }

    pub fn u8(&mut self, v: u8) {
        self.take(1)[0] = v;
    }

    pub fn u16(&mut self, v: u16) {
        NativeEndian::write_u16(self.take(2), v);
    }

    pub fn f32(&mut self, v: f32) {
        NativeEndian::write_f32(self.take(4), v);
    }
}
