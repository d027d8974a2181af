//! 小端流读取器

use std::io::{self, BufRead, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::text::{trim_nul, SjisText};
use crate::keyword::{KeywordTable, Name};
use crate::{MmdError, Result};

/// 小端二进制读取器
///
/// 记录当前区段名和已读字节数，流提前结束时报告
/// `MmdError::Truncated` 而不是裸的 IO 错误。
pub struct LeReader<R: BufRead> {
    inner: R,
    section: &'static str,
    position: u64,
}

impl<R: BufRead> LeReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            section: "header",
            position: 0,
        }
    }

    /// 切换当前区段（仅用于错误信息）
    pub fn enter(&mut self, section: &'static str) {
        self.section = section;
    }

    pub fn section(&self) -> &'static str {
        self.section
    }

    /// 已消费的字节数
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fail(&self, err: io::Error) -> MmdError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            MmdError::Truncated {
                section: self.section,
                offset: self.position,
            }
        } else {
            MmdError::Io(err)
        }
    }

    fn advance<T>(&mut self, n: u64, res: io::Result<T>) -> Result<T> {
        match res {
            Ok(v) => {
                self.position += n;
                Ok(v)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let res = self.inner.read_u8();
        self.advance(1, res)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let res = self.inner.read_u16::<LittleEndian>();
        self.advance(2, res)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let res = self.inner.read_i16::<LittleEndian>();
        self.advance(2, res)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let res = self.inner.read_u32::<LittleEndian>();
        self.advance(4, res)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let res = self.inner.read_i32::<LittleEndian>();
        self.advance(4, res)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let res = self.inner.read_f32::<LittleEndian>();
        self.advance(4, res)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        let res = self.inner.read_exact(&mut buf);
        self.advance(N as u64, res)?;
        Ok(buf)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let res = self.inner.read_exact(&mut buf);
        self.advance(len as u64, res)?;
        Ok(buf)
    }

    /// 读取定长字段并截断到第一个 NUL
    pub fn read_fixed_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = self.read_bytes(len)?;
        let end = trim_nul(&buf).len();
        buf.truncate(end);
        Ok(buf)
    }

    /// 读取定长 Shift-JIS 文本，保留原始字节
    pub fn read_text(&mut self, len: usize) -> Result<SjisText> {
        let bytes = self.read_fixed_bytes(len)?;
        SjisText::from_bytes(bytes, self.section)
    }

    /// 读取定长名称并驻留到关键字表
    pub fn read_name(&mut self, len: usize, keywords: &KeywordTable) -> Result<Name> {
        let bytes = self.read_fixed_bytes(len)?;
        keywords.intern(&bytes)
    }

    /// 精确跳过 `len` 字节
    ///
    /// 跳过的字节数与期望不一致时返回 `SkipMismatch`，
    /// 否则后续区段的流位置全部错位。
    pub fn skip(&mut self, len: u64) -> Result<()> {
        let res = io::copy(&mut (&mut self.inner).take(len), &mut io::sink());
        let actual = res.map_err(|e| self.fail(e))?;
        self.position += actual;
        if actual != len {
            return Err(MmdError::SkipMismatch {
                section: self.section,
                expected: len,
                actual,
            });
        }
        Ok(())
    }

    /// 流中是否还有数据（用于可选的尾部区段）
    pub fn has_remaining(&mut self) -> Result<bool> {
        let res = self.inner.fill_buf().map(|buf| !buf.is_empty());
        res.map_err(|e| self.fail(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_little_endian() {
        let data = [0x34, 0x12, 0x00, 0x00, 0x80, 0x3f, 0xff, 0xff];
        let mut r = LeReader::new(Cursor::new(&data[..]));
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.read_i16().unwrap(), -1);
        assert_eq!(r.position(), 8);
        assert!(!r.has_remaining().unwrap());
    }

    #[test]
    fn test_truncated_reports_section() {
        let data = [0u8; 3];
        let mut r = LeReader::new(Cursor::new(&data[..]));
        r.enter("bones");
        let err = r.read_i32().unwrap_err();
        assert!(matches!(
            err,
            MmdError::Truncated { section: "bones", offset: 0 }
        ));
    }

    #[test]
    fn test_fixed_text_trims_padding() {
        let mut data = b"Pmd\0\xfd\xfd".to_vec();
        data.push(b'x');
        let mut r = LeReader::new(Cursor::new(&data[..]));
        let text = r.read_text(6).unwrap();
        assert_eq!(text, "Pmd");
        assert_eq!(text.bytes(), b"Pmd");
        assert_eq!(r.read_u8().unwrap(), b'x');
    }

    #[test]
    fn test_skip_exact_and_short() {
        let data = [1u8, 2, 3, 4];
        let mut r = LeReader::new(Cursor::new(&data[..]));
        r.skip(3).unwrap();
        assert_eq!(r.read_u8().unwrap(), 4);

        let mut r = LeReader::new(Cursor::new(&data[..]));
        r.enter("faces");
        let err = r.skip(10).unwrap_err();
        assert!(matches!(
            err,
            MmdError::SkipMismatch { section: "faces", expected: 10, actual: 4 }
        ));
    }
}
