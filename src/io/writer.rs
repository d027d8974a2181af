//! 小端流写入器

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use super::text::{encode_shift_jis, fit_sjis, pad_to, SjisText};
use crate::keyword::Name;
use crate::Result;

/// 小端二进制写入器
///
/// 单字节写入不受字节序影响，直接透传。
pub struct LeWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> LeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// 已写入的字节数
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.inner.write_u8(v)?;
        self.position += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.inner.write_u16::<LittleEndian>(v)?;
        self.position += 2;
        Ok(())
    }

    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        self.inner.write_i16::<LittleEndian>(v)?;
        self.position += 2;
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.inner.write_u32::<LittleEndian>(v)?;
        self.position += 4;
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.inner.write_i32::<LittleEndian>(v)?;
        self.position += 4;
        Ok(())
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        self.inner.write_f32::<LittleEndian>(v)?;
        self.position += 4;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// 写入定长字段：截断或补零到 `len`
    pub fn write_fixed_bytes(&mut self, bytes: &[u8], len: usize) -> Result<()> {
        self.write_bytes(&pad_to(bytes, len))
    }

    /// 写入定长 Shift-JIS 字段，超长时在字符边界截断
    fn write_sjis_bytes(&mut self, bytes: &[u8], len: usize) -> Result<()> {
        self.write_fixed_bytes(fit_sjis(bytes, len), len)
    }

    /// 以 Shift-JIS 写入定长字符串
    pub fn write_fixed_string(&mut self, text: &str, len: usize, field: &'static str) -> Result<()> {
        let bytes = encode_shift_jis(text, field)?;
        self.write_sjis_bytes(&bytes, len)
    }

    /// 写入文本字段的原始字节
    pub fn write_text(&mut self, text: &SjisText, len: usize) -> Result<()> {
        self.write_sjis_bytes(text.bytes(), len)
    }

    /// 写入驻留名称的原始字节
    pub fn write_name(&mut self, name: &Name, len: usize) -> Result<()> {
        self.write_sjis_bytes(name.bytes(), len)
    }
}
