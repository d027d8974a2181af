//! 定长 Shift-JIS 文本字段

use std::borrow::Cow;
use std::fmt;

use encoding_rs::SHIFT_JIS;

use crate::{MmdError, Result};

/// 截断到第一个 NUL 字节
pub fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

fn is_lead_byte(b: u8) -> bool {
    matches!(b, 0x81..=0x9F | 0xE0..=0xFC)
}

/// 去掉被定长字段截断的半个双字节字符
///
/// VMD 的 15 字节名称字段经常在双字节字符中间截断。
pub fn trim_incomplete_sjis(bytes: &[u8]) -> &[u8] {
    let mut i = 0;
    while i < bytes.len() {
        if is_lead_byte(bytes[i]) {
            if i + 1 == bytes.len() {
                return &bytes[..i];
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    bytes
}

/// 严格解码 Shift-JIS，无法解码的字节序列视为格式错误
pub fn decode_shift_jis(bytes: &[u8], field: &'static str) -> Result<String> {
    SHIFT_JIS
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| MmdError::Encoding {
            field,
            bytes: bytes.to_vec(),
        })
}

/// 编码为 Shift-JIS
pub fn encode_shift_jis<'a>(text: &'a str, field: &'static str) -> Result<Cow<'a, [u8]>> {
    let (bytes, _, unmappable) = SHIFT_JIS.encode(text);
    if unmappable {
        return Err(MmdError::Encoding {
            field,
            bytes: text.as_bytes().to_vec(),
        });
    }
    Ok(bytes)
}

/// 截断到 `len` 字节以内，且不切开双字节字符
pub fn fit_sjis(bytes: &[u8], len: usize) -> &[u8] {
    if bytes.len() <= len {
        bytes
    } else {
        trim_incomplete_sjis(&bytes[..len])
    }
}

/// 定长文本字段
///
/// 保留文件中的原始字节（截断到 NUL），写回时原样输出。
/// Shift-JIS 中同一个字符可能有两种编码（NEC 选定 IBM 扩展），
/// 解码再编码不一定得到原来的字节。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SjisText {
    bytes: Vec<u8>,
    text: String,
}

impl SjisText {
    /// 由文本编码
    pub fn new(text: &str) -> Result<Self> {
        let bytes = encode_shift_jis(text, "text")?.into_owned();
        Ok(Self {
            bytes,
            text: text.to_owned(),
        })
    }

    /// 由原始字节严格解码
    pub fn from_bytes(bytes: Vec<u8>, field: &'static str) -> Result<Self> {
        let text = decode_shift_jis(&bytes, field)?;
        Ok(Self { bytes, text })
    }

    /// 纯 ASCII 文本，字节与文本一致
    pub(crate) fn from_ascii(text: String) -> Self {
        debug_assert!(text.is_ascii());
        Self {
            bytes: text.clone().into_bytes(),
            text,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 替换文本并重新编码
    pub fn set(&mut self, text: &str) -> Result<()> {
        *self = Self::new(text)?;
        Ok(())
    }
}

impl fmt::Display for SjisText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for SjisText {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for SjisText {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// 截断或补零到固定长度
pub fn pad_to(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let n = bytes.len().min(len);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}
