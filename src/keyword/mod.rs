//! 关键字驻留
//!
//! 骨骼名、表情名在不同模型和动作文件之间大量重复。
//! 相同字节序列只解码一次，并分配一个自增的小整数 ID。

mod table;

pub use table::KeywordTable;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 不可变的字节序列键，带预先计算的哈希
#[derive(Clone, Debug)]
pub struct Keyword {
    bytes: Box<[u8]>,
    hash: i32,
}

impl Keyword {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.into(),
            hash: keyword_hash(bytes),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn hash_code(&self) -> i32 {
        self.hash
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bytes == other.bytes
    }
}

impl Eq for Keyword {}

impl Hash for Keyword {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash);
    }
}

/// 31 乘子多项式哈希（字节按有符号处理）
pub fn keyword_hash(bytes: &[u8]) -> i32 {
    bytes
        .iter()
        .fold(0i32, |h, &b| h.wrapping_mul(31).wrapping_add(b as i8 as i32))
}

/// 驻留记录：ID、原始字节和解码后的文本
#[derive(Debug)]
pub struct KeywordEntry {
    id: u32,
    keyword: Keyword,
    text: Arc<str>,
}

impl KeywordEntry {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    pub fn bytes(&self) -> &[u8] {
        self.keyword.bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }
}

impl PartialEq for KeywordEntry {
    fn eq(&self, other: &Self) -> bool {
        self.keyword == other.keyword
    }
}

impl Eq for KeywordEntry {}

impl fmt::Display for KeywordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 驻留名称句柄
pub type Name = Arc<KeywordEntry>;
