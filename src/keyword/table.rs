//! 关键字表

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use super::{keyword_hash, Keyword, KeywordEntry, Name};
use crate::io::text::{decode_shift_jis, encode_shift_jis};
use crate::{MmdError, Result};

#[derive(Default)]
struct TableInner {
    // 哈希 -> 同哈希的记录，按字节逐一比较
    buckets: HashMap<i32, Vec<Name>>,
    by_id: Vec<Name>,
}

/// 线程安全、只增不减的关键字表
///
/// 插入与 ID 递增在同一把锁内完成。
#[derive(Default)]
pub struct KeywordTable {
    inner: Mutex<TableInner>,
}

/// 进程级共享表
static GLOBAL_KEYWORDS: Lazy<Arc<KeywordTable>> = Lazy::new(|| Arc::new(KeywordTable::new()));

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级共享的关键字表
    pub fn global() -> Arc<KeywordTable> {
        Arc::clone(&GLOBAL_KEYWORDS)
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 驻留字节序列，命中时返回已有记录
    pub fn intern(&self, bytes: &[u8]) -> Result<Name> {
        let hash = keyword_hash(bytes);
        let mut inner = self.lock();
        if let Some(found) = inner
            .buckets
            .get(&hash)
            .and_then(|bucket| bucket.iter().find(|e| e.bytes() == bytes))
        {
            return Ok(Arc::clone(found));
        }

        let text: Arc<str> = decode_shift_jis(bytes, "keyword")?.into();
        let id = u32::try_from(inner.by_id.len())
            .map_err(|_| MmdError::InvalidFormat("keyword table exhausted".to_string()))?;
        let entry = Arc::new(KeywordEntry {
            id,
            keyword: Keyword::new(bytes),
            text,
        });
        inner.buckets.entry(hash).or_default().push(Arc::clone(&entry));
        inner.by_id.push(Arc::clone(&entry));
        Ok(entry)
    }

    /// 先编码为 Shift-JIS 再驻留
    pub fn intern_str(&self, text: &str) -> Result<Name> {
        let bytes = encode_shift_jis(text, "keyword")?;
        self.intern(&bytes)
    }

    /// 按 ID 取回解码文本
    pub fn lookup_by_id(&self, id: u32) -> Result<Arc<str>> {
        self.entry_by_id(id).map(|e| e.text())
    }

    pub fn entry_by_id(&self, id: u32) -> Result<Name> {
        let inner = self.lock();
        inner
            .by_id
            .get(id as usize)
            .cloned()
            .ok_or(MmdError::UnknownKeyword(id))
    }

    /// 当前所有已驻留文本的快照
    pub fn snapshot_keys(&self) -> HashSet<String> {
        let inner = self.lock();
        inner.by_id.iter().map(|e| e.as_str().to_owned()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
