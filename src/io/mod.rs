//! 二进制流适配层
//!
//! PMD/VMD 文件统一为小端序；内存中的顶点缓冲区使用本机字节序。

mod reader;
mod slice;
pub mod text;
mod writer;

pub use reader::LeReader;
pub use slice::{SliceReader, SliceWriter};
pub use writer::LeWriter;
pub use text::SjisText;

/// 根据计数估算初始容量，避免恶意计数导致一次性巨额分配
pub(crate) fn bounded_capacity(count: usize, limit: usize) -> usize {
    count.min(limit)
}
