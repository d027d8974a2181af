//! MMD 二进制编解码
//!
//! - PMD 模型读取 / 写回（顶点、面、材质、骨骼、IK、表情、显示枠、刚体、关节）
//! - VMD 动作关键帧读取 / 写回
//! - 骨骼名、表情名的关键字驻留
//!
//! 渲染、场景图、动画播放和物理模拟由外部使用方负责。

pub mod config;
pub mod coords;
pub mod io;
pub mod keyword;
pub mod pmd;
pub mod types;
pub mod vmd;

pub use config::LoaderConfig;
pub use io::SjisText;
pub use keyword::{KeywordTable, Name};
pub use pmd::{PmdLoader, PmdModel};
pub use vmd::{VmdFile, VmdLoader, VmdMotion, VmdSkin};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MmdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Section `{section}` truncated at byte {offset}")]
    Truncated { section: &'static str, offset: u64 },

    #[error("Undecodable Shift-JIS in `{field}`: {bytes:02x?}")]
    Encoding { field: &'static str, bytes: Vec<u8> },

    #[error("Skip in `{section}` consumed {actual} of {expected} bytes")]
    SkipMismatch {
        section: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown keyword id: {0}")]
    UnknownKeyword(u32),

    #[error("VMD parse error: {0}")]
    VmdParse(String),
}

impl MmdError {
    /// 是否为流截断
    pub fn is_truncated(&self) -> bool {
        matches!(self, MmdError::Truncated { .. } | MmdError::SkipMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, MmdError>;
