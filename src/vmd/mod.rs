//! VMD 动作格式
//!
//! 只解析骨骼关键帧和表情关键帧，其后的相机 / 灯光 / 阴影数据保持不读。

mod file;
mod loader;
mod motion;
mod skin;

pub use file::{VmdFile, VMD_MAGIC};
pub use loader::VmdLoader;
pub use motion::{Interpolation, VmdMotion, VMD_MOTION_SIZE};
pub use skin::{VmdSkin, VMD_SKIN_SIZE};

use std::io::BufRead;

use crate::io::text::trim_incomplete_sjis;
use crate::io::LeReader;
use crate::keyword::{KeywordTable, Name};
use crate::Result;

/// 关键帧名称字段长度
pub const VMD_NAME_LEN: usize = 15;

/// 读取 15 字节名称；截断在双字节字符中间的尾部会被丢弃
fn read_keyframe_name<R: BufRead>(r: &mut LeReader<R>, keywords: &KeywordTable) -> Result<Name> {
    let raw = r.read_fixed_bytes(VMD_NAME_LEN)?;
    keywords.intern(trim_incomplete_sjis(&raw))
}
