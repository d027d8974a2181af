//! 表情 / 骨骼显示枠

use std::io::{BufRead, Write};

use crate::io::{bounded_capacity, LeReader, LeWriter, SjisText};
use crate::{MmdError, Result};

/// 骨骼显示枠名长度
pub const BONE_DISP_NAME_LEN: usize = 50;

/// 骨骼显示枠条目：骨骼挂在哪个分组下
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoneDisplay {
    pub bone_index: u16,
    /// 1 起始的显示枠序号
    pub group_index: u8,
}

fn count_u8(len: usize, what: &str) -> Result<u8> {
    u8::try_from(len).map_err(|_| MmdError::InvalidFormat(format!("too many {}: {}", what, len)))
}

/// 表情显示列表：u8 个数 + u16 表情序号
pub fn read_morph_display<R: BufRead>(r: &mut LeReader<R>) -> Result<Vec<u16>> {
    let count = r.read_u8()?;
    (0..count).map(|_| r.read_u16()).collect()
}

pub fn write_morph_display<W: Write>(w: &mut LeWriter<W>, list: &[u16]) -> Result<()> {
    w.write_u8(count_u8(list.len(), "morph display entries")?)?;
    for &index in list {
        w.write_u16(index)?;
    }
    Ok(())
}

/// 骨骼显示枠名：u8 个数 + 50 字节名称
///
/// 名称末尾通常带换行，保持原样。
pub fn read_bone_display_names<R: BufRead>(r: &mut LeReader<R>) -> Result<Vec<SjisText>> {
    let count = r.read_u8()?;
    (0..count).map(|_| r.read_text(BONE_DISP_NAME_LEN)).collect()
}

pub fn write_bone_display_names<W: Write>(w: &mut LeWriter<W>, names: &[SjisText]) -> Result<()> {
    w.write_u8(count_u8(names.len(), "bone display names")?)?;
    for name in names {
        w.write_text(name, BONE_DISP_NAME_LEN)?;
    }
    Ok(())
}

/// 骨骼显示列表：i32 个数 + (u16 骨骼, u8 分组)
pub fn read_bone_display<R: BufRead>(
    r: &mut LeReader<R>,
    max_preallocate: usize,
) -> Result<Vec<BoneDisplay>> {
    let count = r.read_i32()?;
    let count = usize::try_from(count)
        .map_err(|_| MmdError::InvalidFormat(format!("negative bone display count {}", count)))?;
    let mut list = Vec::with_capacity(bounded_capacity(count, max_preallocate));
    for _ in 0..count {
        list.push(BoneDisplay {
            bone_index: r.read_u16()?,
            group_index: r.read_u8()?,
        });
    }
    Ok(list)
}

pub fn write_bone_display<W: Write>(w: &mut LeWriter<W>, list: &[BoneDisplay]) -> Result<()> {
    let count = i32::try_from(list.len())
        .map_err(|_| MmdError::InvalidFormat(format!("too many bone display entries: {}", list.len())))?;
    w.write_i32(count)?;
    for entry in list {
        w.write_u16(entry.bone_index)?;
        w.write_u8(entry.group_index)?;
    }
    Ok(())
}
