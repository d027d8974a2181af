//! VMD 文件读写

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::loader::VmdLoader;
use super::{VmdMotion, VmdSkin};
use crate::io::{LeWriter, SjisText};
use crate::{MmdError, Result};

pub const VMD_MAGIC: &[u8] = b"Vocaloid Motion Data 0002";

pub(super) const MAGIC_LEN: usize = 30;
pub(super) const MODEL_NAME_LEN: usize = 20;

/// VMD 动作文件
///
/// 关键帧保持文件中的顺序，需要按帧排序时调用 [`VmdFile::sort_keyframes`]。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VmdFile {
    pub model_name: SjisText,
    pub motions: Vec<VmdMotion>,
    pub skins: Vec<VmdSkin>,
}

impl VmdFile {
    /// 使用全局关键字表和全局配置从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        VmdLoader::new().load(path)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        VmdLoader::new().load_from(bytes)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        VmdLoader::new().load_from(BufReader::new(reader))
    }

    /// 写出头、骨骼关键帧和表情关键帧，其余区段计数写 0
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut w = LeWriter::new(writer);
        w.write_fixed_bytes(VMD_MAGIC, MAGIC_LEN)?;
        w.write_text(&self.model_name, MODEL_NAME_LEN)?;

        w.write_u32(count_u32(self.motions.len())?)?;
        for motion in &self.motions {
            motion.write_to(&mut w)?;
        }
        w.write_u32(count_u32(self.skins.len())?)?;
        for skin in &self.skins {
            skin.write_to(&mut w)?;
        }
        // 相机、灯光
        w.write_u32(0)?;
        w.write_u32(0)?;
        w.flush()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(MmdError::Io)?;
        self.write_to(BufWriter::new(file))
    }

    /// 按帧号稳定排序，同一帧内保持文件顺序
    pub fn sort_keyframes(&mut self) {
        self.motions.sort_by_key(|m| m.frame);
        self.skins.sort_by_key(|s| s.frame);
    }

    /// 指定表情的所有关键帧
    pub fn skins_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a VmdSkin> + 'a {
        self.skins.iter().filter(move |s| s.name.as_str() == name)
    }

    /// 指定骨骼的所有关键帧
    pub fn motions_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a VmdMotion> + 'a {
        self.motions.iter().filter(move |m| m.name.as_str() == name)
    }

    /// 最大帧号
    pub fn max_frame(&self) -> u32 {
        let motion = self.motions.iter().map(|m| m.frame).max().unwrap_or(0);
        let skin = self.skins.iter().map(|s| s.frame).max().unwrap_or(0);
        motion.max(skin)
    }
}

fn count_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| MmdError::VmdParse(format!("too many keyframes: {}", len)))
}
