//! IK 链

use std::io::{BufRead, Write};

use crate::io::{LeReader, LeWriter};
use crate::{MmdError, Result};

/// IK 链定义
#[derive(Clone, Debug, PartialEq)]
pub struct IkChain {
    /// IK 骨骼（目标位置）
    pub bone_index: u16,
    /// 末端效应骨骼
    pub target_bone_index: u16,
    pub iterations: u16,
    /// 单次迭代的最大旋转角（弧度 / 4）
    pub control_weight: f32,
    /// 受影响的骨骼，从末端向根排列
    pub links: Vec<u16>,
}

impl IkChain {
    pub fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        let bone_index = r.read_u16()?;
        let target_bone_index = r.read_u16()?;
        let chain_length = r.read_u8()?;
        let iterations = r.read_u16()?;
        let control_weight = r.read_f32()?;
        let links = (0..chain_length)
            .map(|_| r.read_u16())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            bone_index,
            target_bone_index,
            iterations,
            control_weight,
            links,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        let chain_length = u8::try_from(self.links.len()).map_err(|_| {
            MmdError::InvalidFormat(format!("IK chain too long: {}", self.links.len()))
        })?;
        w.write_u16(self.bone_index)?;
        w.write_u16(self.target_bone_index)?;
        w.write_u8(chain_length)?;
        w.write_u16(self.iterations)?;
        w.write_f32(self.control_weight)?;
        for &link in &self.links {
            w.write_u16(link)?;
        }
        Ok(())
    }

    pub fn chain_length(&self) -> usize {
        self.links.len()
    }
}
