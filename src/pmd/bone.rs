//! 骨骼记录

use std::io::{BufRead, Write};

use glam::Vec3;

use crate::coords::flip_position;
use crate::io::{LeReader, LeWriter};
use crate::keyword::{KeywordTable, Name};
use crate::types::FixedRecord;
use crate::Result;

/// 骨骼名长度
pub const BONE_NAME_LEN: usize = 20;

/// 膝盖骨骼的名称标记，IK 求解时特殊处理
pub const KNEE_MARKER: &str = "ひざ";

/// 根骨骼的父索引
pub const NO_PARENT: u16 = 0xFFFF;

/// 骨骼类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneType {
    Rotate,
    RotateMove,
    Ik,
    Unknown,
    IkInfluenced,
    RotateInfluenced,
    IkTarget,
    Hidden,
    Twist,
    RotateMotion,
    /// 未定义的类型码，原样保留以便写回
    Other(u8),
}

impl From<u8> for BoneType {
    fn from(code: u8) -> Self {
        match code {
            0 => BoneType::Rotate,
            1 => BoneType::RotateMove,
            2 => BoneType::Ik,
            3 => BoneType::Unknown,
            4 => BoneType::IkInfluenced,
            5 => BoneType::RotateInfluenced,
            6 => BoneType::IkTarget,
            7 => BoneType::Hidden,
            8 => BoneType::Twist,
            9 => BoneType::RotateMotion,
            other => BoneType::Other(other),
        }
    }
}

impl From<BoneType> for u8 {
    fn from(t: BoneType) -> u8 {
        match t {
            BoneType::Rotate => 0,
            BoneType::RotateMove => 1,
            BoneType::Ik => 2,
            BoneType::Unknown => 3,
            BoneType::IkInfluenced => 4,
            BoneType::RotateInfluenced => 5,
            BoneType::IkTarget => 6,
            BoneType::Hidden => 7,
            BoneType::Twist => 8,
            BoneType::RotateMotion => 9,
            BoneType::Other(code) => code,
        }
    }
}

/// PMD 骨骼
#[derive(Clone, Debug, PartialEq)]
pub struct Bone {
    name: Name,
    pub parent_index: u16,
    pub tail_index: u16,
    pub bone_type: BoneType,
    pub ik_target_index: i16,
    /// 头部位置（右手坐标系）
    pub head_position: Vec3,
    is_knee: bool,
}

impl Bone {
    pub fn new(name: Name, bone_type: BoneType, head_position: Vec3) -> Self {
        let is_knee = name.as_str().contains(KNEE_MARKER);
        Self {
            name,
            parent_index: NO_PARENT,
            tail_index: 0,
            bone_type,
            ik_target_index: 0,
            head_position,
            is_knee,
        }
    }

    pub fn read_from<R: BufRead>(r: &mut LeReader<R>, keywords: &KeywordTable) -> Result<Self> {
        let name = r.read_name(BONE_NAME_LEN, keywords)?;
        let parent_index = r.read_u16()?;
        let tail_index = r.read_u16()?;
        let bone_type = BoneType::from(r.read_u8()?);
        let ik_target_index = r.read_i16()?;
        let head_position = flip_position(Vec3::read_from(r)?);

        let mut bone = Bone::new(name, bone_type, head_position);
        bone.parent_index = parent_index;
        bone.tail_index = tail_index;
        bone.ik_target_index = ik_target_index;
        Ok(bone)
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_name(&self.name, BONE_NAME_LEN)?;
        w.write_u16(self.parent_index)?;
        w.write_u16(self.tail_index)?;
        w.write_u8(self.bone_type.into())?;
        w.write_i16(self.ik_target_index)?;
        flip_position(self.head_position).write_to(w)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// 改名后重新计算膝盖标记
    pub fn set_name(&mut self, name: Name) {
        self.is_knee = name.as_str().contains(KNEE_MARKER);
        self.name = name;
    }

    /// 名称中含有 `ひざ`
    pub fn is_knee(&self) -> bool {
        self.is_knee
    }

    pub fn parent(&self) -> Option<u16> {
        (self.parent_index != NO_PARENT).then_some(self.parent_index)
    }

    /// 0 表示没有 IK 目标
    pub fn ik_target(&self) -> Option<u16> {
        u16::try_from(self.ik_target_index).ok().filter(|&i| i != 0)
    }
}
