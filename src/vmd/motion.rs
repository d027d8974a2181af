//! 骨骼关键帧

use std::io::{BufRead, Write};

use glam::{Quat, Vec3};

use super::{read_keyframe_name, VMD_NAME_LEN};
use crate::coords::{flip_position, flip_quat};
use crate::io::{LeReader, LeWriter};
use crate::keyword::{KeywordTable, Name};
use crate::types::FixedRecord;
use crate::Result;

pub const VMD_MOTION_SIZE: usize = 111;

const INTERPOLATION_LEN: usize = 64;

/// 插值曲线所属的通道
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    X,
    Y,
    Z,
    Rotation,
}

impl Interpolation {
    fn column(self) -> usize {
        match self {
            Interpolation::X => 0,
            Interpolation::Y => 1,
            Interpolation::Z => 2,
            Interpolation::Rotation => 3,
        }
    }
}

/// 某一帧上某根骨骼的位移与旋转
#[derive(Clone, Debug, PartialEq)]
pub struct VmdMotion {
    pub name: Name,
    pub frame: u32,
    /// 相对初始姿态的位移（右手坐标系）
    pub position: Vec3,
    pub rotation: Quat,
    /// 原始插值字节，写回时原样输出
    pub interpolation: [u8; INTERPOLATION_LEN],
}

impl VmdMotion {
    pub fn new(name: Name, frame: u32, position: Vec3, rotation: Quat) -> Self {
        Self {
            name,
            frame,
            position,
            rotation,
            interpolation: linear_interpolation(),
        }
    }

    pub fn read_from<R: BufRead>(r: &mut LeReader<R>, keywords: &KeywordTable) -> Result<Self> {
        let name = read_keyframe_name(r, keywords)?;
        let frame = r.read_u32()?;
        let position = flip_position(Vec3::read_from(r)?);
        let rotation = Quat::from_xyzw(r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?);
        Ok(Self {
            name,
            frame,
            position,
            rotation: flip_quat(rotation),
            interpolation: r.read_array::<INTERPOLATION_LEN>()?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_name(&self.name, VMD_NAME_LEN)?;
        w.write_u32(self.frame)?;
        flip_position(self.position).write_to(w)?;
        let q = flip_quat(self.rotation);
        w.write_f32(q.x)?;
        w.write_f32(q.y)?;
        w.write_f32(q.z)?;
        w.write_f32(q.w)?;
        w.write_bytes(&self.interpolation)
    }

    /// 贝塞尔控制点 (x1, y1, x2, y2)，取值 0..=127
    pub fn control_points(&self, channel: Interpolation) -> [u8; 4] {
        let c = channel.column();
        [
            self.interpolation[c],
            self.interpolation[c + 4],
            self.interpolation[c + 8],
            self.interpolation[c + 12],
        ]
    }

    /// 归一化到 0.0..=1.0 的控制点
    pub fn curve(&self, channel: Interpolation) -> [f32; 4] {
        self.control_points(channel).map(|v| f32::from(v) / 127.0)
    }
}

/// 四个通道都为 (20, 20, 107, 107) 的直线插值
fn linear_interpolation() -> [u8; INTERPOLATION_LEN] {
    let mut bytes = [0u8; INTERPOLATION_LEN];
    for row in 0..4 {
        let value = if row < 2 { 20 } else { 107 };
        for col in 0..4 {
            bytes[row * 4 + col] = value;
        }
    }
    bytes
}
