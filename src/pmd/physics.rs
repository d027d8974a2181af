//! 刚体与关节
//!
//! 位于 toon 列表之后的可选区段。这里只做数据的读写，
//! 物理模拟由使用方实现。

use std::io::{BufRead, Write};

use glam::Vec3;

use crate::coords::{flip_position, flip_position_range, flip_rotation, flip_rotation_range};
use crate::io::{bounded_capacity, LeReader, LeWriter, SjisText};
use crate::types::FixedRecord;
use crate::{MmdError, Result};

const PHYSICS_NAME_LEN: usize = 20;

pub const RIGID_BODY_SIZE: usize = 83;
pub const JOINT_SIZE: usize = 124;

/// 碰撞形状
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RigidShape {
    Sphere,
    Box,
    Capsule,
    Other(u8),
}

impl From<u8> for RigidShape {
    fn from(code: u8) -> Self {
        match code {
            0 => RigidShape::Sphere,
            1 => RigidShape::Box,
            2 => RigidShape::Capsule,
            other => RigidShape::Other(other),
        }
    }
}

impl From<RigidShape> for u8 {
    fn from(shape: RigidShape) -> u8 {
        match shape {
            RigidShape::Sphere => 0,
            RigidShape::Box => 1,
            RigidShape::Capsule => 2,
            RigidShape::Other(code) => code,
        }
    }
}

/// 刚体运算方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RigidBodyMode {
    /// 跟随骨骼
    Static,
    /// 完全由物理驱动
    Dynamic,
    /// 物理驱动旋转，位置跟随骨骼
    DynamicWithBonePosition,
    Other(u8),
}

impl From<u8> for RigidBodyMode {
    fn from(code: u8) -> Self {
        match code {
            0 => RigidBodyMode::Static,
            1 => RigidBodyMode::Dynamic,
            2 => RigidBodyMode::DynamicWithBonePosition,
            other => RigidBodyMode::Other(other),
        }
    }
}

impl From<RigidBodyMode> for u8 {
    fn from(mode: RigidBodyMode) -> u8 {
        match mode {
            RigidBodyMode::Static => 0,
            RigidBodyMode::Dynamic => 1,
            RigidBodyMode::DynamicWithBonePosition => 2,
            RigidBodyMode::Other(code) => code,
        }
    }
}

/// PMD 刚体
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub name: SjisText,
    /// 关联骨骼，0xFFFF 表示不关联
    pub bone_index: u16,
    pub group: u8,
    /// 不与之碰撞的组
    pub group_mask: u16,
    pub shape: RigidShape,
    pub size: Vec3,
    /// 相对骨骼的位置
    pub position: Vec3,
    /// 欧拉角（弧度）
    pub rotation: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub mode: RigidBodyMode,
}

impl RigidBody {
    pub fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        Ok(Self {
            name: r.read_text(PHYSICS_NAME_LEN)?,
            bone_index: r.read_u16()?,
            group: r.read_u8()?,
            group_mask: r.read_u16()?,
            shape: RigidShape::from(r.read_u8()?),
            size: Vec3::read_from(r)?,
            position: flip_position(Vec3::read_from(r)?),
            rotation: flip_rotation(Vec3::read_from(r)?),
            mass: r.read_f32()?,
            linear_damping: r.read_f32()?,
            angular_damping: r.read_f32()?,
            restitution: r.read_f32()?,
            friction: r.read_f32()?,
            mode: RigidBodyMode::from(r.read_u8()?),
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_text(&self.name, PHYSICS_NAME_LEN)?;
        w.write_u16(self.bone_index)?;
        w.write_u8(self.group)?;
        w.write_u16(self.group_mask)?;
        w.write_u8(self.shape.into())?;
        self.size.write_to(w)?;
        flip_position(self.position).write_to(w)?;
        flip_rotation(self.rotation).write_to(w)?;
        w.write_f32(self.mass)?;
        w.write_f32(self.linear_damping)?;
        w.write_f32(self.angular_damping)?;
        w.write_f32(self.restitution)?;
        w.write_f32(self.friction)?;
        w.write_u8(self.mode.into())
    }

    pub fn bone(&self) -> Option<u16> {
        (self.bone_index != 0xFFFF).then_some(self.bone_index)
    }
}

/// 6 自由度弹簧关节
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    pub name: SjisText,
    pub rigid_body_a: u32,
    pub rigid_body_b: u32,
    pub position: Vec3,
    pub rotation: Vec3,
    pub position_lower: Vec3,
    pub position_upper: Vec3,
    pub rotation_lower: Vec3,
    pub rotation_upper: Vec3,
    pub spring_position: Vec3,
    pub spring_rotation: Vec3,
}

impl Joint {
    pub fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        let name = r.read_text(PHYSICS_NAME_LEN)?;
        let rigid_body_a = r.read_u32()?;
        let rigid_body_b = r.read_u32()?;
        let position = flip_position(Vec3::read_from(r)?);
        let rotation = flip_rotation(Vec3::read_from(r)?);
        let (position_lower, position_upper) =
            flip_position_range(Vec3::read_from(r)?, Vec3::read_from(r)?);
        let (rotation_lower, rotation_upper) =
            flip_rotation_range(Vec3::read_from(r)?, Vec3::read_from(r)?);
        Ok(Self {
            name,
            rigid_body_a,
            rigid_body_b,
            position,
            rotation,
            position_lower,
            position_upper,
            rotation_lower,
            rotation_upper,
            spring_position: Vec3::read_from(r)?,
            spring_rotation: Vec3::read_from(r)?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_text(&self.name, PHYSICS_NAME_LEN)?;
        w.write_u32(self.rigid_body_a)?;
        w.write_u32(self.rigid_body_b)?;
        flip_position(self.position).write_to(w)?;
        flip_rotation(self.rotation).write_to(w)?;
        let (lo, hi) = flip_position_range(self.position_lower, self.position_upper);
        lo.write_to(w)?;
        hi.write_to(w)?;
        let (lo, hi) = flip_rotation_range(self.rotation_lower, self.rotation_upper);
        lo.write_to(w)?;
        hi.write_to(w)?;
        self.spring_position.write_to(w)?;
        self.spring_rotation.write_to(w)
    }
}

fn read_count<R: BufRead>(r: &mut LeReader<R>, what: &str) -> Result<usize> {
    let count = r.read_i32()?;
    usize::try_from(count)
        .map_err(|_| MmdError::InvalidFormat(format!("negative {} count {}", what, count)))
}

fn write_count<W: Write>(w: &mut LeWriter<W>, len: usize, what: &str) -> Result<()> {
    let count = i32::try_from(len)
        .map_err(|_| MmdError::InvalidFormat(format!("too many {}: {}", what, len)))?;
    w.write_i32(count)
}

pub fn read_rigid_bodies<R: BufRead>(
    r: &mut LeReader<R>,
    max_preallocate: usize,
) -> Result<Vec<RigidBody>> {
    let count = read_count(r, "rigid body")?;
    let mut bodies = Vec::with_capacity(bounded_capacity(count, max_preallocate));
    for _ in 0..count {
        bodies.push(RigidBody::read_from(r)?);
    }
    Ok(bodies)
}

pub fn write_rigid_bodies<W: Write>(w: &mut LeWriter<W>, bodies: &[RigidBody]) -> Result<()> {
    write_count(w, bodies.len(), "rigid bodies")?;
    bodies.iter().try_for_each(|body| body.write_to(w))
}

pub fn read_joints<R: BufRead>(r: &mut LeReader<R>, max_preallocate: usize) -> Result<Vec<Joint>> {
    let count = read_count(r, "joint")?;
    let mut joints = Vec::with_capacity(bounded_capacity(count, max_preallocate));
    for _ in 0..count {
        joints.push(Joint::read_from(r)?);
    }
    Ok(joints)
}

pub fn write_joints<W: Write>(w: &mut LeWriter<W>, joints: &[Joint]) -> Result<()> {
    write_count(w, joints.len(), "joints")?;
    joints.iter().try_for_each(|joint| joint.write_to(w))
}
