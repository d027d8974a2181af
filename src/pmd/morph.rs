//! 表情（skin）记录

use std::io::{BufRead, Write};

use glam::Vec3;

use crate::coords::flip_position;
use crate::io::{bounded_capacity, LeReader, LeWriter};
use crate::keyword::{KeywordTable, Name};
use crate::{MmdError, Result};

pub const MORPH_NAME_LEN: usize = 20;

/// 表情分类
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphKind {
    /// 基准表情：索引指向模型顶点，位移为绝对位置
    Base,
    Eyebrow,
    Eye,
    Lip,
    Other,
    Unknown(u8),
}

impl From<u8> for MorphKind {
    fn from(code: u8) -> Self {
        match code {
            0 => MorphKind::Base,
            1 => MorphKind::Eyebrow,
            2 => MorphKind::Eye,
            3 => MorphKind::Lip,
            4 => MorphKind::Other,
            other => MorphKind::Unknown(other),
        }
    }
}

impl From<MorphKind> for u8 {
    fn from(kind: MorphKind) -> u8 {
        match kind {
            MorphKind::Base => 0,
            MorphKind::Eyebrow => 1,
            MorphKind::Eye => 2,
            MorphKind::Lip => 3,
            MorphKind::Other => 4,
            MorphKind::Unknown(code) => code,
        }
    }
}

/// 顶点表情
///
/// 位移数据存成两个平行的扁平数组：顶点索引和 xyz 三元组，
/// 数千个顶点的表情不必逐条分配。
#[derive(Clone, Debug, PartialEq)]
pub struct Morph {
    name: Name,
    pub kind: MorphKind,
    indices: Vec<u32>,
    offsets: Vec<f32>,
}

/// 每个顶点 3 个偏移分量
fn offset_capacity(vertices: usize) -> usize {
    vertices.saturating_mul(3)
}

impl Morph {
    pub fn new(name: Name, kind: MorphKind) -> Self {
        Self {
            name,
            kind,
            indices: Vec::new(),
            offsets: Vec::new(),
        }
    }

    pub fn read_from<R: BufRead>(
        r: &mut LeReader<R>,
        keywords: &KeywordTable,
        max_preallocate: usize,
    ) -> Result<Self> {
        let name = r.read_name(MORPH_NAME_LEN, keywords)?;
        let count = r.read_i32()?;
        let count = usize::try_from(count).map_err(|_| {
            MmdError::InvalidFormat(format!("morph `{}` has negative vertex count {}", name, count))
        })?;
        let kind = MorphKind::from(r.read_u8()?);

        let cap = bounded_capacity(count, max_preallocate);
        let mut morph = Morph {
            name,
            kind,
            indices: Vec::with_capacity(cap),
            offsets: Vec::with_capacity(offset_capacity(cap)),
        };
        for _ in 0..count {
            let index = r.read_u32()?;
            let offset = Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?);
            morph.push(index, flip_position(offset));
        }
        Ok(morph)
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        let count = i32::try_from(self.len())
            .map_err(|_| MmdError::InvalidFormat(format!("morph `{}` too large", self.name)))?;
        w.write_name(&self.name, MORPH_NAME_LEN)?;
        w.write_i32(count)?;
        w.write_u8(self.kind.into())?;
        for (index, offset) in self.iter() {
            let file = flip_position(offset);
            w.write_u32(index)?;
            w.write_f32(file.x)?;
            w.write_f32(file.y)?;
            w.write_f32(file.z)?;
        }
        Ok(())
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn is_base(&self) -> bool {
        self.kind == MorphKind::Base
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn push(&mut self, index: u32, offset: Vec3) {
        self.indices.push(index);
        self.offsets.extend_from_slice(&offset.to_array());
    }

    /// 第 `i` 条位移（右手坐标系）
    pub fn get(&self, i: usize) -> Option<(u32, Vec3)> {
        let index = *self.indices.get(i)?;
        let xyz = self.offsets.get(i * 3..i * 3 + 3)?;
        Some((index, Vec3::from_slice(xyz)))
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// 扁平 xyz 数组，长度为 `len() * 3`
    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Vec3)> + '_ {
        self.indices
            .iter()
            .zip(self.offsets.chunks_exact(3))
            .map(|(&i, xyz)| (i, Vec3::from_slice(xyz)))
    }
}
