//! 顶点记录与连续顶点缓冲区

use std::io::{BufRead, Write};

use glam::Vec3;

use crate::coords::flip_position;
use crate::io::{LeReader, LeWriter, SliceReader, SliceWriter};
use crate::types::{bits_eq, FixedRecord, TexCoord};
use crate::{MmdError, Result};

/// 单个顶点的字节跨度（文件与内存缓冲区相同）
pub const VERTEX_STRIDE: usize = 38;

/// PMD 顶点
///
/// 位置与法线为右手坐标系（读入时已翻转 Z）。
#[derive(Clone, Debug, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: TexCoord,
    pub bones: [u16; 2],
    /// 第一根骨骼的权重，0..=100
    pub weight: u8,
    /// 0: 通常 1: 无边缘
    pub edge_flag: u8,
}

impl PartialEq for Vertex {
    /// 浮点字段按位比较，与写回的字节一致
    fn eq(&self, other: &Self) -> bool {
        bits_eq(&self.position.to_array(), &other.position.to_array())
            && bits_eq(&self.normal.to_array(), &other.normal.to_array())
            && self.uv == other.uv
            && self.bones == other.bones
            && self.weight == other.weight
            && self.edge_flag == other.edge_flag
    }
}

impl Vertex {
    pub fn bone_weight(&self) -> f32 {
        f32::from(self.weight) / 100.0
    }

    pub fn has_edge(&self) -> bool {
        self.edge_flag == 0
    }
}

impl FixedRecord for Vertex {
    const SIZE: usize = VERTEX_STRIDE;

    fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        let position = flip_position(Vec3::read_from(r)?);
        let normal = flip_position(Vec3::read_from(r)?);
        Ok(Self {
            position,
            normal,
            uv: TexCoord::read_from(r)?,
            bones: [r.read_u16()?, r.read_u16()?],
            weight: r.read_u8()?,
            edge_flag: r.read_u8()?,
        })
    }

    fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        flip_position(self.position).write_to(w)?;
        flip_position(self.normal).write_to(w)?;
        self.uv.write_to(w)?;
        w.write_u16(self.bones[0])?;
        w.write_u16(self.bones[1])?;
        w.write_u8(self.weight)?;
        w.write_u8(self.edge_flag)
    }

    fn read_at(buf: &[u8], offset: usize) -> Result<Self> {
        let mut r = SliceReader::at(buf, offset, Self::SIZE)?;
        Ok(Self {
            position: Vec3::new(r.f32(), r.f32(), r.f32()),
            normal: Vec3::new(r.f32(), r.f32(), r.f32()),
            uv: TexCoord::new(r.f32(), r.f32()),
            bones: [r.u16(), r.u16()],
            weight: r.u8(),
            edge_flag: r.u8(),
        })
    }

    fn write_at(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let mut w = SliceWriter::at(buf, offset, Self::SIZE)?;
        for f in self.position.to_array() {
            w.f32(f);
        }
        for f in self.normal.to_array() {
            w.f32(f);
        }
        w.f32(self.uv.u);
        w.f32(self.uv.v);
        w.u16(self.bones[0]);
        w.u16(self.bones[1]);
        w.u8(self.weight);
        w.u8(self.edge_flag);
        Ok(())
    }
}

/// 连续顶点缓冲区
///
/// 所有顶点放在一块本机字节序的字节数组里，按 `i * VERTEX_STRIDE`
/// 定位后就地读写，不为单个顶点分配对象。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexBuffer {
    bytes: Vec<u8>,
}

impl VertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(count: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(count.saturating_mul(VERTEX_STRIDE)),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / VERTEX_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn offset(&self, index: usize) -> Result<usize> {
        if index >= self.len() {
            return Err(MmdError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(index * VERTEX_STRIDE)
    }

    /// 读取第 `index` 个顶点
    pub fn get(&self, index: usize) -> Result<Vertex> {
        Vertex::read_at(&self.bytes, self.offset(index)?)
    }

    /// 覆盖第 `index` 个顶点
    pub fn set(&mut self, index: usize, vertex: &Vertex) -> Result<()> {
        let offset = self.offset(index)?;
        vertex.write_at(&mut self.bytes, offset)
    }

    pub fn push(&mut self, vertex: &Vertex) -> Result<()> {
        let offset = self.bytes.len();
        self.bytes.resize(offset + VERTEX_STRIDE, 0);
        vertex.write_at(&mut self.bytes, offset)
    }

    /// 原始字节（交给渲染层构建 GPU 缓冲区）
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn iter(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.bytes
            .chunks_exact(VERTEX_STRIDE)
            .filter_map(|chunk| Vertex::read_at(chunk, 0).ok())
    }
}
