//! PMD 模型容器与写出

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::bone::Bone;
use super::display::{self, BoneDisplay};
use super::english::{EnglishCounts, EnglishHeader};
use super::ik::IkChain;
use super::loader::PmdLoader;
use super::material::Material;
use super::morph::Morph;
use super::physics::{self, Joint, RigidBody};
use super::submesh::{build_submeshes, SubMesh};
use super::toon::ToonTextures;
use super::vertex::{Vertex, VertexBuffer};
use crate::coords::swap_winding;
use crate::io::{LeWriter, SjisText};
use crate::types::FixedRecord;
use crate::{MmdError, Result};

pub const PMD_MAGIC: &[u8; 3] = b"Pmd";
pub const MODEL_NAME_LEN: usize = 20;
pub const COMMENT_LEN: usize = 256;

/// 文件头
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub version: f32,
    pub model_name: SjisText,
    pub comment: SjisText,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: 1.0,
            model_name: SjisText::default(),
            comment: SjisText::default(),
        }
    }
}

/// 文件在哪个扩展区段之后结束
///
/// 扩展区段依次为英文头、toon 列表、刚体、关节；旧文件可能缺少尾部若干个。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TrailingSections {
    CoreOnly,
    English,
    ToonTextures,
    RigidBodies,
    #[default]
    Joints,
}

/// PMD 模型
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PmdModel {
    pub header: Header,
    pub(crate) vertices: VertexBuffer,
    pub(crate) indices: Vec<u16>,
    pub materials: Vec<Material>,
    pub bones: Vec<Bone>,
    pub iks: Vec<IkChain>,
    pub morphs: Vec<Morph>,
    /// 表情面板中显示的表情序号
    pub morph_display: Vec<u16>,
    pub bone_display_names: Vec<SjisText>,
    pub bone_display: Vec<BoneDisplay>,
    pub english: Option<EnglishHeader>,
    pub toon_textures: ToonTextures,
    pub rigid_bodies: Vec<RigidBody>,
    pub joints: Vec<Joint>,
    pub trailing: TrailingSections,
    pub(crate) geometry_skipped: bool,
}

impl PmdModel {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            ..Default::default()
        }
    }

    /// 使用全局关键字表和全局配置从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        PmdLoader::new().load(path)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        PmdLoader::new().load_from(bytes)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        PmdLoader::new().load_from(BufReader::new(reader))
    }

    /// 加载时是否跳过了顶点与面数据
    pub fn geometry_skipped(&self) -> bool {
        self.geometry_skipped
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    pub fn vertex(&self, index: usize) -> Result<Vertex> {
        self.vertices.get(index)
    }

    pub fn set_vertex(&mut self, index: usize, vertex: &Vertex) -> Result<()> {
        self.vertices.set(index, vertex)
    }

    pub fn push_vertex(&mut self, vertex: &Vertex) -> Result<()> {
        self.vertices.push(vertex)
    }

    /// 三角形索引（右手坐标系绕序）
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// 替换索引列表，长度必须是 3 的倍数且每个索引都指向已有顶点
    pub fn set_indices(&mut self, indices: Vec<u16>) -> Result<()> {
        if indices.len() % 3 != 0 {
            return Err(MmdError::InvalidFormat(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        check_indices(&indices, self.vertices.len())?;
        self.indices = indices;
        Ok(())
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn find_bone(&self, name: &str) -> Option<(usize, &Bone)> {
        self.bones
            .iter()
            .enumerate()
            .find(|(_, b)| b.name().as_str() == name)
    }

    pub fn find_morph(&self, name: &str) -> Option<(usize, &Morph)> {
        self.morphs
            .iter()
            .enumerate()
            .find(|(_, m)| m.name().as_str() == name)
    }

    pub fn base_morph(&self) -> Option<&Morph> {
        self.morphs.iter().find(|m| m.is_base())
    }

    pub fn submeshes(&self) -> Result<Vec<SubMesh>> {
        build_submeshes(&self.materials, self.indices.len())
    }

    fn english_counts(&self) -> EnglishCounts {
        EnglishCounts::new(self.bones.len(), self.morphs.len(), self.bone_display_names.len())
    }

    /// 实际需要写出的扩展区段
    fn trailing_to_write(&self) -> TrailingSections {
        let needed = if !self.joints.is_empty() {
            TrailingSections::Joints
        } else if !self.rigid_bodies.is_empty() {
            TrailingSections::RigidBodies
        } else if self.toon_textures != ToonTextures::default() {
            TrailingSections::ToonTextures
        } else if self.english.is_some() {
            TrailingSections::English
        } else {
            TrailingSections::CoreOnly
        };
        needed.max(self.trailing)
    }

    /// 按原始布局写出
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        if self.geometry_skipped {
            return Err(MmdError::InvalidFormat(
                "model was loaded without geometry and cannot be written".to_string(),
            ));
        }
        let mut w = LeWriter::new(writer);

        w.write_bytes(PMD_MAGIC)?;
        w.write_f32(self.header.version)?;
        w.write_text(&self.header.model_name, MODEL_NAME_LEN)?;
        w.write_text(&self.header.comment, COMMENT_LEN)?;

        w.write_i32(count_i32(self.vertices.len(), "vertices")?)?;
        for vertex in self.vertices.iter() {
            vertex.write_to(&mut w)?;
        }

        let mut indices = self.indices.clone();
        swap_winding(&mut indices);
        w.write_i32(count_i32(indices.len(), "indices")?)?;
        for index in indices {
            w.write_u16(index)?;
        }

        w.write_i32(count_i32(self.materials.len(), "materials")?)?;
        for material in &self.materials {
            material.write_to(&mut w)?;
        }

        w.write_u16(count_u16(self.bones.len(), "bones")?)?;
        for bone in &self.bones {
            bone.write_to(&mut w)?;
        }

        w.write_u16(count_u16(self.iks.len(), "IK chains")?)?;
        for ik in &self.iks {
            ik.write_to(&mut w)?;
        }

        let morph_count = i16::try_from(self.morphs.len())
            .map_err(|_| MmdError::InvalidFormat(format!("too many morphs: {}", self.morphs.len())))?;
        w.write_i16(morph_count)?;
        for morph in &self.morphs {
            morph.write_to(&mut w)?;
        }

        display::write_morph_display(&mut w, &self.morph_display)?;
        display::write_bone_display_names(&mut w, &self.bone_display_names)?;
        display::write_bone_display(&mut w, &self.bone_display)?;

        let trailing = self.trailing_to_write();
        if trailing >= TrailingSections::English {
            EnglishHeader::write_to(self.english.as_ref(), &mut w, self.english_counts())?;
        }
        if trailing >= TrailingSections::ToonTextures {
            self.toon_textures.write_to(&mut w)?;
        }
        if trailing >= TrailingSections::RigidBodies {
            physics::write_rigid_bodies(&mut w, &self.rigid_bodies)?;
        }
        if trailing >= TrailingSections::Joints {
            physics::write_joints(&mut w, &self.joints)?;
        }
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
}

pub(crate) fn check_indices(indices: &[u16], vertex_count: usize) -> Result<()> {
    match indices.iter().find(|&&i| usize::from(i) >= vertex_count) {
        Some(&index) => Err(MmdError::IndexOutOfRange {
            index: usize::from(index),
            len: vertex_count,
        }),
        None => Ok(()),
    }
}

fn count_i32(len: usize, what: &str) -> Result<i32> {
    i32::try_from(len).map_err(|_| MmdError::InvalidFormat(format!("too many {}: {}", what, len)))
}

fn count_u16(len: usize, what: &str) -> Result<u16> {
    u16::try_from(len).map_err(|_| MmdError::InvalidFormat(format!("too many {}: {}", what, len)))
}
