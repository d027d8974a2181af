//! PMD 材质记录

use std::io::{BufRead, Write};

use crate::io::{LeReader, LeWriter, SjisText};
use crate::types::{ColorRgb, ColorRgba, FixedRecord};
use crate::Result;

pub const TEXTURE_NAME_LEN: usize = 20;

/// 材质记录大小
pub const MATERIAL_SIZE: usize = 70;

/// 贴图名与球面贴图名之间的分隔符
const SPHERE_SEPARATOR: char = '*';

/// PMD 材质
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// 在材质列表中的序号，决定绘制顺序
    pub material_no: usize,
    pub diffuse: ColorRgba,
    pub specular_power: f32,
    pub specular: ColorRgb,
    pub ambient: ColorRgb,
    /// toon 贴图序号，0xFF 表示不使用
    pub toon_index: u8,
    pub edge_flag: u8,
    /// 此材质覆盖的面索引个数（三角形数 × 3）
    pub face_vert_count: u32,
    /// `贴图名*球面贴图名`
    pub texture_name: SjisText,
}

impl Material {
    pub fn read_from<R: BufRead>(r: &mut LeReader<R>, material_no: usize) -> Result<Self> {
        Ok(Self {
            material_no,
            diffuse: ColorRgba::read_from(r)?,
            specular_power: r.read_f32()?,
            specular: ColorRgb::read_from(r)?,
            ambient: ColorRgb::read_from(r)?,
            toon_index: r.read_u8()?,
            edge_flag: r.read_u8()?,
            face_vert_count: r.read_u32()?,
            texture_name: r.read_text(TEXTURE_NAME_LEN)?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        self.diffuse.write_to(w)?;
        w.write_f32(self.specular_power)?;
        self.specular.write_to(w)?;
        self.ambient.write_to(w)?;
        w.write_u8(self.toon_index)?;
        w.write_u8(self.edge_flag)?;
        w.write_u32(self.face_vert_count)?;
        w.write_text(&self.texture_name, TEXTURE_NAME_LEN)
    }

    pub fn has_edge(&self) -> bool {
        self.edge_flag != 0
    }

    pub fn toon(&self) -> Option<usize> {
        (self.toon_index != 0xFF).then_some(self.toon_index as usize)
    }

    /// 主贴图文件名（去掉 `*` 之后的球面贴图部分）
    pub fn texture_file(&self) -> Option<&str> {
        let main = self
            .texture_name
            .as_str()
            .split(SPHERE_SEPARATOR)
            .next()
            .unwrap_or_default();
        (!main.is_empty() && !is_sphere(main)).then_some(main)
    }

    /// 球面贴图文件名（`.sph` / `.spa`）
    pub fn sphere_file(&self) -> Option<&str> {
        let name = self.texture_name.as_str();
        match name.split_once(SPHERE_SEPARATOR) {
            Some((_, sphere)) if !sphere.is_empty() => Some(sphere),
            Some(_) => None,
            None => is_sphere(name).then_some(name),
        }
    }
}

fn is_sphere(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".sph") || lower.ends_with(".spa")
}
