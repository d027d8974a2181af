//! 材质到索引区间的映射

use super::material::Material;
use crate::{MmdError, Result};

/// 子网格：一个材质覆盖的连续索引区间
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub begin_index: u32,
    pub index_count: u32,
    pub material_no: usize,
}

impl SubMesh {
    pub fn new(begin_index: u32, index_count: u32, material_no: usize) -> Self {
        Self { begin_index, index_count, material_no }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        let begin = self.begin_index as usize;
        begin..begin + self.index_count as usize
    }
}

/// 按材质顺序累加面顶点数
pub fn build_submeshes(materials: &[Material], index_count: usize) -> Result<Vec<SubMesh>> {
    let mut begin: u64 = 0;
    let mut submeshes = Vec::with_capacity(materials.len());
    for material in materials {
        let count = u64::from(material.face_vert_count);
        let end = begin + count;
        if end > index_count as u64 {
            return Err(MmdError::InvalidFormat(format!(
                "material {} covers indices {}..{} but only {} exist",
                material.material_no, begin, end, index_count
            )));
        }
        // end <= index_count，u32 足够容纳
        submeshes.push(SubMesh::new(begin as u32, count as u32, material.material_no));
        begin = end;
    }
    Ok(submeshes)
}

/// 所有材质的面顶点数之和
pub fn covered_indices(materials: &[Material]) -> u64 {
    materials.iter().map(|m| u64::from(m.face_vert_count)).sum()
}
