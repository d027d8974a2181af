//! PMD 加载会话
//!
//! 区段顺序固定，按顺序逐段读取：
//! 头 → 顶点 → 面 → 材质 → 骨骼 → IK → 表情 → 显示枠 → 英文头 → toon → 刚体 → 关节

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use super::bone::Bone;
use super::display;
use super::english::{EnglishCounts, EnglishHeader};
use super::ik::IkChain;
use super::material::Material;
use super::model::{check_indices, Header, PmdModel, TrailingSections, COMMENT_LEN, MODEL_NAME_LEN, PMD_MAGIC};
use super::morph::Morph;
use super::physics;
use super::submesh::covered_indices;
use super::toon::ToonTextures;
use super::vertex::{Vertex, VertexBuffer, VERTEX_STRIDE};
use crate::config::{get_config, LoaderConfig};
use crate::coords::swap_winding;
use crate::io::{bounded_capacity, LeReader};
use crate::keyword::KeywordTable;
use crate::types::FixedRecord;
use crate::{MmdError, Result};

/// PMD 加载器
///
/// 持有关键字表和配置；同一个加载器可以连续加载多个模型，
/// 骨骼名、表情名在这些模型之间共享同一份驻留记录。
pub struct PmdLoader {
    keywords: Arc<KeywordTable>,
    config: LoaderConfig,
}

impl Default for PmdLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PmdLoader {
    /// 全局关键字表 + 当前全局配置
    pub fn new() -> Self {
        Self {
            keywords: KeywordTable::global(),
            config: get_config(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_keywords(mut self, keywords: Arc<KeywordTable>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn keywords(&self) -> &Arc<KeywordTable> {
        &self.keywords
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<PmdModel> {
        let path = path.as_ref();
        let file = File::open(path).map_err(MmdError::Io)?;
        let model = self.load_from(BufReader::new(file))?;
        log::info!("PMD 加载完成: {}", path.display());
        Ok(model)
    }

    pub fn load_from<R: BufRead>(&self, reader: R) -> Result<PmdModel> {
        let mut r = LeReader::new(reader);
        let mut model = PmdModel::default();

        model.header = self.read_header(&mut r)?;
        self.read_geometry(&mut r, &mut model)?;

        self.enter(&mut r, "materials");
        let count = read_count(&mut r, "material")?;
        model.materials = Vec::with_capacity(self.capacity(count));
        for material_no in 0..count {
            model.materials.push(Material::read_from(&mut r, material_no)?);
        }

        self.enter(&mut r, "bones");
        let count = r.read_u16()?;
        model.bones = (0..count)
            .map(|_| Bone::read_from(&mut r, &self.keywords))
            .collect::<Result<_>>()?;

        self.enter(&mut r, "ik chains");
        let count = r.read_u16()?;
        model.iks = (0..count)
            .map(|_| IkChain::read_from(&mut r))
            .collect::<Result<_>>()?;

        self.enter(&mut r, "morphs");
        let count = r.read_i16()?;
        let count = usize::try_from(count)
            .map_err(|_| MmdError::InvalidFormat(format!("negative morph count {}", count)))?;
        model.morphs = Vec::with_capacity(count);
        for _ in 0..count {
            model
                .morphs
                .push(Morph::read_from(&mut r, &self.keywords, self.config.max_preallocate)?);
        }

        self.enter(&mut r, "morph display");
        model.morph_display = display::read_morph_display(&mut r)?;
        self.enter(&mut r, "bone display names");
        model.bone_display_names = display::read_bone_display_names(&mut r)?;
        self.enter(&mut r, "bone display");
        model.bone_display = display::read_bone_display(&mut r, self.config.max_preallocate)?;

        self.read_trailing(&mut r, &mut model)?;
        self.summarize(&model, r.position());
        Ok(model)
    }

    fn enter<R: BufRead>(&self, r: &mut LeReader<R>, section: &'static str) {
        r.enter(section);
        if self.config.debug_log {
            log::debug!("PMD 区段 `{}` 起始于字节 {}", section, r.position());
        }
    }

    fn capacity(&self, count: usize) -> usize {
        bounded_capacity(count, self.config.max_preallocate)
    }

    fn read_header<R: BufRead>(&self, r: &mut LeReader<R>) -> Result<Header> {
        self.enter(r, "header");
        let magic = r.read_array::<3>()?;
        if &magic != PMD_MAGIC {
            return Err(MmdError::InvalidFormat(format!(
                "bad PMD magic {:02x?}",
                magic
            )));
        }
        let version = r.read_f32()?;
        if version != self.config.expected_version {
            log::warn!(
                "PMD 版本 {} 与期望的 {} 不一致，继续读取",
                version,
                self.config.expected_version
            );
        }
        Ok(Header {
            version,
            model_name: r.read_text(MODEL_NAME_LEN)?,
            comment: r.read_text(COMMENT_LEN)?,
        })
    }

    /// 顶点与面；跳过模式下精确消费相同字节数
    fn read_geometry<R: BufRead>(&self, r: &mut LeReader<R>, model: &mut PmdModel) -> Result<()> {
        let skip = self.config.skip_geometry;

        self.enter(r, "vertices");
        let vertex_count = read_count(r, "vertex")?;
        if skip {
            r.skip(vertex_count as u64 * VERTEX_STRIDE as u64)?;
        } else {
            let mut vertices = VertexBuffer::with_capacity(self.capacity(vertex_count));
            for _ in 0..vertex_count {
                vertices.push(&Vertex::read_from(r)?)?;
            }
            model.vertices = vertices;
        }

        self.enter(r, "faces");
        let index_count = read_count(r, "index")?;
        if index_count % 3 != 0 {
            return Err(MmdError::InvalidFormat(format!(
                "index count {} is not a multiple of 3",
                index_count
            )));
        }
        if skip {
            r.skip(index_count as u64 * 2)?;
        } else {
            let mut indices = Vec::with_capacity(self.capacity(index_count));
            for _ in 0..index_count {
                indices.push(r.read_u16()?);
            }
            swap_winding(&mut indices);
            check_indices(&indices, vertex_count)?;
            model.indices = indices;
        }
        model.geometry_skipped = skip;
        Ok(())
    }

    /// 英文头、toon 列表、刚体、关节
    ///
    /// 流恰好在某个区段边界结束时，之后的区段视为缺省；
    /// 区段一旦开始，中途截断即为错误。
    fn read_trailing<R: BufRead>(&self, r: &mut LeReader<R>, model: &mut PmdModel) -> Result<()> {
        model.trailing = TrailingSections::CoreOnly;

        // 早期工具导出的文件在显示枠之后直接结束，连英文标志字节都没有
        self.enter(r, "english header");
        if !r.has_remaining()? {
            return Ok(());
        }
        let counts = EnglishCounts::new(
            model.bones.len(),
            model.morphs.len(),
            model.bone_display_names.len(),
        );
        model.english = EnglishHeader::read_from(r, counts)?;
        model.trailing = TrailingSections::English;

        self.enter(r, "toon textures");
        if !r.has_remaining()? {
            return Ok(());
        }
        model.toon_textures = ToonTextures::read_from(r)?;
        model.trailing = TrailingSections::ToonTextures;

        self.enter(r, "rigid bodies");
        if !r.has_remaining()? {
            return Ok(());
        }
        model.rigid_bodies = physics::read_rigid_bodies(r, self.config.max_preallocate)?;
        model.trailing = TrailingSections::RigidBodies;

        self.enter(r, "joints");
        if !r.has_remaining()? {
            return Ok(());
        }
        model.joints = physics::read_joints(r, self.config.max_preallocate)?;
        model.trailing = TrailingSections::Joints;

        if r.has_remaining()? {
            log::debug!("PMD 关节区段之后还有未解析的数据，已忽略");
        }
        Ok(())
    }

    fn summarize(&self, model: &PmdModel, bytes: u64) {
        if !model.geometry_skipped {
            let covered = covered_indices(&model.materials);
            if covered != model.indices.len() as u64 {
                log::warn!(
                    "材质面顶点数之和 {} 与索引数 {} 不一致",
                    covered,
                    model.indices.len()
                );
            }
        }
        log::info!(
            "PMD 模型 `{}`: {} 顶点, {} 面, {} 材质, {} 骨骼, {} IK, {} 表情, {} 刚体, {} 关节 ({} 字节)",
            model.header.model_name,
            model.vertex_count(),
            model.face_count(),
            model.materials.len(),
            model.bones.len(),
            model.iks.len(),
            model.morphs.len(),
            model.rigid_bodies.len(),
            model.joints.len(),
            bytes
        );
    }
}

fn read_count<R: BufRead>(r: &mut LeReader<R>, what: &str) -> Result<usize> {
    let count = r.read_i32()?;
    usize::try_from(count)
        .map_err(|_| MmdError::InvalidFormat(format!("negative {} count {}", what, count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{LeWriter, SjisText};
    use crate::pmd::{
        BoneDisplay, BoneType, Joint, MorphKind, RigidBody, RigidBodyMode, RigidShape, MATERIAL_SIZE,
    };
    use crate::types::{ColorRgb, ColorRgba, TexCoord};
    use glam::Vec3;

    fn text(s: &str) -> SjisText {
        SjisText::new(s).unwrap()
    }

    fn loader() -> PmdLoader {
        PmdLoader::new()
            .with_keywords(Arc::new(KeywordTable::new()))
            .with_config(LoaderConfig::default())
    }

    fn vertex(x: f32, bone: u16) -> Vertex {
        Vertex {
            position: Vec3::new(x, 1.0, 2.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
            uv: TexCoord::new(x, 0.5),
            bones: [bone, 0],
            weight: 100,
            edge_flag: 0,
        }
    }

    fn material(material_no: usize, face_vert_count: u32) -> Material {
        Material {
            material_no,
            diffuse: ColorRgba::new(0.8, 0.8, 0.8, 1.0),
            specular_power: 5.0,
            specular: ColorRgb::new(0.0, 0.0, 0.0),
            ambient: ColorRgb::new(0.4, 0.4, 0.4),
            toon_index: 1,
            edge_flag: 1,
            face_vert_count,
            texture_name: text("skin.bmp"),
        }
    }

    fn sample_model(table: &KeywordTable) -> PmdModel {
        let mut model = PmdModel::new(Header {
            version: 1.0,
            model_name: text("テスト"),
            comment: text("round trip"),
        });
        for i in 0..4 {
            model.push_vertex(&vertex(i as f32, i % 2)).unwrap();
        }
        model.set_indices(vec![0, 1, 2, 2, 1, 3]).unwrap();
        model.materials = vec![material(0, 3), material(1, 3)];

        let center = Bone::new(table.intern_str("センター").unwrap(), BoneType::RotateMove, Vec3::ZERO);
        let mut knee = Bone::new(
            table.intern_str("左ひざ").unwrap(),
            BoneType::Rotate,
            Vec3::new(1.0, 5.0, -0.5),
        );
        knee.parent_index = 0;
        knee.tail_index = 2;
        let mut ik = Bone::new(table.intern_str("左足ＩＫ").unwrap(), BoneType::Ik, Vec3::new(1.0, 1.0, 0.0));
        ik.parent_index = 0;
        ik.ik_target_index = 1;
        model.bones = vec![center, knee, ik];
        model.iks = vec![IkChain {
            bone_index: 2,
            target_bone_index: 1,
            iterations: 40,
            control_weight: 0.5,
            links: vec![1],
        }];

        let mut base = Morph::new(table.intern_str("base").unwrap(), MorphKind::Base);
        base.push(0, Vec3::new(0.0, 1.0, 2.0));
        base.push(3, Vec3::new(3.0, 1.0, 2.0));
        let mut smile = Morph::new(table.intern_str("笑い").unwrap(), MorphKind::Eye);
        smile.push(1, Vec3::new(0.0, 0.1, -0.1));
        model.morphs = vec![base, smile];
        model.morph_display = vec![1];
        model.bone_display_names = vec![text("足\n")];
        model.bone_display = vec![BoneDisplay { bone_index: 1, group_index: 1 }];
        model.english = Some(EnglishHeader {
            model_name: text("Test"),
            comment: text("english"),
            bone_names: vec![text("center"), text("knee_L"), text("leg IK_L")],
            morph_names: vec![text("smile")],
            bone_display_names: vec![text("Legs\n")],
        });
        model.rigid_bodies = vec![RigidBody {
            name: text("足"),
            bone_index: 1,
            group: 2,
            group_mask: 0xFFFF,
            shape: RigidShape::Sphere,
            size: Vec3::new(0.5, 0.0, 0.0),
            position: Vec3::new(0.0, 0.0, 0.25),
            rotation: Vec3::new(0.1, 0.2, 0.3),
            mass: 1.0,
            linear_damping: 0.5,
            angular_damping: 0.5,
            restitution: 0.0,
            friction: 0.5,
            mode: RigidBodyMode::Dynamic,
        }];
        model.joints = vec![Joint {
            name: text("足J"),
            rigid_body_a: 0,
            rigid_body_b: 0,
            position: Vec3::new(0.0, 1.0, 0.5),
            rotation: Vec3::ZERO,
            position_lower: Vec3::ZERO,
            position_upper: Vec3::ZERO,
            rotation_lower: Vec3::splat(-0.1),
            rotation_upper: Vec3::splat(0.1),
            spring_position: Vec3::ZERO,
            spring_rotation: Vec3::ZERO,
        }];
        model
    }

    /// 魔数、版本、空名称、零计数，直到骨骼显示列表为止
    fn minimal_core() -> LeWriter<Vec<u8>> {
        let mut w = LeWriter::new(Vec::new());
        w.write_bytes(b"Pmd").unwrap();
        w.write_f32(1.0).unwrap();
        w.write_fixed_bytes(&[], MODEL_NAME_LEN).unwrap();
        w.write_fixed_bytes(&[], COMMENT_LEN).unwrap();
        w.write_i32(0).unwrap(); // vertices
        w.write_i32(0).unwrap(); // indices
        w.write_i32(0).unwrap(); // materials
        w.write_u16(0).unwrap(); // bones
        w.write_u16(0).unwrap(); // ik
        w.write_i16(0).unwrap(); // morphs
        w.write_u8(0).unwrap(); // morph display
        w.write_u8(0).unwrap(); // bone display names
        w.write_i32(0).unwrap(); // bone display
        w
    }

    const MODEL_NAME_OFFSET: usize = 3 + 4;
    const MORPH_COUNT_OFFSET: usize = MODEL_NAME_OFFSET + MODEL_NAME_LEN + COMMENT_LEN + 4 * 3 + 2 * 2;

    fn bones_start() -> usize {
        3 + 4 + MODEL_NAME_LEN + COMMENT_LEN
            + 4 + 4 * VERTEX_STRIDE
            + 4 + 6 * 2
            + 4 + 2 * MATERIAL_SIZE
    }

    #[test]
    fn test_minimal_file_loads_empty_model() {
        let bytes = minimal_core().into_inner();
        let model = loader().load_from(&bytes[..]).unwrap();
        assert_eq!(model.vertex_count(), 0);
        assert!(model.indices().is_empty());
        assert!(model.materials.is_empty());
        assert!(model.bones.is_empty());
        assert!(model.iks.is_empty());
        assert!(model.morphs.is_empty());
        assert!(model.morph_display.is_empty());
        assert!(model.bone_display.is_empty());
        assert!(model.english.is_none());
        assert!(model.rigid_bodies.is_empty());
        assert!(model.joints.is_empty());
        assert_eq!(model.trailing, TrailingSections::CoreOnly);
        assert_eq!(model.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_minimal_file_with_english_flag_and_toons() {
        let mut w = minimal_core();
        w.write_u8(0).unwrap();
        ToonTextures::default().write_to(&mut w).unwrap();
        let bytes = w.into_inner();
        let model = loader().load_from(&bytes[..]).unwrap();
        assert_eq!(model.trailing, TrailingSections::ToonTextures);
        assert!(model.rigid_bodies.is_empty());
        assert!(model.joints.is_empty());
        assert_eq!(model.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = minimal_core().into_inner();
        bytes[0] = b'X';
        let err = loader().load_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, MmdError::InvalidFormat(_)));
    }

    #[test]
    fn test_unexpected_version_still_loads() {
        let mut bytes = minimal_core().into_inner();
        bytes[3..7].copy_from_slice(&2.0f32.to_le_bytes());
        let model = loader().load_from(&bytes[..]).unwrap();
        assert_eq!(model.header.version, 2.0);
    }

    #[test]
    fn test_full_round_trip_is_byte_identical() {
        let table = KeywordTable::new();
        let model = sample_model(&table);
        let bytes = model.to_bytes().unwrap();

        let loaded = loader().load_from(&bytes[..]).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.trailing, TrailingSections::Joints);
        assert_eq!(loaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_winding_and_z_flip_on_the_wire() {
        let table = KeywordTable::new();
        let model = sample_model(&table);
        let bytes = model.to_bytes().unwrap();

        // 第一个顶点的位置 Z 在文件中为 -2.0
        let vertex_start = 3 + 4 + MODEL_NAME_LEN + COMMENT_LEN + 4;
        assert_eq!(&bytes[vertex_start + 8..vertex_start + 12], &(-2.0f32).to_le_bytes());

        // 第一个三角形在文件中为 1, 0, 2
        let index_start = vertex_start + 4 * VERTEX_STRIDE + 4;
        let first: Vec<u16> = bytes[index_start..index_start + 6]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(first, vec![1, 0, 2]);
    }

    #[test]
    fn test_physics_sections_are_optional() {
        let table = KeywordTable::new();
        let mut model = sample_model(&table);
        model.rigid_bodies.clear();
        model.joints.clear();
        model.trailing = TrailingSections::ToonTextures;
        let bytes = model.to_bytes().unwrap();

        let loaded = loader().load_from(&bytes[..]).unwrap();
        assert!(loaded.rigid_bodies.is_empty());
        assert!(loaded.joints.is_empty());
        assert_eq!(loaded.trailing, TrailingSections::ToonTextures);
        assert_eq!(loaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_rigid_bodies_without_joints() {
        let table = KeywordTable::new();
        let mut model = sample_model(&table);
        model.joints.clear();
        model.trailing = TrailingSections::RigidBodies;
        let bytes = model.to_bytes().unwrap();

        let loaded = loader().load_from(&bytes[..]).unwrap();
        assert_eq!(loaded.rigid_bodies.len(), 1);
        assert!(loaded.joints.is_empty());
        assert_eq!(loaded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_truncation_inside_started_section_is_fatal() {
        let table = KeywordTable::new();
        let bytes = sample_model(&table).to_bytes().unwrap();
        let cut = &bytes[..bytes.len() - 10];
        let err = loader().load_from(cut).unwrap_err();
        assert!(matches!(err, MmdError::Truncated { section: "joints", .. }));
    }

    #[test]
    fn test_truncation_names_the_section() {
        let table = KeywordTable::new();
        let bytes = sample_model(&table).to_bytes().unwrap();
        let cut = &bytes[..bones_start() + 2 + 10];
        let err = loader().load_from(cut).unwrap_err();
        assert!(matches!(err, MmdError::Truncated { section: "bones", .. }));
    }

    #[test]
    fn test_skip_geometry_consumes_same_bytes() {
        let table = KeywordTable::new();
        let model = sample_model(&table);
        let bytes = model.to_bytes().unwrap();

        let config = LoaderConfig {
            skip_geometry: true,
            ..Default::default()
        };
        let skipped = loader().with_config(config).load_from(&bytes[..]).unwrap();
        assert!(skipped.geometry_skipped());
        assert_eq!(skipped.vertex_count(), 0);
        assert!(skipped.indices().is_empty());
        assert_eq!(skipped.bones, model.bones);
        assert_eq!(skipped.morphs, model.morphs);
        assert_eq!(skipped.joints, model.joints);
        assert!(matches!(skipped.to_bytes(), Err(MmdError::InvalidFormat(_))));
    }

    #[test]
    fn test_short_skip_is_reported() {
        let table = KeywordTable::new();
        let bytes = sample_model(&table).to_bytes().unwrap();
        let vertex_start = 3 + 4 + MODEL_NAME_LEN + COMMENT_LEN + 4;
        let cut = &bytes[..vertex_start + VERTEX_STRIDE];

        let config = LoaderConfig {
            skip_geometry: true,
            ..Default::default()
        };
        let err = loader().with_config(config).load_from(cut).unwrap_err();
        assert!(matches!(
            err,
            MmdError::SkipMismatch {
                section: "vertices",
                expected,
                actual,
            } if expected == 4 * VERTEX_STRIDE as u64 && actual == VERTEX_STRIDE as u64
        ));
    }

    fn with_faces(vertex_count: usize, indices: &[u16]) -> Vec<u8> {
        let mut w = LeWriter::new(Vec::new());
        w.write_bytes(b"Pmd").unwrap();
        w.write_f32(1.0).unwrap();
        w.write_fixed_bytes(&[], MODEL_NAME_LEN + COMMENT_LEN).unwrap();
        w.write_i32(vertex_count as i32).unwrap();
        for i in 0..vertex_count {
            vertex(i as f32, 0).write_to(&mut w).unwrap();
        }
        w.write_i32(indices.len() as i32).unwrap();
        for &i in indices {
            w.write_u16(i).unwrap();
        }
        w.into_inner()
    }

    #[test]
    fn test_index_count_must_be_multiple_of_three() {
        let bytes = with_faces(3, &[0, 1, 2, 0]);
        let err = loader().load_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, MmdError::InvalidFormat(_)));
    }

    #[test]
    fn test_index_past_vertex_count() {
        let bytes = with_faces(3, &[0, 1, 3]);
        let err = loader().load_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, MmdError::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn test_negative_vertex_count() {
        let mut w = LeWriter::new(Vec::new());
        w.write_bytes(b"Pmd").unwrap();
        w.write_f32(1.0).unwrap();
        w.write_fixed_bytes(&[], MODEL_NAME_LEN + COMMENT_LEN).unwrap();
        w.write_i32(-5).unwrap();
        let bytes = w.into_inner();
        let err = loader().load_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, MmdError::InvalidFormat(_)));
    }

    #[test]
    fn test_knee_flag_recomputed_on_load() {
        let table = KeywordTable::new();
        let bytes = sample_model(&table).to_bytes().unwrap();
        let loaded = loader().load_from(&bytes[..]).unwrap();

        let (index, knee) = loaded.find_bone("左ひざ").unwrap();
        assert_eq!(index, 1);
        assert!(knee.is_knee());
        assert_eq!(knee.parent(), Some(0));
        assert!(!loaded.bones[0].is_knee());
        assert_eq!(loaded.bones[0].parent(), None);
        assert_eq!(loaded.bones[2].ik_target(), Some(1));
    }

    #[test]
    fn test_vertex_addressing() {
        let table = KeywordTable::new();
        let mut model = sample_model(&table);
        let v = vertex(9.0, 1);
        model.set_vertex(3, &v).unwrap();
        assert_eq!(model.vertex(3).unwrap(), v);
        assert_eq!(model.vertex(2).unwrap(), vertex(2.0, 0));
        assert!(matches!(
            model.vertex(4),
            Err(MmdError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(model.set_vertex(4, &v).is_err());
    }

    #[test]
    fn test_names_shared_across_loads() {
        let table = KeywordTable::new();
        let bytes = sample_model(&table).to_bytes().unwrap();
        let loader = loader();
        let a = loader.load_from(&bytes[..]).unwrap();
        let b = loader.load_from(&bytes[..]).unwrap();
        assert!(Arc::ptr_eq(a.bones[1].name(), b.bones[1].name()));
        assert_eq!(a.find_morph("笑い").map(|(i, _)| i), Some(1));
        assert!(a.base_morph().is_some());
    }

    #[test]
    fn test_submeshes_follow_materials() {
        let table = KeywordTable::new();
        let model = sample_model(&table);
        let submeshes = model.submeshes().unwrap();
        assert_eq!(submeshes.len(), 2);
        assert_eq!(submeshes[1].begin_index, 3);
        assert_eq!(submeshes[1].index_count, 3);
        assert_eq!(submeshes[1].material_no, 1);
    }

    #[test]
    fn test_save_and_load_file() {
        let table = KeywordTable::new();
        let model = sample_model(&table);
        let path = std::env::temp_dir().join(format!("mmd_codec_{}.pmd", std::process::id()));
        model.save(&path).unwrap();
        let loaded = loader().load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_model_name_bytes_survive_round_trip() {
        // 0xED40 解码后重新编码会变成 0xFA5C
        let mut bytes = minimal_core().into_inner();
        bytes[MODEL_NAME_OFFSET..MODEL_NAME_OFFSET + 2].copy_from_slice(&[0xED, 0x40]);
        let model = loader().load_from(&bytes[..]).unwrap();
        assert_eq!(model.header.model_name.bytes(), &[0xED, 0x40]);
        assert!(!model.header.model_name.as_str().is_empty());
        assert_eq!(model.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_overlong_model_name_reloads() {
        let table = KeywordTable::new();
        let mut model = sample_model(&table);
        model.header.model_name = text(&format!("a{}", "あ".repeat(10)));
        let bytes = model.to_bytes().unwrap();

        let loaded = loader().load_from(&bytes[..]).unwrap();
        assert_eq!(loaded.header.model_name, format!("a{}", "あ".repeat(9)).as_str());
        assert_eq!(loaded.bones, model.bones);
    }

    #[test]
    fn test_negative_morph_count() {
        let mut bytes = minimal_core().into_inner();
        bytes[MORPH_COUNT_OFFSET..MORPH_COUNT_OFFSET + 2].copy_from_slice(&(-1i16).to_le_bytes());
        let err = loader().load_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, MmdError::InvalidFormat(_)));
    }

    #[test]
    fn test_morph_count_over_i16_refuses_to_write() {
        let table = KeywordTable::new();
        let mut model = PmdModel::default();
        let morph = Morph::new(table.intern_str("base").unwrap(), MorphKind::Base);
        model.morphs = vec![morph; 32768];
        let err = model.to_bytes().unwrap_err();
        assert!(matches!(err, MmdError::InvalidFormat(_)));

        model.morphs.truncate(32767);
        assert!(model.to_bytes().is_ok());
    }

    #[test]
    fn test_undecodable_model_name_aborts_load() {
        let mut bytes = minimal_core().into_inner();
        bytes[MODEL_NAME_OFFSET..MODEL_NAME_OFFSET + 2].copy_from_slice(&[0x82, 0x20]);
        let err = loader().load_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, MmdError::Encoding { .. }));
    }

    #[test]
    fn test_undecodable_bone_name_aborts_load() {
        let table = KeywordTable::new();
        let mut bytes = sample_model(&table).to_bytes().unwrap();
        let name = bones_start() + 2;
        bytes[name..name + 2].copy_from_slice(&[0x82, 0x20]);
        let err = loader().load_from(&bytes[..]).unwrap_err();
        assert!(matches!(err, MmdError::Encoding { .. }));
    }
}
