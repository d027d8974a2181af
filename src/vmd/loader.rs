//! VMD 加载会话

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use super::file::{VmdFile, MAGIC_LEN, MODEL_NAME_LEN, VMD_MAGIC};
use super::{VmdMotion, VmdSkin};
use crate::config::{get_config, LoaderConfig};
use crate::io::text::{trim_incomplete_sjis, trim_nul};
use crate::io::{bounded_capacity, LeReader, SjisText};
use crate::keyword::KeywordTable;
use crate::{MmdError, Result};

/// VMD 加载器
///
/// 与 [`crate::PmdLoader`] 一样持有关键字表和配置，
/// 动作中的骨骼名、表情名与同一张表中的模型名称共享驻留记录。
pub struct VmdLoader {
    keywords: Arc<KeywordTable>,
    config: LoaderConfig,
}

impl Default for VmdLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VmdLoader {
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

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<VmdFile> {
        let path = path.as_ref();
        let file = File::open(path).map_err(MmdError::Io)?;
        let vmd = self.load_from(BufReader::new(file))?;
        log::info!("VMD 加载完成: {}", path.display());
        Ok(vmd)
    }

    pub fn load_from<R: BufRead>(&self, reader: R) -> Result<VmdFile> {
        let mut r = LeReader::new(reader);

        self.enter(&mut r, "vmd header");
        let magic = r.read_array::<MAGIC_LEN>()?;
        if trim_nul(&magic) != VMD_MAGIC {
            return Err(MmdError::VmdParse(format!(
                "unsupported VMD signature {:?}",
                String::from_utf8_lossy(trim_nul(&magic))
            )));
        }
        let mut name = r.read_fixed_bytes(MODEL_NAME_LEN)?;
        let end = trim_incomplete_sjis(&name).len();
        name.truncate(end);
        let model_name = SjisText::from_bytes(name, "vmd model name")?;

        self.enter(&mut r, "bone keyframes");
        let count = r.read_u32()? as usize;
        let mut motions = Vec::with_capacity(self.capacity(count));
        for _ in 0..count {
            motions.push(VmdMotion::read_from(&mut r, &self.keywords)?);
        }

        self.enter(&mut r, "morph keyframes");
        let count = r.read_u32()? as usize;
        let mut skins = Vec::with_capacity(self.capacity(count));
        for _ in 0..count {
            skins.push(VmdSkin::read_from(&mut r, &self.keywords)?);
        }

        log::debug!(
            "VMD `{}`: {} 骨骼关键帧, {} 表情关键帧",
            model_name,
            motions.len(),
            skins.len()
        );
        Ok(VmdFile {
            model_name,
            motions,
            skins,
        })
    }

    fn enter<R: BufRead>(&self, r: &mut LeReader<R>, section: &'static str) {
        r.enter(section);
        if self.config.debug_log {
            log::debug!("VMD 区段 `{}` 起始于字节 {}", section, r.position());
        }
    }

    fn capacity(&self, count: usize) -> usize {
        bounded_capacity(count, self.config.max_preallocate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::LeWriter;

    fn loader(table: &Arc<KeywordTable>) -> VmdLoader {
        VmdLoader::new()
            .with_keywords(table.clone())
            .with_config(LoaderConfig::default())
    }

    fn header(w: &mut LeWriter<Vec<u8>>, model_name: &[u8]) {
        w.write_fixed_bytes(VMD_MAGIC, MAGIC_LEN).unwrap();
        w.write_fixed_bytes(model_name, MODEL_NAME_LEN).unwrap();
    }

    #[test]
    fn test_old_signature_is_rejected() {
        let mut w = LeWriter::new(Vec::new());
        w.write_fixed_bytes(b"Vocaloid Motion Data file", MAGIC_LEN).unwrap();
        w.write_fixed_bytes(&[], 10).unwrap();
        let bytes = w.into_inner();
        let err = loader(&Arc::new(KeywordTable::new()))
            .load_from(&bytes[..])
            .unwrap_err();
        assert!(matches!(err, MmdError::VmdParse(_)));
    }

    #[test]
    fn test_huge_count_is_bounded_by_session_config() {
        let mut w = LeWriter::new(Vec::new());
        header(&mut w, b"model");
        w.write_u32(u32::MAX).unwrap();
        let bytes = w.into_inner();

        let config = LoaderConfig {
            max_preallocate: 4,
            ..LoaderConfig::default()
        };
        let err = VmdLoader::new()
            .with_keywords(Arc::new(KeywordTable::new()))
            .with_config(config)
            .load_from(&bytes[..])
            .unwrap_err();
        assert!(matches!(err, MmdError::Truncated { section: "bone keyframes", .. }));
    }

    #[test]
    fn test_model_name_cut_mid_character() {
        let mut name = crate::io::text::encode_shift_jis("初音ミク", "test")
            .unwrap()
            .into_owned();
        name.push(0x83);
        let mut w = LeWriter::new(Vec::new());
        header(&mut w, &name);
        w.write_u32(0).unwrap();
        w.write_u32(0).unwrap();
        let bytes = w.into_inner();

        let vmd = loader(&Arc::new(KeywordTable::new())).load_from(&bytes[..]).unwrap();
        assert_eq!(vmd.model_name, "初音ミク");
        assert!(vmd.motions.is_empty());
    }

    #[test]
    fn test_names_interned_in_session_table() {
        let table = Arc::new(KeywordTable::new());
        let center = table.intern_str("センター").unwrap();
        let file = VmdFile {
            model_name: SjisText::new("model").unwrap(),
            motions: vec![VmdMotion::new(center.clone(), 0, glam::Vec3::ZERO, glam::Quat::IDENTITY)],
            skins: Vec::new(),
        };
        let bytes = file.to_bytes().unwrap();

        let back = loader(&table).load_from(&bytes[..]).unwrap();
        assert!(Arc::ptr_eq(&back.motions[0].name, &center));
    }
}
