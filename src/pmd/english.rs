//! 英文本地化头

use std::io::{BufRead, Write};

use crate::io::{LeReader, LeWriter, SjisText};
use crate::{MmdError, Result};

const NAME_LEN: usize = 20;
const COMMENT_LEN: usize = 256;
const DISP_NAME_LEN: usize = 50;

/// 英文名称块
///
/// 各列表长度由模型本体决定：骨骼数、表情数 - 1（基准表情没有英文名）、
/// 骨骼显示枠名数。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnglishHeader {
    pub model_name: SjisText,
    pub comment: SjisText,
    pub bone_names: Vec<SjisText>,
    pub morph_names: Vec<SjisText>,
    pub bone_display_names: Vec<SjisText>,
}

/// 英文块各列表的期望长度
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnglishCounts {
    pub bones: usize,
    pub morphs: usize,
    pub bone_display_names: usize,
}

impl EnglishCounts {
    pub fn new(bones: usize, morphs_with_base: usize, bone_display_names: usize) -> Self {
        Self {
            bones,
            morphs: morphs_with_base.saturating_sub(1),
            bone_display_names,
        }
    }
}

fn read_names<R: BufRead>(r: &mut LeReader<R>, count: usize, len: usize) -> Result<Vec<SjisText>> {
    (0..count).map(|_| r.read_text(len)).collect()
}

fn write_names<W: Write>(w: &mut LeWriter<W>, names: &[SjisText], len: usize) -> Result<()> {
    names.iter().try_for_each(|name| w.write_text(name, len))
}

impl EnglishHeader {
    /// 读取标志字节；为 0 时返回 `None`
    pub fn read_from<R: BufRead>(r: &mut LeReader<R>, counts: EnglishCounts) -> Result<Option<Self>> {
        if r.read_u8()? == 0 {
            return Ok(None);
        }
        Ok(Some(Self {
            model_name: r.read_text(NAME_LEN)?,
            comment: r.read_text(COMMENT_LEN)?,
            bone_names: read_names(r, counts.bones, NAME_LEN)?,
            morph_names: read_names(r, counts.morphs, NAME_LEN)?,
            bone_display_names: read_names(r, counts.bone_display_names, DISP_NAME_LEN)?,
        }))
    }

    /// 写入标志字节和名称块，`None` 只写一个 0
    pub fn write_to<W: Write>(
        header: Option<&Self>,
        w: &mut LeWriter<W>,
        counts: EnglishCounts,
    ) -> Result<()> {
        let Some(header) = header else {
            return w.write_u8(0);
        };
        header.check_counts(counts)?;
        w.write_u8(1)?;
        w.write_text(&header.model_name, NAME_LEN)?;
        w.write_text(&header.comment, COMMENT_LEN)?;
        write_names(w, &header.bone_names, NAME_LEN)?;
        write_names(w, &header.morph_names, NAME_LEN)?;
        write_names(w, &header.bone_display_names, DISP_NAME_LEN)
    }

    fn check_counts(&self, counts: EnglishCounts) -> Result<()> {
        let actual = EnglishCounts {
            bones: self.bone_names.len(),
            morphs: self.morph_names.len(),
            bone_display_names: self.bone_display_names.len(),
        };
        if actual != counts {
            return Err(MmdError::InvalidFormat(format!(
                "english header lists {:?} do not match model {:?}",
                actual, counts
            )));
        }
        Ok(())
    }
}
