//! 表情关键帧

use std::io::{BufRead, Write};

use super::{read_keyframe_name, VMD_NAME_LEN};
use crate::io::{LeReader, LeWriter};
use crate::keyword::{KeywordTable, Name};
use crate::Result;

pub const VMD_SKIN_SIZE: usize = 23;

/// 某一帧上某个表情的权重
#[derive(Clone, Debug, PartialEq)]
pub struct VmdSkin {
    pub name: Name,
    pub frame: u32,
    /// 0.0 ..= 1.0
    pub weight: f32,
}

impl VmdSkin {
    pub fn new(name: Name, frame: u32, weight: f32) -> Self {
        Self { name, frame, weight }
    }

    pub fn read_from<R: BufRead>(r: &mut LeReader<R>, keywords: &KeywordTable) -> Result<Self> {
        Ok(Self {
            name: read_keyframe_name(r, keywords)?,
            frame: r.read_u32()?,
            weight: r.read_f32()?,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_name(&self.name, VMD_NAME_LEN)?;
        w.write_u32(self.frame)?;
        w.write_f32(self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_round_trip_is_23_bytes() {
        let table = KeywordTable::new();
        let skin = VmdSkin::new(table.intern_str("まばたき").unwrap(), 120, 0.75);
        let mut w = LeWriter::new(Vec::new());
        skin.write_to(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), VMD_SKIN_SIZE);

        let back = VmdSkin::read_from(&mut LeReader::new(Cursor::new(&bytes[..])), &table).unwrap();
        assert_eq!(back, skin);
        assert!(std::sync::Arc::ptr_eq(&back.name, &skin.name));
    }

    #[test]
    fn test_name_cut_mid_character() {
        let table = KeywordTable::new();
        let mut raw = crate::io::text::encode_shift_jis("右人指", "test")
            .unwrap()
            .into_owned();
        // 最后一个字节是缺少尾字节的前导字节
        raw.extend_from_slice(&[0x81, 0x40, 0x81, 0x40, 0x81, 0x40, 0x83, 0x93, 0x83]);
        assert_eq!(raw.len(), VMD_NAME_LEN);

        let mut w = LeWriter::new(Vec::new());
        w.write_bytes(&raw).unwrap();
        w.write_u32(0).unwrap();
        w.write_f32(1.0).unwrap();
        let bytes = w.into_inner();

        let skin = VmdSkin::read_from(&mut LeReader::new(Cursor::new(&bytes[..])), &table).unwrap();
        assert_eq!(skin.name.as_str(), "右人指　　　ン");
    }
}
