//! toon 贴图列表

use std::io::{BufRead, Write};

use crate::io::{LeReader, LeWriter, SjisText};
use crate::Result;

pub const TOON_COUNT: usize = 10;
pub const TOON_NAME_LEN: usize = 100;

/// 固定 10 项的 toon 贴图文件名
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToonTextures(pub [SjisText; TOON_COUNT]);

impl Default for ToonTextures {
    /// `toon01.bmp` .. `toon10.bmp`
    fn default() -> Self {
        Self(std::array::from_fn(|i| SjisText::from_ascii(format!("toon{:02}.bmp", i + 1))))
    }
}

impl ToonTextures {
    pub fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        let mut names: [SjisText; TOON_COUNT] = Default::default();
        for name in names.iter_mut() {
            *name = r.read_text(TOON_NAME_LEN)?;
        }
        Ok(Self(names))
    }

    pub fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        for name in &self.0 {
            w.write_text(name, TOON_NAME_LEN)?;
        }
        Ok(())
    }

    /// 材质的 toon 序号对应的文件名
    pub fn get(&self, toon_index: u8) -> Option<&str> {
        self.0.get(toon_index as usize).map(SjisText::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_default_names() {
        let toons = ToonTextures::default();
        assert_eq!(toons.get(0), Some("toon01.bmp"));
        assert_eq!(toons.get(9), Some("toon10.bmp"));
        assert_eq!(toons.get(0xFF), None);
    }

    #[test]
    fn test_round_trip_is_1000_bytes() {
        let mut toons = ToonTextures::default();
        toons.0[3].set("custom.bmp").unwrap();
        let mut w = LeWriter::new(Vec::new());
        toons.write_to(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), TOON_COUNT * TOON_NAME_LEN);
        let back = ToonTextures::read_from(&mut LeReader::new(Cursor::new(&bytes[..]))).unwrap();
        assert_eq!(back, toons);
    }
}
