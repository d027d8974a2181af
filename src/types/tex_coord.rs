use std::io::{BufRead, Write};

use glam::Vec2;

use super::{bits_eq, FixedRecord};
use crate::io::{LeReader, LeWriter, SliceReader, SliceWriter};
use crate::Result;

/// 二维纹理坐标
#[derive(Clone, Copy, Debug, Default)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
}

impl TexCoord {
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.u, self.v)
    }
}

impl From<Vec2> for TexCoord {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl PartialEq for TexCoord {
    fn eq(&self, other: &Self) -> bool {
        bits_eq(&[self.u, self.v], &[other.u, other.v])
    }
}

impl FixedRecord for TexCoord {
    const SIZE: usize = 8;

    fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        Ok(Self {
            u: r.read_f32()?,
            v: r.read_f32()?,
        })
    }

    fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_f32(self.u)?;
        w.write_f32(self.v)
    }

    fn read_at(buf: &[u8], offset: usize) -> Result<Self> {
        let mut r = SliceReader::at(buf, offset, Self::SIZE)?;
        Ok(Self {
            u: r.f32(),
            v: r.f32(),
        })
    }

    fn write_at(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let mut w = SliceWriter::at(buf, offset, Self::SIZE)?;
        w.f32(self.u);
        w.f32(self.v);
        Ok(())
    }
}
