//! 三维向量（直接使用 glam::Vec3）

use std::io::{BufRead, Write};

use glam::Vec3;

use super::FixedRecord;
use crate::io::{LeReader, LeWriter, SliceReader, SliceWriter};
use crate::Result;

impl FixedRecord for Vec3 {
    const SIZE: usize = 12;

    fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        Ok(Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?))
    }

    fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_f32(self.x)?;
        w.write_f32(self.y)?;
        w.write_f32(self.z)
    }

    fn read_at(buf: &[u8], offset: usize) -> Result<Self> {
        let mut r = SliceReader::at(buf, offset, Self::SIZE)?;
        Ok(Vec3::new(r.f32(), r.f32(), r.f32()))
    }

    fn write_at(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let mut w = SliceWriter::at(buf, offset, Self::SIZE)?;
        w.f32(self.x);
        w.f32(self.y);
        w.f32(self.z);
        Ok(())
    }
}
