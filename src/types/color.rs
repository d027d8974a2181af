use std::io::{BufRead, Write};

use glam::{Vec3, Vec4};

use super::{bits_eq, FixedRecord};
use crate::io::{LeReader, LeWriter, SliceReader, SliceWriter};
use crate::Result;

/// RGB 颜色（不做 [0,1] 范围校验）
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// RGBA 颜色
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn with_alpha(self, a: f32) -> ColorRgba {
        ColorRgba::new(self.r, self.g, self.b, a)
    }
}

impl ColorRgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(self) -> ColorRgb {
        ColorRgb::new(self.r, self.g, self.b)
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

impl PartialEq for ColorRgb {
    fn eq(&self, o: &Self) -> bool {
        bits_eq(&[self.r, self.g, self.b], &[o.r, o.g, o.b])
    }
}

impl PartialEq for ColorRgba {
    fn eq(&self, o: &Self) -> bool {
        bits_eq(&[self.r, self.g, self.b, self.a], &[o.r, o.g, o.b, o.a])
    }
}

impl FixedRecord for ColorRgb {
    const SIZE: usize = 12;

    fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        Ok(Self::new(r.read_f32()?, r.read_f32()?, r.read_f32()?))
    }

    fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        w.write_f32(self.r)?;
        w.write_f32(self.g)?;
        w.write_f32(self.b)
    }

    fn read_at(buf: &[u8], offset: usize) -> Result<Self> {
        let mut r = SliceReader::at(buf, offset, Self::SIZE)?;
        Ok(Self::new(r.f32(), r.f32(), r.f32()))
    }

    fn write_at(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let mut w = SliceWriter::at(buf, offset, Self::SIZE)?;
        w.f32(self.r);
        w.f32(self.g);
        w.f32(self.b);
        Ok(())
    }
}

impl FixedRecord for ColorRgba {
    const SIZE: usize = 16;

    fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self> {
        let rgb = ColorRgb::read_from(r)?;
        Ok(rgb.with_alpha(r.read_f32()?))
    }

    fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()> {
        self.rgb().write_to(w)?;
        w.write_f32(self.a)
    }

    fn read_at(buf: &[u8], offset: usize) -> Result<Self> {
        let mut r = SliceReader::at(buf, offset, Self::SIZE)?;
        Ok(Self::new(r.f32(), r.f32(), r.f32(), r.f32()))
    }

    fn write_at(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let mut w = SliceWriter::at(buf, offset, Self::SIZE)?;
        w.f32(self.r);
        w.f32(self.g);
        w.f32(self.b);
        w.f32(self.a);
        Ok(())
    }
}
