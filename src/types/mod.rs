//! 基础几何 / 颜色记录

mod color;
mod tex_coord;
mod vector;

pub use color::{ColorRgb, ColorRgba};
pub use tex_coord::TexCoord;

use std::io::{BufRead, Write};

use crate::io::{LeReader, LeWriter};
use crate::Result;

/// 定长记录
///
/// 两条读取路径：顺序流（文件，小端）和内存缓冲区的固定偏移（本机字节序），
/// 以及对应的两条写入路径。
pub trait FixedRecord: Sized {
    /// 记录字节数
    const SIZE: usize;

    fn read_from<R: BufRead>(r: &mut LeReader<R>) -> Result<Self>;

    fn write_to<W: Write>(&self, w: &mut LeWriter<W>) -> Result<()>;

    fn read_at(buf: &[u8], offset: usize) -> Result<Self>;

    fn write_at(&self, buf: &mut [u8], offset: usize) -> Result<()>;
}

/// 按位比较浮点数，区分 0.0 / -0.0，NaN 与自身相等
pub(crate) fn bits_eq(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}
