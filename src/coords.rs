//! 坐标系转换
//!
//! MMD 文件是左手坐标系，内存中统一为右手坐标系。
//! 所有转换都是对合（应用两次即恢复原值），读写两端调用同一个函数。

use glam::{Quat, Vec3};

/// 位置 / 法线 / 位移：翻转 Z
pub fn flip_position(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}

/// 欧拉角旋转：翻转 X、Y
pub fn flip_rotation(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, -v.y, v.z)
}

/// 四元数：翻转 Z、W
pub fn flip_quat(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, q.y, -q.z, -q.w)
}

/// 位置范围 [lo, hi]：翻转 Z 后交换上下限，保持 lo <= hi
pub fn flip_position_range(lo: Vec3, hi: Vec3) -> (Vec3, Vec3) {
    (
        Vec3::new(lo.x, lo.y, -hi.z),
        Vec3::new(hi.x, hi.y, -lo.z),
    )
}

/// 旋转范围 [lo, hi]：翻转 X、Y 后交换上下限
pub fn flip_rotation_range(lo: Vec3, hi: Vec3) -> (Vec3, Vec3) {
    (
        Vec3::new(-hi.x, -hi.y, lo.z),
        Vec3::new(-lo.x, -lo.y, hi.z),
    )
}

/// 交换每个三角形的前两个索引（反转绕序）
///
/// 末尾不足三个的索引保持不动。
pub fn swap_winding(indices: &mut [u16]) {
    for tri in indices.chunks_exact_mut(3) {
        tri.swap(0, 1);
    }
}
