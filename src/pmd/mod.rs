//! PMD 模型格式
//!
//! 读取 MikuMikuDance 的 PMD 模型文件，并可按原始布局写回。
//! 内存中的坐标统一为右手坐标系。

mod bone;
mod display;
mod english;
mod ik;
mod loader;
mod material;
mod model;
mod morph;
mod physics;
mod submesh;
mod toon;
mod vertex;

pub use bone::{Bone, BoneType, BONE_NAME_LEN, KNEE_MARKER, NO_PARENT};
pub use display::{BoneDisplay, BONE_DISP_NAME_LEN};
pub use english::{EnglishCounts, EnglishHeader};
pub use ik::IkChain;
pub use loader::PmdLoader;
pub use material::{Material, MATERIAL_SIZE};
pub use model::{Header, PmdModel, TrailingSections, PMD_MAGIC};
pub use morph::{Morph, MorphKind};
pub use physics::{Joint, RigidBody, RigidBodyMode, RigidShape, JOINT_SIZE, RIGID_BODY_SIZE};
pub use submesh::SubMesh;
pub use toon::{ToonTextures, TOON_COUNT};
pub use vertex::{Vertex, VertexBuffer, VERTEX_STRIDE};
