pub mod gltf;
pub mod ply;
pub mod splat;

pub use self::gltf::{load_gltf_mesh, parse_gltf_mesh, MeshData};
pub use self::ply::{load_ply_file, parse_ply, PointCloud};
pub use self::splat::{parse_splats, stream_splat_file, Splat, SplatRecord};
