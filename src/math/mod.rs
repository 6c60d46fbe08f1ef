mod aabb;
mod transform;

pub use aabb::AABB;
pub use transform::{approach, round_to, Transform};
