use std::sync::Arc;

use anyhow::{bail, Result};
use glam::Vec3;

use crate::assets::{Geometry, NormalizedAsset};
use crate::math::Transform;

/// World axis selector for external target control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A renderable object owned by the registry
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub transform: Transform,
    /// Where the interpolation step is pulling the object
    pub target_position: Vec3,
}

impl SceneObject {
    pub fn from_asset(asset: NormalizedAsset) -> Self {
        Self {
            name: asset.name,
            geometry: Arc::new(asset.geometry),
            transform: Transform::from_scale(asset.scale),
            target_position: Vec3::ZERO,
        }
    }
}

/// Insertion-ordered objects keyed by unique name
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<SceneObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object; a name already in the registry is rejected
    pub fn insert(&mut self, object: SceneObject) -> Result<()> {
        if self.contains(&object.name) {
            bail!("an object named `{}` is already in the scene", object.name);
        }
        self.objects.push(object);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.name.as_str()).collect()
    }

    /// Sets one component of an object's target. The live transform only
    /// follows on later frames through interpolation.
    pub fn set_target(&mut self, name: &str, axis: Axis, value: f32) -> Result<()> {
        let Some(object) = self.get_mut(name) else {
            bail!("no object named `{}`", name);
        };
        match axis {
            Axis::X => object.target_position.x = value,
            Axis::Y => object.target_position.y = value,
            Axis::Z => object.target_position.z = value,
        }
        Ok(())
    }

    pub fn set_target_position(&mut self, name: &str, position: Vec3) -> Result<()> {
        let Some(object) = self.get_mut(name) else {
            bail!("no object named `{}`", name);
        };
        object.target_position = position;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::AABB;

    fn object(name: &str) -> SceneObject {
        SceneObject::from_asset(NormalizedAsset {
            name: name.to_string(),
            geometry: Geometry::Points {
                positions: vec![Vec3::ZERO],
                colors: vec![[1.0; 3]],
            },
            scale: 0.5,
            source_bounds: AABB::new(Vec3::ZERO, Vec3::ZERO),
        })
    }

    #[test]
    fn test_new_object_targets_origin() {
        let obj = object("a.ply");
        assert_eq!(obj.target_position, Vec3::ZERO);
        assert_eq!(obj.transform.scale, Vec3::splat(0.5));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("a.ply")).unwrap();
        assert!(registry.insert(object("a.ply")).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_target_leaves_transform() {
        let mut registry = ObjectRegistry::new();
        registry.insert(object("a.ply")).unwrap();
        registry.set_target("a.ply", Axis::Y, 3.0).unwrap();

        let obj = registry.get("a.ply").unwrap();
        assert_eq!(obj.target_position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(obj.transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_set_target_unknown_name() {
        let mut registry = ObjectRegistry::new();
        assert!(registry.set_target("ghost.glb", Axis::X, 1.0).is_err());
        assert!(registry.set_target_position("ghost.glb", Vec3::ONE).is_err());
    }
}
