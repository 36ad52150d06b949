use glam::Mat4;
use parkview_common::ModelHandle;
use parkview_scene::{ObjectSpec, SceneTable};
use std::collections::BTreeSet;

use crate::placement::{Animation, Placement, Rotation};

/// Errors from building a catalog out of a scene table.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("object '{object}' references unknown model '{model}'")]
    UnknownModel { object: String, model: String },
    #[error("object '{object}' has a degenerate {part} axis or angle")]
    DegenerateAxis { object: String, part: &'static str },
    #[error("object '{object}' has a non-finite translation or scale")]
    NonFinite { object: String },
}

/// One placed object in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub model: ModelHandle,
    pub placement: Placement,
    pub animation: Option<Animation>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, model: ModelHandle, placement: Placement) -> Self {
        Self {
            name: name.into(),
            model,
            placement,
            animation: None,
        }
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Model matrix at `elapsed` seconds since start.
    pub fn model_matrix(&self, elapsed: f32) -> Mat4 {
        self.placement
            .matrix(self.animation.as_ref().map(|a| (a, elapsed)))
    }
}

/// The fixed, ordered table of scene objects. Order is draw order.
///
/// Every entry is assumed opaque: there is no back-to-front sorting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneCatalog {
    objects: Vec<SceneObject>,
}

impl SceneCatalog {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self { objects }
    }

    /// Build from a scene table, resolving model keys to handles.
    pub fn from_table(
        table: &SceneTable,
        mut resolve: impl FnMut(&str) -> Option<ModelHandle>,
    ) -> Result<Self, CatalogError> {
        let objects = table
            .objects
            .iter()
            .map(|spec| {
                let model = resolve(&spec.model).ok_or_else(|| CatalogError::UnknownModel {
                    object: spec.name.clone(),
                    model: spec.model.clone(),
                })?;
                object_from_spec(spec, model)
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!("scene catalog built with {} objects", objects.len());
        Ok(Self { objects })
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Distinct model handles referenced by the catalog.
    pub fn models(&self) -> BTreeSet<ModelHandle> {
        self.objects.iter().map(|o| o.model).collect()
    }

    pub fn animated_count(&self) -> usize {
        self.objects.iter().filter(|o| o.animation.is_some()).count()
    }
}

fn object_from_spec(spec: &ObjectSpec, model: ModelHandle) -> Result<SceneObject, CatalogError> {
    let degenerate = |part| CatalogError::DegenerateAxis {
        object: spec.name.clone(),
        part,
    };

    let mut placement = Placement::new(spec.translation, spec.scale);
    if !placement.is_finite() {
        return Err(CatalogError::NonFinite {
            object: spec.name.clone(),
        });
    }
    if let Some(rot) = &spec.rotation {
        let rotation = Rotation::from_degrees(rot.degrees, rot.axis).ok_or_else(|| degenerate("rotation"))?;
        placement = placement.with_rotation(rotation);
    }

    let mut object = SceneObject::new(spec.name.clone(), model, placement);
    if let Some(anim) = &spec.animation {
        let animation = Animation::new(anim.axis, anim.degrees_per_second, anim.offset)
            .ok_or_else(|| degenerate("animation"))?;
        object = object.with_animation(animation);
    }
    Ok(object)
}
