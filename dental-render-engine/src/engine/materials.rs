//! Material presets for the dental model.
//!
//! Materials are plain value objects owned by the scene graph's material
//! store. The mirror system turns each live material into one
//! `StandardMaterial` asset and frees it once the store releases it.

use bevy::color::Alpha;
use bevy::prelude::*;
use bevy::render::render_resource::Face;
use constants::interaction::HOVER_EMISSIVE_INTENSITY;
use constants::render_settings::*;

/// Which factory produced a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialPreset {
    Default,
    Highlight,
    SkullTranslucent,
}

/// Rendering parameters for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothMaterial {
    pub preset: MaterialPreset,
    pub base_color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
    pub depth_write: bool,
    pub depth_test: bool,
}

impl ToothMaterial {
    pub fn with_emissive_intensity(mut self, intensity: f32) -> Self {
        self.emissive_intensity = intensity;
        self
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0 || !self.depth_write
    }
}

/// Translucent blue shell with depth writes off so teeth show through.
pub fn skull_material() -> ToothMaterial {
    ToothMaterial {
        preset: MaterialPreset::SkullTranslucent,
        base_color: SKULL_COLOUR,
        emissive: SKULL_EMISSIVE,
        emissive_intensity: SKULL_EMISSIVE_INTENSITY,
        opacity: SKULL_OPACITY,
        metallic: SKULL_METALLIC,
        roughness: SKULL_ROUGHNESS,
        double_sided: true,
        depth_write: false,
        depth_test: true,
    }
}

/// Opaque white enamel.
pub fn default_tooth_material() -> ToothMaterial {
    ToothMaterial {
        preset: MaterialPreset::Default,
        base_color: TOOTH_COLOUR,
        emissive: Color::BLACK,
        emissive_intensity: 0.0,
        opacity: 1.0,
        metallic: TOOTH_METALLIC,
        roughness: TOOTH_ROUGHNESS,
        double_sided: true,
        depth_write: true,
        depth_test: true,
    }
}

/// Glowing gold used on hover and, with a stronger glow, on selection.
pub fn highlight_tooth_material() -> ToothMaterial {
    ToothMaterial {
        preset: MaterialPreset::Highlight,
        base_color: HIGHLIGHT_COLOUR,
        emissive: HIGHLIGHT_EMISSIVE,
        emissive_intensity: HOVER_EMISSIVE_INTENSITY,
        opacity: 1.0,
        metallic: HIGHLIGHT_METALLIC,
        roughness: HIGHLIGHT_ROUGHNESS,
        double_sided: true,
        depth_write: true,
        depth_test: true,
    }
}

// Bevy has no per-material depth-write switch; blending is what disables
// depth writes for a StandardMaterial. Depth testing is always on.
impl From<&ToothMaterial> for StandardMaterial {
    fn from(material: &ToothMaterial) -> Self {
        StandardMaterial {
            base_color: material.base_color.with_alpha(material.opacity),
            emissive: material.emissive.to_linear() * material.emissive_intensity,
            metallic: material.metallic,
            perceptual_roughness: material.roughness,
            alpha_mode: if material.is_translucent() {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            double_sided: material.double_sided,
            cull_mode: if material.double_sided {
                None
            } else {
                Some(Face::Back)
            },
            ..default()
        }
    }
}
