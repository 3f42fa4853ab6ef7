use bevy::prelude::Color;

pub const CLEAR_COLOUR: Color = Color::BLACK;

pub const TOOTH_COLOUR: Color = Color::WHITE;
pub const TOOTH_METALLIC: f32 = 0.2;
pub const TOOTH_ROUGHNESS: f32 = 0.3;

/// Gold base with a lighter gold glow.
pub const HIGHLIGHT_COLOUR: Color = Color::srgb(1.0, 0.843, 0.0);
pub const HIGHLIGHT_EMISSIVE: Color = Color::srgb(1.0, 0.898, 0.498);
pub const HIGHLIGHT_METALLIC: f32 = 0.3;
pub const HIGHLIGHT_ROUGHNESS: f32 = 0.2;

/// Light blue 200 base with a light blue 100 glow.
pub const SKULL_COLOUR: Color = Color::srgb(0.565, 0.792, 0.976);
pub const SKULL_EMISSIVE: Color = Color::srgb(0.733, 0.871, 0.984);
pub const SKULL_EMISSIVE_INTENSITY: f32 = 0.15;
pub const SKULL_OPACITY: f32 = 0.8;
pub const SKULL_METALLIC: f32 = 0.1;
pub const SKULL_ROUGHNESS: f32 = 0.4;

pub const AMBIENT_COLOUR: Color = Color::srgb(0.565, 0.792, 0.976);
pub const AMBIENT_BRIGHTNESS: f32 = 400.0;
pub const KEY_LIGHT_COLOUR: Color = Color::srgb(0.392, 0.710, 0.965);
pub const KEY_LIGHT_ILLUMINANCE: f32 = 3_000.0;
pub const FILL_LIGHT_COLOUR: Color = Color::srgb(0.129, 0.588, 0.953);
pub const FILL_LIGHT_INTENSITY: f32 = 200_000.0;
pub const FILL_LIGHT_RANGE: f32 = 20.0;
