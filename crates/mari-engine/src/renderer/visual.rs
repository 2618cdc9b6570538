use serde::Serialize;

use crate::api::types::Viewport;
use crate::components::entity::Entity;

/// A renderer draws one entity: `(key, entity, viewport) -> Visual`.
pub type Renderer = fn(&str, &Entity, &Viewport) -> Visual;

/// One positioned element for the host to draw. Serialized to JSON for the
/// TypeScript side, which maps it to an absolutely positioned element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visual {
    /// Stable key (the entity's store key).
    pub key: String,
    /// Top-left corner in world space.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Background color, empty for transparent.
    pub color: String,
    /// Sprite asset path, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,
    /// Text content, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub z_index: i32,
    pub visible: bool,
}

impl Visual {
    /// A box covering `entity`, centred on its position.
    pub fn boxed(key: &str, entity: &Entity) -> Self {
        Self {
            key: key.to_string(),
            x: entity.pos.x - entity.size.x / 2.0,
            y: entity.pos.y - entity.size.y / 2.0,
            width: entity.size.x,
            height: entity.size.y,
            rotation: 0.0,
            color: entity.color.clone(),
            sprite: None,
            text: None,
            z_index: 0,
            visible: true,
        }
    }

    pub fn with_sprite(mut self, sprite: impl Into<String>) -> Self {
        self.sprite = Some(sprite.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Transparent background.
    pub fn transparent(mut self) -> Self {
        self.color.clear();
        self
    }
}
