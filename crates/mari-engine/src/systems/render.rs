use crate::api::types::Viewport;
use crate::core::store::EntityStore;
use crate::renderer::visual::Visual;

/// Build the visual tree for a store.
/// Only entities carrying a renderer are drawn; the rest (world holders,
/// counters without a display) are skipped. Stateless.
pub fn render(entities: &EntityStore, viewport: &Viewport) -> Vec<Visual> {
    entities
        .iter()
        .filter_map(|(key, entity)| entity.renderer.map(|draw| draw(key.as_str(), entity, viewport)))
        .collect()
}
