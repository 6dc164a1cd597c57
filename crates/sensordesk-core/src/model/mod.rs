// ── Domain model ──
//
// Items, their identifiers, and the set of resource kinds.

pub mod entity_id;
pub mod item;
pub mod resource;

pub use entity_id::EntityId;
pub use item::Item;
pub use resource::ResourceKind;
