pub mod entity_registry;
pub mod events;
