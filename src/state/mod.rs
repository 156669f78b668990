pub mod items;

pub use items::{Item, ItemId, ItemName, ItemStore};
