pub mod item_service;
pub mod validation;
