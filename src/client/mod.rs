//! Client side of the items API: an HTTP binding and the optimistic list
//! controller that drives a UI with it.

pub mod api;
pub mod reconcile;

pub use api::{ClientError, HttpItemsApi, ItemsApi};
pub use reconcile::{ItemList, ItemView, Modal, Phase};
