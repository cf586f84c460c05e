//! Types shared between the task timer server and its clients.

pub mod api;
pub mod models;

pub use models::{Event, EventAttributes};
