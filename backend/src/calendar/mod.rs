//! Calendar events as timer tasks.

pub mod attributes;
pub mod cache;
pub mod display;
pub mod mapping;
pub mod service;

pub use service::{CalendarService, ServiceSettings};
