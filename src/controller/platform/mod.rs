//! Platform adapters filling the shared event queue
//!
//! - [`gilrs_queue`] - gamepads through gilrs
//! - [`egui_keys`] - keyboard events from an egui frame

pub mod egui_keys;
pub mod gilrs_queue;

pub use gilrs_queue::GilrsQueue;
