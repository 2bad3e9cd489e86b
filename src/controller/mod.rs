//! Controller subsystem: raw input events to held key codes
//!
//! Implements a per-device processing pipeline:
//!
//! 1. [`event_queue`] - Shared FIFO of raw platform events
//! 2. [`modifier`] - Modifier-combo rewriting for keyboards
//! 3. [`axis`] - Analog stick to direction keys for joysticks
//! 4. [`event_collector`] - Drains a device's events, reinjects the rest
//! 5. [`input_host`] - Device registry and lifecycle
//!
//! # Architecture
//!
//! ```text
//! Platform ──► EventQueue ──► Collector ──► Device ──► KeyStateTable
//!              (shared)       (per poll)    (translator / axis mapper)
//! ```
//!
//! Everything runs on the polling thread; the host is driven by the frontend's
//! frame loop.

pub mod axis;
pub mod device;
pub mod error;
pub mod event_collector;
pub mod event_queue;
pub mod input_host;
pub mod key_state;
pub mod keycode;
pub mod modifier;
pub mod platform;

pub use error::InputError;
pub use input_host::{ConfigKey, DeviceId, InputHost, JoystickInfo, PlatformData};
pub use keycode::KeyCode;
