//! Shared platform event queue
//!
//! Every registered device reads from the same FIFO. A device takes the events
//! matching its [`EventMask`], and anything it does not own goes back to the
//! tail in original relative order so other consumers still see it.

use crate::controller::keycode::KeyCode;
use bitflags::bitflags;
use std::collections::VecDeque;
use tracing::debug;

bitflags! {
    /// Event classes, used to select which events a device drains
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const KEY = 1 << 0;
        const JOY_AXIS = 1 << 1;
        const JOY_BALL = 1 << 2;
        const JOY_HAT = 1 << 3;
        const JOY_BUTTON = 1 << 4;
        const SYSTEM = 1 << 5;

        const JOYSTICK = Self::JOY_AXIS.bits()
            | Self::JOY_BALL.bits()
            | Self::JOY_HAT.bits()
            | Self::JOY_BUTTON.bits();
    }
}

// Non-input platform notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    Quit,
    JoystickAdded(u32),
    JoystickRemoved(u32),
    Focus(bool),
}

// Raw platform event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    Key {
        code: KeyCode,
        pressed: bool,
    },
    JoyAxis {
        joystick: u32,
        axis: u8,
        value: i16,
    },
    JoyBall {
        joystick: u32,
        ball: u8,
        dx: i16,
        dy: i16,
    },
    JoyHat {
        joystick: u32,
        hat: u8,
        value: u8,
    },
    JoyButton {
        joystick: u32,
        button: u8,
        pressed: bool,
    },
    System(SystemEvent),
}

impl RawEvent {
    pub fn key(code: KeyCode, pressed: bool) -> Self {
        RawEvent::Key { code, pressed }
    }

    pub fn class(&self) -> EventMask {
        match self {
            RawEvent::Key { .. } => EventMask::KEY,
            RawEvent::JoyAxis { .. } => EventMask::JOY_AXIS,
            RawEvent::JoyBall { .. } => EventMask::JOY_BALL,
            RawEvent::JoyHat { .. } => EventMask::JOY_HAT,
            RawEvent::JoyButton { .. } => EventMask::JOY_BUTTON,
            RawEvent::System(_) => EventMask::SYSTEM,
        }
    }

    pub fn matches(&self, mask: EventMask) -> bool {
        mask.intersects(self.class())
    }
}

/// Access contract for the shared event source
pub trait EventQueue {
    /// Pulls fresh events from the platform into the queue
    fn pump(&mut self) {}

    /// Number of queued events matching `mask`
    fn count(&self, mask: EventMask) -> usize;

    /// Removes up to `max` of the oldest events matching `mask`, leaving the
    /// others in place
    fn take(&mut self, mask: EventMask, max: usize) -> Vec<RawEvent>;

    /// Appends one event at the tail
    fn push(&mut self, event: RawEvent);

    /// Reinjects events at the tail, keeping their relative order
    fn put_back(&mut self, events: Vec<RawEvent>) {
        for event in events {
            self.push(event);
        }
    }
}

/// In-memory FIFO, the queue behind platform adapters and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryQueue {
    events: VecDeque<RawEvent>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawEvent> {
        self.events.iter()
    }

    /// Removes every queued event
    pub fn drain_all(&mut self) -> Vec<RawEvent> {
        self.events.drain(..).collect()
    }
}

impl FromIterator<RawEvent> for MemoryQueue {
    fn from_iter<T: IntoIterator<Item = RawEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl EventQueue for MemoryQueue {
    fn count(&self, mask: EventMask) -> usize {
        self.events.iter().filter(|e| e.matches(mask)).count()
    }

    fn take(&mut self, mask: EventMask, max: usize) -> Vec<RawEvent> {
        if max == 0 {
            return Vec::new();
        }

        let mut taken = Vec::with_capacity(max.min(self.events.len()));
        let mut rest = VecDeque::with_capacity(self.events.len());
        for event in self.events.drain(..) {
            if taken.len() < max && event.matches(mask) {
                taken.push(event);
            } else {
                rest.push_back(event);
            }
        }
        self.events = rest;
        taken
    }

    fn push(&mut self, event: RawEvent) {
        self.events.push_back(event);
    }

    fn put_back(&mut self, events: Vec<RawEvent>) {
        if !events.is_empty() {
            debug!("Reinjecting {} events", events.len());
        }
        self.events.extend(events);
    }
}
