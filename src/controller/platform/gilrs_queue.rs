use crate::controller::error::InputError;
use crate::controller::event_queue::{EventMask, EventQueue, MemoryQueue, RawEvent, SystemEvent};
use crate::controller::input_host::JoystickInfo;
use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, Gilrs};
use tracing::{debug, error, info, warn};

/// Event queue fed by gilrs gamepad events
pub struct GilrsQueue {
    // Gilrs context
    gilrs: Gilrs,
    // Converted events waiting for a device
    pending: MemoryQueue,
}

impl GilrsQueue {
    pub fn create() -> Result<Self, InputError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(InputError::PlatformError(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            pending: MemoryQueue::new(),
        })
    }

    /// Gamepads currently known to gilrs
    pub fn joysticks(&self) -> Vec<JoystickInfo> {
        let joysticks: Vec<JoystickInfo> = self
            .gilrs
            .gamepads()
            .map(|(id, gamepad)| JoystickInfo {
                id: usize::from(id) as u32,
                name: gamepad.name().to_string(),
            })
            .collect();

        if joysticks.is_empty() {
            warn!("No gamepad connected");
        }
        for joy in &joysticks {
            info!("  [{}] {}", joy.id, joy.name);
        }
        joysticks
    }
}

impl EventQueue for GilrsQueue {
    fn pump(&mut self) {
        while let Some(Event { id, event, time, .. }) = self.gilrs.next_event() {
            debug!("Processing gilrs event: {:?} at time: {:?}", event, time);
            if let Some(raw) = convert_gilrs_event(usize::from(id) as u32, event) {
                self.pending.push(raw);
            }
        }
    }

    fn count(&self, mask: EventMask) -> usize {
        self.pending.count(mask)
    }

    fn take(&mut self, mask: EventMask, max: usize) -> Vec<RawEvent> {
        self.pending.take(mask, max)
    }

    fn push(&mut self, event: RawEvent) {
        self.pending.push(event)
    }

    fn put_back(&mut self, events: Vec<RawEvent>) {
        self.pending.put_back(events)
    }
}

/// Converts one gilrs event for gamepad `joystick`; repeats and unknown
/// inputs produce nothing
pub fn convert_gilrs_event(joystick: u32, event: EventType) -> Option<RawEvent> {
    match event {
        EventType::AxisChanged(axis, value, _) => axis_event(joystick, axis, value),
        EventType::ButtonPressed(button, _) => button_event(joystick, button, true),
        EventType::ButtonReleased(button, _) => button_event(joystick, button, false),
        EventType::ButtonRepeated(button, _) => {
            debug!("Button repeat ignored: {:?}", button);
            None
        }
        EventType::Connected => {
            info!("Controller {} connected", joystick);
            Some(RawEvent::System(SystemEvent::JoystickAdded(joystick)))
        }
        EventType::Disconnected => {
            warn!("Controller {} disconnected", joystick);
            Some(RawEvent::System(SystemEvent::JoystickRemoved(joystick)))
        }
        _ => {
            debug!("Unhandled event type: {:?}", event);
            None
        }
    }
}

/// Stick axes become axes 0-5 with Y pointing down, scaled to i16
pub fn axis_event(joystick: u32, axis: Axis, value: f32) -> Option<RawEvent> {
    let (index, value) = match axis {
        Axis::LeftStickX => (0, value),
        Axis::LeftStickY => (1, -value),
        Axis::RightStickX => (2, value),
        Axis::RightStickY => (3, -value),
        Axis::LeftZ => (4, value),
        Axis::RightZ => (5, value),
        _ => return None,
    };
    Some(RawEvent::JoyAxis {
        joystick,
        axis: index,
        value: (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16,
    })
}

pub fn button_index(button: Button) -> Option<u8> {
    let index = match button {
        Button::South => 0,
        Button::East => 1,
        Button::North => 2,
        Button::West => 3,
        Button::LeftTrigger => 4,
        Button::RightTrigger => 5,
        Button::Select => 6,
        Button::Start => 7,
        Button::Mode => 8,
        Button::LeftThumb => 9,
        Button::RightThumb => 10,
        Button::DPadUp => 11,
        Button::DPadDown => 12,
        Button::DPadLeft => 13,
        Button::DPadRight => 14,
        Button::LeftTrigger2 => 15,
        Button::RightTrigger2 => 16,
        _ => return None,
    };
    Some(index)
}

fn button_event(joystick: u32, button: Button, pressed: bool) -> Option<RawEvent> {
    let index = button_index(button)?;
    debug!(
        "Button {:?} {} at {}",
        button,
        if pressed { "pressed" } else { "released" },
        Local::now().format("%H:%M:%S.%3f")
    );
    Some(RawEvent::JoyButton {
        joystick,
        button: index,
        pressed,
    })
}
