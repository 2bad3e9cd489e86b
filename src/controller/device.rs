//! Device variants and their per-device state
//!
//! Every registered device is either the keyboard or one joystick. Both
//! implement [`InputDevice`], and [`Device`] dispatches between them.

use crate::controller::axis::{JoystickAxisMapper, KeyTransition};
use crate::controller::event_queue::{EventMask, EventQueue, RawEvent};
use crate::controller::key_state::KeyStateTable;
use crate::controller::modifier::{ModifierMap, ModifierState, ModifierTranslator};
use std::collections::VecDeque;
use tracing::{debug, info};

// Per-device input state
#[derive(Debug, Default, Clone)]
pub struct DeviceState {
    pub keys: KeyStateTable,
    // Codes bound to emulator functions, delivered without delay
    pub emu_keys: KeyStateTable,
    pub allow_unbound_modifiers: bool,
    // Transitions produced but not yet reported by a single-code poll
    pub(crate) backlog: VecDeque<KeyTransition>,
}

/// Result of offering one raw event to a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// The event changed these keys; `emu` is set if any is an emulator key
    Keys {
        transitions: Vec<KeyTransition>,
        emu: bool,
    },
    /// Owned by this device but produced no key change
    Consumed,
    /// Belongs to another device of the same kind, goes back to the queue
    Foreign,
    /// In this device's mask but not something it handles
    Unhandled,
}

impl Handled {
    fn from_transitions(state: &mut DeviceState, transitions: Vec<KeyTransition>) -> Self {
        if transitions.is_empty() {
            return Handled::Consumed;
        }
        let mut emu = false;
        for t in &transitions {
            emu |= state.emu_keys.test(t.code);
            state.keys.set(t.code, t.pressed);
        }
        Handled::Keys { transitions, emu }
    }
}

/// Capability interface shared by all device kinds
pub trait InputDevice {
    /// Queue classes this device drains
    fn event_mask(&self) -> EventMask;

    fn state(&self) -> &DeviceState;

    fn state_mut(&mut self) -> &mut DeviceState;

    /// Applies one event to the device state
    fn handle_event(&mut self, event: &RawEvent) -> Handled;

    /// Pre-pass over the queue before collection
    fn translate(&mut self, _queue: &mut dyn EventQueue) {}

    /// Events produced by [`translate`](Self::translate) and not yet collected
    fn translated_len(&self) -> usize {
        0
    }

    fn take_translated(&mut self, _max: usize) -> Vec<RawEvent> {
        Vec::new()
    }

    /// Puts uncollected translated events back in front
    fn restore_translated(&mut self, _events: Vec<RawEvent>) {}

    /// Rewrite rules, for devices that support modifier combos
    fn modifier_map_mut(&mut self) -> Option<&mut ModifierMap> {
        None
    }

    /// Releases device resources
    fn teardown(&mut self) {}
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardDevice {
    state: DeviceState,
    translator: Option<ModifierTranslator>,
}

impl KeyboardDevice {
    pub fn new(translator: Option<ModifierTranslator>) -> Self {
        Self {
            state: DeviceState::default(),
            translator,
        }
    }

    pub fn translator(&self) -> Option<&ModifierTranslator> {
        self.translator.as_ref()
    }

    pub fn modifier_state(&self) -> ModifierState {
        self.translator
            .as_ref()
            .map(ModifierTranslator::state)
            .unwrap_or_default()
    }
}

impl InputDevice for KeyboardDevice {
    fn event_mask(&self) -> EventMask {
        EventMask::all() - EventMask::JOYSTICK
    }

    fn state(&self) -> &DeviceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    fn handle_event(&mut self, event: &RawEvent) -> Handled {
        match *event {
            RawEvent::Key { code, pressed } => {
                Handled::from_transitions(&mut self.state, vec![KeyTransition { code, pressed }])
            }
            _ => Handled::Unhandled,
        }
    }

    fn translate(&mut self, queue: &mut dyn EventQueue) {
        let mask = self.event_mask();
        if let Some(translator) = self.translator.as_mut() {
            translator.translate_pending(
                queue,
                mask,
                &self.state.keys,
                &self.state.emu_keys,
                self.state.allow_unbound_modifiers,
            );
        }
    }

    fn translated_len(&self) -> usize {
        self.translator
            .as_ref()
            .map_or(0, ModifierTranslator::translated_len)
    }

    fn take_translated(&mut self, max: usize) -> Vec<RawEvent> {
        match self.translator.as_mut() {
            Some(translator) => translator.take_translated(max),
            None => Vec::new(),
        }
    }

    fn restore_translated(&mut self, events: Vec<RawEvent>) {
        if let Some(translator) = self.translator.as_mut() {
            translator.restore_translated(events);
        }
    }

    fn modifier_map_mut(&mut self) -> Option<&mut ModifierMap> {
        self.translator.as_mut().map(ModifierTranslator::map_mut)
    }

    fn teardown(&mut self) {
        if let Some(translator) = self.translator.take() {
            debug!(
                "Dropping modifier map with {} pairs",
                translator.map().len()
            );
        }
        self.state.keys.clear();
    }
}

#[derive(Debug, Clone)]
pub struct JoystickDevice {
    state: DeviceState,
    joy_id: u32,
    axes: JoystickAxisMapper,
    // Registration flag only; the gilrs context owning the pad lives in the queue
    open: bool,
}

impl JoystickDevice {
    pub fn new(joy_id: u32) -> Self {
        Self {
            state: DeviceState::default(),
            joy_id,
            axes: JoystickAxisMapper::new(),
            open: true,
        }
    }

    pub fn joy_id(&self) -> u32 {
        self.joy_id
    }

    /// False after teardown. The platform handle is not owned here, so this
    /// only tracks whether the device still takes part in polling.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn axes(&self) -> &JoystickAxisMapper {
        &self.axes
    }
}

impl InputDevice for JoystickDevice {
    fn event_mask(&self) -> EventMask {
        EventMask::JOYSTICK
    }

    fn state(&self) -> &DeviceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    fn handle_event(&mut self, event: &RawEvent) -> Handled {
        match *event {
            RawEvent::JoyAxis {
                joystick,
                axis,
                value,
            } => {
                if joystick != self.joy_id {
                    return Handled::Foreign;
                }
                match self.axes.axis_motion(axis, value) {
                    Some(transitions) => Handled::from_transitions(&mut self.state, transitions),
                    None => Handled::Unhandled,
                }
            }
            RawEvent::JoyButton {
                joystick,
                button,
                pressed,
            } => {
                if joystick != self.joy_id {
                    return Handled::Foreign;
                }
                match JoystickAxisMapper::button(button, pressed) {
                    Some(t) => Handled::from_transitions(&mut self.state, vec![t]),
                    None => Handled::Unhandled,
                }
            }
            _ => Handled::Unhandled,
        }
    }

    fn teardown(&mut self) {
        if self.open {
            info!("Releasing joystick {}", self.joy_id);
            self.open = false;
        }
        self.axes.reset();
        self.state.keys.clear();
    }
}

/// Closed set of device kinds
#[derive(Debug, Clone)]
pub enum Device {
    Keyboard(KeyboardDevice),
    Joystick(JoystickDevice),
}

impl Device {
    pub fn is_keyboard(&self) -> bool {
        matches!(self, Device::Keyboard(_))
    }

    pub fn joy_id(&self) -> Option<u32> {
        match self {
            Device::Joystick(joy) => Some(joy.joy_id()),
            Device::Keyboard(_) => None,
        }
    }

    /// Whether this device rewrites modifier combos
    pub fn does_combos(&self) -> bool {
        matches!(self, Device::Keyboard(kbd) if kbd.translator().is_some())
    }

    fn inner(&self) -> &dyn InputDevice {
        match self {
            Device::Keyboard(kbd) => kbd,
            Device::Joystick(joy) => joy,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn InputDevice {
        match self {
            Device::Keyboard(kbd) => kbd,
            Device::Joystick(joy) => joy,
        }
    }
}

impl InputDevice for Device {
    fn event_mask(&self) -> EventMask {
        self.inner().event_mask()
    }

    fn state(&self) -> &DeviceState {
        self.inner().state()
    }

    fn state_mut(&mut self) -> &mut DeviceState {
        self.inner_mut().state_mut()
    }

    fn handle_event(&mut self, event: &RawEvent) -> Handled {
        self.inner_mut().handle_event(event)
    }

    fn translate(&mut self, queue: &mut dyn EventQueue) {
        self.inner_mut().translate(queue)
    }

    fn translated_len(&self) -> usize {
        self.inner().translated_len()
    }

    fn take_translated(&mut self, max: usize) -> Vec<RawEvent> {
        self.inner_mut().take_translated(max)
    }

    fn restore_translated(&mut self, events: Vec<RawEvent>) {
        self.inner_mut().restore_translated(events)
    }

    fn modifier_map_mut(&mut self) -> Option<&mut ModifierMap> {
        self.inner_mut().modifier_map_mut()
    }

    fn teardown(&mut self) {
        self.inner_mut().teardown()
    }
}
