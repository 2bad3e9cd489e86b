//! Event collection for one device per poll
//!
//! Keyboard events pass the modifier translator first and wait in the
//! device's own buffer; that buffer is drained before the shared queue.
//!
//! ```text
//!  EventQueue ──► [translate] ──► take chunk ──► Device::handle_event
//!      ▲                                            │
//!      ├──────── Foreign / leftover chunk ──────────┤
//!      │                                            ▼
//!  RawEventSink ◄──────────── Unhandled      KeyStateTable
//! ```

use crate::controller::axis::KeyTransition;
use crate::controller::device::{Device, Handled, InputDevice};
use crate::controller::event_queue::{EventQueue, RawEvent};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Events drained per chunk in aggregate mode
pub const COLLECT_CHUNK: usize = 4;

/// Receiver for events no device handles (window, quit, ball/hat motion...)
pub trait RawEventSink {
    fn forward(&mut self, event: RawEvent);
}

impl<F: FnMut(RawEvent)> RawEventSink for F {
    fn forward(&mut self, event: RawEvent) {
        self(event)
    }
}

impl RawEventSink for Vec<RawEvent> {
    fn forward(&mut self, event: RawEvent) {
        self.push(event);
    }
}

impl RawEventSink for mpsc::UnboundedSender<RawEvent> {
    fn forward(&mut self, event: RawEvent) {
        if let Err(e) = self.send(event) {
            warn!("Raw event receiver closed: {}", e);
        }
    }
}

/// Sink that only logs what it drops
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl RawEventSink for DiscardSink {
    fn forward(&mut self, event: RawEvent) {
        trace!("Dropping unhandled event: {:?}", event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectMode {
    /// Stop at the first key change and report it
    Single,
    /// Drain everything, stopping early only after an emulator key
    Aggregate,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectOutcome {
    /// Any owned event was handled
    pub matched: bool,
    /// First key change, single mode only
    pub first: Option<KeyTransition>,
}

/// Borrowed view of the shared queue and the external sink for one poll
pub struct EventCollector<'a> {
    queue: &'a mut dyn EventQueue,
    sink: &'a mut dyn RawEventSink,
}

impl<'a> EventCollector<'a> {
    pub fn new(queue: &'a mut dyn EventQueue, sink: &'a mut dyn RawEventSink) -> Self {
        Self { queue, sink }
    }

    /// Returns the next key change of `device`, if any
    pub fn poll_single(&mut self, device: &mut Device) -> Option<KeyTransition> {
        if let Some(t) = device.state_mut().backlog.pop_front() {
            trace!("Reporting backlogged transition {:?}", t);
            return Some(t);
        }
        self.collect(device, CollectMode::Single).first
    }

    /// Applies every pending event of `device`, true if anything matched
    pub fn poll_aggregate(&mut self, device: &mut Device) -> bool {
        device.state_mut().backlog.clear();
        self.collect(device, CollectMode::Aggregate).matched
    }

    pub fn collect(&mut self, device: &mut Device, mode: CollectMode) -> CollectOutcome {
        let single = mode == CollectMode::Single;
        let chunk = if single { 1 } else { COLLECT_CHUNK };
        let mut outcome = CollectOutcome::default();

        self.queue.pump();
        device.translate(&mut *self.queue);

        let mask = device.event_mask();
        let total = device.translated_len() + self.queue.count(mask);
        let mut seen = 0;

        'drain: while seen < total {
            // Translated output first, it is older than anything still queued
            let mut translated = true;
            let mut events = device.take_translated(chunk);
            if events.is_empty() {
                translated = false;
                events = self.queue.take(mask, chunk);
            }
            if events.is_empty() {
                break;
            }
            seen += events.len();

            let mut events = events.into_iter();
            while let Some(event) = events.next() {
                match device.handle_event(&event) {
                    Handled::Foreign => self.queue.push(event),
                    Handled::Unhandled => self.sink.forward(event),
                    Handled::Consumed => outcome.matched = true,
                    Handled::Keys { transitions, emu } => {
                        outcome.matched = true;
                        if single {
                            let mut transitions = transitions.into_iter();
                            outcome.first = transitions.next();
                            device.state_mut().backlog.extend(transitions);
                        }

                        if single || emu {
                            // Don't lose events other devices might want
                            let rest: Vec<RawEvent> = events.by_ref().collect();
                            if translated {
                                device.restore_translated(rest);
                            } else if !rest.is_empty() {
                                self.queue.put_back(rest);
                            }
                            if emu {
                                debug!("Emulator key seen, ending collection early");
                            }
                            break 'drain;
                        }
                    }
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::device::{JoystickDevice, KeyboardDevice};
    use crate::controller::event_queue::{MemoryQueue, SystemEvent};
    use crate::controller::keycode::KeyCode;
    use crate::controller::modifier::{
        ModifierMap, ModifierPair, ModifierState, ModifierTranslator,
    };

    fn axis(joystick: u32, axis: u8, value: i16) -> RawEvent {
        RawEvent::JoyAxis {
            joystick,
            axis,
            value,
        }
    }

    fn keyboard_with_combo() -> Device {
        let mut map = ModifierMap::new(vec![ModifierPair::new(KeyCode::UP, KeyCode::PAGEUP)]);
        map.set_bound(0, true);
        Device::Keyboard(KeyboardDevice::new(Some(ModifierTranslator::new(
            KeyCode::RCTRL,
            map,
        ))))
    }

    #[test]
    fn test_single_mode_requeues_everything_else() {
        let mut queue: MemoryQueue = [
            RawEvent::key(KeyCode::A, true),
            axis(0, 0, 20000),
            RawEvent::key(KeyCode::B, true),
            RawEvent::key(KeyCode::C, true),
        ]
        .into_iter()
        .collect();
        let mut sink: Vec<RawEvent> = Vec::new();
        let mut kbd = Device::Keyboard(KeyboardDevice::new(None));

        let first = EventCollector::new(&mut queue, &mut sink).poll_single(&mut kbd);
        assert_eq!(first, Some(KeyTransition::down(KeyCode::A)));
        assert_eq!(queue.len(), 3);

        let second = EventCollector::new(&mut queue, &mut sink).poll_single(&mut kbd);
        assert_eq!(second, Some(KeyTransition::down(KeyCode::B)));
        assert_eq!(
            queue.iter().copied().collect::<Vec<_>>(),
            vec![axis(0, 0, 20000), RawEvent::key(KeyCode::C, true)]
        );
        assert!(kbd.state().keys.test(KeyCode::A));
        assert!(kbd.state().keys.test(KeyCode::B));
        assert!(!kbd.state().keys.test(KeyCode::C));
    }

    #[test]
    fn test_aggregate_mode_drains_and_forwards() {
        let mut queue: MemoryQueue = [
            RawEvent::key(KeyCode::A, true),
            RawEvent::System(SystemEvent::Quit),
            RawEvent::key(KeyCode::B, true),
            RawEvent::key(KeyCode::A, false),
            axis(0, 0, -20000),
        ]
        .into_iter()
        .collect();
        let mut sink: Vec<RawEvent> = Vec::new();
        let mut kbd = Device::Keyboard(KeyboardDevice::new(None));

        let matched = EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd);
        assert!(matched);
        assert_eq!(sink, vec![RawEvent::System(SystemEvent::Quit)]);
        assert_eq!(kbd.state().keys.held().collect::<Vec<_>>(), vec![KeyCode::B]);
        assert_eq!(queue.drain_all(), vec![axis(0, 0, -20000)]);
    }

    #[test]
    fn test_aggregate_stops_after_emulator_key() {
        let mut queue: MemoryQueue = [
            RawEvent::key(KeyCode::ESCAPE, true),
            RawEvent::key(KeyCode::A, true),
            RawEvent::key(KeyCode::B, true),
        ]
        .into_iter()
        .collect();
        let mut sink = DiscardSink;
        let mut kbd = Device::Keyboard(KeyboardDevice::new(None));
        kbd.state_mut().emu_keys.set(KeyCode::ESCAPE, true);

        assert!(EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd));
        assert!(kbd.state().keys.test(KeyCode::ESCAPE));
        assert!(!kbd.state().keys.test(KeyCode::A));
        assert_eq!(
            queue.iter().copied().collect::<Vec<_>>(),
            vec![RawEvent::key(KeyCode::A, true), RawEvent::key(KeyCode::B, true)]
        );

        assert!(EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd));
        assert!(kbd.state().keys.test(KeyCode::A));
        assert!(kbd.state().keys.test(KeyCode::B));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_foreign_joystick_events_survive() {
        let mut queue: MemoryQueue = [
            axis(1, 0, -20000),
            axis(0, 0, -20000),
            RawEvent::JoyButton {
                joystick: 1,
                button: 2,
                pressed: true,
            },
        ]
        .into_iter()
        .collect();
        let mut sink = DiscardSink;
        let mut joy0 = Device::Joystick(JoystickDevice::new(0));
        let mut joy1 = Device::Joystick(JoystickDevice::new(1));

        assert!(EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut joy0));
        assert!(joy0.state().keys.test(KeyCode::LEFT));
        assert_eq!(queue.len(), 2);

        assert!(EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut joy1));
        assert!(joy1.state().keys.test(KeyCode::LEFT));
        assert!(joy1.state().keys.test(KeyCode::joy_button(2).unwrap()));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_single_mode_reports_axis_flip_in_order() {
        let mut queue: MemoryQueue = [axis(0, 0, -20000), axis(0, 0, 20000)]
            .into_iter()
            .collect();
        let mut sink = DiscardSink;
        let mut joy = Device::Joystick(JoystickDevice::new(0));

        let mut seen = Vec::new();
        while let Some(t) = EventCollector::new(&mut queue, &mut sink).poll_single(&mut joy) {
            seen.push(t);
        }
        assert_eq!(
            seen,
            vec![
                KeyTransition::down(KeyCode::LEFT),
                KeyTransition::up(KeyCode::LEFT),
                KeyTransition::down(KeyCode::RIGHT),
            ]
        );
    }

    #[test]
    fn test_single_mode_skips_centering_without_key() {
        let mut queue: MemoryQueue = [
            axis(0, 1, 0),
            RawEvent::JoyButton {
                joystick: 0,
                button: 0,
                pressed: true,
            },
        ]
        .into_iter()
        .collect();
        let mut sink = DiscardSink;
        let mut joy = Device::Joystick(JoystickDevice::new(0));

        let first = EventCollector::new(&mut queue, &mut sink).poll_single(&mut joy);
        assert_eq!(first, Some(KeyTransition::down(KeyCode::joy_button(0).unwrap())));
    }

    #[test]
    fn test_keyboard_combo_through_collector() {
        let mut queue: MemoryQueue = [RawEvent::key(KeyCode::UP, true)].into_iter().collect();
        let mut sink = DiscardSink;
        let mut kbd = keyboard_with_combo();

        EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd);
        assert!(kbd.state().keys.test(KeyCode::UP));

        queue.push(RawEvent::key(KeyCode::RCTRL, true));
        EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd);
        assert!(kbd.state().keys.test(KeyCode::PAGEUP));
        assert!(!kbd.state().keys.test(KeyCode::UP));
        assert!(!kbd.state().keys.test(KeyCode::RCTRL));

        queue.push(RawEvent::key(KeyCode::RCTRL, false));
        EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd);
        assert!(kbd.state().keys.test(KeyCode::UP));
        assert!(!kbd.state().keys.test(KeyCode::PAGEUP));
        match &kbd {
            Device::Keyboard(k) => assert_eq!(k.modifier_state(), ModifierState::Idle),
            Device::Joystick(_) => unreachable!(),
        }
    }

    #[test]
    fn test_modifier_tap_across_two_polls() {
        let mut queue: MemoryQueue = [
            RawEvent::key(KeyCode::RCTRL, true),
            RawEvent::key(KeyCode::RCTRL, false),
        ]
        .into_iter()
        .collect();
        let mut sink = DiscardSink;
        let mut kbd = keyboard_with_combo();

        let first = EventCollector::new(&mut queue, &mut sink).poll_single(&mut kbd);
        assert_eq!(first, Some(KeyTransition::down(KeyCode::RCTRL)));
        let second = EventCollector::new(&mut queue, &mut sink).poll_single(&mut kbd);
        assert_eq!(second, Some(KeyTransition::up(KeyCode::RCTRL)));
        let third = EventCollector::new(&mut queue, &mut sink).poll_single(&mut kbd);
        assert_eq!(third, None);
    }

    #[test]
    fn test_combo_survives_emulator_early_stop() {
        let mut queue: MemoryQueue = [
            RawEvent::key(KeyCode::ESCAPE, true),
            RawEvent::key(KeyCode::RCTRL, true),
        ]
        .into_iter()
        .collect();
        let mut sink = DiscardSink;
        let mut kbd = keyboard_with_combo();
        kbd.state_mut().keys.set(KeyCode::UP, true);
        kbd.state_mut().emu_keys.set(KeyCode::ESCAPE, true);

        assert!(EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd));
        assert_eq!(kbd.state().keys.held().collect::<Vec<_>>(), vec![KeyCode::ESCAPE, KeyCode::UP]);

        assert!(EventCollector::new(&mut queue, &mut sink).poll_aggregate(&mut kbd));
        assert_eq!(
            kbd.state().keys.held().collect::<Vec<_>>(),
            vec![KeyCode::ESCAPE, KeyCode::PAGEUP]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_combo_switch_drained_one_code_at_a_time() {
        let mut queue: MemoryQueue = [
            RawEvent::key(KeyCode::UP, true),
            RawEvent::key(KeyCode::RCTRL, true),
        ]
        .into_iter()
        .collect();
        let mut sink = DiscardSink;
        let mut kbd = keyboard_with_combo();

        let mut seen = Vec::new();
        while let Some(t) = EventCollector::new(&mut queue, &mut sink).poll_single(&mut kbd) {
            seen.push(t);
        }
        assert_eq!(
            seen,
            vec![
                KeyTransition::down(KeyCode::UP),
                KeyTransition::up(KeyCode::UP),
                KeyTransition::down(KeyCode::PAGEUP),
            ]
        );
        assert_eq!(kbd.state().keys.held().collect::<Vec<_>>(), vec![KeyCode::PAGEUP]);
    }
}
