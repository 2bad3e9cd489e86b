//! Device registry and lifecycle
//!
//! The host owns the shared event queue, the external raw-event sink and all
//! registered devices. Registration happens while probing; polling is only
//! possible once probing is finished.
//!
//! ```text
//! InputHost<Probing> ── finish_probe() ──► InputHost<Ready> ── teardown()
//!   register_keyboard                        update_binds / poll_single
//!   register_joystick                        menu_wait / bind_key ...
//! ```

use crate::controller::axis::KeyTransition;
use crate::controller::device::{Device, InputDevice, JoystickDevice, KeyboardDevice};
use crate::controller::error::InputError;
use crate::controller::event_collector::{EventCollector, RawEventSink};
use crate::controller::event_queue::EventQueue;
use crate::controller::keycode::{KeyCode, KeyNames, KEY_COUNT};
use crate::controller::modifier::{ModifierMap, ModifierPair, ModifierTranslator};
use crate::mapping::binds::{self, ActionMasks, BindType, BindingTable, DefaultBind};
use crate::mapping::{MenuButtons, MenuInput, MenuMap, BIND_TYPE_COUNT};
use statum::{machine, state};
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Upper bound on registered devices
pub const MAX_DEVICES: usize = 16;

/// Poll period of [`InputHost::menu_wait`]
pub const MENU_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Index of a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub usize);

/// A joystick as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoystickInfo {
    pub id: u32,
    pub name: String,
}

/// Per-platform registration data: names, default binds, combos and menu maps
#[derive(Debug, Clone)]
pub struct PlatformData {
    pub key_names: KeyNames,
    pub defaults: Vec<DefaultBind>,
    pub joy_defaults: Vec<DefaultBind>,
    pub modifier: Option<KeyCode>,
    pub modifier_map: Vec<ModifierPair>,
    pub key_menu: MenuMap,
    pub joy_menu: MenuMap,
}

impl Default for PlatformData {
    fn default() -> Self {
        Self {
            key_names: KeyNames::default(),
            defaults: Vec::new(),
            joy_defaults: Vec::new(),
            modifier: None,
            modifier_map: Vec::new(),
            key_menu: MenuMap::default_keyboard(),
            joy_menu: MenuMap::default_joystick(),
        }
    }
}

/// Runtime-queryable device settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// Combos fire for pairs whose out key has no binding
    AllowUnboundModifiers,
    /// Size of the binding table (read-only)
    BindCount,
    /// Device rewrites modifier combos (read-only)
    DoesCombos,
}

#[derive(Debug)]
pub struct RegisteredDevice {
    pub name: String,
    pub device: Device,
    pub binds: BindingTable,
}

/// Host lifecycle states
#[state]
#[derive(Debug, Clone)]
pub enum HostState {
    Probing, // Accepting device registrations
    Ready,   // Polling registered devices
}

#[machine]
pub struct InputHost<S: HostState> {
    queue: Box<dyn EventQueue>,
    sink: Box<dyn RawEventSink>,
    platform: PlatformData,
    name_prefix: String,
    allow_unbound_modifiers: bool,
    devices: Vec<RegisteredDevice>,
}

impl<S: HostState> InputHost<S> {
    /// Shared event source, e.g. for platform code pushing events
    pub fn queue_mut(&mut self) -> &mut dyn EventQueue {
        &mut *self.queue
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn device(&self, id: DeviceId) -> Option<&RegisteredDevice> {
        self.devices.get(id.0)
    }

    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &RegisteredDevice)> {
        self.devices
            .iter()
            .enumerate()
            .map(|(idx, dev)| (DeviceId(idx), dev))
    }

    pub fn key_names(&self) -> &KeyNames {
        &self.platform.key_names
    }

    /// Display name of `code`, with a generic label for unnamed codes
    pub fn key_name(&self, code: KeyCode) -> String {
        self.platform.key_names.display(code)
    }

    pub fn find_key(&self, name: &str) -> Option<KeyCode> {
        self.platform.key_names.find(name)
    }

    fn entry(&self, id: DeviceId) -> Result<&RegisteredDevice, InputError> {
        self.devices
            .get(id.0)
            .ok_or_else(|| InputError::UnknownDevice(format!("{:?}", id)))
    }

    fn entry_mut(&mut self, id: DeviceId) -> Result<&mut RegisteredDevice, InputError> {
        self.devices
            .get_mut(id.0)
            .ok_or_else(|| InputError::UnknownDevice(format!("{:?}", id)))
    }

    pub fn get_config(&self, id: DeviceId, key: ConfigKey) -> Result<i32, InputError> {
        let entry = self.entry(id)?;
        let value = match key {
            ConfigKey::AllowUnboundModifiers => {
                i32::from(entry.device.state().allow_unbound_modifiers)
            }
            ConfigKey::BindCount => KEY_COUNT as i32,
            ConfigKey::DoesCombos => i32::from(entry.device.does_combos()),
        };
        Ok(value)
    }

    pub fn set_config(&mut self, id: DeviceId, key: ConfigKey, value: i32) -> Result<(), InputError> {
        let entry = self.entry_mut(id)?;
        match key {
            ConfigKey::AllowUnboundModifiers => {
                entry.device.state_mut().allow_unbound_modifiers = value != 0;
                debug!(
                    "{}: allow unbound modifiers = {}",
                    entry.name,
                    value != 0
                );
                Ok(())
            }
            other => Err(InputError::UnsupportedConfig(format!("{:?}", other))),
        }
    }

    /// Rebuilds the emulator-key mask of a device from its bindings
    pub fn clean_binds(&mut self, id: DeviceId) -> Result<usize, InputError> {
        let entry = self.entry_mut(id)?;
        Ok(binds::clean_binds(
            &entry.binds,
            &mut entry.device.state_mut().emu_keys,
        ))
    }

    pub fn bind_key(
        &mut self,
        id: DeviceId,
        code: KeyCode,
        actions: u32,
        bind_type: BindType,
        force: bool,
    ) -> Result<(), InputError> {
        let entry = self.entry_mut(id)?;
        entry.binds.bind_key(code, actions, bind_type, force);
        debug!(
            "{}: {} {} now {:#x}",
            entry.name,
            bind_type,
            code,
            entry.binds.get(code, bind_type)
        );
        self.clean_binds(id).map(|_| ())
    }

    pub fn unbind_all(&mut self, id: DeviceId, actions: u32, bind_type: BindType) -> Result<(), InputError> {
        self.entry_mut(id)?.binds.unbind_all(actions, bind_type);
        self.clean_binds(id).map(|_| ())
    }

    pub fn count_bound_keys(
        &self,
        id: DeviceId,
        actions: u32,
        bind_type: BindType,
    ) -> Result<usize, InputError> {
        Ok(self.entry(id)?.binds.count_bound_keys(actions, bind_type))
    }

    /// Names of all keys bound to any of `actions`, e.g. for a key config menu
    pub fn action_key_names(
        &self,
        id: DeviceId,
        actions: u32,
        bind_type: BindType,
    ) -> Result<Vec<String>, InputError> {
        Ok(self
            .entry(id)?
            .binds
            .keys_for(actions, bind_type)
            .into_iter()
            .map(|code| self.key_name(code))
            .collect())
    }

    fn menu_map(&self, device: &Device) -> &MenuMap {
        if device.is_keyboard() {
            &self.platform.key_menu
        } else {
            &self.platform.joy_menu
        }
    }

    pub fn menu_translate(&self, id: DeviceId, code: KeyCode) -> Result<MenuInput, InputError> {
        let entry = self.entry(id)?;
        Ok(self
            .menu_map(&entry.device)
            .translate(code, &self.platform.key_names))
    }

    pub fn menu_key_for(&self, id: DeviceId, button: MenuButtons) -> Result<Option<KeyCode>, InputError> {
        let entry = self.entry(id)?;
        Ok(self.menu_map(&entry.device).key_for(button))
    }

    /// Releases every device; returns how many were torn down
    pub fn teardown(mut self) -> usize {
        let count = self.devices.len();
        for entry in self.devices.iter_mut() {
            debug!("Tearing down {}", entry.name);
            entry.device.teardown();
        }
        self.devices.clear();
        info!("Input host shut down, {} devices released", count);
        count
    }
}

impl InputHost<Probing> {
    pub fn create(
        queue: Box<dyn EventQueue>,
        sink: Box<dyn RawEventSink>,
        platform: PlatformData,
        name_prefix: impl Into<String>,
        allow_unbound_modifiers: bool,
    ) -> Self {
        let name_prefix = name_prefix.into();
        info!("Probing input devices with prefix {:?}", name_prefix);

        Self::new(
            queue,
            sink,
            platform,
            name_prefix,
            allow_unbound_modifiers,
            Vec::new(), // devices
        )
    }

    fn register(
        &mut self,
        name: String,
        mut device: Device,
        defaults: &[DefaultBind],
    ) -> Option<DeviceId> {
        if self.devices.len() >= MAX_DEVICES {
            warn!("Device limit {} reached, skipping {}", MAX_DEVICES, name);
            return None;
        }
        device.state_mut().allow_unbound_modifiers = self.allow_unbound_modifiers;

        let id = DeviceId(self.devices.len());
        info!("Registered input device {}: {}", id.0, name);
        self.devices.push(RegisteredDevice {
            name,
            device,
            binds: BindingTable::from_defaults(defaults),
        });
        Some(id)
    }

    pub fn register_keyboard(&mut self) -> Option<DeviceId> {
        if self.devices.iter().any(|entry| entry.device.is_keyboard()) {
            warn!("Keyboard already registered");
            return None;
        }

        let translator = self.platform.modifier.map(|modifier| {
            debug!(
                "Keyboard combos on {} with {} pairs",
                self.platform.key_names.display(modifier),
                self.platform.modifier_map.len()
            );
            ModifierTranslator::new(
                modifier,
                ModifierMap::new(self.platform.modifier_map.clone()),
            )
        });

        let name = format!("{}keys", self.name_prefix);
        let defaults = self.platform.defaults.clone();
        self.register(name, Device::Keyboard(KeyboardDevice::new(translator)), &defaults)
    }

    pub fn register_joystick(&mut self, joystick: &JoystickInfo) -> Option<DeviceId> {
        if self
            .devices
            .iter()
            .any(|entry| entry.device.joy_id() == Some(joystick.id))
        {
            warn!("Joystick {} already registered, skipping", joystick.id);
            return None;
        }

        let name = format!("{}{}", self.name_prefix, joystick.name);
        let defaults = self.platform.joy_defaults.clone();
        self.register(
            name,
            Device::Joystick(JoystickDevice::new(joystick.id)),
            &defaults,
        )
    }

    pub fn finish_probe(mut self) -> InputHost<Ready> {
        for idx in 0..self.devices.len() {
            let entry = &mut self.devices[idx];
            let count = binds::clean_binds(&entry.binds, &mut entry.device.state_mut().emu_keys);
            debug!("{}: {} bound entries", entry.name, count);
        }
        info!("Probe finished, {} devices", self.devices.len());
        self.transition()
    }
}

impl InputHost<Ready> {
    /// Applies all pending events of a device and resolves its held keys into
    /// action masks
    pub fn update_binds(&mut self, id: DeviceId) -> Result<ActionMasks, InputError> {
        let entry = self
            .devices
            .get_mut(id.0)
            .ok_or_else(|| InputError::UnknownDevice(format!("{:?}", id)))?;

        if let Some(map) = entry.device.modifier_map_mut() {
            binds::refresh_modifier_binds(map, &entry.binds);
        }

        let mut collector = EventCollector::new(&mut *self.queue, &mut *self.sink);
        if collector.poll_aggregate(&mut entry.device) {
            trace!("{}: events applied", entry.name);
        }

        let mut result = [0; BIND_TYPE_COUNT];
        binds::update_binds(&entry.device.state().keys, &entry.binds, &mut result);
        Ok(result)
    }

    /// Action masks of all devices combined
    pub fn update_all(&mut self) -> ActionMasks {
        let mut result = [0; BIND_TYPE_COUNT];
        for idx in 0..self.devices.len() {
            if let Ok(masks) = self.update_binds(DeviceId(idx)) {
                for (acc, mask) in result.iter_mut().zip(masks) {
                    *acc |= mask;
                }
            }
        }
        result
    }

    /// Next key change of one device
    pub fn poll_single(&mut self, id: DeviceId) -> Result<Option<KeyTransition>, InputError> {
        let entry = self
            .devices
            .get_mut(id.0)
            .ok_or_else(|| InputError::UnknownDevice(format!("{:?}", id)))?;
        let mut collector = EventCollector::new(&mut *self.queue, &mut *self.sink);
        Ok(collector.poll_single(&mut entry.device))
    }

    /// First key change of any device, in registration order
    pub fn poll_any_single(&mut self) -> Option<(DeviceId, KeyTransition)> {
        for idx in 0..self.devices.len() {
            let id = DeviceId(idx);
            if let Ok(Some(transition)) = self.poll_single(id) {
                return Some((id, transition));
            }
        }
        None
    }

    /// Waits for a key press that translates to a menu button in `mask`.
    ///
    /// Returns an empty [`MenuInput`] once `timeout` has passed.
    pub async fn menu_wait(&mut self, mask: MenuButtons, timeout: Duration) -> MenuInput {
        let deadline = Instant::now() + timeout;
        let mut interval = time::interval(MENU_POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            while let Some((id, transition)) = self.poll_any_single() {
                if !transition.pressed {
                    continue;
                }
                let input = match self.menu_translate(id, transition.code) {
                    Ok(input) => input,
                    Err(_) => continue,
                };
                if input.buttons.intersects(mask) {
                    debug!("Menu input {:?} from {}", input.buttons, transition.code);
                    return MenuInput {
                        buttons: input.buttons & mask,
                        ch: input.ch,
                    };
                }
            }

            if Instant::now() >= deadline {
                trace!("Menu wait timed out");
                return MenuInput::default();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::event_queue::{EventMask, MemoryQueue, RawEvent, SystemEvent};
    use crate::controller::event_collector::DiscardSink;
    use crate::controller::modifier::ModifierState;
    use tokio::sync::mpsc;

    fn platform() -> PlatformData {
        PlatformData {
            defaults: vec![
                DefaultBind {
                    code: KeyCode::UP,
                    bind_type: BindType::Player12,
                    actions: 1 << 0,
                },
                DefaultBind {
                    code: KeyCode::PAGEUP,
                    bind_type: BindType::Player12,
                    actions: 1 << 5,
                },
                DefaultBind {
                    code: KeyCode::ESCAPE,
                    bind_type: BindType::Emulator,
                    actions: 1 << 3,
                },
            ],
            joy_defaults: vec![DefaultBind {
                code: KeyCode::LEFT,
                bind_type: BindType::Player12,
                actions: 1 << 2,
            }],
            modifier: Some(KeyCode::RCTRL),
            modifier_map: vec![ModifierPair::new(KeyCode::UP, KeyCode::PAGEUP)],
            ..PlatformData::default()
        }
    }

    fn ready_host() -> (InputHost<Ready>, DeviceId, DeviceId) {
        let mut host = InputHost::create(
            Box::new(MemoryQueue::new()),
            Box::new(DiscardSink),
            platform(),
            "gilrs:",
            false,
        );
        let kbd = host.register_keyboard().unwrap();
        let joy = host
            .register_joystick(&JoystickInfo {
                id: 0,
                name: "Pad".to_string(),
            })
            .unwrap();
        (host.finish_probe(), kbd, joy)
    }

    #[test]
    fn test_registration_names_and_limits() {
        let mut host = InputHost::create(
            Box::new(MemoryQueue::new()),
            Box::new(DiscardSink),
            PlatformData::default(),
            "gilrs:",
            false,
        );
        let kbd = host.register_keyboard().unwrap();
        assert!(host.register_keyboard().is_none());
        assert_eq!(host.device(kbd).unwrap().name, "gilrs:keys");

        for id in 0..(MAX_DEVICES as u32 - 1) {
            let info = JoystickInfo {
                id,
                name: format!("Pad {}", id),
            };
            assert!(host.register_joystick(&info).is_some());
        }
        let extra = JoystickInfo {
            id: 99,
            name: "Extra".to_string(),
        };
        assert!(host.register_joystick(&extra).is_none());
        assert_eq!(host.device_count(), MAX_DEVICES);
        assert_eq!(host.device(DeviceId(1)).unwrap().name, "gilrs:Pad 0");
    }

    #[test]
    fn test_duplicate_joystick_skipped() {
        let mut host = InputHost::create(
            Box::new(MemoryQueue::new()),
            Box::new(DiscardSink),
            PlatformData::default(),
            "pad:",
            false,
        );
        let info = JoystickInfo {
            id: 4,
            name: "Stick".to_string(),
        };
        assert!(host.register_joystick(&info).is_some());
        assert!(host.register_joystick(&info).is_none());
    }

    #[test]
    fn test_update_binds_per_device() {
        let (mut host, kbd, joy) = ready_host();
        host.queue_mut().push(RawEvent::key(KeyCode::UP, true));
        host.queue_mut().push(RawEvent::JoyAxis {
            joystick: 0,
            axis: 0,
            value: -30000,
        });

        assert_eq!(host.update_binds(kbd).unwrap(), [0, 1, 0]);
        assert_eq!(host.update_binds(joy).unwrap(), [0, 1 << 2, 0]);
        assert_eq!(host.update_all(), [0, 1 | (1 << 2), 0]);
    }

    #[test]
    fn test_combo_resolves_to_out_key_binding() {
        let (mut host, kbd, _) = ready_host();
        host.queue_mut().push(RawEvent::key(KeyCode::UP, true));
        assert_eq!(host.update_binds(kbd).unwrap(), [0, 1, 0]);

        host.queue_mut().push(RawEvent::key(KeyCode::RCTRL, true));
        assert_eq!(host.update_binds(kbd).unwrap(), [0, 1 << 5, 0]);
        match &host.device(kbd).unwrap().device {
            Device::Keyboard(k) => assert_eq!(k.modifier_state(), ModifierState::Active),
            other => panic!("unexpected {:?}", other),
        }

        host.queue_mut().push(RawEvent::key(KeyCode::RCTRL, false));
        assert_eq!(host.update_binds(kbd).unwrap(), [0, 1, 0]);
    }

    #[test]
    fn test_poll_single_requeues_other_devices_events() {
        let (mut host, kbd, joy) = ready_host();
        host.queue_mut().push(RawEvent::JoyButton {
            joystick: 0,
            button: 1,
            pressed: true,
        });
        host.queue_mut().push(RawEvent::key(KeyCode::A, true));
        host.queue_mut().push(RawEvent::key(KeyCode::B, true));

        assert_eq!(
            host.poll_single(kbd).unwrap(),
            Some(KeyTransition::down(KeyCode::A))
        );
        assert_eq!(
            host.poll_single(joy).unwrap(),
            Some(KeyTransition::down(KeyCode::joy_button(1).unwrap()))
        );
        assert_eq!(
            host.poll_any_single(),
            Some((kbd, KeyTransition::down(KeyCode::B)))
        );
        assert_eq!(host.poll_any_single(), None);
    }

    #[test]
    fn test_config_keys() {
        let (mut host, kbd, joy) = ready_host();
        assert_eq!(host.get_config(kbd, ConfigKey::AllowUnboundModifiers).unwrap(), 0);
        host.set_config(kbd, ConfigKey::AllowUnboundModifiers, 1).unwrap();
        assert_eq!(host.get_config(kbd, ConfigKey::AllowUnboundModifiers).unwrap(), 1);

        assert_eq!(host.get_config(kbd, ConfigKey::DoesCombos).unwrap(), 1);
        assert_eq!(host.get_config(joy, ConfigKey::DoesCombos).unwrap(), 0);
        assert_eq!(host.get_config(joy, ConfigKey::BindCount).unwrap(), KEY_COUNT as i32);

        assert!(matches!(
            host.set_config(kbd, ConfigKey::BindCount, 5),
            Err(InputError::UnsupportedConfig(_))
        ));
        assert!(matches!(
            host.get_config(DeviceId(42), ConfigKey::BindCount),
            Err(InputError::UnknownDevice(_))
        ));
    }

    #[test]
    fn test_bind_management() {
        let (mut host, kbd, _) = ready_host();
        assert_eq!(host.clean_binds(kbd).unwrap(), 3);

        host.bind_key(kbd, KeyCode::F5, 1 << 3, BindType::Emulator, false)
            .unwrap();
        assert_eq!(host.count_bound_keys(kbd, 1 << 3, BindType::Emulator).unwrap(), 2);
        assert_eq!(
            host.action_key_names(kbd, 1 << 3, BindType::Emulator).unwrap(),
            vec!["escape".to_string(), "f5".to_string()]
        );
        assert!(host.device(kbd).unwrap().device.state().emu_keys.test(KeyCode::F5));

        host.unbind_all(kbd, 1 << 3, BindType::Emulator).unwrap();
        assert_eq!(host.count_bound_keys(kbd, 1 << 3, BindType::Emulator).unwrap(), 0);
        assert!(host.device(kbd).unwrap().device.state().emu_keys.is_empty());
    }

    #[test]
    fn test_unhandled_events_reach_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut host = InputHost::create(
            Box::new(MemoryQueue::new()),
            Box::new(tx),
            PlatformData::default(),
            "gilrs:",
            false,
        );
        let kbd = host.register_keyboard().unwrap();
        let mut host = host.finish_probe();

        let quit = RawEvent::System(SystemEvent::Quit);
        host.queue_mut().push(quit);
        host.update_binds(kbd).unwrap();
        assert_eq!(rx.try_recv().unwrap(), quit);
    }

    #[test]
    fn test_keyboard_forwards_hotplug_without_key_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut host = InputHost::create(
            Box::new(MemoryQueue::new()),
            Box::new(tx),
            PlatformData::default(),
            "gilrs:",
            false,
        );
        host.register_keyboard().unwrap();
        host.register_joystick(&JoystickInfo {
            id: 0,
            name: "Pad".to_string(),
        })
        .unwrap();
        let mut host = host.finish_probe();

        let added = RawEvent::System(SystemEvent::JoystickAdded(1));
        host.queue_mut().push(added);
        host.queue_mut().push(RawEvent::JoyButton {
            joystick: 0,
            button: 0,
            pressed: true,
        });

        assert_eq!(host.update_all(), [0; BIND_TYPE_COUNT]);
        assert_eq!(rx.try_recv().unwrap(), added);
        assert!(rx.try_recv().is_err());
        assert_eq!(host.queue_mut().count(EventMask::all()), 0);
    }

    #[test]
    fn test_menu_lookup_and_names() {
        let (host, kbd, joy) = ready_host();
        assert_eq!(
            host.menu_translate(kbd, KeyCode::RETURN).unwrap().buttons,
            MenuButtons::MOK
        );
        assert_eq!(
            host.menu_key_for(joy, MenuButtons::MBACK).unwrap(),
            KeyCode::joy_button(1)
        );
        assert_eq!(host.key_name(KeyCode::joy_button(3).unwrap()), "btn 3");
        assert_eq!(host.find_key("Page Up"), Some(KeyCode::PAGEUP));
    }

    #[test]
    fn test_teardown_releases_devices() {
        let (host, _, _) = ready_host();
        assert_eq!(host.teardown(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_wait_returns_matching_button() {
        let (mut host, _, _) = ready_host();
        host.queue_mut().push(RawEvent::key(KeyCode::Q, true));
        host.queue_mut().push(RawEvent::key(KeyCode::Q, false));
        host.queue_mut().push(RawEvent::JoyButton {
            joystick: 0,
            button: 0,
            pressed: true,
        });

        let input = host
            .menu_wait(MenuButtons::MOK | MenuButtons::MBACK, Duration::from_millis(500))
            .await;
        assert_eq!(input.buttons, MenuButtons::MOK);
        assert_eq!(input.ch, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_wait_char_and_timeout() {
        let (mut host, _, _) = ready_host();
        host.queue_mut().push(RawEvent::key(KeyCode::Q, true));
        let input = host
            .menu_wait(MenuButtons::CHAR, Duration::from_millis(100))
            .await;
        assert_eq!(input.ch, Some('q'));

        let start = Instant::now();
        let input = host
            .menu_wait(MenuButtons::all(), Duration::from_millis(100))
            .await;
        assert_eq!(input, MenuInput::default());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
