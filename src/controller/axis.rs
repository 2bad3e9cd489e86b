use crate::controller::keycode::KeyCode;
use tracing::debug;

/// Axis values within `-AXIS_THRESHOLD..=AXIS_THRESHOLD` count as neutral
pub const AXIS_THRESHOLD: i16 = 16384;

/// Only the first two axes (the main stick) produce keys
pub const TRACKED_AXES: usize = 2;

// Logical key change produced by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTransition {
    pub code: KeyCode,
    pub pressed: bool,
}

impl KeyTransition {
    pub fn down(code: KeyCode) -> Self {
        Self {
            code,
            pressed: true,
        }
    }

    pub fn up(code: KeyCode) -> Self {
        Self {
            code,
            pressed: false,
        }
    }
}

/// Turns analog stick motion into digital direction keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoystickAxisMapper {
    // Direction key currently synthesized per tracked axis
    axis_keys: [Option<KeyCode>; TRACKED_AXES],
}

impl JoystickAxisMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self, axis: u8) -> Option<KeyCode> {
        self.axis_keys.get(axis as usize).copied().flatten()
    }

    /// Returns `None` for axes that are not tracked, otherwise the key changes
    /// caused by the motion (a release always precedes a new press)
    pub fn axis_motion(&mut self, axis: u8, value: i16) -> Option<Vec<KeyTransition>> {
        let slot = self.axis_keys.get_mut(axis as usize)?;
        let mut out = Vec::with_capacity(2);

        if (-AXIS_THRESHOLD..=AXIS_THRESHOLD).contains(&value) {
            if let Some(released) = slot.take() {
                debug!("Axis {} back to center, releasing {}", axis, released);
                out.push(KeyTransition::up(released));
            }
            return Some(out);
        }

        let direction = match (axis, value < 0) {
            (0, true) => KeyCode::LEFT,
            (0, false) => KeyCode::RIGHT,
            (_, true) => KeyCode::UP,
            (_, false) => KeyCode::DOWN,
        };

        if let Some(previous) = *slot {
            if previous != direction {
                out.push(KeyTransition::up(previous));
            }
        }
        *slot = Some(direction);
        out.push(KeyTransition::down(direction));
        Some(out)
    }

    /// Button `button` maps to the joystick button code range
    pub fn button(button: u8, pressed: bool) -> Option<KeyTransition> {
        KeyCode::joy_button(button).map(|code| KeyTransition { code, pressed })
    }

    pub fn reset(&mut self) {
        self.axis_keys = [None; TRACKED_AXES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_sequence_releases_before_pressing() {
        let mut mapper = JoystickAxisMapper::new();
        let mut seen = Vec::new();
        for value in [0, -20000, 0, 20000] {
            seen.extend(mapper.axis_motion(0, value).unwrap());
        }

        assert_eq!(
            seen,
            vec![
                KeyTransition::down(KeyCode::LEFT),
                KeyTransition::up(KeyCode::LEFT),
                KeyTransition::down(KeyCode::RIGHT),
            ]
        );
        assert_eq!(mapper.held(0), Some(KeyCode::RIGHT));
    }

    #[test]
    fn test_direct_flip_emits_release_first() {
        let mut mapper = JoystickAxisMapper::new();
        mapper.axis_motion(1, -30000);
        assert_eq!(
            mapper.axis_motion(1, 30000).unwrap(),
            vec![KeyTransition::up(KeyCode::UP), KeyTransition::down(KeyCode::DOWN)]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut mapper = JoystickAxisMapper::new();
        assert!(mapper.axis_motion(0, AXIS_THRESHOLD).unwrap().is_empty());
        assert!(mapper.axis_motion(0, -AXIS_THRESHOLD).unwrap().is_empty());
        assert_eq!(
            mapper.axis_motion(0, AXIS_THRESHOLD + 1).unwrap(),
            vec![KeyTransition::down(KeyCode::RIGHT)]
        );
        assert_eq!(
            mapper.axis_motion(0, i16::MIN).unwrap(),
            vec![KeyTransition::up(KeyCode::RIGHT), KeyTransition::down(KeyCode::LEFT)]
        );
    }

    #[test]
    fn test_same_direction_repeats_without_release() {
        let mut mapper = JoystickAxisMapper::new();
        mapper.axis_motion(1, 20000);
        assert_eq!(
            mapper.axis_motion(1, 25000).unwrap(),
            vec![KeyTransition::down(KeyCode::DOWN)]
        );
    }

    #[test]
    fn test_untracked_axes_and_buttons() {
        let mut mapper = JoystickAxisMapper::new();
        assert!(mapper.axis_motion(2, 30000).is_none());
        assert_eq!(
            JoystickAxisMapper::button(0, true),
            Some(KeyTransition::down(KeyCode::joy_button(0).unwrap()))
        );
        assert_eq!(JoystickAxisMapper::button(200, true), None);
    }
}
