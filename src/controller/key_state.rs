use crate::controller::keycode::{KeyCode, KEY_COUNT};
use fixedbitset::FixedBitSet;

/// Packed set of currently held key codes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStateTable {
    bits: FixedBitSet,
}

impl Default for KeyStateTable {
    fn default() -> Self {
        Self {
            bits: FixedBitSet::with_capacity(KEY_COUNT),
        }
    }
}

impl KeyStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, code: KeyCode, down: bool) {
        self.bits.set(code.index(), down);
    }

    pub fn test(&self, code: KeyCode) -> bool {
        self.bits.contains(code.index())
    }

    /// Held codes in ascending order
    pub fn held(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.bits.ones().map(KeyCode::from_index)
    }

    pub fn count(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.held().next().is_none()
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }
}
