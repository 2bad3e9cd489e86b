//! Binding-Tabellen und Auflösung der gehaltenen Tasten in Aktionsmasken

use crate::controller::key_state::KeyStateTable;
use crate::controller::keycode::{KeyCode, KEY_COUNT};
use crate::controller::modifier::ModifierMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use tracing::debug;

/// Anzahl der Binding-Typen
pub const BIND_TYPE_COUNT: usize = 3;

/// Aktionsmasken je Binding-Typ, indiziert über [`BindType::index`]
pub type ActionMasks = [u32; BIND_TYPE_COUNT];

/// Kategorie einer Aktionsbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindType {
    /// Emulator-Funktionen (Menü, Savestate, Fast-Forward ...)
    Emulator,
    /// Spieler 1 und 2
    Player12,
    /// Spieler 3 und 4
    Player34,
}

impl BindType {
    pub const ALL: [BindType; BIND_TYPE_COUNT] =
        [BindType::Emulator, BindType::Player12, BindType::Player34];

    pub const fn index(self) -> usize {
        match self {
            BindType::Emulator => 0,
            BindType::Player12 => 1,
            BindType::Player34 => 2,
        }
    }
}

impl Display for BindType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindType::Emulator => write!(f, "Emulator"),
            BindType::Player12 => write!(f, "Player12"),
            BindType::Player34 => write!(f, "Player34"),
        }
    }
}

/// Standardbindung, die bei der Registrierung eines Geräts gesetzt wird
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultBind {
    pub code: KeyCode,
    pub bind_type: BindType,
    pub actions: u32,
}

/// Zuordnung (KeyCode, BindType) -> Aktionsmaske
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    binds: Vec<u32>,
}

impl Default for BindingTable {
    fn default() -> Self {
        Self {
            binds: vec![0; KEY_COUNT * BIND_TYPE_COUNT],
        }
    }
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt eine Tabelle aus Standardbindungen
    pub fn from_defaults(defaults: &[DefaultBind]) -> Self {
        let mut table = Self::new();
        for bind in defaults {
            table.binds[Self::offset(bind.code, bind.bind_type)] |= bind.actions;
        }
        table
    }

    fn offset(code: KeyCode, bind_type: BindType) -> usize {
        code.index() * BIND_TYPE_COUNT + bind_type.index()
    }

    pub fn get(&self, code: KeyCode, bind_type: BindType) -> u32 {
        self.binds[Self::offset(code, bind_type)]
    }

    /// Lookup über einen ungeprüften Code, `None` für unbekannte Codes
    pub fn get_raw(&self, raw: u16, bind_type: BindType) -> Option<u32> {
        KeyCode::new(raw).map(|code| self.get(code, bind_type))
    }

    pub fn set(&mut self, code: KeyCode, bind_type: BindType, actions: u32) {
        self.binds[Self::offset(code, bind_type)] = actions;
    }

    /// Bindet `actions` an `code`. Mit `force` wird die Maske ersetzt,
    /// sonst werden die Bits umgeschaltet.
    pub fn bind_key(&mut self, code: KeyCode, actions: u32, bind_type: BindType, force: bool) {
        let slot = &mut self.binds[Self::offset(code, bind_type)];
        if force {
            *slot = actions;
        } else {
            *slot ^= actions;
        }
    }

    /// Entfernt `actions` von allen Tasten
    pub fn unbind_all(&mut self, actions: u32, bind_type: BindType) {
        for idx in 0..KEY_COUNT {
            self.binds[idx * BIND_TYPE_COUNT + bind_type.index()] &= !actions;
        }
    }

    /// Alle Tasten, an die mindestens ein Bit aus `actions` gebunden ist
    pub fn keys_for(&self, actions: u32, bind_type: BindType) -> Vec<KeyCode> {
        (0..KEY_COUNT)
            .map(KeyCode::from_index)
            .filter(|code| self.get(*code, bind_type) & actions != 0)
            .collect()
    }

    pub fn count_bound_keys(&self, actions: u32, bind_type: BindType) -> usize {
        self.keys_for(actions, bind_type).len()
    }

    /// Bindet `code` an irgendeine Aktion?
    pub fn is_bound(&self, code: KeyCode) -> bool {
        BindType::ALL.iter().any(|bt| self.get(code, *bt) != 0)
    }

    /// Alle Einträge ungleich null
    pub fn iter_bound(&self) -> impl Iterator<Item = (KeyCode, BindType, u32)> + '_ {
        (0..KEY_COUNT).flat_map(move |idx| {
            let code = KeyCode::from_index(idx);
            BindType::ALL
                .into_iter()
                .map(move |bt| (code, bt, self.get(code, bt)))
                .filter(|(_, _, actions)| *actions != 0)
        })
    }
}

/// ODER-verknüpft für jede gehaltene Taste die gebundenen Aktionen in `result`
pub fn update_binds(keys: &KeyStateTable, binds: &BindingTable, result: &mut ActionMasks) {
    for code in keys.held() {
        for bind_type in BindType::ALL {
            result[bind_type.index()] |= binds.get(code, bind_type);
        }
    }
}

/// Aktualisiert die Bound-Flags der Modifier-Paare: ein Paar gilt als
/// gebunden, wenn seine Ausgabetaste in irgendeinem Binding-Typ belegt ist
pub fn refresh_modifier_binds(map: &mut ModifierMap, binds: &BindingTable) {
    let flags: Vec<bool> = map
        .pairs()
        .iter()
        .map(|pair| binds.is_bound(pair.out_key))
        .collect();
    for (idx, bound) in flags.into_iter().enumerate() {
        map.set_bound(idx, bound);
    }
}

/// Baut die Emulator-Tastenmaske neu auf und liefert die Anzahl belegter Einträge
pub fn clean_binds(binds: &BindingTable, emu_keys: &mut KeyStateTable) -> usize {
    emu_keys.clear();
    let mut count = 0;
    for (code, bind_type, _) in binds.iter_bound() {
        if bind_type == BindType::Emulator {
            emu_keys.set(code, true);
        }
        count += 1;
    }
    debug!(
        "Cleaned binds: {} entries, {} emulator keys",
        count,
        emu_keys.count()
    );
    count
}
