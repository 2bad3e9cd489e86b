//! Menü-Tasten: Übersetzung zwischen KeyCodes und Menü-Buttons

use crate::controller::keycode::{KeyCode, KeyNames};
use bitflags::bitflags;
use tracing::warn;

bitflags! {
    /// Logische Menü-Buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MenuButtons: u32 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const MOK = 1 << 4;
        const MBACK = 1 << 5;
        const MA2 = 1 << 6;
        const MA3 = 1 << 7;
        const L = 1 << 8;
        const R = 1 << 9;
        const MENU = 1 << 10;
        // Taste hat ein druckbares Zeichen (Type-to-seek)
        const CHAR = 1 << 11;
    }
}

impl MenuButtons {
    /// Parst einen Button-Namen aus der Konfiguration, z.B. "mok" oder "up".
    /// Groß-/Kleinschreibung egal, Aliase "ok" und "back" erlaubt.
    pub fn parse_config_name(name: &str) -> Option<Self> {
        let button = match name.trim().to_ascii_lowercase().as_str() {
            "up" => Self::UP,
            "down" => Self::DOWN,
            "left" => Self::LEFT,
            "right" => Self::RIGHT,
            "mok" | "ok" => Self::MOK,
            "mback" | "back" => Self::MBACK,
            "ma2" => Self::MA2,
            "ma3" => Self::MA3,
            "l" => Self::L,
            "r" => Self::R,
            "menu" => Self::MENU,
            _ => return None,
        };
        Some(button)
    }
}

/// Eine Zeile der Menü-Tastenzuordnung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuKey {
    pub key: KeyCode,
    pub button: MenuButtons,
}

impl MenuKey {
    pub const fn new(key: KeyCode, button: MenuButtons) -> Self {
        Self { key, button }
    }
}

/// Ergebnis einer Menü-Abfrage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuInput {
    pub buttons: MenuButtons,
    pub ch: Option<char>,
}

// Zuordnung pro Gerätetyp, erster Treffer gewinnt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuMap {
    keys: Vec<MenuKey>,
}

impl MenuMap {
    pub fn new(keys: Vec<MenuKey>) -> Self {
        Self { keys }
    }

    pub fn default_keyboard() -> Self {
        Self::new(vec![
            MenuKey::new(KeyCode::UP, MenuButtons::UP),
            MenuKey::new(KeyCode::DOWN, MenuButtons::DOWN),
            MenuKey::new(KeyCode::LEFT, MenuButtons::LEFT),
            MenuKey::new(KeyCode::RIGHT, MenuButtons::RIGHT),
            MenuKey::new(KeyCode::RETURN, MenuButtons::MOK),
            MenuKey::new(KeyCode::ESCAPE, MenuButtons::MBACK),
            MenuKey::new(KeyCode::SEMICOLON, MenuButtons::MA2),
            MenuKey::new(KeyCode::QUOTE, MenuButtons::MA3),
            MenuKey::new(KeyCode::LEFTBRACKET, MenuButtons::L),
            MenuKey::new(KeyCode::RIGHTBRACKET, MenuButtons::R),
            MenuKey::new(KeyCode::F1, MenuButtons::MENU),
        ])
    }

    pub fn default_joystick() -> Self {
        let mut keys = vec![
            MenuKey::new(KeyCode::UP, MenuButtons::UP),
            MenuKey::new(KeyCode::DOWN, MenuButtons::DOWN),
            MenuKey::new(KeyCode::LEFT, MenuButtons::LEFT),
            MenuKey::new(KeyCode::RIGHT, MenuButtons::RIGHT),
        ];
        let buttons = [
            MenuButtons::MOK,
            MenuButtons::MBACK,
            MenuButtons::MA2,
            MenuButtons::MA3,
        ];
        for (idx, button) in buttons.into_iter().enumerate() {
            if let Some(key) = KeyCode::joy_button(idx as u8) {
                keys.push(MenuKey::new(key, button));
            }
        }
        Self::new(keys)
    }

    /// Baut eine Zuordnung aus (Tastenname, Buttonname)-Paaren;
    /// unbekannte Namen werden übersprungen
    pub fn from_names<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
        names: &KeyNames,
    ) -> Self {
        let mut keys = Vec::new();
        for (key, button) in entries {
            match (names.find(key), MenuButtons::parse_config_name(button)) {
                (Some(key), Some(button)) => keys.push(MenuKey::new(key, button)),
                _ => warn!("Ignoring menu key {} -> {}", key, button),
            }
        }
        Self::new(keys)
    }

    pub fn keys(&self) -> &[MenuKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// KeyCode -> Menü-Button. Ohne Zuordnung liefert eine Taste mit
    /// einbuchstabigem Namen `CHAR` und das Zeichen.
    pub fn translate(&self, code: KeyCode, names: &KeyNames) -> MenuInput {
        if let Some(entry) = self.keys.iter().find(|k| k.key == code) {
            return MenuInput {
                buttons: entry.button,
                ch: None,
            };
        }
        match names.char_of(code) {
            Some(ch) => MenuInput {
                buttons: MenuButtons::CHAR,
                ch: Some(ch),
            },
            None => MenuInput::default(),
        }
    }

    /// Menü-Button -> erste zugeordnete Taste
    pub fn key_for(&self, button: MenuButtons) -> Option<KeyCode> {
        self.keys.iter().find(|k| k.button == button).map(|k| k.key)
    }
}
