//! Logical key codes and their display names
//!
//! Codes follow the classic SDL 1.2 keysym layout so binding tables written for
//! older frontends keep working: printable keys use their ASCII value, the
//! keypad, arrows and function keys live above 255, and joystick buttons are
//! folded into the otherwise unused "world" range starting at [`JOY_BUTTON_BASE`].

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Number of distinct logical symbols, every valid code is below this
pub const KEY_COUNT: usize = 323;

/// Joystick button `n` is reported as `JOY_BUTTON_BASE + n`
pub const JOY_BUTTON_BASE: u16 = 160;

/// Logical input symbol (physical key, joystick button or synthesized direction)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct KeyCode(u16);

impl KeyCode {
    /// Returns `None` for codes outside the symbol space
    pub const fn new(raw: u16) -> Option<Self> {
        if (raw as usize) < KEY_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Code reported for joystick button `button`
    pub fn joy_button(button: u8) -> Option<Self> {
        Self::new(JOY_BUTTON_BASE + u16::from(button))
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < KEY_COUNT);
        Self(index as u16)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// True for codes in the joystick button range
    pub fn is_joy_button(self) -> bool {
        (JOY_BUTTON_BASE..=JOY_BUTTON_BASE + 95).contains(&self.0)
    }
}

impl TryFrom<u16> for KeyCode {
    type Error = String;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        KeyCode::new(raw).ok_or_else(|| format!("key code {} out of range", raw))
    }
}

impl From<KeyCode> for u16 {
    fn from(code: KeyCode) -> u16 {
        code.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Generates the named constants and the default name table from one list
macro_rules! key_table {
    ($($konst:ident = $code:expr => $label:expr),* $(,)?) => {
        impl KeyCode {
            $(pub const $konst: KeyCode = KeyCode($code);)*
        }

        const DEFAULT_KEY_NAMES: &[(u16, &str)] = &[$(($code, $label)),*];
    };
}

key_table! {
    BACKSPACE = 8 => "backspace",
    TAB = 9 => "tab",
    CLEAR = 12 => "clear",
    RETURN = 13 => "return",
    PAUSE = 19 => "pause",
    ESCAPE = 27 => "escape",
    SPACE = 32 => "space",
    EXCLAIM = 33 => "!",
    QUOTEDBL = 34 => "\"",
    HASH = 35 => "#",
    DOLLAR = 36 => "$",
    AMPERSAND = 38 => "&",
    QUOTE = 39 => "'",
    LEFTPAREN = 40 => "(",
    RIGHTPAREN = 41 => ")",
    ASTERISK = 42 => "*",
    PLUS = 43 => "+",
    COMMA = 44 => ",",
    MINUS = 45 => "-",
    PERIOD = 46 => ".",
    SLASH = 47 => "/",
    NUM_0 = 48 => "0",
    NUM_1 = 49 => "1",
    NUM_2 = 50 => "2",
    NUM_3 = 51 => "3",
    NUM_4 = 52 => "4",
    NUM_5 = 53 => "5",
    NUM_6 = 54 => "6",
    NUM_7 = 55 => "7",
    NUM_8 = 56 => "8",
    NUM_9 = 57 => "9",
    COLON = 58 => ":",
    SEMICOLON = 59 => ";",
    LESS = 60 => "<",
    EQUALS = 61 => "=",
    GREATER = 62 => ">",
    QUESTION = 63 => "?",
    AT = 64 => "@",
    LEFTBRACKET = 91 => "[",
    BACKSLASH = 92 => "\\",
    RIGHTBRACKET = 93 => "]",
    CARET = 94 => "^",
    UNDERSCORE = 95 => "_",
    BACKQUOTE = 96 => "`",
    A = 97 => "a",
    B = 98 => "b",
    C = 99 => "c",
    D = 100 => "d",
    E = 101 => "e",
    F = 102 => "f",
    G = 103 => "g",
    H = 104 => "h",
    I = 105 => "i",
    J = 106 => "j",
    K = 107 => "k",
    L = 108 => "l",
    M = 109 => "m",
    N = 110 => "n",
    O = 111 => "o",
    P = 112 => "p",
    Q = 113 => "q",
    R = 114 => "r",
    S = 115 => "s",
    T = 116 => "t",
    U = 117 => "u",
    V = 118 => "v",
    W = 119 => "w",
    X = 120 => "x",
    Y = 121 => "y",
    Z = 122 => "z",
    DELETE = 127 => "delete",
    KP_0 = 256 => "[0]",
    KP_1 = 257 => "[1]",
    KP_2 = 258 => "[2]",
    KP_3 = 259 => "[3]",
    KP_4 = 260 => "[4]",
    KP_5 = 261 => "[5]",
    KP_6 = 262 => "[6]",
    KP_7 = 263 => "[7]",
    KP_8 = 264 => "[8]",
    KP_9 = 265 => "[9]",
    KP_PERIOD = 266 => "[.]",
    KP_DIVIDE = 267 => "[/]",
    KP_MULTIPLY = 268 => "[*]",
    KP_MINUS = 269 => "[-]",
    KP_PLUS = 270 => "[+]",
    KP_ENTER = 271 => "enter",
    KP_EQUALS = 272 => "equals",
    UP = 273 => "up",
    DOWN = 274 => "down",
    RIGHT = 275 => "right",
    LEFT = 276 => "left",
    INSERT = 277 => "insert",
    HOME = 278 => "home",
    END = 279 => "end",
    PAGEUP = 280 => "page up",
    PAGEDOWN = 281 => "page down",
    F1 = 282 => "f1",
    F2 = 283 => "f2",
    F3 = 284 => "f3",
    F4 = 285 => "f4",
    F5 = 286 => "f5",
    F6 = 287 => "f6",
    F7 = 288 => "f7",
    F8 = 289 => "f8",
    F9 = 290 => "f9",
    F10 = 291 => "f10",
    F11 = 292 => "f11",
    F12 = 293 => "f12",
    F13 = 294 => "f13",
    F14 = 295 => "f14",
    F15 = 296 => "f15",
    NUMLOCK = 300 => "numlock",
    CAPSLOCK = 301 => "caps lock",
    SCROLLOCK = 302 => "scroll lock",
    RSHIFT = 303 => "right shift",
    LSHIFT = 304 => "left shift",
    RCTRL = 305 => "right ctrl",
    LCTRL = 306 => "left ctrl",
    RALT = 307 => "right alt",
    LALT = 308 => "left alt",
    RMETA = 309 => "right meta",
    LMETA = 310 => "left meta",
    LSUPER = 311 => "left super",
    RSUPER = 312 => "right super",
    MODE = 313 => "alt gr",
    COMPOSE = 314 => "compose",
}

/// Key-name table indexed by [`KeyCode`], entries may be absent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyNames {
    names: Vec<Option<Cow<'static, str>>>,
}

impl Default for KeyNames {
    fn default() -> Self {
        let mut names = vec![None; KEY_COUNT];
        for &(code, label) in DEFAULT_KEY_NAMES {
            names[code as usize] = Some(Cow::Borrowed(label));
        }
        Self { names }
    }
}

impl KeyNames {
    /// Table without any names, for platforms that supply their own
    pub fn empty() -> Self {
        Self {
            names: vec![None; KEY_COUNT],
        }
    }

    /// Replaces (or adds) the name of a single code
    pub fn set(&mut self, code: KeyCode, name: impl Into<String>) {
        self.names[code.index()] = Some(Cow::Owned(name.into()));
    }

    pub fn get(&self, code: KeyCode) -> Option<&str> {
        self.names[code.index()].as_deref()
    }

    /// Name for display, unnamed codes get a generic label
    pub fn display(&self, code: KeyCode) -> String {
        match self.get(code) {
            Some(name) => name.to_string(),
            None if code.is_joy_button() => {
                format!("btn {}", code.raw() - JOY_BUTTON_BASE)
            }
            None => format!("Unkn{}", code.raw()),
        }
    }

    /// Reverse lookup; also accepts a plain decimal code
    pub fn find(&self, name: &str) -> Option<KeyCode> {
        let name = name.trim();
        if let Some(idx) = self
            .names
            .iter()
            .position(|n| n.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
        {
            return Some(KeyCode::from_index(idx));
        }
        name.parse::<u16>().ok().and_then(KeyCode::new)
    }

    /// Single printable character bound to a code, used for type-to-seek
    pub fn char_of(&self, code: KeyCode) -> Option<char> {
        let name = self.get(code)?;
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.iter().all(Option::is_none)
    }
}
