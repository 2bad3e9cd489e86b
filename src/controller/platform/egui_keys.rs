use crate::controller::event_queue::{EventQueue, RawEvent};
use crate::controller::keycode::KeyCode;
use egui::{Event, Key};
use tracing::{debug, trace};

/// Maps an egui key to its key code; keys without a counterpart yield `None`
pub fn key_code(key: Key) -> Option<KeyCode> {
    let code = match key {
        Key::ArrowUp => KeyCode::UP,
        Key::ArrowDown => KeyCode::DOWN,
        Key::ArrowLeft => KeyCode::LEFT,
        Key::ArrowRight => KeyCode::RIGHT,
        Key::Escape => KeyCode::ESCAPE,
        Key::Tab => KeyCode::TAB,
        Key::Backspace => KeyCode::BACKSPACE,
        Key::Enter => KeyCode::RETURN,
        Key::Space => KeyCode::SPACE,
        Key::Insert => KeyCode::INSERT,
        Key::Delete => KeyCode::DELETE,
        Key::Home => KeyCode::HOME,
        Key::End => KeyCode::END,
        Key::PageUp => KeyCode::PAGEUP,
        Key::PageDown => KeyCode::PAGEDOWN,
        Key::Minus => KeyCode::MINUS,
        Key::Equals => KeyCode::EQUALS,
        Key::Plus => KeyCode::PLUS,
        Key::Comma => KeyCode::COMMA,
        Key::Period => KeyCode::PERIOD,
        Key::Semicolon => KeyCode::SEMICOLON,
        Key::Colon => KeyCode::COLON,
        Key::Quote => KeyCode::QUOTE,
        Key::Slash => KeyCode::SLASH,
        Key::Backslash => KeyCode::BACKSLASH,
        Key::OpenBracket => KeyCode::LEFTBRACKET,
        Key::CloseBracket => KeyCode::RIGHTBRACKET,
        Key::Backtick => KeyCode::BACKQUOTE,
        Key::Num0 => KeyCode::NUM_0,
        Key::Num1 => KeyCode::NUM_1,
        Key::Num2 => KeyCode::NUM_2,
        Key::Num3 => KeyCode::NUM_3,
        Key::Num4 => KeyCode::NUM_4,
        Key::Num5 => KeyCode::NUM_5,
        Key::Num6 => KeyCode::NUM_6,
        Key::Num7 => KeyCode::NUM_7,
        Key::Num8 => KeyCode::NUM_8,
        Key::Num9 => KeyCode::NUM_9,
        Key::A => KeyCode::A,
        Key::B => KeyCode::B,
        Key::C => KeyCode::C,
        Key::D => KeyCode::D,
        Key::E => KeyCode::E,
        Key::F => KeyCode::F,
        Key::G => KeyCode::G,
        Key::H => KeyCode::H,
        Key::I => KeyCode::I,
        Key::J => KeyCode::J,
        Key::K => KeyCode::K,
        Key::L => KeyCode::L,
        Key::M => KeyCode::M,
        Key::N => KeyCode::N,
        Key::O => KeyCode::O,
        Key::P => KeyCode::P,
        Key::Q => KeyCode::Q,
        Key::R => KeyCode::R,
        Key::S => KeyCode::S,
        Key::T => KeyCode::T,
        Key::U => KeyCode::U,
        Key::V => KeyCode::V,
        Key::W => KeyCode::W,
        Key::X => KeyCode::X,
        Key::Y => KeyCode::Y,
        Key::Z => KeyCode::Z,
        Key::F1 => KeyCode::F1,
        Key::F2 => KeyCode::F2,
        Key::F3 => KeyCode::F3,
        Key::F4 => KeyCode::F4,
        Key::F5 => KeyCode::F5,
        Key::F6 => KeyCode::F6,
        Key::F7 => KeyCode::F7,
        Key::F8 => KeyCode::F8,
        Key::F9 => KeyCode::F9,
        Key::F10 => KeyCode::F10,
        Key::F11 => KeyCode::F11,
        Key::F12 => KeyCode::F12,
        Key::F13 => KeyCode::F13,
        Key::F14 => KeyCode::F14,
        Key::F15 => KeyCode::F15,
        _ => return None,
    };
    Some(code)
}

/// Key events of one egui frame, auto-repeats dropped
pub fn convert_events(events: &[Event]) -> Vec<RawEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Key {
                key,
                pressed,
                repeat,
                ..
            } => {
                if *repeat {
                    trace!("Key repeat ignored: {:?}", key);
                    return None;
                }
                let code = key_code(*key);
                if code.is_none() {
                    debug!("No key code for {:?}", key);
                }
                code.map(|code| RawEvent::key(code, *pressed))
            }
            _ => None,
        })
        .collect()
}

/// Feeds the key events of one egui frame into `queue`
pub fn push_events(queue: &mut dyn EventQueue, events: &[Event]) -> usize {
    let converted = convert_events(events);
    let count = converted.len();
    for event in converted {
        queue.push(event);
    }
    count
}
