//! Input handling - key reading and translation

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Key modifier flags
pub mod key_flags {
    pub const CTLC: u32 = 0x0800_0000;
    pub const CONTROL: u32 = 0x1000_0000;
    pub const META: u32 = 0x2000_0000;
    pub const CTLX: u32 = 0x4000_0000;
    pub const SPEC: u32 = 0x8000_0000;

    /// Every flag bit
    pub const ALL: u32 = CTLC | CONTROL | META | CTLX | SPEC;
}

/// Codes for special keys, combined with `key_flags::SPEC`
pub mod special {
    pub const HOME: u32 = 0x47;
    pub const UP: u32 = 0x48;
    pub const PAGE_UP: u32 = 0x49;
    pub const LEFT: u32 = 0x4b;
    pub const RIGHT: u32 = 0x4d;
    pub const END: u32 = 0x4f;
    pub const DOWN: u32 = 0x50;
    pub const PAGE_DOWN: u32 = 0x51;
    pub const DELETE: u32 = 0x53;

    /// Function key `F<n>`
    pub const fn f(n: u8) -> u32 {
        0x3a + n as u32
    }
}

/// Represents a key input with modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub u32);

impl Key {
    /// Create a key from a character
    pub fn char(ch: char) -> Self {
        Key(ch as u32)
    }

    /// Create a control key (C-x)
    pub fn ctrl(ch: char) -> Self {
        Key(key_flags::CONTROL | ch.to_ascii_lowercase() as u32)
    }

    /// Create a meta key (M-x or ESC x)
    pub fn meta(ch: char) -> Self {
        Key(key_flags::META | ch as u32)
    }

    /// Create a C-x prefixed key (C-x x)
    pub fn ctlx(ch: char) -> Self {
        Key(key_flags::CTLX | ch.to_ascii_lowercase() as u32)
    }

    /// Create a C-x C-x key (C-x C-x)
    pub fn ctlx_ctrl(ch: char) -> Self {
        Key(key_flags::CTLX | key_flags::CONTROL | ch.to_ascii_lowercase() as u32)
    }

    /// Create a C-c C-x key
    pub fn ctlc_ctrl(ch: char) -> Self {
        Key(key_flags::CTLC | key_flags::CONTROL | ch.to_ascii_lowercase() as u32)
    }

    /// Create a special key (function keys, etc.)
    pub fn special(code: u32) -> Self {
        Key(key_flags::SPEC | code)
    }

    /// Get the raw key code
    pub fn code(&self) -> u32 {
        self.0
    }

    pub fn is_ctrl(&self) -> bool {
        self.0 & key_flags::CONTROL != 0
    }

    pub fn is_meta(&self) -> bool {
        self.0 & key_flags::META != 0
    }

    pub fn is_ctlx(&self) -> bool {
        self.0 & key_flags::CTLX != 0
    }

    pub fn is_ctlc(&self) -> bool {
        self.0 & key_flags::CTLC != 0
    }

    pub fn is_special(&self) -> bool {
        self.0 & key_flags::SPEC != 0
    }

    /// Get the base character (without modifiers)
    pub fn base_char(&self) -> Option<char> {
        char::from_u32(self.0 & !key_flags::ALL)
    }

    /// Check if this is a printable self-insert character
    pub fn is_self_insert(&self) -> bool {
        if self.0 & key_flags::ALL != 0 {
            return false;
        }
        match char::from_u32(self.0) {
            Some(ch) => ch >= ' ' && ch != '\x7f',
            None => false,
        }
    }

    /// Convert key to a human-readable string (e.g., "C-f", "M-<", "C-c C-c")
    pub fn display_name(&self) -> String {
        let mut result = String::new();

        if self.is_ctlx() {
            result.push_str("C-x ");
        }
        if self.is_ctlc() {
            result.push_str("C-c ");
        }
        if self.is_meta() {
            result.push_str("M-");
        }
        if self.is_ctrl() {
            result.push_str("C-");
        }

        if self.is_special() {
            let code = self.0 & 0xFF;
            let name = match code {
                special::HOME => "Home",
                special::UP => "Up",
                special::PAGE_UP => "PageUp",
                special::LEFT => "Left",
                special::RIGHT => "Right",
                special::END => "End",
                special::DOWN => "Down",
                special::PAGE_DOWN => "PageDown",
                special::DELETE => "Delete",
                n if (0x3b..=0x46).contains(&n) => {
                    return format!("{}F{}", result, n - 0x3a);
                }
                _ => return format!("{}special-0x{:02x}", result, code),
            };
            result.push_str(name);
            return result;
        }

        let base = self.0 & !key_flags::ALL;
        match base {
            0x7f => result.push_str("Backspace"),
            0x20 => result.push_str("SPC"),
            _ => match char::from_u32(base) {
                Some(ch) => result.push(ch),
                None => result.push_str(&format!("0x{:x}", base)),
            },
        }

        result
    }
}

/// Which prefix key is waiting for its continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Meta,
    CtlX,
    CtlC,
}

/// Input state for handling multi-key sequences
pub struct InputState {
    pending: Pending,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pending: Pending::None,
        }
    }

    /// Prefix shown on the message line while a sequence is pending
    pub fn pending_prefix(&self) -> Option<&'static str> {
        match self.pending {
            Pending::None => None,
            Pending::Meta => Some("ESC"),
            Pending::CtlX => Some("C-x"),
            Pending::CtlC => Some("C-c"),
        }
    }

    /// Translate a crossterm KeyEvent to our Key representation
    pub fn translate_key(&mut self, event: KeyEvent) -> Option<Key> {
        let KeyEvent {
            code, modifiers, kind, ..
        } = event;

        // Windows reports release and repeat events too
        if kind != KeyEventKind::Press {
            return None;
        }

        let pending = std::mem::replace(&mut self.pending, Pending::None);
        let prefix = match pending {
            Pending::None => {
                let ctrl = modifiers.contains(KeyModifiers::CONTROL);
                match code {
                    KeyCode::Esc => self.pending = Pending::Meta,
                    KeyCode::Char('x') if ctrl => self.pending = Pending::CtlX,
                    KeyCode::Char('c') if ctrl => self.pending = Pending::CtlC,
                    _ => return translate_normal(code, modifiers),
                }
                return None;
            }
            Pending::Meta => key_flags::META,
            Pending::CtlX => key_flags::CTLX,
            Pending::CtlC => key_flags::CTLC,
        };

        translate_normal(code, modifiers).map(|k| {
            let k = if prefix == key_flags::META { k } else { lowercase(k) };
            Key(k.0 | prefix)
        })
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefixed letter keys are case-insensitive
fn lowercase(key: Key) -> Key {
    match key.base_char() {
        Some(ch) if !key.is_special() => Key((key.0 & key_flags::ALL) | ch.to_ascii_lowercase() as u32),
        _ => key,
    }
}

fn translate_normal(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);

    let key = match code {
        KeyCode::Char(ch) if ctrl && alt => Key(key_flags::META | Key::ctrl(ch).0),
        KeyCode::Char(ch) if ctrl => Key::ctrl(ch),
        KeyCode::Char(ch) if alt => Key::meta(ch),
        KeyCode::Char(ch) => Key::char(ch),
        KeyCode::Enter => Key::ctrl('m'),
        KeyCode::Tab => Key::ctrl('i'),
        KeyCode::Backspace => Key(0x7f),
        KeyCode::Delete => Key::special(special::DELETE),
        KeyCode::Home => Key::special(special::HOME),
        KeyCode::End => Key::special(special::END),
        KeyCode::PageUp => Key::special(special::PAGE_UP),
        KeyCode::PageDown => Key::special(special::PAGE_DOWN),
        KeyCode::Up => Key::special(special::UP),
        KeyCode::Down => Key::special(special::DOWN),
        KeyCode::Left => Key::special(special::LEFT),
        KeyCode::Right => Key::special(special::RIGHT),
        KeyCode::F(n) => Key::special(special::f(n)),
        KeyCode::Esc => Key::ctrl('['),
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn ctrl(ch: char) -> KeyEvent {
        press(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_plain_and_control_keys() {
        let mut input = InputState::new();
        let a = input.translate_key(press(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(a, Some(Key::char('a')));
        assert!(a.unwrap().is_self_insert());

        let f = input.translate_key(ctrl('f')).unwrap();
        assert_eq!(f, Key::ctrl('f'));
        assert!(!f.is_self_insert());
        assert_eq!(f.display_name(), "C-f");
    }

    #[test]
    fn test_ctlx_sequence() {
        let mut input = InputState::new();
        assert_eq!(input.translate_key(ctrl('x')), None);
        assert_eq!(input.pending_prefix(), Some("C-x"));
        let key = input.translate_key(ctrl('s')).unwrap();
        assert_eq!(key, Key::ctlx_ctrl('s'));
        assert_eq!(key.display_name(), "C-x C-s");
        assert_eq!(input.pending_prefix(), None);
    }

    #[test]
    fn test_ctlc_sequence() {
        let mut input = InputState::new();
        assert_eq!(input.translate_key(ctrl('c')), None);
        let key = input.translate_key(ctrl('r')).unwrap();
        assert_eq!(key, Key::ctlc_ctrl('r'));
        assert!(key.is_ctlc());
        assert!(!key.is_self_insert());
        assert_eq!(key.display_name(), "C-c C-r");
    }

    #[test]
    fn test_escape_prefix_is_meta() {
        let mut input = InputState::new();
        assert_eq!(input.translate_key(press(KeyCode::Esc, KeyModifiers::NONE)), None);
        let key = input.translate_key(press(KeyCode::Char('<'), KeyModifiers::NONE));
        assert_eq!(key, Some(Key::meta('<')));
    }

    #[test]
    fn test_function_keys() {
        let mut input = InputState::new();
        let f5 = input.translate_key(press(KeyCode::F(5), KeyModifiers::NONE)).unwrap();
        assert_eq!(f5, Key::special(special::f(5)));
        assert_eq!(f5.display_name(), "F5");
    }

    #[test]
    fn test_release_events_ignored() {
        let mut input = InputState::new();
        let mut event = press(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(input.translate_key(event), None);
    }
}
