//! Platform-independent keyboard key identifiers.

use std::fmt;
use std::str::FromStr;

/// A physical key, independent of the keyboard backend that reported it.
///
/// Backends map their native codes (Win32 virtual keys, XKB key names) onto
/// exactly one of these values. Anything without a mapping becomes
/// [`Key::Unknown`].
///
/// Many keys have alternative names (`Key::Esc`, `Key::Enter`, `Key::Plus`...).
/// These are associated constants equal to the canonical variant, so they can
/// be used anywhere the variant can, including `match` patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Key {
    /// Unmapped or unrecognized key
    #[default]
    Unknown,
    Backspace,
    Tab,
    Return,
    Escape,
    Space,
    /// `'` and `"`
    Apostrophe,
    /// `,` and `<`
    Comma,
    /// `-` and `_`
    Dash,
    /// `.` and `>`
    Period,
    /// `/` and `?`
    Slash,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    /// `;` and `:`
    Semicolon,
    /// `=` and `+`
    Equal,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    /// `[` and `{`
    LBracket,
    /// `\` and `|`
    Backslash,
    /// `]` and `}`
    RBracket,
    /// `` ` `` and `~`
    Backtick,
    Delete,
    Clear,
    LShift,
    RShift,
    LControl,
    RControl,
    LAlt,
    RAlt,
    Pause,
    CapsLock,
    PageUp,
    PageDown,
    End,
    Home,
    /// Left arrow
    Left,
    /// Up arrow
    Up,
    /// Right arrow
    Right,
    /// Down arrow
    Down,
    Select,
    PrintScreen,
    Insert,
    LMeta,
    RMeta,
    Menu,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    /// Numpad `*`
    Multiply,
    /// Numpad `+`
    Add,
    /// Numpad `-`
    Subtract,
    /// Numpad `.`
    Decimal,
    /// Numpad `/`
    Divide,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
    NumLock,
    ScrollLock,
}

#[allow(non_upper_case_globals)]
impl Key {
    pub const Back: Key = Key::Backspace;
    pub const Enter: Key = Key::Return;
    pub const Esc: Key = Key::Escape;
    pub const Quote: Key = Key::Apostrophe;
    pub const Less: Key = Key::Comma;
    pub const Minus: Key = Key::Dash;
    pub const Underscore: Key = Key::Dash;
    pub const Greater: Key = Key::Period;
    pub const QuestionMark: Key = Key::Slash;
    pub const RParenthesis: Key = Key::Num0;
    pub const RParen: Key = Key::Num0;
    pub const ExclamationMark: Key = Key::Num1;
    pub const AtSign: Key = Key::Num2;
    pub const Hash: Key = Key::Num3;
    pub const Dollar: Key = Key::Num4;
    pub const Percent: Key = Key::Num5;
    pub const Caret: Key = Key::Num6;
    pub const Ampersand: Key = Key::Num7;
    pub const Amp: Key = Key::Num7;
    pub const Asterisk: Key = Key::Num8;
    pub const LParenthesis: Key = Key::Num9;
    pub const LParen: Key = Key::Num9;
    pub const Colon: Key = Key::Semicolon;
    pub const Plus: Key = Key::Equal;
    pub const LBrace: Key = Key::LBracket;
    pub const Pipe: Key = Key::Backslash;
    pub const RBrace: Key = Key::RBracket;
    pub const Grave: Key = Key::Backtick;
    pub const Tilde: Key = Key::Backtick;
    pub const Del: Key = Key::Delete;
    pub const LCtrl: Key = Key::LControl;
    pub const RCtrl: Key = Key::RControl;
    pub const CapsLk: Key = Key::CapsLock;
    pub const Caps: Key = Key::CapsLock;
    pub const PgUp: Key = Key::PageUp;
    pub const PgDn: Key = Key::PageDown;
    pub const PrtScr: Key = Key::PrintScreen;
    pub const Ins: Key = Key::Insert;
    pub const Context: Key = Key::Menu;
    pub const Mul: Key = Key::Multiply;
    pub const Sub: Key = Key::Subtract;
    pub const Dec: Key = Key::Decimal;
    pub const Div: Key = Key::Divide;
    pub const NumLk: Key = Key::NumLock;
    pub const ScrLk: Key = Key::ScrollLock;
}

/// Textual aliases accepted by [`Key::from_str`], paired with their value.
const ALIASES: &[(&str, Key)] = &[
    ("Back", Key::Back),
    ("Enter", Key::Enter),
    ("Esc", Key::Esc),
    ("Quote", Key::Quote),
    ("Less", Key::Less),
    ("Minus", Key::Minus),
    ("Underscore", Key::Underscore),
    ("Greater", Key::Greater),
    ("QuestionMark", Key::QuestionMark),
    ("RParenthesis", Key::RParenthesis),
    ("RParen", Key::RParen),
    ("ExclamationMark", Key::ExclamationMark),
    ("AtSign", Key::AtSign),
    ("Hash", Key::Hash),
    ("Dollar", Key::Dollar),
    ("Percent", Key::Percent),
    ("Caret", Key::Caret),
    ("Ampersand", Key::Ampersand),
    ("Amp", Key::Amp),
    ("Asterisk", Key::Asterisk),
    ("LParenthesis", Key::LParenthesis),
    ("LParen", Key::LParen),
    ("Colon", Key::Colon),
    ("Plus", Key::Plus),
    ("LBrace", Key::LBrace),
    ("Pipe", Key::Pipe),
    ("RBrace", Key::RBrace),
    ("Grave", Key::Grave),
    ("Tilde", Key::Tilde),
    ("Del", Key::Del),
    ("LCtrl", Key::LCtrl),
    ("RCtrl", Key::RCtrl),
    ("CapsLk", Key::CapsLk),
    ("Caps", Key::Caps),
    ("PgUp", Key::PgUp),
    ("PgDn", Key::PgDn),
    ("PrtScr", Key::PrtScr),
    ("Ins", Key::Ins),
    ("Context", Key::Context),
    ("Mul", Key::Mul),
    ("Sub", Key::Sub),
    ("Dec", Key::Dec),
    ("Div", Key::Div),
    ("NumLk", Key::NumLk),
    ("ScrLk", Key::ScrLk),
];

impl Key {
    /// Every canonical key, in declaration order (starting with `Unknown`).
    pub const ALL: [Key; 118] = [
        Key::Unknown,
        Key::Backspace,
        Key::Tab,
        Key::Return,
        Key::Escape,
        Key::Space,
        Key::Apostrophe,
        Key::Comma,
        Key::Dash,
        Key::Period,
        Key::Slash,
        Key::Num0,
        Key::Num1,
        Key::Num2,
        Key::Num3,
        Key::Num4,
        Key::Num5,
        Key::Num6,
        Key::Num7,
        Key::Num8,
        Key::Num9,
        Key::Semicolon,
        Key::Equal,
        Key::A,
        Key::B,
        Key::C,
        Key::D,
        Key::E,
        Key::F,
        Key::G,
        Key::H,
        Key::I,
        Key::J,
        Key::K,
        Key::L,
        Key::M,
        Key::N,
        Key::O,
        Key::P,
        Key::Q,
        Key::R,
        Key::S,
        Key::T,
        Key::U,
        Key::V,
        Key::W,
        Key::X,
        Key::Y,
        Key::Z,
        Key::LBracket,
        Key::Backslash,
        Key::RBracket,
        Key::Backtick,
        Key::Delete,
        Key::Clear,
        Key::LShift,
        Key::RShift,
        Key::LControl,
        Key::RControl,
        Key::LAlt,
        Key::RAlt,
        Key::Pause,
        Key::CapsLock,
        Key::PageUp,
        Key::PageDown,
        Key::End,
        Key::Home,
        Key::Left,
        Key::Up,
        Key::Right,
        Key::Down,
        Key::Select,
        Key::PrintScreen,
        Key::Insert,
        Key::LMeta,
        Key::RMeta,
        Key::Menu,
        Key::Numpad0,
        Key::Numpad1,
        Key::Numpad2,
        Key::Numpad3,
        Key::Numpad4,
        Key::Numpad5,
        Key::Numpad6,
        Key::Numpad7,
        Key::Numpad8,
        Key::Numpad9,
        Key::Multiply,
        Key::Add,
        Key::Subtract,
        Key::Decimal,
        Key::Divide,
        Key::F1,
        Key::F2,
        Key::F3,
        Key::F4,
        Key::F5,
        Key::F6,
        Key::F7,
        Key::F8,
        Key::F9,
        Key::F10,
        Key::F11,
        Key::F12,
        Key::F13,
        Key::F14,
        Key::F15,
        Key::F16,
        Key::F17,
        Key::F18,
        Key::F19,
        Key::F20,
        Key::F21,
        Key::F22,
        Key::F23,
        Key::F24,
        Key::NumLock,
        Key::ScrollLock,
    ];

    /// Number of distinct canonical keys.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index of this key, usable for per-key lookup arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this key carries a lock state that [`is_key_toggled`] reports.
    ///
    /// [`is_key_toggled`]: crate::Window::is_key_toggled
    pub const fn is_toggle(self) -> bool {
        matches!(self, Key::CapsLock | Key::NumLock | Key::ScrollLock)
    }

    /// Human-readable label for the key.
    ///
    /// `Key::Unknown` yields `"Unknown Key"`.
    pub fn name(self) -> &'static str {
        match self {
            Key::Unknown => "Unknown Key",
            Key::Backspace => "Backspace",
            Key::Tab => "Tab",
            Key::Return => "Return",
            Key::Escape => "Escape",
            Key::Space => "Space",
            Key::Apostrophe => "Apostrophe",
            Key::Comma => "Comma",
            Key::Dash => "Dash",
            Key::Period => "Period",
            Key::Slash => "Slash",
            Key::Num0 => "0",
            Key::Num1 => "1",
            Key::Num2 => "2",
            Key::Num3 => "3",
            Key::Num4 => "4",
            Key::Num5 => "5",
            Key::Num6 => "6",
            Key::Num7 => "7",
            Key::Num8 => "8",
            Key::Num9 => "9",
            Key::Semicolon => "Semicolon",
            Key::Equal => "Equal",
            Key::A => "A",
            Key::B => "B",
            Key::C => "C",
            Key::D => "D",
            Key::E => "E",
            Key::F => "F",
            Key::G => "G",
            Key::H => "H",
            Key::I => "I",
            Key::J => "J",
            Key::K => "K",
            Key::L => "L",
            Key::M => "M",
            Key::N => "N",
            Key::O => "O",
            Key::P => "P",
            Key::Q => "Q",
            Key::R => "R",
            Key::S => "S",
            Key::T => "T",
            Key::U => "U",
            Key::V => "V",
            Key::W => "W",
            Key::X => "X",
            Key::Y => "Y",
            Key::Z => "Z",
            Key::LBracket => "Left Bracket",
            Key::Backslash => "Backslash",
            Key::RBracket => "Right Bracket",
            Key::Backtick => "Backtick",
            Key::Delete => "Delete",
            Key::Clear => "Clear",
            Key::LShift => "Left Shift",
            Key::RShift => "Right Shift",
            Key::LControl => "Left Control",
            Key::RControl => "Right Control",
            Key::LAlt => "Left Alt",
            Key::RAlt => "Right Alt",
            Key::Pause => "Pause",
            Key::CapsLock => "Caps Lock",
            Key::PageUp => "Page Up",
            Key::PageDown => "Page Down",
            Key::End => "End",
            Key::Home => "Home",
            Key::Left => "Left",
            Key::Up => "Up",
            Key::Right => "Right",
            Key::Down => "Down",
            Key::Select => "Select",
            Key::PrintScreen => "Print Screen",
            Key::Insert => "Insert",
            Key::LMeta => "Left Meta",
            Key::RMeta => "Right Meta",
            Key::Menu => "Menu",
            Key::Numpad0 => "Numpad 0",
            Key::Numpad1 => "Numpad 1",
            Key::Numpad2 => "Numpad 2",
            Key::Numpad3 => "Numpad 3",
            Key::Numpad4 => "Numpad 4",
            Key::Numpad5 => "Numpad 5",
            Key::Numpad6 => "Numpad 6",
            Key::Numpad7 => "Numpad 7",
            Key::Numpad8 => "Numpad 8",
            Key::Numpad9 => "Numpad 9",
            Key::Multiply => "Multiply",
            Key::Add => "Add",
            Key::Subtract => "Subtract",
            Key::Decimal => "Decimal",
            Key::Divide => "Divide",
            Key::F1 => "F1",
            Key::F2 => "F2",
            Key::F3 => "F3",
            Key::F4 => "F4",
            Key::F5 => "F5",
            Key::F6 => "F6",
            Key::F7 => "F7",
            Key::F8 => "F8",
            Key::F9 => "F9",
            Key::F10 => "F10",
            Key::F11 => "F11",
            Key::F12 => "F12",
            Key::F13 => "F13",
            Key::F14 => "F14",
            Key::F15 => "F15",
            Key::F16 => "F16",
            Key::F17 => "F17",
            Key::F18 => "F18",
            Key::F19 => "F19",
            Key::F20 => "F20",
            Key::F21 => "F21",
            Key::F22 => "F22",
            Key::F23 => "F23",
            Key::F24 => "F24",
            Key::NumLock => "Num Lock",
            Key::ScrollLock => "Scroll Lock",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name '{0}'")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    /// Parses a key from its identifier (`LShift`), an alias (`Esc`) or its
    /// label (`Left Shift`). Matching ignores case and whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return Err(ParseKeyError(s.to_string()));
        }

        let canonical = Key::ALL.iter().copied().find(|key| {
            normalize(&format!("{key:?}")) == wanted || normalize(key.name()) == wanted
        });

        canonical
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| normalize(alias) == wanted)
                    .map(|(_, key)| *key)
            })
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_the_canonical_value() {
        assert_eq!(Key::Esc, Key::Escape);
        assert_eq!(Key::Enter, Key::Return);
        assert_eq!(Key::Underscore, Key::Minus);
        assert_eq!(Key::Minus, Key::Dash);
        assert_eq!(Key::Tilde, Key::Grave);
        assert_eq!(Key::Context, Key::Menu);
        assert_eq!(Key::LCtrl.index(), Key::LControl.index());
    }

    #[test]
    fn aliases_work_in_patterns() {
        let label = match Key::Escape {
            Key::Esc => "esc",
            _ => "other",
        };
        assert_eq!(label, "esc");
    }

    #[test]
    fn all_is_dense_and_ordered() {
        for (i, key) in Key::ALL.iter().enumerate() {
            assert_eq!(key.index(), i, "{key:?} is out of place");
        }
        assert_eq!(Key::ALL[Key::COUNT - 1], Key::ScrollLock);
    }

    #[test]
    fn names_are_total() {
        assert_eq!(Key::Unknown.name(), "Unknown Key");
        assert_eq!(Key::LShift.name(), "Left Shift");
        assert_eq!(Key::Num7.name(), "7");
        for key in Key::ALL.iter().skip(1) {
            assert_ne!(key.name(), "Unknown Key");
        }
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Key::PageUp.to_string(), "Page Up");
    }

    #[test]
    fn parse_identifier_alias_and_label() {
        assert_eq!("Escape".parse::<Key>(), Ok(Key::Escape));
        assert_eq!("esc".parse::<Key>(), Ok(Key::Escape));
        assert_eq!("Left Shift".parse::<Key>(), Ok(Key::LShift));
        assert_eq!("lshift".parse::<Key>(), Ok(Key::LShift));
        assert_eq!("PgDn".parse::<Key>(), Ok(Key::PageDown));
        assert_eq!("f11".parse::<Key>(), Ok(Key::F11));
        assert_eq!("0".parse::<Key>(), Ok(Key::Num0));
        assert_eq!("Numpad 5".parse::<Key>(), Ok(Key::Numpad5));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert!("Hyper".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn every_alias_parses_to_its_key() {
        for (alias, key) in ALIASES {
            assert_eq!(alias.parse::<Key>().as_ref(), Ok(key), "alias {alias}");
        }
    }

    #[test]
    fn toggle_keys() {
        assert!(Key::CapsLock.is_toggle());
        assert!(Key::NumLk.is_toggle());
        assert!(Key::ScrLk.is_toggle());
        assert!(!Key::A.is_toggle());
        assert!(!Key::LShift.is_toggle());
    }
}
