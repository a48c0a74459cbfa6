//! Modifier combinations, key codes and the cycling key bindings.
//!
//! Key codes are the hardware-independent virtual key codes the input layer
//! reports (e.g. `124` for the right arrow).  In the config file a key may be
//! given either as that number or as a name (`"right"`, `"k"`, `"F5"`, …);
//! modifier sets may be an object of four booleans or a string such as
//! `"ctrl+opt"`.

use crate::grid::{Axis, Direction};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

//  Modifiers

/// The four modifier keys the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct ModifierSet {
    pub control: bool,
    pub option: bool,
    pub command: bool,
    pub shift: bool,
}

impl ModifierSet {
    pub const NONE: ModifierSet = ModifierSet {
        control: false,
        option: false,
        command: false,
        shift: false,
    };
    pub const CONTROL: ModifierSet = ModifierSet {
        control: true,
        ..Self::NONE
    };
    pub const OPTION: ModifierSet = ModifierSet {
        option: true,
        ..Self::NONE
    };
    pub const COMMAND: ModifierSet = ModifierSet {
        command: true,
        ..Self::NONE
    };
    pub const SHIFT: ModifierSet = ModifierSet {
        shift: true,
        ..Self::NONE
    };

    /// Union of two sets.
    pub const fn with(self, other: ModifierSet) -> Self {
        Self {
            control: self.control || other.control,
            option: self.option || other.option,
            command: self.command || other.command,
            shift: self.shift || other.shift,
        }
    }

    /// True when `held` is exactly this combination, with no extra bits.
    pub fn matches_exactly(&self, held: ModifierSet) -> bool {
        *self == held
    }

    /// True when every modifier in `self` is also in `held`.
    pub fn is_subset_of(&self, held: ModifierSet) -> bool {
        (!self.control || held.control)
            && (!self.option || held.option)
            && (!self.command || held.command)
            && (!self.shift || held.shift)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Glyph form, e.g. `⌃⌥`, or `None` for the empty set.
    pub fn display_string(&self) -> String {
        let mut s = String::new();
        if self.control {
            s.push('⌃');
        }
        if self.option {
            s.push('⌥');
        }
        if self.command {
            s.push('⌘');
        }
        if self.shift {
            s.push('⇧');
        }
        if s.is_empty() {
            s.push_str("None");
        }
        s
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

/// Parse `"ctrl+opt"`, `"Control Option"`, `"⌃⌥"`, … (case-insensitive).
fn parse_modifiers(s: &str) -> Option<ModifierSet> {
    let mut set = ModifierSet::NONE;
    let mut any = false;
    let tokens = s
        .split(|c: char| c == '+' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    for token in tokens {
        // Glyph runs such as "⌃⌥" arrive as a single token.
        if token.chars().all(|c| "⌃⌥⌘⇧".contains(c)) {
            for c in token.chars() {
                set = set.with(match c {
                    '⌃' => ModifierSet::CONTROL,
                    '⌥' => ModifierSet::OPTION,
                    '⌘' => ModifierSet::COMMAND,
                    _ => ModifierSet::SHIFT,
                });
            }
            any = true;
            continue;
        }
        let m = match token.to_lowercase().as_str() {
            "ctrl" | "control" => ModifierSet::CONTROL,
            "opt" | "option" | "alt" => ModifierSet::OPTION,
            "cmd" | "command" | "super" => ModifierSet::COMMAND,
            "shift" => ModifierSet::SHIFT,
            "none" => ModifierSet::NONE,
            _ => return None,
        };
        set = set.with(m);
        any = true;
    }
    any.then_some(set)
}

impl<'de> Deserialize<'de> for ModifierSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = ModifierSet;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "object {{control, option, command, shift}} or string \"ctrl+opt\"")
            }
            fn visit_map<A>(self, mut map: A) -> Result<ModifierSet, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut set = ModifierSet::NONE;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "control" => set.control = map.next_value()?,
                        "option" => set.option = map.next_value()?,
                        "command" => set.command = map.next_value()?,
                        "shift" => set.shift = map.next_value()?,
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                Ok(set)
            }
            fn visit_str<E>(self, s: &str) -> Result<ModifierSet, E>
            where
                E: DeError,
            {
                parse_modifiers(s)
                    .ok_or_else(|| DeError::custom(format!("invalid modifier set: {:?}", s)))
            }
        }
        deserializer.deserialize_any(V)
    }
}

//  Key codes

/// A virtual key code as reported by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const LEFT_ARROW: KeyCode = KeyCode(123);
    pub const RIGHT_ARROW: KeyCode = KeyCode(124);
    pub const DOWN_ARROW: KeyCode = KeyCode(125);
    pub const UP_ARROW: KeyCode = KeyCode(126);

    /// Look up a key by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        KEY_TABLE
            .iter()
            .find(|(_, n, glyph)| *n == lower || *glyph == name.trim())
            .map(|(code, _, _)| KeyCode(*code))
    }

    /// Short label for menus and logs: `→`, `A`, `F5`, or `Key 200` for
    /// codes without a name.
    pub fn display_name(&self) -> String {
        KEY_TABLE
            .iter()
            .find(|(code, _, _)| *code == self.0)
            .map(|(_, _, glyph)| (*glyph).to_string())
            .unwrap_or_else(|| format!("Key {}", self.0))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl<'de> Deserialize<'de> for KeyCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = KeyCode;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "key code number or key name")
            }
            fn visit_u64<E>(self, n: u64) -> Result<KeyCode, E>
            where
                E: DeError,
            {
                u16::try_from(n)
                    .map(KeyCode)
                    .map_err(|_| DeError::custom(format!("key code {} out of range", n)))
            }
            fn visit_str<E>(self, s: &str) -> Result<KeyCode, E>
            where
                E: DeError,
            {
                KeyCode::from_name(s)
                    .ok_or_else(|| DeError::custom(format!("unknown key name: {:?}", s)))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// `(code, config name, display label)` for the keys worth naming.
const KEY_TABLE: &[(u16, &str, &str)] = &[
    (123, "left", "←"),
    (124, "right", "→"),
    (125, "down", "↓"),
    (126, "up", "↑"),
    (36, "return", "↩"),
    (48, "tab", "⇥"),
    (49, "space", "Space"),
    (51, "delete", "⌫"),
    (117, "forwarddelete", "⌦"),
    (53, "escape", "⎋"),
    (115, "home", "Home"),
    (119, "end", "End"),
    (116, "pageup", "PgUp"),
    (121, "pagedown", "PgDn"),
    (0, "a", "A"),
    (11, "b", "B"),
    (8, "c", "C"),
    (2, "d", "D"),
    (14, "e", "E"),
    (3, "f", "F"),
    (5, "g", "G"),
    (4, "h", "H"),
    (34, "i", "I"),
    (38, "j", "J"),
    (40, "k", "K"),
    (37, "l", "L"),
    (46, "m", "M"),
    (45, "n", "N"),
    (31, "o", "O"),
    (35, "p", "P"),
    (12, "q", "Q"),
    (15, "r", "R"),
    (1, "s", "S"),
    (17, "t", "T"),
    (32, "u", "U"),
    (9, "v", "V"),
    (13, "w", "W"),
    (7, "x", "X"),
    (16, "y", "Y"),
    (6, "z", "Z"),
    (29, "0", "0"),
    (18, "1", "1"),
    (19, "2", "2"),
    (20, "3", "3"),
    (21, "4", "4"),
    (23, "5", "5"),
    (22, "6", "6"),
    (26, "7", "7"),
    (28, "8", "8"),
    (25, "9", "9"),
    (27, "minus", "-"),
    (24, "equal", "="),
    (33, "leftbracket", "["),
    (30, "rightbracket", "]"),
    (42, "backslash", "\\"),
    (41, "semicolon", ";"),
    (39, "quote", "'"),
    (43, "comma", ","),
    (47, "period", "."),
    (44, "slash", "/"),
    (50, "grave", "`"),
    (122, "f1", "F1"),
    (120, "f2", "F2"),
    (99, "f3", "F3"),
    (118, "f4", "F4"),
    (96, "f5", "F5"),
    (97, "f6", "F6"),
    (98, "f7", "F7"),
    (100, "f8", "F8"),
    (101, "f9", "F9"),
    (109, "f10", "F10"),
    (103, "f11", "F11"),
    (111, "f12", "F12"),
    (105, "f13", "F13"),
    (107, "f14", "F14"),
    (113, "f15", "F15"),
    (106, "f16", "F16"),
    (64, "f17", "F17"),
    (79, "f18", "F18"),
    (80, "f19", "F19"),
    (90, "f20", "F20"),
];

//  Bindings

/// One step of cycling: an axis and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleAction {
    pub axis: Axis,
    pub direction: Direction,
}

/// User key bindings for cycling and drag-snapping.
///
/// The engine only ever reads these; editing and persisting them is the
/// job of whatever front end owns the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Held to show the overlay; must match exactly for a key press to
    /// cycle.  Default: ⌃⌥.
    pub cycling_modifiers: ModifierSet,
    /// Held while dragging with the mouse to snap.  Default: ⇧.
    pub drag_modifiers: ModifierSet,
    /// Default: right arrow.
    pub next_column: KeyCode,
    /// Default: left arrow.
    pub prev_column: KeyCode,
    /// Default: down arrow.
    pub next_row: KeyCode,
    /// Default: up arrow.
    pub prev_row: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            cycling_modifiers: ModifierSet::CONTROL.with(ModifierSet::OPTION),
            drag_modifiers: ModifierSet::SHIFT,
            next_column: KeyCode::RIGHT_ARROW,
            prev_column: KeyCode::LEFT_ARROW,
            next_row: KeyCode::DOWN_ARROW,
            prev_row: KeyCode::UP_ARROW,
        }
    }
}

impl KeyBindings {
    /// The cycling action bound to `key`, provided `held` is exactly the
    /// cycling modifier combination.
    pub fn action_for(&self, key: KeyCode, held: ModifierSet) -> Option<CycleAction> {
        if !self.cycling_modifiers.matches_exactly(held) {
            return None;
        }
        let (axis, direction) = if key == self.next_column {
            (Axis::Column, Direction::Forward)
        } else if key == self.prev_column {
            (Axis::Column, Direction::Backward)
        } else if key == self.next_row {
            (Axis::Row, Direction::Forward)
        } else if key == self.prev_row {
            (Axis::Row, Direction::Backward)
        } else {
            return None;
        };
        Some(CycleAction { axis, direction })
    }

    /// Whether the cycling combination is held (extra modifiers allowed).
    pub fn cycling_held(&self, held: ModifierSet) -> bool {
        self.cycling_modifiers.is_subset_of(held)
    }

    /// Whether the drag combination is held (extra modifiers allowed).
    pub fn drag_held(&self, held: ModifierSet) -> bool {
        self.drag_modifiers.is_subset_of(held)
    }
}

//  Tests
