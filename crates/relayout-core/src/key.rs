// Relayout Key Type
// Key codes from Linux input-event-codes.h and their canonical rule-grammar names

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Number of addressable key codes (`KEY_MAX + 1`).
pub const KEY_COUNT: usize = 0x300;

/// Represents a single keyboard key code.
///
/// The numeric values match Linux input-event-codes.h definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {
    pub const BACKSPACE: Key = Key(14);
    pub const SPACE: Key = Key(57);
    pub const LEFT_CTRL: Key = Key(29);
    pub const LEFT_SHIFT: Key = Key(42);
    pub const RIGHT_SHIFT: Key = Key(54);
    pub const LEFT_ALT: Key = Key(56);
    pub const CAPSLOCK: Key = Key(58);
    pub const NUMLOCK: Key = Key(69);
    pub const RIGHT_CTRL: Key = Key(97);
    pub const RIGHT_ALT: Key = Key(100);
    pub const LEFT_META: Key = Key(125);
    pub const RIGHT_META: Key = Key(126);

    /// The eight modifiers whose releases are always forwarded during a retype.
    pub const STANDARD_MODIFIERS: [Key; 8] = [
        Key::LEFT_CTRL,
        Key::LEFT_SHIFT,
        Key::LEFT_ALT,
        Key::RIGHT_CTRL,
        Key::RIGHT_SHIFT,
        Key::RIGHT_ALT,
        Key::LEFT_META,
        Key::RIGHT_META,
    ];

    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Index into per-code tables; `None` for codes past `KEY_MAX`.
    pub fn index(self) -> Option<usize> {
        let idx = self.0 as usize;
        (idx < KEY_COUNT).then_some(idx)
    }

    /// Canonical name of this key as used in rule sequences
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }

    pub fn is_standard_modifier(self) -> bool {
        Self::STANDARD_MODIFIERS.contains(&self)
    }

    /// Lock keys toggle host state on a single tap instead of being held.
    pub fn is_lock(self) -> bool {
        self == Key::CAPSLOCK || self == Key::NUMLOCK
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

const CANONICAL_NAMES: &[(u16, &str)] = &[
    (0, "RESERVED"),
    (1, "ESC"),
    (2, "1"),
    (3, "2"),
    (4, "3"),
    (5, "4"),
    (6, "5"),
    (7, "6"),
    (8, "7"),
    (9, "8"),
    (10, "9"),
    (11, "0"),
    (12, "-"),
    (13, "="),
    (14, "BACKSPACE"),
    (15, "TAB"),
    (16, "Q"),
    (17, "W"),
    (18, "E"),
    (19, "R"),
    (20, "T"),
    (21, "Y"),
    (22, "U"),
    (23, "I"),
    (24, "O"),
    (25, "P"),
    (26, "L_BRACE"),
    (27, "R_BRACE"),
    (28, "ENTER"),
    (29, "L_CTRL"),
    (30, "A"),
    (31, "S"),
    (32, "D"),
    (33, "F"),
    (34, "G"),
    (35, "H"),
    (36, "J"),
    (37, "K"),
    (38, "L"),
    (39, "SEMICOLON"),
    (40, "APOSTROPHE"),
    (41, "GRAVE"),
    (42, "L_SHIFT"),
    (43, "BACKSLASH"),
    (44, "Z"),
    (45, "X"),
    (46, "C"),
    (47, "V"),
    (48, "B"),
    (49, "N"),
    (50, "M"),
    (51, "COMMA"),
    (52, "DOT"),
    (53, "SLASH"),
    (54, "R_SHIFT"),
    (55, "KPASTERISK"),
    (56, "L_ALT"),
    (57, "SPACE"),
    (58, "CAPS"),
    (59, "F1"),
    (60, "F2"),
    (61, "F3"),
    (62, "F4"),
    (63, "F5"),
    (64, "F6"),
    (65, "F7"),
    (66, "F8"),
    (67, "F9"),
    (68, "F10"),
    (69, "N_LOCK"),
    (70, "S_LOCK"),
    (71, "KP7"),
    (72, "KP8"),
    (73, "KP9"),
    (74, "KPMINUS"),
    (75, "KP4"),
    (76, "KP5"),
    (77, "KP6"),
    (78, "KPPLUS"),
    (79, "KP1"),
    (80, "KP2"),
    (81, "KP3"),
    (82, "KP0"),
    (83, "KPDOT"),
    (85, "ZENKAKUHANKAKU"),
    (86, "102ND"),
    (87, "F11"),
    (88, "F12"),
    (89, "RO"),
    (90, "KATAKANA"),
    (91, "HIRAGANA"),
    (92, "HENKAN"),
    (93, "KATAKANAHIRAGANA"),
    (94, "MUHENKAN"),
    (95, "KPJPCOMMA"),
    (96, "KPENTER"),
    (97, "R_CTRL"),
    (98, "KPSLASH"),
    (99, "SYSRQ"),
    (100, "R_ALT"),
    (101, "LINEFEED"),
    (102, "HOME"),
    (103, "UP"),
    (104, "PAGEUP"),
    (105, "LEFT"),
    (106, "RIGHT"),
    (107, "END"),
    (108, "DOWN"),
    (109, "PAGEDOWN"),
    (110, "INSERT"),
    (111, "DELETE"),
    (112, "MACRO"),
    (113, "MUTE"),
    (114, "VOLUMEDOWN"),
    (115, "VOLUMEUP"),
    (116, "POWER"),
    (117, "KPEQUAL"),
    (118, "KPPLUSMINUS"),
    (119, "PAUSE"),
    (120, "SCALE"),
    (121, "KPCOMMA"),
    (122, "HANGEUL"),
    (123, "HANJA"),
    (124, "YEN"),
    (125, "L_META"),
    (126, "R_META"),
    (127, "COMPOSE"),
    (128, "STOP"),
    (129, "AGAIN"),
    (130, "PROPS"),
    (131, "UNDO"),
    (132, "FRONT"),
    (133, "COPY"),
    (134, "OPEN"),
    (135, "PASTE"),
    (136, "FIND"),
    (137, "CUT"),
    (138, "HELP"),
    (139, "MENU"),
    (140, "CALC"),
    (141, "SETUP"),
    (142, "SLEEP"),
    (143, "WAKEUP"),
    (144, "FILE"),
    (145, "SENDFILE"),
    (146, "DELETEFILE"),
    (147, "XFER"),
    (148, "PROG1"),
    (149, "PROG2"),
    (150, "WWW"),
    (151, "MSDOS"),
    (152, "COFFEE"),
    (153, "ROTATE_DISPLAY"),
    (154, "CYCLEWINDOWS"),
    (155, "MAIL"),
    (156, "BOOKMARKS"),
    (157, "COMPUTER"),
    (158, "BACK"),
    (159, "FORWARD"),
    (160, "CLOSECD"),
    (161, "EJECTCD"),
    (162, "EJECTCLOSECD"),
    (163, "NEXTSONG"),
    (164, "PLAYPAUSE"),
    (165, "PREVIOUSSONG"),
    (166, "STOPCD"),
    (167, "RECORD"),
    (168, "REWIND"),
    (169, "PHONE"),
    (170, "ISO"),
    (171, "CONFIG"),
    (172, "HOMEPAGE"),
    (173, "REFRESH"),
    (174, "EXIT"),
    (175, "MOVE"),
    (176, "EDIT"),
    (177, "SCROLLUP"),
    (178, "SCROLLDOWN"),
    (179, "KPLEFTPAREN"),
    (180, "KPRIGHTPAREN"),
    (181, "NEW"),
    (182, "REDO"),
    (183, "F13"),
    (184, "F14"),
    (185, "F15"),
    (186, "F16"),
    (187, "F17"),
    (188, "F18"),
    (189, "F19"),
    (190, "F20"),
    (191, "F21"),
    (192, "F22"),
    (193, "F23"),
    (194, "F24"),
    (200, "PLAYCD"),
    (201, "PAUSECD"),
    (202, "PROG3"),
    (203, "PROG4"),
    (204, "DASHBOARD"),
    (205, "SUSPEND"),
    (206, "CLOSE"),
    (207, "PLAY"),
    (208, "FASTFORWARD"),
    (209, "BASSBOOST"),
    (210, "PRINT"),
    (211, "HP"),
    (212, "CAMERA"),
    (213, "SOUND"),
    (214, "QUESTION"),
    (215, "EMAIL"),
    (216, "CHAT"),
    (217, "SEARCH"),
    (218, "CONNECT"),
    (219, "FINANCE"),
    (220, "SPORT"),
    (221, "SHOP"),
    (222, "ALTERASE"),
    (223, "CANCEL"),
    (224, "BRIGHTNESSDOWN"),
    (225, "BRIGHTNESSUP"),
    (226, "MEDIA"),
    (227, "SWITCHVIDEOMODE"),
    (228, "KBDILLUMTOGGLE"),
    (229, "KBDILLUMDOWN"),
    (230, "KBDILLUMUP"),
    (231, "SEND"),
    (232, "REPLY"),
    (233, "FORWARDMAIL"),
    (234, "SAVE"),
    (235, "DOCUMENTS"),
    (236, "BATTERY"),
    (237, "BLUETOOTH"),
    (238, "WLAN"),
    (239, "UWB"),
    (240, "UNKNOWN"),
    (241, "VIDEO_NEXT"),
    (242, "VIDEO_PREV"),
    (243, "BRIGHTNESS_CYCLE"),
    (244, "BRIGHTNESS_AUTO"),
    (245, "DISPLAY_OFF"),
    (246, "WWAN"),
    (247, "RFKILL"),
    (248, "MICMUTE"),
    (0x2ff, "MAX"),
];

/// Additional spellings accepted in configuration key lists.
const ALIASES: &[(&str, u16)] = &[
    ("MINUS", 12),
    ("EQUAL", 13),
    ("[", 26),
    ("]", 27),
    (";", 39),
    ("'", 40),
    ("`", 41),
    ("\\", 43),
    (",", 51),
    (".", 52),
    ("/", 53),
];

fn name_table() -> &'static [String] {
    static KEY_NAMES: OnceLock<Vec<String>> = OnceLock::new();
    KEY_NAMES.get_or_init(|| {
        let mut names: Vec<String> = (0..KEY_COUNT).map(|code| format!("KEY_{}", code)).collect();
        for (code, name) in CANONICAL_NAMES {
            names[*code as usize] = (*name).to_string();
        }
        names
    })
}

/// Canonical name for a key code
pub fn key_name(code: u16) -> &'static str {
    name_table()
        .get(code as usize)
        .map(String::as_str)
        .unwrap_or("UNKNOWN")
}

/// Try to parse a key name (canonical or alias) to a key code
pub fn key_from_name(name: &str) -> Option<Key> {
    static NAME_TO_CODE: OnceLock<HashMap<&'static str, u16>> = OnceLock::new();
    let map = NAME_TO_CODE.get_or_init(|| {
        CANONICAL_NAMES
            .iter()
            .map(|(code, name)| (*name, *code))
            .chain(ALIASES.iter().copied())
            .collect()
    });
    let upper = name.trim().to_uppercase();
    map.get(upper.as_str()).map(|code| Key(*code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("a"), Some(Key(30)));
        assert_eq!(key_from_name("A"), Some(Key(30)));
        assert_eq!(key_from_name("1"), Some(Key(2)));
        assert_eq!(key_from_name("0"), Some(Key(11)));
        assert_eq!(key_from_name("L_CTRL"), Some(Key::LEFT_CTRL));
        assert_eq!(key_from_name("MAX"), Some(Key(0x2ff)));
        assert_eq!(key_from_name("NOPE"), None);
    }

    #[test]
    fn test_aliases_resolve_to_canonical_codes() {
        assert_eq!(key_from_name("]"), Some(Key(27)));
        assert_eq!(key_from_name("MINUS"), key_from_name("-"));
        assert_eq!(Key(27).name(), "R_BRACE");
    }

    #[test]
    fn test_unnamed_codes_render_with_number() {
        assert_eq!(key_name(84), "KEY_84");
        assert_eq!(key_name(0x2ff), "MAX");
        assert_eq!(key_name(0x300), "UNKNOWN");
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key(30).to_string(), "A");
        assert_eq!(Key::CAPSLOCK.to_string(), "CAPS");
    }

    #[test]
    fn test_standard_modifiers() {
        assert!(Key::RIGHT_META.is_standard_modifier());
        assert!(!Key::CAPSLOCK.is_standard_modifier());
        assert!(Key::NUMLOCK.is_lock());
    }
}
