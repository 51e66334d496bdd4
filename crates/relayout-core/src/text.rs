// Relayout Text Rendering
// Turns buffered key events into the text they would type on a US layout

use crate::event::KeyEvent;
use crate::Key;

/// (code, unshifted, shifted) for keys that produce a character
const US_LAYOUT: &[(u16, char, char)] = &[
    (2, '1', '!'),
    (3, '2', '@'),
    (4, '3', '#'),
    (5, '4', '$'),
    (6, '5', '%'),
    (7, '6', '^'),
    (8, '7', '&'),
    (9, '8', '*'),
    (10, '9', '('),
    (11, '0', ')'),
    (12, '-', '_'),
    (13, '=', '+'),
    (15, '\t', '\t'),
    (16, 'q', 'Q'),
    (17, 'w', 'W'),
    (18, 'e', 'E'),
    (19, 'r', 'R'),
    (20, 't', 'T'),
    (21, 'y', 'Y'),
    (22, 'u', 'U'),
    (23, 'i', 'I'),
    (24, 'o', 'O'),
    (25, 'p', 'P'),
    (26, '[', '{'),
    (27, ']', '}'),
    (28, '\n', '\n'),
    (30, 'a', 'A'),
    (31, 's', 'S'),
    (32, 'd', 'D'),
    (33, 'f', 'F'),
    (34, 'g', 'G'),
    (35, 'h', 'H'),
    (36, 'j', 'J'),
    (37, 'k', 'K'),
    (38, 'l', 'L'),
    (39, ';', ':'),
    (40, '\'', '"'),
    (41, '`', '~'),
    (43, '\\', '|'),
    (44, 'z', 'Z'),
    (45, 'x', 'X'),
    (46, 'c', 'C'),
    (47, 'v', 'V'),
    (48, 'b', 'B'),
    (49, 'n', 'N'),
    (50, 'm', 'M'),
    (51, ',', '<'),
    (52, '.', '>'),
    (53, '/', '?'),
    (55, '*', '*'),
    (57, ' ', ' '),
    (71, '7', '7'),
    (72, '8', '8'),
    (73, '9', '9'),
    (74, '-', '-'),
    (75, '4', '4'),
    (76, '5', '5'),
    (77, '6', '6'),
    (78, '+', '+'),
    (79, '1', '1'),
    (80, '2', '2'),
    (81, '3', '3'),
    (82, '0', '0'),
    (83, '.', '.'),
    (96, '\n', '\n'),
    (98, '/', '/'),
    (117, '=', '='),
];

fn lookup(key: Key) -> Option<(char, char)> {
    US_LAYOUT
        .iter()
        .find(|(code, _, _)| *code == key.code())
        .map(|&(_, plain, shifted)| (plain, shifted))
}

/// Render events as text. Shift state follows the events themselves, Caps
/// Lock starts as `caps_lock` and toggles on each press. Backspace removes
/// the previous character; other non-printing keys are ignored.
pub fn render<'a, I>(events: I, caps_lock: bool) -> String
where
    I: IntoIterator<Item = &'a KeyEvent>,
{
    let mut text = String::new();
    let mut shift = 0usize;
    let mut caps = caps_lock;

    for event in events {
        let key = event.key;
        let pressed = event.transition.is_pressed();

        if key == Key::LEFT_SHIFT || key == Key::RIGHT_SHIFT {
            match event.transition {
                crate::Transition::Press => shift += 1,
                crate::Transition::Release => shift = shift.saturating_sub(1),
                crate::Transition::Repeat => {}
            }
            continue;
        }
        if !pressed {
            continue;
        }
        if key == Key::CAPSLOCK {
            if !event.transition.is_repeat() {
                caps = !caps;
            }
            continue;
        }
        if key == Key::BACKSPACE {
            text.pop();
            continue;
        }
        if let Some((plain, shifted)) = lookup(key) {
            let upper = if plain.is_ascii_alphabetic() {
                (shift > 0) != caps
            } else {
                shift > 0
            };
            text.push(if upper { shifted } else { plain });
        }
    }
    text
}
