// Relayout Engine Scenarios
//
// Drive the engine end to end with a recording sink, a scripted focus
// provider and an in-memory layout controller. No hardware involved.

use relayout_core::{
    Config, Engine, HookContext, HookError, InputEvent, Key, KeyEvent, LockState, MemoryLayout,
    Primitive, RecordingSink, ScriptedProvider,
};
use std::cell::Cell;
use std::rc::Rc;

const CONFIG: &str = r#"
[ActionKeys]
 Layouts = [0, 1]
 Add = ["1..0", "Q..P", "A..L", "Z..M", "SPACE", "BACKSPACE", "R_ALT"]
 Drop = ["ENTER", "ESC"]
 Test = ["F1..F10", "F11", "F12"]
 StateKeys = ["L_SHIFT", "R_SHIFT", "L_CTRL"]

[[WindowClasses]]
 Regex = "^VirtualBox"
 Actions = ""

[[WindowClasses]]
 MouseClickDrops = true
 Actions = "Actions"

[Templates]
 "LETTER" = "[A-Z]"

[Actions]
 SeqLength = 8
 WordChars = "^@LETTER@:0$"
 NewWord = ["SEQ:(SPACE:0)"]
 NewSentence = ["SEQ:(ENTER:0)"]
 Compose = ["SEQ:(R_ALT:1,R_ALT:0)"]
 "Action.Fix" = ["OFF:(CTRL) SEQ:(F12:1,F12:0)"]
 "Action.Quick" = ["SEQ:(X:1,X:0,X:1,X:0)"]

[Action.Fix]
 Action = ["RetypeWord"]

[Action.Quick]
 Action = ["RetypeWord"]
"#;

const A: Key = Key(30);
const B: Key = Key(48);
const H: Key = Key(35);
const X: Key = Key(45);
const F1: Key = Key(59);
const F12: Key = Key(88);

/// Records the Word length instead of retyping
struct WordLength(Rc<Cell<usize>>);

impl Primitive for WordLength {
    fn call(&mut self, ctx: &mut HookContext<'_>) -> Result<(), HookError> {
        self.0.set(ctx.session.word().len());
        Ok(())
    }
}

struct Harness {
    engine: Engine,
    sink: RecordingSink,
    layout: MemoryLayout,
    focus: ScriptedProvider,
}

impl Harness {
    fn new() -> Self {
        Self::with_class("xterm")
    }

    fn with_class(class: &str) -> Self {
        let config = Config::from_toml(CONFIG).unwrap();
        let sink = RecordingSink::new();
        let layout = MemoryLayout::new(0);
        let focus = ScriptedProvider::new(class);
        let engine = Engine::new(
            config,
            Box::new(sink.clone()),
            Box::new(layout.clone()),
            Box::new(focus.clone()),
        );
        let mut harness = Self {
            engine,
            sink,
            layout,
            focus,
        };
        // Settle the first focus report so it does not reset later buffers
        harness.tap(F1);
        harness
    }

    fn send(&mut self, event: KeyEvent) {
        self.engine.process_event(InputEvent::Key(event));
    }

    fn tap(&mut self, key: Key) {
        self.send(KeyEvent::press(key));
        self.send(KeyEvent::release(key));
    }

    fn word(&self) -> Vec<KeyEvent> {
        self.engine.session().word().to_vec()
    }

    fn emitted(&self) -> Vec<KeyEvent> {
        self.sink.events()
    }
}

#[test]
fn test_space_release_starts_new_word_once() {
    let mut h = Harness::new();
    h.send(KeyEvent::press(H));
    h.send(KeyEvent::release(H));
    assert_eq!(h.word().len(), 2);

    h.send(KeyEvent::press(Key::SPACE));
    assert_eq!(h.word().len(), 3);

    h.send(KeyEvent::release(Key::SPACE));
    assert!(h.word().is_empty());

    // The space is not part of the next word
    h.tap(A);
    assert_eq!(h.word(), vec![KeyEvent::press(A), KeyEvent::release(A)]);
}

#[test]
fn test_retype_single_letter() {
    let mut h = Harness::new();
    h.tap(A);
    h.tap(F12);

    assert_eq!(
        h.emitted(),
        vec![
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(A),
            KeyEvent::release(A),
        ]
    );
    assert!(h.engine.session().modifiers().contains("WORD"));
}

#[test]
fn test_retype_replays_shift() {
    let mut h = Harness::new();
    h.send(KeyEvent::press(Key::LEFT_SHIFT));
    h.tap(A);
    h.send(KeyEvent::release(Key::LEFT_SHIFT));
    h.tap(B);
    h.tap(F12);

    assert_eq!(
        h.emitted(),
        vec![
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(Key::LEFT_SHIFT),
            KeyEvent::press(A),
            KeyEvent::release(A),
            KeyEvent::release(Key::LEFT_SHIFT),
            KeyEvent::press(B),
            KeyEvent::release(B),
        ]
    );
}

#[test]
fn test_retype_forwards_repeats_verbatim() {
    let mut h = Harness::new();
    h.send(KeyEvent::press(A));
    h.send(KeyEvent::repeat(A));
    h.send(KeyEvent::release(A));
    h.tap(F12);

    assert_eq!(
        h.emitted(),
        vec![
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(A),
            KeyEvent::repeat(A),
            KeyEvent::release(A),
        ]
    );
}

#[test]
fn test_compose_reduces_erase_count() {
    let mut h = Harness::new();
    h.tap(A);
    h.tap(Key::RIGHT_ALT);
    h.tap(B);
    assert_eq!(h.engine.session().compose(), 1);

    h.tap(F12);
    assert_eq!(
        h.emitted(),
        vec![
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(A),
            KeyEvent::release(A),
            KeyEvent::press(Key::RIGHT_ALT),
            KeyEvent::release(Key::RIGHT_ALT),
            KeyEvent::press(B),
            KeyEvent::release(B),
        ]
    );
}

#[test]
fn test_retype_restores_word_start_shift() {
    let mut h = Harness::new();
    h.send(KeyEvent::press(Key::LEFT_SHIFT));
    h.tap(Key::SPACE);
    h.tap(A);
    h.send(KeyEvent::release(Key::LEFT_SHIFT));
    h.tap(B);
    assert!(h.engine.session().word_start_modifiers().contains("L_SHIFT"));

    h.tap(F12);
    assert_eq!(
        h.emitted(),
        vec![
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(Key::LEFT_SHIFT),
            KeyEvent::press(A),
            KeyEvent::release(A),
            KeyEvent::release(Key::LEFT_SHIFT),
            KeyEvent::press(B),
            KeyEvent::release(B),
        ]
    );
}

#[test]
fn test_retype_taps_caps_lock_once() {
    let mut h = Harness::new();
    h.layout.set_locks(LockState {
        caps_lock: true,
        num_lock: false,
    });
    h.tap(Key::SPACE);
    assert!(h.engine.session().word_start_modifiers().contains("CAPS"));

    h.layout.set_locks(LockState::default());
    h.tap(A);
    h.tap(F12);
    assert_eq!(
        h.emitted(),
        vec![
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(Key::CAPSLOCK),
            KeyEvent::release(Key::CAPSLOCK),
            KeyEvent::press(A),
            KeyEvent::release(A),
        ]
    );
}

#[test]
fn test_retype_releases_keys_left_down() {
    let mut h = Harness::new();
    h.send(KeyEvent::press(A));
    h.tap(F12);

    // WordChars counts releases, so a held key erases nothing
    assert_eq!(h.emitted(), vec![KeyEvent::press(A), KeyEvent::release(A)]);
    assert!(h.engine.session().modifiers().contains("WORD"));
}

#[test]
fn test_backspace_inside_word_aborts_retype() {
    let mut h = Harness::new();
    h.tap(A);
    h.tap(Key::BACKSPACE);
    h.tap(B);
    h.tap(F12);

    assert!(h.emitted().is_empty());
    assert!(h.word().is_empty());
    assert!(!h.engine.session().modifiers().contains("WORD"));
}

#[test]
fn test_word_made_of_trigger_only_is_not_retyped() {
    let mut h = Harness::new();
    h.tap(X);
    h.tap(X);

    assert!(h.emitted().is_empty());
    assert!(h.word().is_empty());
    assert!(!h.engine.session().modifiers().contains("WORD"));
}

#[test]
fn test_trigger_keys_are_not_retyped() {
    let mut h = Harness::new();
    h.tap(B);
    h.tap(X);
    h.tap(X);

    assert_eq!(
        h.emitted(),
        vec![
            KeyEvent::press(Key::BACKSPACE),
            KeyEvent::release(Key::BACKSPACE),
            KeyEvent::press(B),
            KeyEvent::release(B),
        ]
    );
    assert_eq!(h.word(), vec![KeyEvent::press(B), KeyEvent::release(B)]);
}

#[test]
fn test_retype_blocked_by_held_ctrl() {
    let mut h = Harness::new();
    h.tap(A);
    h.send(KeyEvent::press(Key::LEFT_CTRL));
    h.tap(F12);
    h.send(KeyEvent::release(Key::LEFT_CTRL));

    assert!(h.emitted().is_empty());
}

#[test]
fn test_repeats_are_deduplicated() {
    let mut h = Harness::new();
    h.send(KeyEvent::press(A));
    h.send(KeyEvent::repeat(A));
    h.send(KeyEvent::repeat(A));
    h.send(KeyEvent::repeat(A));
    h.send(KeyEvent::release(A));

    assert_eq!(
        h.word(),
        vec![KeyEvent::press(A), KeyEvent::repeat(A), KeyEvent::release(A)]
    );
}

#[test]
fn test_drop_key_clears_buffers() {
    let mut h = Harness::new();
    h.tap(A);
    h.tap(Key(1)); // ESC
    assert!(h.word().is_empty());
    assert!(h.engine.session().probe().is_empty());
}

#[test]
fn test_focus_change_drops_history() {
    let mut h = Harness::new();
    h.tap(A);
    h.focus.focus("firefox");
    h.send(KeyEvent::press(B));

    assert_eq!(h.word(), vec![KeyEvent::press(B)]);
}

#[test]
fn test_disabled_window_class_never_acts() {
    let mut h = Harness::with_class("VirtualBox Machine");
    h.tap(A);
    h.tap(F12);

    assert!(h.emitted().is_empty());
    assert!(!h.engine.active_context().unwrap().actions_enabled);
}

#[test]
fn test_other_layout_is_not_buffered() {
    let mut h = Harness::new();
    h.layout.set_current(3);
    h.send(KeyEvent::press(Key::LEFT_SHIFT));
    h.tap(A);

    assert!(h.word().is_empty());
    assert!(h.engine.session().modifiers().contains("L_SHIFT"));

    h.layout.set_current(1);
    h.tap(B);
    assert_eq!(h.word().len(), 2);
}

#[test]
fn test_mouse_click_drops_history() {
    let mut h = Harness::new();
    h.tap(A);
    h.engine.process_event(InputEvent::MouseClick);
    assert!(h.word().is_empty());
}

#[test]
fn test_custom_hook_receives_session() {
    let mut h = Harness::new();
    let seen = Rc::new(Cell::new(0));
    h.engine.register_primitive("RetypeWord", WordLength(seen.clone()));

    h.tap(A);
    h.tap(B);
    h.tap(F12);
    assert_eq!(seen.get(), 4);
    assert!(h.emitted().is_empty());
}
