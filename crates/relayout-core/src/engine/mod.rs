// Relayout Engine
// Single consumer of input events: session bookkeeping, rule evaluation and action chains

mod hook;
mod retype;

pub use hook::{HookContext, HookError, Primitive};
pub use retype::{erase_count, retype_word};

use crate::action::{canonical_primitive, PrimitiveName, Step};
use crate::config::Config;
use crate::event::{InputEvent, KeyEvent};
use crate::layout::LayoutController;
use crate::output::KeySink;
use crate::rule::MatchKind;
use crate::state::{Admission, Session};
use crate::window::{select_context, FocusedWindowProvider, WindowContext};
use crate::Key;
use std::collections::{HashMap, HashSet};

/// Deepest `Action.<Name>` nesting followed before a chain is cut off
pub const MAX_CHAIN_DEPTH: usize = 16;

/// Owns all engine state. Events must arrive in order from one thread.
pub struct Engine {
    config: Config,
    session: Session,
    sink: Box<dyn KeySink>,
    layout: Box<dyn LayoutController>,
    focus: Box<dyn FocusedWindowProvider>,
    context: Option<usize>,
    primitives: HashMap<String, Box<dyn Primitive>>,
    /// Actions already reported for exceeding the chain depth
    runaway: HashSet<String>,
}

impl Engine {
    /// Create an engine with only the `RetypeWord` hook registered
    pub fn new(
        config: Config,
        sink: Box<dyn KeySink>,
        layout: Box<dyn LayoutController>,
        focus: Box<dyn FocusedWindowProvider>,
    ) -> Self {
        let session = Session::new(config.rules.seq_length);
        let mut engine = Self {
            config,
            session,
            sink,
            layout,
            focus,
            context: None,
            primitives: HashMap::new(),
            runaway: HashSet::new(),
        };
        engine.register_primitive(PrimitiveName::RetypeWord.to_string(), retype_word);
        engine
    }

    /// Register (or replace) a primitive hook. Aliases resolve to the same hook.
    pub fn register_primitive<P>(&mut self, name: impl AsRef<str>, primitive: P)
    where
        P: Primitive + 'static,
    {
        let name = canonical_primitive(name.as_ref());
        log::debug!("Registered hook {}", name);
        self.primitives.insert(name, Box::new(primitive));
    }

    pub fn has_primitive(&self, name: &str) -> bool {
        self.primitives.contains_key(&canonical_primitive(name))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The `[[WindowClasses]]` entry selected for the focused window
    pub fn active_context(&self) -> Option<&WindowContext> {
        self.context.and_then(|idx| self.config.windows.get(idx))
    }

    /// Entry point for the device layer
    pub fn process_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key_event) => self.process_key(key_event),
            InputEvent::MouseClick => {
                if self.active_context().is_some_and(|ctx| ctx.mouse_click_drops) {
                    log::trace!("mouse click");
                    self.session.drop_all();
                }
            }
        }
    }

    fn process_key(&mut self, event: KeyEvent) {
        if event.key.index().is_none() {
            log::warn!("Invalid event code: {}", event.key.code());
            return;
        }

        let role = self.config.roles.role(event.key);
        if self.session.admit(event, role) != Admission::Accepted {
            return;
        }
        self.refresh_locks();

        if !self.layout_active() {
            return;
        }
        self.refresh_focus();

        self.session.append(event, role);

        if self.active_context().is_some_and(|ctx| ctx.actions_enabled) {
            self.evaluate();
        }
    }

    /// The host is the truth for lock keys
    fn refresh_locks(&mut self) {
        if let Some(locks) = self.layout.lock_state() {
            self.session.set_lock(Key::CAPSLOCK, locks.caps_lock);
            self.session.set_lock(Key::NUMLOCK, locks.num_lock);
        }
    }

    fn layout_active(&mut self) -> bool {
        match self.layout.current() {
            Ok(current) => self.config.layouts.contains(&current),
            Err(e) => {
                log::debug!("{}", e);
                true
            }
        }
    }

    fn refresh_focus(&mut self) {
        match self.focus.focused() {
            Ok(state) if state.changed => {
                self.session.drop_all();
                self.context = select_context(&self.config.windows, &state.class_name);
                log::debug!(
                    "Focused \"{}\", window context {:?}",
                    state.class_name,
                    self.context
                );
            }
            Ok(_) => {}
            Err(e) => log::debug!("{}", e),
        }
    }

    fn evaluate(&mut self) {
        let rules = &self.config.rules;
        let found = rules.evaluate(
            self.session.modifiers(),
            self.session.probe(),
            &self.config.roles,
        );
        let Some(found) = found else {
            return;
        };

        match found.kind {
            MatchKind::NewSentence => self.session.start_new_sentence(),
            MatchKind::Compose => self.session.increment_compose(),
            MatchKind::NewWord => self.session.start_new_word(),
            MatchKind::Custom(name) => {
                self.session.set_extra(found.extra);
                self.run_action(&name);
            }
        }
    }

    /// Run an action definition by name (without the `Action.` prefix)
    pub fn run_action(&mut self, name: &str) {
        self.run_chain(name, 0);
    }

    fn run_chain(&mut self, name: &str, depth: usize) {
        if depth >= MAX_CHAIN_DEPTH {
            if self.runaway.insert(name.to_string()) {
                log::error!(
                    "Action.{} nests deeper than {} levels, chain stopped",
                    name,
                    MAX_CHAIN_DEPTH
                );
            }
            return;
        }
        let Some(steps) = self.config.actions.get(name).map(|def| def.steps.clone()) else {
            log::debug!("No [Action.{}] defined", name);
            return;
        };

        for step in steps {
            match step {
                Step::Chain(next) => {
                    log::debug!("Action.{} -> Action.{}", name, next);
                    self.run_chain(&next, depth + 1);
                }
                Step::Primitive(hook) => self.call_primitive(name, &hook),
            }
        }
    }

    fn call_primitive(&mut self, action: &str, hook: &str) {
        let Some(primitive) = self.primitives.get_mut(&canonical_primitive(hook)) else {
            log::warn!("Action.{}: no such hook \"{}\"", action, hook);
            return;
        };
        let Some(definition) = self.config.actions.get(action) else {
            return;
        };

        log::debug!("Action.{}: {}", action, hook);
        let mut ctx = HookContext {
            action: definition,
            config: &self.config,
            session: &mut self.session,
            sink: self.sink.as_mut(),
            layout: self.layout.as_mut(),
        };
        if let Err(e) = primitive.call(&mut ctx) {
            log::error!("Action.{}: {} failed: {}", action, hook, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MemoryLayout;
    use crate::output::RecordingSink;
    use crate::window::ScriptedProvider;
    use std::cell::Cell;
    use std::rc::Rc;

    const CONFIG: &str = r#"
[ActionKeys]
 Add = ["1..0", "Q..P", "A..L", "Z..M", "SPACE"]
 Drop = ["ENTER"]

[[WindowClasses]]
 Actions = "Actions"

[Actions]
 WordChars = "^[A-Z]:0$"
 "Action.Loop" = ["SEQ:(F1:1)"]
 "Action.Twice" = ["SEQ:(F2:1)"]

[Action.Loop]
 Action = ["Action.Loop", "Count"]

[Action.Twice]
 Action = ["Action.Once", "Nope", "Action.Once", "Action.Missing"]

[Action.Once]
 Action = ["Count"]
"#;

    fn engine() -> Engine {
        let config = Config::from_toml(CONFIG).unwrap();
        Engine::new(
            config,
            Box::new(RecordingSink::new()),
            Box::new(MemoryLayout::new(0)),
            Box::new(ScriptedProvider::new("xterm")),
        )
    }

    struct Counter(Rc<Cell<usize>>);

    impl Primitive for Counter {
        fn call(&mut self, _ctx: &mut HookContext<'_>) -> Result<(), HookError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    fn counter(engine: &mut Engine) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        engine.register_primitive("Count", Counter(count.clone()));
        count
    }

    #[test]
    fn test_retype_registered_by_default() {
        let engine = engine();
        assert!(engine.has_primitive("RetypeWord"));
        assert!(!engine.has_primitive("Exec"));
    }

    #[test]
    fn test_chain_runs_steps_in_order_and_skips_unknown() {
        let mut engine = engine();
        let count = counter(&mut engine);
        engine.run_action("Twice");
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_unknown_action_is_noop() {
        let mut engine = engine();
        let count = counter(&mut engine);
        engine.run_action("Missing");
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_self_reference_is_cut_off() {
        let mut engine = engine();
        let count = counter(&mut engine);
        engine.process_event(KeyEvent::press(Key(59)).into());
        // Every level runs its Count step once the recursion unwinds
        assert_eq!(count.get(), MAX_CHAIN_DEPTH);
        assert!(engine.runaway.contains("Loop"));
    }

    #[test]
    fn test_focus_selects_context() {
        let mut engine = engine();
        assert!(engine.active_context().is_none());
        engine.process_event(KeyEvent::press(Key(30)).into());
        assert!(engine.active_context().unwrap().actions_enabled);
    }

    #[test]
    fn test_out_of_range_code_ignored() {
        let mut engine = engine();
        engine.process_event(KeyEvent::press(Key(0x300)).into());
        assert!(engine.session().probe().is_empty());
    }
}
