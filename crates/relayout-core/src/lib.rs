// Relayout Core Library
// Keyboard event history rule engine: fixes words typed in the wrong layout

pub mod action;
pub mod config;
pub mod engine;
pub mod event;
pub mod exec;
pub mod hooks;
pub mod input;
pub mod key;
pub mod layout;
pub mod output;
pub mod respawn;
pub mod role;
pub mod rule;
pub mod state;
pub mod text;
pub mod transition;
pub mod window;

pub use action::{ActionDefinition, ActionParams, BufferSource, PrimitiveName, Step};
pub use config::{Config, ConfigError, ConfigSource, Templates};
pub use engine::{Engine, HookContext, HookError, Primitive};
pub use event::{InputEvent, KeyEvent};
pub use exec::{CommandResult, CommandSpec, ProcessRunner};
pub use hooks::register_builtin_hooks;
pub use input::{DeviceCapabilities, DeviceFilter, DeviceKind};
pub use key::{key_from_name, key_name, Key};
pub use layout::{CommandLayout, LayoutController, LayoutError, LockState, MemoryLayout};
pub use output::{KeyLedger, KeySink, OutputError, RecordingSink};
pub use role::{KeyRole, KeyRoleTable};
pub use rule::{CompileError, CompiledRule, MatchKind, RuleGroup, RuleMatch, RuleSet};
pub use state::{Admission, EventBuffer, ModifierSet, Session};
pub use transition::Transition;
pub use window::{FocusState, FocusedWindowProvider, ScriptedProvider, WindowContext, WindowError};

#[cfg(feature = "pure-rust")]
pub use event::{list_devices, spawn_readers, DeviceInfo, ReaderError};

#[cfg(feature = "pure-rust")]
pub use output::VirtualDevice;

#[cfg(feature = "x11-backend")]
pub use layout::XkbLayout;

#[cfg(feature = "x11-backend")]
pub use window::X11FocusProvider;
