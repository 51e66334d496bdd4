// Relayout Config
// TOML loading, templates and compilation into the engine's read-only tables

mod defaults;
mod parser;
mod template;

pub use defaults::DEFAULT_CONFIG;
pub use parser::{
    default_config_paths, Config, ConfigSource, ConfigToml, KeyboardSettings, ScanDevices,
    DEFAULT_CONFIG_PATH, DEFAULT_SEQ_LENGTH, MAX_DELAY_MS,
};
pub use template::Templates;

use crate::rule::CompileError;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Unknown key in [Actions]: {0}")]
    UnknownActionsKey(String),

    #[error("Invalid key for {list}: {entry}")]
    InvalidKeyRange { list: String, entry: String },

    #[error("Invalid regexp for template \"{0}\": {1}")]
    InvalidTemplate(String, String),

    #[error("Invalid regexp for Actions.WordChars: {0}")]
    InvalidWordChars(String),

    #[error("Invalid regexp for WindowClasses \"{0}\": {1}")]
    InvalidWindowClass(String, String),

    #[error("Invalid WindowClasses Actions value \"{0}\" (expected \"\" or \"Actions\")")]
    InvalidWindowActions(String),

    #[error("Invalid glob for ScanDevices.Search \"{0}\": {1}")]
    InvalidSearchGlob(String, String),

    #[error("Invalid regexp for ScanDevices.Bypass \"{0}\": {1}")]
    InvalidBypass(String, String),

    #[error("Actions.SeqLength out of range 1..=255: {0}")]
    SeqLengthOutOfRange(i64),

    #[error("Keyboard.Delay out of range 0..={max}: {value}")]
    DelayOutOfRange { value: i64, max: u64 },

    #[error("Timeout of [Action.{0}] must be a positive number of seconds")]
    InvalidTimeout(String),

    #[error("Trigger \"Action.{0}\" has no [Action.{0}] definition")]
    MissingActionDefinition(String),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
