// Relayout Config Parser - TOML with Serde
// Parses the configuration file and compiles it into read-only engine tables

use super::{ConfigError, Templates, DEFAULT_CONFIG};
use crate::action::{ActionDefinition, ActionParams, BufferSource, PrimitiveName, Step, ACTION_PREFIX};
use crate::role::KeyRoleTable;
use crate::rule::{compile, RuleGroup, RuleSet};
use crate::window::WindowContext;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// System-wide configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/relayout/relayout.toml";

/// Default number of probe events rendered for `SEQ:` matching
pub const DEFAULT_SEQ_LENGTH: usize = 8;

/// Upper bound for `Keyboard.Delay`
pub const MAX_DELAY_MS: u64 = 150;

const DEFAULT_DELAY_MS: u64 = 5;
const ACTIONS_SET: &str = "Actions";

/// Root TOML table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct ConfigToml {
    #[serde(default)]
    pub scan_devices: ScanDevicesToml,

    #[serde(default)]
    pub keyboard: KeyboardToml,

    #[serde(default)]
    pub templates: IndexMap<String, String>,

    #[serde(default)]
    pub action_keys: ActionKeysToml,

    #[serde(default)]
    pub window_classes: Vec<WindowClassToml>,

    #[serde(default)]
    pub actions: ActionsToml,

    /// `[Action.<Name>]` sections
    #[serde(default)]
    pub action: IndexMap<String, ActionDefinitionToml>,
}

/// `[ScanDevices]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct ScanDevicesToml {
    pub test: Option<String>,
    #[serde(default)]
    pub respawn: u64,
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default)]
    pub bypass: String,
}

fn default_search() -> String {
    "/dev/input/event*".to_string()
}

impl Default for ScanDevicesToml {
    fn default() -> Self {
        Self {
            test: None,
            respawn: 0,
            search: default_search(),
            bypass: String::new(),
        }
    }
}

/// `[Keyboard]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct KeyboardToml {
    pub delay: Option<i64>,
    pub layout_command: Option<String>,
}

/// `[ActionKeys]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct ActionKeysToml {
    #[serde(default = "default_layouts")]
    pub layouts: Vec<u32>,
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub drop: Vec<String>,
    #[serde(default)]
    pub test: Vec<String>,
    #[serde(default)]
    pub state_keys: Vec<String>,
}

fn default_layouts() -> Vec<u32> {
    vec![0, 1]
}

impl Default for ActionKeysToml {
    fn default() -> Self {
        Self {
            layouts: default_layouts(),
            add: Vec::new(),
            drop: Vec::new(),
            test: Vec::new(),
            state_keys: Vec::new(),
        }
    }
}

/// `[[WindowClasses]]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct WindowClassToml {
    #[serde(default)]
    pub regex: String,
    #[serde(default)]
    pub mouse_click_drops: bool,
    #[serde(default)]
    pub actions: String,
}

/// `[Actions]`. Trigger groups are the `"Action.<Name>"` keys; any other
/// unknown key is rejected while compiling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionsToml {
    pub seq_length: Option<i64>,
    #[serde(default)]
    pub word_chars: String,
    #[serde(default)]
    pub new_word: Vec<String>,
    #[serde(default)]
    pub new_sentence: Vec<String>,
    #[serde(default)]
    pub compose: Vec<String>,
    #[serde(flatten)]
    pub triggers: IndexMap<String, Vec<String>>,
}

/// `[Action.<Name>]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct ActionDefinitionToml {
    #[serde(default)]
    pub action: Vec<String>,
    pub layout: Option<u32>,
    #[serde(default)]
    pub layouts: Vec<u32>,
    pub exec: Option<String>,
    #[serde(default)]
    pub wait: bool,
    pub timeout: Option<f64>,
    pub send_buffer: Option<String>,
    #[serde(default)]
    pub use_shell: bool,
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub clean_env: bool,
    #[serde(default)]
    pub environment: Vec<String>,
    #[serde(rename = "UID")]
    pub uid: Option<String>,
    #[serde(rename = "GID")]
    pub gid: Option<String>,
    pub max_reply: Option<usize>,
}

/// Compiled `[ScanDevices]`
#[derive(Debug, Clone)]
pub struct ScanDevices {
    pub test: Option<PathBuf>,
    pub respawn: Duration,
    pub filter: crate::input::DeviceFilter,
}

/// Compiled `[Keyboard]`
#[derive(Debug, Clone)]
pub struct KeyboardSettings {
    /// Settle delay after every synthetic event
    pub delay: Duration,
    /// Command selecting a layout, `{layout}` replaced by the index
    pub layout_command: Option<String>,
}

/// Where the configuration was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Embedded,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Embedded => write!(f, "built-in defaults"),
        }
    }
}

/// Fully compiled configuration, read-only for the life of the process
#[derive(Debug, Clone)]
pub struct Config {
    pub scan_devices: ScanDevices,
    pub keyboard: KeyboardSettings,
    pub templates: Templates,
    /// Layouts the engine acts in
    pub layouts: Vec<u32>,
    pub roles: KeyRoleTable,
    pub windows: Vec<WindowContext>,
    pub rules: RuleSet,
    pub actions: IndexMap<String, ActionDefinition>,
}

/// Candidate configuration files, in the order they are tried
pub fn default_config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("relayout").join("relayout.toml"));
    }
    paths
}

impl Config {
    /// Load the first readable candidate file, falling back to the
    /// embedded defaults. Parse and compile errors are always returned.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        for path in default_config_paths(explicit) {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    log::info!("Reading configuration from {}", path.display());
                    let config = Self::from_toml(&content)?;
                    return Ok((config, ConfigSource::File(path)));
                }
                Err(e) => log::debug!("Unable to read {}: {}", path.display(), e),
            }
        }
        log::warn!("No configuration file could be read, using built-in defaults");
        Ok((Self::from_toml(DEFAULT_CONFIG)?, ConfigSource::Embedded))
    }

    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.to_config()
    }

    /// Definition of an action by name (without the `Action.` prefix)
    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }
}

impl ConfigToml {
    /// Validate and compile into the engine's tables
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        let templates = self.compile_templates()?;
        let scan_devices = self.compile_scan_devices()?;
        let keyboard = self.compile_keyboard()?;

        let keys = &self.action_keys;
        let roles = KeyRoleTable::compile(&keys.add, &keys.drop, &keys.test, &keys.state_keys)?;

        let windows = self
            .window_classes
            .iter()
            .map(compile_window_class)
            .collect::<Result<Vec<_>, _>>()?;

        let actions = self.compile_actions()?;
        let rules = self.compile_rules(&templates, &actions)?;

        Ok(Config {
            scan_devices,
            keyboard,
            templates,
            layouts: keys.layouts.clone(),
            roles,
            windows,
            rules,
            actions,
        })
    }

    fn compile_templates(&self) -> Result<Templates, ConfigError> {
        for (name, pattern) in &self.templates {
            Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidTemplate(name.clone(), e.to_string()))?;
        }
        Ok(Templates::new(self.templates.clone()))
    }

    fn compile_scan_devices(&self) -> Result<ScanDevices, ConfigError> {
        let scan = &self.scan_devices;
        Ok(ScanDevices {
            test: scan.test.as_ref().filter(|t| !t.is_empty()).map(PathBuf::from),
            respawn: Duration::from_secs(scan.respawn),
            filter: crate::input::DeviceFilter::new(&scan.search, &scan.bypass)?,
        })
    }

    fn compile_keyboard(&self) -> Result<KeyboardSettings, ConfigError> {
        let delay = match self.keyboard.delay {
            None => DEFAULT_DELAY_MS,
            Some(value) if (0..=MAX_DELAY_MS as i64).contains(&value) => value as u64,
            Some(value) => {
                return Err(ConfigError::DelayOutOfRange {
                    value,
                    max: MAX_DELAY_MS,
                })
            }
        };
        Ok(KeyboardSettings {
            delay: Duration::from_millis(delay),
            layout_command: self.keyboard.layout_command.clone(),
        })
    }

    fn compile_actions(&self) -> Result<IndexMap<String, ActionDefinition>, ConfigError> {
        let mut actions = IndexMap::new();
        for (name, def) in &self.action {
            let timeout = match def.timeout {
                None => None,
                Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
                Some(_) => return Err(ConfigError::InvalidTimeout(name.clone())),
            };
            let params = ActionParams {
                layout: def.layout,
                layouts: def.layouts.clone(),
                exec: def.exec.clone(),
                wait: def.wait,
                timeout,
                send_buffer: def.send_buffer.as_deref().map(BufferSource::parse),
                use_shell: def.use_shell,
                directory: def.directory.clone(),
                clean_env: def.clean_env,
                environment: def.environment.clone(),
                uid: def.uid.clone(),
                gid: def.gid.clone(),
                max_reply: def.max_reply,
            };
            let steps = def.action.iter().map(|s| Step::parse(s)).collect();
            actions.insert(
                name.clone(),
                ActionDefinition::new(name.clone(), steps).with_params(params),
            );
        }

        check_action_graph(&actions);
        Ok(actions)
    }

    fn compile_rules(
        &self,
        templates: &Templates,
        actions: &IndexMap<String, ActionDefinition>,
    ) -> Result<RuleSet, ConfigError> {
        let acts = &self.actions;

        let seq_length = match acts.seq_length {
            None => DEFAULT_SEQ_LENGTH,
            Some(n) if (1..=255).contains(&n) => n as usize,
            Some(n) => return Err(ConfigError::SeqLengthOutOfRange(n)),
        };

        let word_chars = Regex::new(&templates.expand(&acts.word_chars))
            .map_err(|e| ConfigError::InvalidWordChars(e.to_string()))?;

        let group = |name: &str, texts: &[String]| -> Result<RuleGroup, ConfigError> {
            let rules = texts
                .iter()
                .map(|t| compile(t, templates, name))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RuleGroup::new(name, rules))
        };

        let mut custom = Vec::with_capacity(acts.triggers.len());
        for (key, texts) in &acts.triggers {
            let name = key
                .strip_prefix(ACTION_PREFIX)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| ConfigError::UnknownActionsKey(key.clone()))?;
            if !actions.contains_key(name) {
                return Err(ConfigError::MissingActionDefinition(name.to_string()));
            }
            let mut compiled = group(key, texts)?;
            compiled.name = name.to_string();
            custom.push(compiled);
        }

        Ok(RuleSet {
            seq_length,
            word_chars,
            new_sentence: group("NewSentence", &acts.new_sentence)?,
            compose: group("Compose", &acts.compose)?,
            new_word: group("NewWord", &acts.new_word)?,
            custom,
        })
    }
}

fn compile_window_class(class: &WindowClassToml) -> Result<WindowContext, ConfigError> {
    let class_pattern = if class.regex.is_empty() {
        None
    } else {
        Some(
            Regex::new(&class.regex)
                .map_err(|e| ConfigError::InvalidWindowClass(class.regex.clone(), e.to_string()))?,
        )
    };
    let actions_enabled = match class.actions.as_str() {
        "" => false,
        ACTIONS_SET => true,
        other => return Err(ConfigError::InvalidWindowActions(other.to_string())),
    };
    Ok(WindowContext {
        class_pattern,
        actions_enabled,
        mouse_click_drops: class.mouse_click_drops,
    })
}

/// Report chain steps that will do nothing at runtime
fn check_action_graph(actions: &IndexMap<String, ActionDefinition>) {
    for def in actions.values() {
        for step in &def.steps {
            match step {
                Step::Chain(target) if !actions.contains_key(target) => log::warn!(
                    "[Action.{}] chains to undefined Action.{}",
                    def.name,
                    target
                ),
                Step::Primitive(name) if name.parse::<PrimitiveName>().is_err() => log::warn!(
                    "[Action.{}] uses {} which is not a built-in hook",
                    def.name,
                    name
                ),
                _ => {}
            }
        }
        if reaches(actions, &def.name, &def.name, 0) {
            log::warn!("[Action.{}] chains back to itself", def.name);
        }
    }
}

fn reaches(
    actions: &IndexMap<String, ActionDefinition>,
    from: &str,
    target: &str,
    depth: usize,
) -> bool {
    if depth > actions.len() {
        return false;
    }
    let Some(def) = actions.get(from) else {
        return false;
    };
    def.steps.iter().any(|step| match step {
        Step::Chain(next) => next == target || reaches(actions, next, target, depth + 1),
        Step::Primitive(_) => false,
    })
}
