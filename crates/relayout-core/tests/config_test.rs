// Relayout Configuration Loading
//
// Files on disk, the embedded fallback and the action graph as the engine sees it.

use relayout_core::config::{ConfigSource, DEFAULT_CONFIG};
use relayout_core::{Config, ConfigError, Key, KeyRole, Step};
use std::path::PathBuf;

fn temp_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("relayout-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

const HOOK_CONFIG: &str = r#"
[ScanDevices]
 Search = "/dev/input/event*"
 Bypass = "(?i)camera"

[Keyboard]
 Delay = 0
 LayoutCommand = "setxkbmap -layout us,ru -option {layout}"

[ActionKeys]
 Layouts = [0, 1, 2]
 Add = ["Q..P", "A..L", "Z..M"]
 StateKeys = ["L_ALT"]

[[WindowClasses]]
 Actions = "Actions"

[Actions]
 WordChars = "^[A-Z]:0$"
 "Action.Hook" = ["OFF:(SHIFT) SEQ:(L_ALT:1,L_ALT:0)"]

[Action.Hook]
 Action = ["Exec"]
 Exec = "cat > /tmp/last-word"
 UseShell = true
 SendBuffer = "WORD"
 Wait = true
 Timeout = 0.5
 MaxReply = 128
"#;

#[test]
fn test_load_explicit_file() {
    let path = temp_config("hook", HOOK_CONFIG);
    let (config, source) = Config::load(Some(&path)).unwrap();
    assert_eq!(source, ConfigSource::File(path.clone()));

    assert_eq!(config.layouts, vec![0, 1, 2]);
    assert!(config.keyboard.delay.is_zero());
    assert_eq!(
        config.keyboard.layout_command.as_deref(),
        Some("setxkbmap -layout us,ru -option {layout}")
    );
    assert!(config.scan_devices.filter.bypasses("USB Camera"));
    assert_eq!(config.roles.role(Key::LEFT_ALT), KeyRole::StateKey);
    assert_eq!(config.roles.role(Key(2)), KeyRole::Test);

    let hook = config.action("Hook").unwrap();
    assert_eq!(hook.steps, vec![Step::Primitive("Exec".to_string())]);
    assert!(hook.params.use_shell);
    assert!(hook.params.wait);
    assert_eq!(hook.params.max_reply, Some(128));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_broken_file_is_fatal() {
    let path = temp_config("broken", "[ActionKeys]\n Add = [\"A..NOPE\"]\n");
    let result = Config::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::InvalidKeyRange { .. })));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_from_toml_path_missing_file() {
    let result = Config::from_toml_path("/nonexistent/relayout.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_embedded_defaults_round_trip_through_engine_types() {
    let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
    for group in &config.rules.custom {
        assert!(
            config.action(&group.name).is_some(),
            "trigger {} has no definition",
            group.name
        );
    }
}
