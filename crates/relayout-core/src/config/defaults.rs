// Relayout Default Configuration
// Used when no configuration file can be read

/// Built-in configuration, also a reference for the file format
pub const DEFAULT_CONFIG: &str = r#"
# relayout configuration (TOML)

[ScanDevices]
 # Must exist at start. If it is younger than Respawn seconds, the daemon
 # restarts itself once that age is reached (lets the desktop settle first).
 Test = "/dev/input/event0"
 Respawn = 30
 Search = "/dev/input/event*"
 # Pseudo keyboards with lots of useless events
 Bypass = "(?i)Video|Camera"

[Keyboard]
 # Milliseconds to wait after each synthetic key event
 Delay = 5

[Templates]
 # "@name@" in rules is replaced by these patterns. Use canonical key names only.
 "WORD" = "([0-9A-Z=-]|GRAVE|APOSTROPHE|SEMICOLON|[LR]_BRACE|COMMA|DOT|(BACK)?SLASH|KP[0-9])"
 "SEPARATOR" = "(((BACK)?SPACE)|([=-]|(KP)?MINUS|(KP)?ENTER|ESC|TAB))"
 "COMPOSE" = "([0-9=-]|[LR]_BRACE)"

[ActionKeys]
 # Layouts the engine works in; typing in other layouts is left alone
 Layouts = [0, 1]

 # Collected into the word and tested against the rules.
 # Repeats are collected once per held key.
 Add = ["1..0", "-", "=", "BACKSPACE", "Q..]", "L_CTRL..CAPS", "N_LOCK", "S_LOCK",
        "KP7..KPDOT", "R_CTRL", "KPSLASH", "R_ALT", "KPEQUAL..PAUSE",
        "KPCOMMA", "L_META..COMPOSE", "KPLEFTPAREN", "KPRIGHTPAREN"]

 # Drop everything collected so far
 Drop = ["ESC", "TAB", "ENTER", "KPENTER", "LINEFEED..POWER"]

 # Held state is visible to OFF:/ON: conditions and survives buffer drops
 StateKeys = ["L_CTRL", "L_SHIFT", "L_ALT", "L_META", "CAPS", "N_LOCK", "S_LOCK",
              "R_CTRL", "R_SHIFT", "R_ALT", "R_META"]

 # Tested against the rules, never collected
 Test = ["F1..F10", "ZENKAKUHANKAKU", "102ND", "F11", "F12",
         "RO..KPJPCOMMA", "SYSRQ", "SCALE", "HANGEUL..YEN",
         "STOP..SCROLLDOWN", "NEW..MAX"]

# Checked in declaration order, first match wins.
[[WindowClasses]]
 # Virtual machines and VNC viewers handle input themselves
 Regex = "^(VirtualBox|Focus-Proxy-Window)"
 Actions = ""

[[WindowClasses]]
 # Terminals keep the cursor where it was on click
 Regex = "^konsole"
 MouseClickDrops = false
 Actions = "Actions"

[[WindowClasses]]
 MouseClickDrops = true
 Actions = "Actions"

# Rule grammar: any of OFF:(regex) ON:(regex) SEQ:(regex), all must hold.
#  OFF - no held state key matches
#  ON  - at least one held state key matches (WORD is held right after a retype)
#  SEQ - the comma separated NAME:code tail of the last SeqLength events matches
# Run with --test to see the tail you type.
[Actions]
 SeqLength = 12
 # Word events that produced a character; one BACKSPACE each on retype
 WordChars = "(^@WORD@:0$)"

 NewWord = [ "SEQ:(@SEPARATOR@:[12]),(((CAPS:[012])|([LR]_SHIFT:[12])|(R_META:0)|((@WORD@|@SEPARATOR@):0)),)*(@WORD@:1)",
             "SEQ:(@WORD@:2,@WORD@:0)",
             "SEQ:(BACKSPACE:0)",
             "SEQ:((([LR]_CTRL|L_ALT|[LR]_META):[12])(,((@WORD@|@SEPARATOR@):[012]))+(,(([LR]_CTRL|L_ALT|[LR]_META):0))+(,@WORD@:1)?)",
             "ON:(WORD) SEQ:(,@WORD@:1)" ]

 NewSentence = [ "SEQ:(ENTER:0)" ]

 Compose = [ "OFF:(CTRL|L_ALT|META|SHIFT)  SEQ:(R_ALT:1(,R_ALT:2)?(,[LR]_SHIFT:[12])*(,@COMPOSE@:1,@COMPOSE@:0)(,[LR]_SHIFT:0)?(,@COMPOSE@:1,@COMPOSE@:0),R_ALT:0)",
             "OFF:(CTRL|L_ALT|META|SHIFT)  SEQ:(R_ALT:1(,R_ALT:2)?(,[LR]_SHIFT:[12])*,@COMPOSE@:1,@COMPOSE@:0(,[LR]_SHIFT:0)?,R_ALT:0(,[LR]_SHIFT:0)?,@COMPOSE@:1,@COMPOSE@:0)" ]

 # Trigger groups must not overlap: the first one declared wins.
 "Action.RetypeWord" = [ "OFF:(CTRL|ALT|META|SHIFT)  SEQ:(PAUSE:1,PAUSE:0)",
                         "OFF:(CTRL|ALT|META|SHIFT)  SEQ:(F12:1,F12:0)" ]
 "Action.CyclicSwitch" = [ "OFF:(R_CTRL|ALT|META|SHIFT)  SEQ:(L_CTRL:1,L_CTRL:0)" ]
 "Action.Respawn" = [ "OFF:(CTRL|ALT|META|SHIFT)  SEQ:(S_LOCK:2,S_LOCK:0)" ]
 "Action.Layout0" = [ "OFF:(CTRL|ALT|META|R_SHIFT)  SEQ:(L_SHIFT:1,L_SHIFT:0)" ]
 "Action.Layout1" = [ "OFF:(CTRL|ALT|META|L_SHIFT)  SEQ:(R_SHIFT:1,R_SHIFT:0)" ]

[Action.RetypeWord]
 # Switch layout, then erase the last word and type it again
 Action = [ "Action.CyclicSwitch", "RetypeWord" ]

[Action.CyclicSwitch]
 Action = [ "SwitchLayoutCyclic" ]
 Layouts = [0, 1]

[Action.Layout0]
 Action = [ "SelectLayout" ]
 Layout = 0

[Action.Layout1]
 Action = [ "SelectLayout" ]
 Layout = 1

[Action.Respawn]
 # Restart the daemon, re-reading the configuration
 Action = [ "Respawn" ]

# External hook example:
# "Action.Hook1" = [ "OFF:(CTRL|R_ALT|META|SHIFT)  SEQ:(L_ALT:1,L_ALT:0)" ]
#
# [Action.Hook1]
#  Action = [ "ExecuteExternal" ]
#  Exec = "cat > /tmp/last-word"   # first word is the program, the rest are arguments
#  UseShell = true                 # run through /bin/bash -c instead
#  SendBuffer = "WORD"             # "WORD", "SENTENCE" or literal text for stdin
#  Wait = true                     # wait and log the result
#  Timeout = 1.0                   # seconds, then the process group is killed
#  Directory = "/tmp"
#  CleanEnv = true
#  Environment = [ "LANG=C" ]
#  MaxReply = 4096                 # bytes of stdout/stderr kept
#  UID = "nobody"
#  GID = "nogroup"
"#;
