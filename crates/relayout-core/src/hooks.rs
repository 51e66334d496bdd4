// Relayout Built-in Hooks
// Layout switching, respawn and external commands

use crate::action::{BufferSource, PrimitiveName};
use crate::engine::{Engine, HookContext, HookError};
use crate::exec::{CommandSpec, ProcessRunner, DEFAULT_MAX_REPLY};
use crate::state::ModifierSet;
use crate::text;
use crate::Key;

/// Register every built-in hook except `RetypeWord`, which the engine
/// registers itself.
pub fn register_builtin_hooks(engine: &mut Engine) {
    engine.register_primitive(PrimitiveName::SwitchLayoutCyclic.to_string(), switch_layout_cyclic);
    engine.register_primitive(PrimitiveName::SelectLayout.to_string(), select_layout);
    engine.register_primitive(PrimitiveName::Respawn.to_string(), respawn);
    engine.register_primitive(PrimitiveName::ExecuteExternal.to_string(), execute_external);
}

/// Select the layout after the current one in `Layouts`, wrapping around.
/// A current layout outside the list moves to the first entry.
pub fn switch_layout_cyclic(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    let layouts = if ctx.action.params.layouts.is_empty() {
        &ctx.config.layouts
    } else {
        &ctx.action.params.layouts
    };
    if layouts.is_empty() {
        return Err(ctx.missing("Layouts"));
    }

    let current = ctx.layout.current()?;
    let next = layouts
        .iter()
        .position(|&l| l == current)
        .map_or(0, |pos| (pos + 1) % layouts.len());
    log::debug!("Switching layout {} -> {}", current, layouts[next]);
    ctx.layout.select(layouts[next])?;
    Ok(())
}

pub fn select_layout(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    let layout = ctx.action.params.layout.ok_or_else(|| ctx.missing("Layout"))?;
    ctx.layout.select(layout)?;
    Ok(())
}

/// Start a fresh copy of the daemon and exit this one
pub fn respawn(_ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    let pid = crate::respawn::spawn_replacement()?;
    log::info!("Started replacement process {}, exiting", pid);
    std::process::exit(0);
}

/// Build the command an `ExecuteExternal` step runs
pub fn command_spec(ctx: &HookContext<'_>) -> Result<CommandSpec, HookError> {
    let params = &ctx.action.params;
    let line = params.exec.as_deref().ok_or_else(|| ctx.missing("Exec"))?;

    let mut spec = CommandSpec::from_command_line(line, params.use_shell);
    spec.stdin = match &params.send_buffer {
        None => Vec::new(),
        Some(BufferSource::Word) => render(
            ctx.session.word().iter(),
            ctx.session.word_start_modifiers(),
        ),
        Some(BufferSource::Sentence) => render(
            ctx.session.sentence().iter(),
            ctx.session.sentence_start_modifiers(),
        ),
        Some(BufferSource::Text(text)) => text.clone().into_bytes(),
    };
    spec.directory = params.directory.clone();
    spec.clean_env = params.clean_env;
    spec.environment = params.environment.clone();
    spec.uid = params.uid.clone();
    spec.gid = params.gid.clone();
    spec.timeout = params.timeout;
    spec.max_reply = params.max_reply.unwrap_or(DEFAULT_MAX_REPLY);
    Ok(spec)
}

fn render<'a>(
    events: impl Iterator<Item = &'a crate::event::KeyEvent>,
    start: &ModifierSet,
) -> Vec<u8> {
    text::render(events, start.contains(Key::CAPSLOCK.name())).into_bytes()
}

/// Run `Exec`. With `Wait` the result is logged here, otherwise the command
/// runs detached and is reaped in the background.
pub fn execute_external(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    let spec = command_spec(ctx)?;
    if !ctx.action.params.wait {
        log::debug!("[{}] starting {}", spec.id, spec.command);
        ProcessRunner::spawn(spec)?;
        return Ok(());
    }

    let result = ProcessRunner::run(&spec);
    if result.success() {
        log::info!(
            "[{}] {} done: {}",
            result.id,
            result.command,
            result.stdout_lossy().trim_end()
        );
    } else {
        log::warn!(
            "[{}] {} exited with {}{}: {}",
            result.id,
            result.command,
            result.status,
            if result.timed_out { " after timeout" } else { "" },
            result.stderr_lossy().trim_end()
        );
    }
    Ok(())
}
