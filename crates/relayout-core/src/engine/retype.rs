// Relayout Word Retype
// Erases the last word and types it again, usually after a layout switch

use super::hook::{HookContext, HookError};
use crate::event::KeyEvent;
use crate::key::key_from_name;
use crate::output::{KeyLedger, KeySink};
use crate::Key;
use regex::Regex;
use std::collections::HashSet;

/// The `RetypeWord` hook.
///
/// Replays `Word[..len - extra]`; the trailing `extra` events belong to the
/// trigger sequence and are neither erased nor replayed.
pub fn retype_word(ctx: &mut HookContext<'_>) -> Result<(), HookError> {
    let word = ctx.session.word().to_vec();
    let extra = ctx.session.extra();
    let Some(span) = word.len().checked_sub(extra).filter(|n| *n > 0) else {
        log::warn!(
            "RetypeWord: word of {} events is not longer than its trigger ({})",
            word.len(),
            extra
        );
        ctx.session.start_new_word();
        return Ok(());
    };
    let replay = &word[..span];

    let Some(count) = erase_count(replay, &ctx.config.rules.word_chars) else {
        log::warn!("RetypeWord: BACKSPACE inside the word, not retyping");
        ctx.session.start_new_word();
        return Ok(());
    };
    let erase = count.saturating_sub(ctx.session.compose());

    let restore: Vec<Key> = ctx
        .session
        .word_start_modifiers()
        .missing_from(ctx.session.modifiers())
        .filter_map(key_from_name)
        .collect();

    log::debug!(
        "RetypeWord: erase {} of {}, restore {:?}, replay {}",
        erase,
        count,
        restore,
        span
    );

    let mut ledger = KeyLedger::new();
    let typed = type_word(ctx.sink, &mut ledger, erase, &restore, replay);

    // Keys left down would stay held on the host
    if !ledger.is_empty() {
        let stuck = ledger.drain();
        log::warn!("RetypeWord: releasing keys left pressed: {:?}", stuck);
        for key in stuck {
            if let Err(e) = ctx.sink.release(key) {
                log::error!("Failed to release {}: {}", key, e);
            }
        }
    }
    typed?;

    ctx.session.word_mut().truncate(span);
    ctx.session.mark_retyped();
    Ok(())
}

/// Characters the replayed events put on screen. `None` when the span holds
/// a Backspace release, meaning the user already edited the word.
pub fn erase_count(events: &[KeyEvent], word_chars: &Regex) -> Option<usize> {
    let mut open = HashSet::new();
    let mut count = 0;
    for event in events {
        if event.transition.is_released() {
            if !open.remove(&event.key) {
                continue;
            }
        } else {
            open.insert(event.key);
        }

        if word_chars.is_match(&event.to_string()) {
            count += 1;
        }
        if event.transition.is_released() {
            if event.key == Key::SPACE {
                count += 1;
            } else if event.key == Key::BACKSPACE {
                return None;
            }
        }
    }
    Some(count)
}

fn type_word(
    sink: &mut dyn KeySink,
    ledger: &mut KeyLedger,
    erase: usize,
    restore: &[Key],
    replay: &[KeyEvent],
) -> Result<(), HookError> {
    for _ in 0..erase {
        sink.tap(Key::BACKSPACE)?;
    }

    for &key in restore {
        if key.is_lock() {
            sink.tap(key)?;
        } else {
            sink.press(key)?;
            ledger.add(key);
        }
    }

    let mut open = HashSet::new();
    for event in replay {
        if event.transition.is_released() {
            if !open.remove(&event.key) && !event.key.is_standard_modifier() {
                log::trace!("RetypeWord: skipping orphan {}", event);
                continue;
            }
            sink.release(event.key)?;
            ledger.remove(event.key);
        } else {
            open.insert(event.key);
            sink.emit(event.key, event.transition)?;
            ledger.add(event.key);
        }
    }
    Ok(())
}
