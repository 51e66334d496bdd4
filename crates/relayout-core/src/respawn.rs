// Relayout Respawn
// Restarting the daemon by starting a fresh copy of itself

use std::io;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, SystemTime};

/// Start a new copy of this executable with the same arguments.
///
/// Returns the child's pid; the caller is expected to exit.
pub fn spawn_replacement() -> io::Result<u32> {
    let exe = std::env::current_exe()?;
    let child = Command::new(exe).args(std::env::args_os().skip(1)).spawn()?;
    Ok(child.id())
}

/// Delay before the scheduled respawn: how much younger than `respawn` the
/// test device is. `None` when it is already old enough.
///
/// Desktop environments that start after the daemon may grab the virtual
/// keyboard layout wrongly, so a freshly booted system gets one restart.
pub fn respawn_delay(test_device: &Path, respawn: Duration) -> io::Result<Option<Duration>> {
    let modified = std::fs::metadata(test_device)?.modified()?;
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);
    Ok(respawn.checked_sub(age).filter(|d| !d.is_zero()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_file_needs_respawn() {
        let path = std::env::temp_dir().join(format!("relayout-respawn-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let delay = respawn_delay(&path, Duration::from_secs(3600)).unwrap();
        assert!(delay.is_some_and(|d| d > Duration::from_secs(3500)));
        assert_eq!(respawn_delay(&path, Duration::ZERO).unwrap(), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(respawn_delay(Path::new("/nonexistent/relayout"), Duration::from_secs(1)).is_err());
    }
}
