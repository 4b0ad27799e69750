//! Detect and clear filesystem immutability flags.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Clears the flags that make a file or directory immutable.
pub trait Unlocker {
    /// True if the path has an immutable flag set.
    fn is_locked(&self, path: &Path) -> bool;

    /// Clear the immutable flag.
    ///
    /// # Errors
    /// Returns an error if the flag could not be cleared.
    fn unlock(&self, path: &Path) -> io::Result<()>;

    /// Clear the flag and check that it is gone.
    ///
    /// # Errors
    /// Returns an error if unlocking fails or the path is still locked afterwards.
    fn unlock_checked(&self, path: &Path) -> io::Result<()> {
        self.unlock(path)?;
        if self.is_locked(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Still locked after unlocking: {}", path.display()),
            ));
        }
        Ok(())
    }

    /// The locked path blocking a move of `source`: the source itself or its parent directory.
    fn locked_path(&self, source: &Path) -> Option<PathBuf> {
        if self.is_locked(source) {
            return Some(source.to_path_buf());
        }
        source
            .parent()
            .filter(|parent| self.is_locked(parent))
            .map(Path::to_path_buf)
    }
}

/// Uses the platform tools: `chflags` on macOS and `chattr` on Linux.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUnlocker;

/// Never reports anything as locked.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUnlock;

impl Unlocker for NoUnlock {
    fn is_locked(&self, _path: &Path) -> bool {
        false
    }

    fn unlock(&self, path: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("Unlocking is disabled: {}", path.display()),
        ))
    }
}

#[cfg(target_os = "macos")]
impl Unlocker for SystemUnlocker {
    fn is_locked(&self, path: &Path) -> bool {
        use std::os::macos::fs::MetadataExt;

        const UF_IMMUTABLE: u32 = 0x0000_0002;
        const SF_IMMUTABLE: u32 = 0x0002_0000;

        std::fs::symlink_metadata(path).is_ok_and(|metadata| metadata.st_flags() & (UF_IMMUTABLE | SF_IMMUTABLE) != 0)
    }

    /// Clearing the system flag needs root and a low securelevel.
    fn unlock(&self, path: &Path) -> io::Result<()> {
        run_command(Command::new("chflags").arg("nouchg,noschg").arg(path))
    }
}

#[cfg(target_os = "linux")]
impl Unlocker for SystemUnlocker {
    fn is_locked(&self, path: &Path) -> bool {
        let Ok(output) = Command::new("lsattr").arg("-d").arg(path).output() else {
            return false;
        };
        if !output.status.success() {
            return false;
        }
        String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .next()
            .is_some_and(|flags| flags.contains('i'))
    }

    fn unlock(&self, path: &Path) -> io::Result<()> {
        run_command(Command::new("chattr").arg("-i").arg(path))
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
impl Unlocker for SystemUnlocker {
    fn is_locked(&self, _path: &Path) -> bool {
        false
    }

    fn unlock(&self, path: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("Unlocking is not supported on this platform: {}", path.display()),
        ))
    }
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn run_command(command: &mut Command) -> io::Result<()> {
    let output = command.output()?;
    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}
