//! PID-file bookkeeping (ambient, mirrors the teacher's `mosaico-core::pid`).
//!
//! Lets the CLI detect a running daemon even if the IPC port check fails,
//! and forcibly clean up after a daemon that was killed without a chance
//! to remove its own PID file.

use std::fs;
use std::path::PathBuf;

/// Returns the directory the PID file lives in, creating it if necessary.
fn data_dir() -> std::io::Result<PathBuf> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| std::io::Error::other("could not determine local data directory"))?;
    let dir = base.join("colonnade");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the path to the PID file.
pub fn pid_path() -> std::io::Result<PathBuf> {
    Ok(data_dir()?.join("colonnade.pid"))
}

/// Writes the current process's PID to the PID file. Called on daemon startup.
pub fn write_pid_file() -> std::io::Result<()> {
    let path = pid_path()?;
    fs::write(&path, std::process::id().to_string())
}

/// Reads the PID from the PID file, if it exists.
pub fn read_pid_file() -> std::io::Result<Option<u32>> {
    let path = pid_path()?;
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    let pid: u32 = contents
        .trim()
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("invalid PID file contents: {e}")))?;
    Ok(Some(pid))
}

/// Removes the PID file. Called on a clean daemon shutdown.
pub fn remove_pid_file() -> std::io::Result<()> {
    let path = pid_path()?;
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips_the_current_pid() {
        // Arrange
        let _ = remove_pid_file();
        // Act
        write_pid_file().expect("write pid file");
        let read_back = read_pid_file().expect("read pid file");
        // Assert
        assert_eq!(read_back, Some(std::process::id()));
        // Cleanup
        remove_pid_file().expect("remove pid file");
    }

    #[test]
    fn reading_a_missing_pid_file_returns_none() {
        // Arrange
        let _ = remove_pid_file();
        // Act
        let read_back = read_pid_file().expect("read pid file");
        // Assert
        assert_eq!(read_back, None);
    }
}
