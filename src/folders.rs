//! Opening local folders in the platform file browser.

use std::path::Path;
use std::process::Command;
use tracing::warn;

#[cfg(target_os = "windows")]
const FILE_BROWSER: &str = "explorer";
#[cfg(target_os = "macos")]
const FILE_BROWSER: &str = "open";
#[cfg(all(unix, not(target_os = "macos")))]
const FILE_BROWSER: &str = "xdg-open";

/// Open `path` in the native file browser.
///
/// Fire and forget: the browser's exit status is not checked, and a
/// failure to spawn it only logs a warning.
pub fn open_in_file_browser(path: &Path) {
    match Command::new(FILE_BROWSER).arg(path).spawn() {
        Ok(_child) => {}
        Err(err) => {
            warn!(path = %path.display(), "could not open the file browser: {err}");
        }
    }
}
