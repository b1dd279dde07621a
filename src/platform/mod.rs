// TabKeeper platform paths
// Only the configuration directory is needed: tab state itself is never stored.
//
// Uses `cfg(target_os)` to pick the platform implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory for TabKeeper.
///
/// - **Linux**: `~/.config/tabkeeper` (or `$XDG_CONFIG_HOME/tabkeeper`)
/// - **macOS**: `~/Library/Application Support/TabKeeper`
/// - **Windows**: `%APPDATA%/TabKeeper`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Location of the settings file TabKeeper reads at startup.
pub fn settings_path() -> PathBuf {
    get_config_dir().join("settings.json")
}
