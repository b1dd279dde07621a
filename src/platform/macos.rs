// TabKeeper config path on macOS: ~/Library/Application Support/TabKeeper

use std::env;
use std::path::PathBuf;

pub fn get_config_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join("Library")
        .join("Application Support")
        .join("TabKeeper")
}
