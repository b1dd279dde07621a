// TabKeeper config path on Windows: %APPDATA%/TabKeeper

use std::env;
use std::path::PathBuf;

pub fn get_config_dir() -> PathBuf {
    env::var_os("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join("TabKeeper")
}
