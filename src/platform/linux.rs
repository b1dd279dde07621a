// TabKeeper config path on Linux: $XDG_CONFIG_HOME/tabkeeper or ~/.config/tabkeeper

use std::env;
use std::path::PathBuf;

pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("tabkeeper"),
        _ => {
            let home = env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir);
            home.join(".config").join("tabkeeper")
        }
    }
}
