// Shellmarks platform paths
//
// Linux:   $XDG_CONFIG_HOME/shellmarks, $XDG_DATA_HOME/shellmarks
// macOS:   ~/Library/Application Support/Shellmarks
// Windows: %APPDATA%/Shellmarks

use std::env;
use std::path::PathBuf;

const APP_DIR_LOWER: &str = "shellmarks";
#[cfg(not(target_os = "linux"))]
const APP_DIR: &str = "Shellmarks";

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join(".config"))
            .join(APP_DIR_LOWER)
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR)
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join(APP_DIR)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(format!(".{}", APP_DIR_LOWER))
    }
}

/// Directory holding the bookmark database.
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join(".local").join("share"))
            .join(APP_DIR_LOWER)
    }
    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}
