pub mod deck;
pub mod session;
pub mod spaced_repetition;
pub mod store;

use log::*;
use std::fs::create_dir_all;
use std::path::PathBuf;

pub fn log_dir() -> Option<PathBuf> {
    let path = dirs::cache_dir()?.join("flashdrill");
    if !path.exists() {
        if let Err(e) = create_dir_all(&path) {
            warn!("Failed to create directory {path:?}: {e}");
            return None;
        }
    }
    Some(path)
}

pub fn log_path() -> Option<PathBuf> {
    log_dir().map(|dir| dir.join("flashdrill.log"))
}
