// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware directory resolution: where the config file lives and where
// a document goes when its requested location is not writable.

use std::path::PathBuf;

/// Location of `config.json`.
///
/// `$XDG_CONFIG_HOME/lipikar/config.json`, else `~/.config/lipikar/config.json`.
pub fn config_path() -> PathBuf {
    config_path_from(|key| std::env::var(key).ok())
}

/// The user's Desktop, used as the save fallback when the config names none.
pub fn desktop_dir() -> Option<PathBuf> {
    desktop_dir_from(|key| std::env::var(key).ok())
}

fn config_path_from(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    let base = match var("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(xdg) => PathBuf::from(xdg),
        None => match var("HOME").filter(|v| !v.is_empty()) {
            Some(home) => PathBuf::from(home).join(".config"),
            // Last resort
            None => PathBuf::from("."),
        },
    };
    base.join("lipikar").join("config.json")
}

fn desktop_dir_from(var: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(desktop) = var("XDG_DESKTOP_DIR").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(desktop));
    }
    var("HOME")
        .or_else(|| var("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join("Desktop"))
}
