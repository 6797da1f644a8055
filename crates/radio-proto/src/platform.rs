use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to control whether to use the player client from PATH only,
/// skipping any copy shipped beside the executable.
/// Defaults to false (beside-exe copies win).
static USE_SYSTEM_DEPS: AtomicBool = AtomicBool::new(false);

/// Set whether to use system dependencies (from PATH) instead of bundled ones.
pub fn set_use_system_deps(use_system: bool) {
    USE_SYSTEM_DEPS.store(use_system, Ordering::Relaxed);
}

/// Check whether to use system dependencies from PATH.
pub fn should_use_system_deps() -> bool {
    USE_SYSTEM_DEPS.load(Ordering::Relaxed)
}

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/sc-radio/ (XDG standard)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("sc-radio")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sc-radio")
    }
}

pub fn config_dir() -> PathBuf {
    // On macOS and Linux, always use ~/.config/sc-radio/
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("sc-radio")
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sc-radio")
    }
}

fn binary_names(name: &str) -> Vec<String> {
    #[cfg(windows)]
    {
        if !name.ends_with(".exe") {
            return vec![format!("{}.exe", name), name.to_string()];
        }
    }
    vec![name.to_string()]
}

fn find_beside_exe(names: &[String]) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    for name in names {
        let p = dir.join(name);
        if p.exists() {
            return Some(p);
        }
    }
    None
}

fn find_on_path(names: &[String]) -> Option<PathBuf> {
    let path = std::env::var("PATH").ok()?;
    #[cfg(unix)]
    let sep = ":";
    #[cfg(windows)]
    let sep = ";";
    for dir in path.split(sep) {
        for name in names {
            let p = PathBuf::from(dir).join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }
    None
}

/// Find the playback daemon's command client (`sc` by default).
///
/// An explicit path is taken as-is when it exists. A bare name is searched
/// beside the current exe (unless use_system_deps is set), then on PATH.
pub fn find_player_binary(command: &str) -> Option<PathBuf> {
    let as_path = PathBuf::from(command);
    if as_path.components().count() > 1 {
        return as_path.exists().then_some(as_path);
    }

    let names = binary_names(command);
    if !should_use_system_deps() {
        if let Some(p) = find_beside_exe(&names) {
            return Some(p);
        }
    }
    find_on_path(&names)
}
