use std::path::Path;

use anyhow::Context;
use vmscope::{HandlerCandidate, ModuleDef};

/// Load a module dump.
pub fn load_module(path: &Path) -> anyhow::Result<ModuleDef> {
    ModuleDef::from_path(path).with_context(|| format!("failed to load module: {}", path.display()))
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

/// Qualified `Type::Method` label of a candidate.
pub fn handler_label(candidate: &HandlerCandidate) -> String {
    format!(
        "{}::{}",
        candidate.vm_type.full_name(),
        candidate.method.name
    )
}
