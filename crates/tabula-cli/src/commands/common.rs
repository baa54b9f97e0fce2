//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use tabula_config::{Patch, get_factory_patch};

/// Load a patch by factory name or path.
///
/// Returns the patch and the directory its wavetable paths resolve against:
/// the patch file's directory, or the working directory for factory patches.
pub fn load_patch(name: &str) -> anyhow::Result<(Patch, PathBuf)> {
    let path = Path::new(name);
    if path.is_file() {
        let patch = Patch::load(path)?;
        let base = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        return Ok((patch, base));
    }

    if let Some(patch) = get_factory_patch(name) {
        return Ok((patch, PathBuf::from(".")));
    }

    anyhow::bail!(
        "Patch '{}' not found. Use 'tabula patch list' to see factory patches.",
        name
    )
}
