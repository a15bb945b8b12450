//! Helpers shared by built-in commands.

use crate::{CommandArgs, CommandContext};
use parley_rs_protocol::CommandError;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Fetch a required argument.
pub(super) fn required_arg<'a>(args: &'a CommandArgs, name: &str) -> Result<&'a str, CommandError> {
    args.get(name)
        .map(String::as_str)
        .ok_or_else(|| CommandError::InvalidArguments(format!("missing argument `{name}`")))
}

/// Resolve a workspace-relative path, rejecting absolute paths and `..`
/// components that would climb above the root.
pub(super) fn resolve_workspace_path(
    ctx: &CommandContext,
    input: &str,
) -> Result<PathBuf, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandError::InvalidArguments(
            "path cannot be empty".to_string(),
        ));
    }
    let root = &ctx.services.workspace_root;
    let resolved = normalize_relative_path(root, input)?;
    ensure_within_root(root, &resolved)?;
    Ok(resolved)
}

/// Display `path` relative to `root` when possible.
pub(super) fn relative_display(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.to_string_lossy().to_string(),
        Err(_) => path.to_string_lossy().to_string(),
    }
}

fn normalize_relative_path(root: &Path, input: &str) -> Result<PathBuf, CommandError> {
    let path = Path::new(input);
    if path.is_absolute() {
        return Err(CommandError::InvalidArguments(
            "path must be relative to the workspace".to_string(),
        ));
    }

    let mut parts: Vec<OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_os_string()),
            Component::CurDir => (),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(CommandError::InvalidArguments(
                        "path escapes the workspace".to_string(),
                    ));
                }
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(CommandError::InvalidArguments(
                    "path must be relative to the workspace".to_string(),
                ));
            }
        }
    }

    let mut resolved = root.to_path_buf();
    resolved.extend(parts);
    Ok(resolved)
}

/// Symlinks inside the workspace may still point outside it; compare the
/// nearest existing ancestor against the canonical root.
fn ensure_within_root(root: &Path, path: &Path) -> Result<(), CommandError> {
    let Ok(root) = root.canonicalize() else {
        // Nothing exists yet, so nothing can be a symlink out of it.
        return Ok(());
    };
    let Some(existing) = path.ancestors().find(|candidate| candidate.exists()) else {
        return Ok(());
    };
    let target = existing.canonicalize().map_err(|err| {
        CommandError::ExecutionFailed(format!("failed to resolve {}: {err}", existing.display()))
    })?;
    if !target.starts_with(&root) {
        return Err(CommandError::InvalidArguments(
            "path is outside the workspace".to_string(),
        ));
    }
    Ok(())
}
