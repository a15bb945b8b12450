//! Workspace filesystem commands.

use crate::builtins::utils::{relative_display, required_arg, resolve_workspace_path};
use crate::{Command, CommandArgs, CommandContext};
use async_trait::async_trait;
use log::info;
use parley_rs_protocol::CommandError;
use tokio::fs;

/// Lists a workspace directory as two groups: subdirectories and files.
#[derive(Debug, Default)]
pub struct ListFilesCommand;

#[async_trait]
impl Command for ListFilesCommand {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List the folders and files in a workspace directory"
    }

    fn parameters(&self) -> &[&str] {
        &["directory"]
    }

    async fn call(&self, ctx: &CommandContext, args: CommandArgs) -> Result<String, CommandError> {
        let directory = args.get("directory").map(String::as_str).unwrap_or(".");
        let path = resolve_workspace_path(ctx, directory)?;
        let shown = relative_display(&ctx.services.workspace_root, &path);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(format!("❌ Path not found: {shown}"));
        }
        if !path.is_dir() {
            return Err(CommandError::InvalidArguments(format!(
                "{shown} is not a directory"
            )));
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&path)
            .await
            .map_err(|err| CommandError::ExecutionFailed(format!("failed to read {shown}: {err}")))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| CommandError::ExecutionFailed(format!("failed to read {shown}: {err}")))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            match entry.file_type().await {
                Ok(kind) if kind.is_dir() => dirs.push(name),
                Ok(_) => files.push(name),
                Err(_) => continue,
            }
        }
        dirs.sort();
        files.sort();
        info!(
            "listed directory (dirs={}, files={})",
            dirs.len(),
            files.len()
        );

        Ok(format!(
            "📁 Contents of {shown}:\n\n📂 Folders: {}\n📄 Files: {}",
            join_or_none(&dirs),
            join_or_none(&files)
        ))
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// Writes text to a workspace file, creating parent directories.
#[derive(Debug, Default)]
pub struct WriteFileCommand;

#[async_trait]
impl Command for WriteFileCommand {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Create or overwrite a text file in the workspace"
    }

    fn parameters(&self) -> &[&str] {
        &["filename", "text"]
    }

    async fn call(&self, ctx: &CommandContext, args: CommandArgs) -> Result<String, CommandError> {
        let filename = required_arg(&args, "filename")?;
        let text = required_arg(&args, "text")?;
        let path = resolve_workspace_path(ctx, filename)?;
        if path.is_dir() {
            return Err(CommandError::InvalidArguments(format!(
                "{filename} is a directory"
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|err| {
                CommandError::ExecutionFailed(format!("failed to create directories: {err}"))
            })?;
        }
        fs::write(&path, text.as_bytes())
            .await
            .map_err(|err| CommandError::ExecutionFailed(format!("failed to write file: {err}")))?;
        info!("wrote file (bytes_written={})", text.len());

        Ok(format!(
            "✅ File written: {}",
            relative_display(&ctx.services.workspace_root, &path)
        ))
    }
}
