use anyhow::Result;
use std::{fs, io::Write, path::Path, process::Command};

pub fn resolve_editor(editor: &Option<String>) -> String {
    editor
        .as_deref()
        .map(str::to_string)
        .or_else(|| std::env::var("VISUAL").ok())
        .or_else(|| std::env::var("EDITOR").ok())
        .unwrap_or_else(|| "vim".into())
}

/// Lets the user edit `initial` in a temporary file and returns the result,
/// without the trailing newline editors usually add.
pub fn edit_text(editor_cmd: &str, initial: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("wlog")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    let path = file.path().to_path_buf();
    open_file_in_editor(editor_cmd, &path)?;
    let edited = fs::read_to_string(&path)?;
    Ok(edited.trim_end_matches(['\n', '\r']).to_string())
}

pub fn open_file_in_editor(editor_cmd: &str, path: &Path) -> Result<()> {
    let status = Command::new(editor_cmd).arg(path).status()?;
    if !status.success() {
        anyhow::bail!("Editor exited with status {}", status);
    }
    Ok(())
}
