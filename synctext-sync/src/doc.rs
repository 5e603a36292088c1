//! Local document seeding and line-oriented file I/O (spec.md §4.9, §6).

use std::path::Path;

const DEFAULT_GREETING: &[&str] = &[
    "Hello User!",
    "Start making changes.",
    "See real-time updates!",
    "Come collaborate with others.",
];

/// Reads `path` as a list of lines, returning an empty vector if the file
/// does not exist (matching the reference `readLinesFile`, which never
/// fails, only returns empty on a missing file).
pub async fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(split_lines(&contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn split_lines(contents: &str) -> Vec<String> {
    if contents.is_empty() {
        return Vec::new();
    }
    contents
        .strip_suffix('\n')
        .unwrap_or(contents)
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Overwrites `path` with `lines`, one per line, trailing newline after
/// every line (matching the reference `writeLinesFile`).
pub async fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push('\n');
    }
    tokio::fs::write(path, contents).await
}

/// Seeds `doc_path` from `base_doc_path` (or a fixed greeting if no base
/// document exists) when `doc_path` does not already exist. A no-op if the
/// document is already present (spec.md §6, document seeding).
pub async fn seed_if_missing(doc_path: &Path, base_doc_path: &Path) -> std::io::Result<()> {
    if tokio::fs::metadata(doc_path).await.is_ok() {
        return Ok(());
    }

    match tokio::fs::read_to_string(base_doc_path).await {
        Ok(contents) => tokio::fs::write(doc_path, contents).await,
        Err(_) => {
            let greeting: String = DEFAULT_GREETING
                .iter()
                .map(|line| format!("{line}\n"))
                .collect();
            tokio::fs::write(doc_path, greeting).await
        }
    }
}

/// Returns the modification time of `path`, if it exists.
pub async fn mtime(path: &Path) -> Option<std::time::SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}
