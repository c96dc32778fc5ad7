use std::path::{Component, Path, PathBuf};

pub fn sanitize_filename(name: &str) -> String {
    let mut s = name.trim().to_string();
    let invalid = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];
    for ch in invalid {
        s = s.replace(ch, "-");
    }
    s = s.replace(' ', "_");
    s = s.trim_start_matches('.').to_string();
    if s.len() > 100 {
        let mut cut = 100;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    if s.is_empty() {
        s = "avatar".into();
    }
    s
}

pub fn relative_from_uploads(uploads_root: &Path, full: &Path) -> String {
    full.strip_prefix(uploads_root)
        .unwrap_or(full)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Joins a stored relative path onto the upload root, refusing anything
/// that would escape it.
pub fn resolve_under_root(uploads_root: &Path, rel: &str) -> anyhow::Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => continue,
            _ => anyhow::bail!("forbidden"),
        }
    }
    if relative.as_os_str().is_empty() {
        anyhow::bail!("forbidden");
    }
    Ok(uploads_root.join(relative))
}
