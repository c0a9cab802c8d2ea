use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::model::project::ProjectInfo;
use crate::services::fsio;

fn projects_base_dir() -> PathBuf {
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("LinguistCore").join("Projects");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("Projects")
}

fn ensure_projects_dir() -> Result<PathBuf, CoreError> {
    let dir = projects_base_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Turns a display name (which may arrive as a full path) into a safe
/// directory name: basename only, filesystem-hostile characters
/// replaced.
fn safe_project_dir_name(name: &str) -> String {
    let mut n = name.trim().to_string();

    if n.contains('\\') || n.contains('/') {
        if let Some(bn) = Path::new(&n).file_name().and_then(|s| s.to_str()) {
            n = bn.to_string();
        }
    }

    let mut out = String::with_capacity(n.len());
    for ch in n.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == ' ' || ch == '_' || ch == '-' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }

    let out = out.trim().trim_matches('.').to_string();
    if out.is_empty() {
        "Project".to_string()
    } else {
        out
    }
}

pub fn list_projects() -> Vec<ProjectInfo> {
    let dir = match ensure_projects_dir() {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("could not prepare projects dir: {e}");
            return Vec::new();
        }
    };

    let mut projects = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path().join("project.json");
            if path.exists() {
                if let Ok(data) = fs::read_to_string(&path) {
                    match serde_json::from_str::<ProjectInfo>(&data) {
                        Ok(project) => projects.push(project),
                        Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
                    }
                }
            }
        }
    }

    projects
}

pub fn create_project(
    name: String,
    root_path: String,
    source_language: String,
    target_language: String,
    catalog_file: String,
) -> Result<ProjectInfo, CoreError> {
    let base = ensure_projects_dir()?;

    let safe_name = safe_project_dir_name(&name);
    let project_dir = base.join(&safe_name);

    if project_dir.exists() {
        return Err(CoreError::Project("project already exists".into()));
    }

    fs::create_dir_all(&project_dir)?;

    let project = ProjectInfo {
        name,
        project_path: project_dir.to_string_lossy().to_string(),
        root_path,
        source_language,
        target_language,
        catalog_file,
    };

    let json = serde_json::to_string_pretty(&project)?;
    fsio::write_atomic(&project_dir.join("project.json"), json.as_bytes())?;

    Ok(project)
}

pub fn open_project(project_path: String) -> Result<ProjectInfo, CoreError> {
    let path = Path::new(&project_path).join("project.json");

    if !path.exists() {
        return Err(CoreError::Project("project.json not found".into()));
    }

    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str::<ProjectInfo>(&data)?)
}

pub fn save_project(mut project: ProjectInfo) -> Result<ProjectInfo, CoreError> {
    let base = ensure_projects_dir()?;

    let project_dir: PathBuf = {
        let pp = project.project_path.trim().to_string();
        if pp.is_empty() {
            base.join(safe_project_dir_name(&project.name))
        } else {
            PathBuf::from(pp)
        }
    };

    fs::create_dir_all(&project_dir)?;
    project.project_path = project_dir.to_string_lossy().to_string();

    let json = serde_json::to_string_pretty(&project)?;
    fsio::write_atomic(&project_dir.join("project.json"), json.as_bytes())?;

    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_project_names() {
        assert_eq!(safe_project_dir_name("V4L2 Viewer"), "V4L2 Viewer");
        assert_eq!(safe_project_dir_name("home/me/V4L2Viewer"), "V4L2Viewer");
        assert_eq!(safe_project_dir_name("de/DE: camera"), "DE_ camera");
        assert_eq!(safe_project_dir_name("..."), "Project");
        assert_eq!(safe_project_dir_name(""), "Project");
    }
}
