use serde::Serialize;
use std::path::{Path, PathBuf};

use super::CommandError;
use crate::ingest;
use crate::state::AppState;
use crate::store::models::{Folder, NewSource, Preview, Source, SourceKind};

#[derive(Debug, Serialize, Clone)]
pub struct FolderView {
    pub folder: Folder,
    pub sources: Vec<Source>,
}

/// Sidebar snapshot: folders with their sources, then unfiled sources.
#[derive(Debug, Serialize, Clone)]
pub struct LibraryView {
    pub folders: Vec<FolderView>,
    pub unfiled: Vec<Source>,
    pub selected: Vec<String>,
}

pub fn list_library<M>(app: &AppState<M>) -> LibraryView {
    let session = app.session();
    let library = &session.library;
    LibraryView {
        folders: library
            .folders()
            .into_iter()
            .map(|folder| FolderView {
                sources: library.sources_in_folder(&folder.id),
                folder,
            })
            .collect(),
        unfiled: library.unfiled_sources(),
        selected: library
            .selected_sources()
            .into_iter()
            .map(|s| s.id)
            .collect(),
    }
}

// ── Folders ──

pub fn add_folder<M>(app: &AppState<M>, name: String) -> Folder {
    app.session().library.add_folder(&name)
}

/// Deletes the folder with its sources; returns the removed source ids.
pub fn delete_folder<M>(app: &AppState<M>, id: String) -> Vec<String> {
    app.session().library.delete_folder(&id)
}

// ── Sources ──

/// Rejects sources the add/edit forms would refuse: a blank name, or a blank
/// address or handle.
fn check_fields(name: &str, kind: &SourceKind) -> Result<(), CommandError> {
    if name.trim().is_empty() {
        return Err(CommandError::EmptySourceField("name"));
    }
    match kind {
        SourceKind::Url { address } if address.trim().is_empty() => {
            Err(CommandError::EmptySourceField("address"))
        }
        SourceKind::Telegram { handle } | SourceKind::Twitter { handle }
            if handle.trim().is_empty() =>
        {
            Err(CommandError::EmptySourceField("handle"))
        }
        _ => Ok(()),
    }
}

pub fn add_source<M>(app: &AppState<M>, source: NewSource) -> Result<Source, CommandError> {
    check_fields(&source.name, &source.kind)?;
    Ok(app.session().library.add_source(source))
}

/// Reads a local file and adds it as a `File` source. Nothing is added when
/// the file is too large or unreadable.
pub async fn add_file_source<M>(
    app: &AppState<M>,
    path: PathBuf,
    folder_id: Option<String>,
) -> Result<Source, CommandError> {
    let file = ingest::ingest_file(&path).await?;
    tracing::info!(name = %file.name, mime = %file.mime_type, bytes = file.data.len(), "file source ingested");
    Ok(app.session().library.add_source(file.into_new_source(folder_id)))
}

pub fn delete_source<M>(app: &AppState<M>, id: String) -> bool {
    app.session().library.delete_source(&id)
}

pub fn toggle_source<M>(app: &AppState<M>, id: String) -> bool {
    app.session().library.toggle_source(&id)
}

pub fn update_source<M>(app: &AppState<M>, source: Source) -> Result<(), CommandError> {
    check_fields(&source.name, &source.kind)?;
    let id = source.id.clone();
    if app.session().library.update_source(source) {
        Ok(())
    } else {
        Err(CommandError::SourceNotFound(id))
    }
}

pub fn edit_source<M>(
    app: &AppState<M>,
    id: String,
    name: String,
    folder_id: Option<String>,
) -> Result<Source, CommandError> {
    if name.trim().is_empty() {
        return Err(CommandError::EmptySourceField("name"));
    }
    app.session()
        .library
        .edit_source(&id, &name, folder_id)
        .ok_or(CommandError::SourceNotFound(id))
}

pub fn view_source<M>(app: &AppState<M>, id: String) -> Result<Preview, CommandError> {
    app.session()
        .library
        .source(&id)
        .map(Source::preview)
        .ok_or(CommandError::SourceNotFound(id))
}

/// Writes a file source's bytes into `dir` under its display name.
pub async fn download_source<M>(
    app: &AppState<M>,
    id: String,
    dir: &Path,
) -> Result<PathBuf, CommandError> {
    let (name, data) = {
        let session = app.session();
        let source = session
            .library
            .source(&id)
            .ok_or_else(|| CommandError::SourceNotFound(id.clone()))?;
        match &source.kind {
            SourceKind::File { data, .. } => (source.name.clone(), data.clone()),
            _ => return Err(CommandError::NotAFile(source.name.clone())),
        }
    }; // lock released

    let file_name = Path::new(&name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "source.bin".into());
    let target = dir.join(file_name);
    tokio::fs::write(&target, data).await?;
    Ok(target)
}
