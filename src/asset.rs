//! Uploaded image files kept beside the records that reference them.

use crate::{setting::Upload, Error, Result};
use actix_multipart::Multipart;
use futures::TryStreamExt;
use rand::Rng;
use std::{
    collections::{HashMap, HashSet},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{info, warn};

pub const GALLERY: &str = "gallery";
pub const EVENTS: &str = "events";

const EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// max bytes of a text field in an upload form
const MAX_TEXT: usize = 64 * 1024;

/// A file received from a multipart form, not yet written.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn extension(&self) -> Option<String> {
        extension(&self.original_name)
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<IncomingFile>,
    pub text: HashMap<String, String>,
}

impl UploadForm {
    pub fn text(&self, key: &str) -> Option<&str> {
        self.text
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub filename: String,
    /// public path, `/uploads/gallery/<filename>`
    pub path: String,
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether a file with this name and declared type is an accepted image.
pub fn accepts(original_name: &str, content_type: &str) -> bool {
    let ext_ok = extension(original_name).map_or(false, |e| EXTENSIONS.contains(&e.as_str()));
    let type_ok = CONTENT_TYPES.contains(&content_type.to_ascii_lowercase().as_str());
    ext_ok && type_ok
}

/// `image-<unix millis>-<random>.<ext>`
pub fn generate_name(ext: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = rand::thread_rng().gen_range(0..1_000_000_000u32);
    format!("image-{}-{}.{}", millis, random, ext)
}

#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    url_prefix: String,
    max_size: usize,
    max_files: usize,
}

impl AssetStore {
    pub fn new(setting: &Upload) -> Self {
        Self {
            root: setting.dir.clone(),
            url_prefix: setting.url_prefix.trim_end_matches('/').to_owned(),
            max_size: setting.max_size,
            max_files: setting.max_files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn too_large(&self) -> Error {
        Error::Rejected(format!(
            "File too large, max size is {} bytes",
            self.max_size
        ))
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Read a multipart body, collecting at most `limit` images from the
    /// `files` fields and every other field as text.
    ///
    /// Type, size and count limits are checked while reading, so a rejected
    /// upload never reaches the disk.
    pub async fn read_form(
        &self,
        mut payload: Multipart,
        files: &[&str],
        limit: usize,
    ) -> Result<UploadForm> {
        let limit = limit.min(self.max_files);
        let mut form = UploadForm::default();
        while let Some(mut field) = payload.try_next().await? {
            let (name, filename) = {
                let cd = field.content_disposition();
                (
                    cd.get_name().unwrap_or_default().to_owned(),
                    cd.get_filename().map(ToOwned::to_owned),
                )
            };

            match filename {
                Some(original_name) if files.contains(&name.as_str()) => {
                    let content_type = field
                        .content_type()
                        .map(|m| m.essence_str().to_owned())
                        .unwrap_or_default();
                    if !accepts(&original_name, &content_type) {
                        return Err(Error::Rejected("Only image files are allowed".to_owned()));
                    }
                    if form.files.len() >= limit {
                        return Err(Error::Rejected(format!(
                            "Too many files, at most {} per upload",
                            limit
                        )));
                    }
                    let mut bytes = Vec::new();
                    while let Some(chunk) = field.try_next().await? {
                        if bytes.len() + chunk.len() > self.max_size {
                            return Err(self.too_large());
                        }
                        bytes.extend_from_slice(&chunk);
                    }
                    if !bytes.is_empty() {
                        form.files.push(IncomingFile {
                            original_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                Some(_) => {
                    // unexpected file field
                    while field.try_next().await?.is_some() {}
                }
                None => {
                    let mut bytes = Vec::new();
                    while let Some(chunk) = field.try_next().await? {
                        if bytes.len() + chunk.len() > MAX_TEXT {
                            return Err(Error::Validation(format!("Field {} is too long", name)));
                        }
                        bytes.extend_from_slice(&chunk);
                    }
                    form.text
                        .insert(name, String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }
        Ok(form)
    }

    fn file_path(&self, folder: &str, filename: &str) -> Result<PathBuf> {
        if Path::new(filename).file_name().and_then(|f| f.to_str()) != Some(filename) {
            return Err(Error::Validation(format!("Invalid file name {}", filename)));
        }
        Ok(self.root.join(folder).join(filename))
    }

    /// Write an accepted file under a generated name.
    pub async fn store(&self, folder: &str, file: &IncomingFile) -> Result<Stored> {
        let ext = file
            .extension()
            .filter(|e| EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| Error::Rejected("Only image files are allowed".to_owned()))?;
        if file.bytes.len() > self.max_size {
            return Err(self.too_large());
        }

        let filename = generate_name(&ext);
        let dir = self.root.join(folder);
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&filename), &file.bytes).await?;
        Ok(Stored {
            path: format!("{}/{}/{}", self.url_prefix, folder, filename),
            filename,
        })
    }

    /// Remove a stored file, a missing file is not an error.
    pub async fn remove(&self, folder: &str, filename: &str) -> Result<()> {
        let path = self.file_path(folder, filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn exists(&self, folder: &str, filename: &str) -> bool {
        match self.file_path(folder, filename) {
            Ok(path) => fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Remove files in `folder` that are not in `keep`, returns the number removed.
    pub async fn sweep(&self, folder: &str, keep: &HashSet<String>) -> Result<usize> {
        let dir = self.root.join(folder);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if keep.contains(&name) {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(err) => warn!(error = err.to_string(), file = %name, "sweep failed"),
            }
        }
        if removed > 0 {
            info!(folder, removed, "removed orphan files");
        }
        Ok(removed)
    }
}
