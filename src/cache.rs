//! Working and output file placement inside the private cache directory.
//!
//! Every intermediate file a resize produces lives under one cache root that
//! the caller injects via [`CacheManager::new`]. Nothing here reads ambient
//! process state.
//!
//! # Naming
//!
//! Temporary files are named `rn_image_resizer_lib_temp_<uuid-v4>.<ext>`. The
//! random component is the only thing keeping two concurrent calls apart; there
//! is no locking.
//!
//! # Working copy
//!
//! A source whose directory already lies under the cache root (for example
//! the output of a previous resize, with or without a `file://` prefix) is
//! decoded in place. Any other source is first copied byte-for-byte into the
//! cache root, so the caller's file is never touched.
//!
//! # Output placement
//!
//! Output is written to `<cache_root><relative_dir>/<temp name>.<format>`,
//! where `relative_dir` is the source's directory below the cache root (empty
//! for sources outside it). When an output directory is requested, the
//! written file is copied there under a second temp name and that copy is
//! what gets reported. The cache copy is left behind; the caller owns the
//! lifecycle of both directories.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Prefix shared by every temp file this crate creates.
pub const TEMP_PREFIX: &str = "rn_image_resizer_lib_temp_";

const FILE_SCHEME: &str = "file://";

/// Strip a leading `file://` so a URI and a plain path compare equal.
pub fn strip_file_scheme(source_ref: &str) -> &str {
    source_ref.strip_prefix(FILE_SCHEME).unwrap_or(source_ref)
}

/// Local-file URI for a path.
pub fn to_file_uri(path: &Path) -> String {
    format!("{}{}", FILE_SCHEME, path.display())
}

/// File name from a URI: the text after the last `/`.
///
/// Only local-file URIs are resolved; any other scheme yields `None`.
pub fn name_from_uri(uri: &str) -> Option<String> {
    if !uri.starts_with("file") {
        return None;
    }
    uri.rsplit('/').next().map(str::to_string)
}

/// Fresh collision-resistant temp file name with the given extension.
pub fn temp_file_name(extension: &str) -> String {
    format!("{}{}.{}", TEMP_PREFIX, Uuid::new_v4(), extension)
}

/// The file the codec decodes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingFile {
    /// Source already lives under the cache root and is read where it is.
    InPlace(PathBuf),
    /// Source was duplicated into the cache root.
    Copied { source: PathBuf, copy: PathBuf },
}

impl WorkingFile {
    pub fn path(&self) -> &Path {
        match self {
            WorkingFile::InPlace(path) => path,
            WorkingFile::Copied { copy, .. } => copy,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, WorkingFile::Copied { .. })
    }

    /// Read the whole working file.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(self.path())
    }
}

/// Where the reported output ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Cache(PathBuf),
    Relocated(PathBuf),
}

impl Location {
    pub fn path(&self) -> &Path {
        match self {
            Location::Cache(path) | Location::Relocated(path) => path,
        }
    }

    pub fn is_relocated(&self) -> bool {
        matches!(self, Location::Relocated(_))
    }
}

/// Absolute form of `path` with `.` dropped and `..` applied to the prefix.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// File facts gathered once the output is in its final place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedOutput {
    pub location: Location,
    pub uri: String,
    pub size: u64,
    pub name: Option<String>,
}

/// Owns naming and placement of files under one cache root.
#[derive(Debug, Clone)]
pub struct CacheManager {
    root: PathBuf,
}

impl CacheManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of `source` relative to the cache root, if it lies under it.
    ///
    /// Both sides are made absolute and `.`/`..` are resolved lexically first,
    /// so `./cache/x.png` and `cache/x.png` agree. Symlinks are not followed.
    fn relative_dir(&self, source: &Path) -> Option<PathBuf> {
        let dir = normalize(source).parent()?.to_path_buf();
        dir.strip_prefix(normalize(&self.root))
            .ok()
            .map(Path::to_path_buf)
    }

    /// Whether `source_ref` (path or `file://` URI) points inside the cache root.
    pub fn is_cached(&self, source_ref: &str) -> bool {
        self.relative_dir(Path::new(strip_file_scheme(source_ref)))
            .is_some()
    }

    /// Decide which file the codec reads: the source itself, or a cache copy.
    pub fn prepare_working_copy(&self, source_ref: &str) -> io::Result<WorkingFile> {
        let source = PathBuf::from(strip_file_scheme(source_ref));

        if self.is_cached(source_ref) {
            debug!(path = %source.display(), "source already in cache, reading in place");
            return Ok(WorkingFile::InPlace(source));
        }

        fs::create_dir_all(&self.root)?;
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("tmp");
        let copy = self.root.join(temp_file_name(extension));
        fs::copy(&source, &copy)?;
        debug!(
            source = %source.display(),
            copy = %copy.display(),
            "copied source into cache"
        );

        Ok(WorkingFile::Copied { source, copy })
    }

    /// Fresh output path for `format`, mirroring the source's directory under the root.
    pub fn allocate_output_path(&self, source_ref: &str, format: &str) -> PathBuf {
        let dir = match self.relative_dir(Path::new(strip_file_scheme(source_ref))) {
            Some(relative) => self.root.join(relative),
            None => self.root.clone(),
        };
        dir.join(temp_file_name(format))
    }

    /// Write encoded bytes to an allocated output path, replacing any content.
    pub fn write_output(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        file.flush()
    }

    /// Open the written output, optionally relocate it, and gather its facts.
    ///
    /// The output is opened with create semantics, so a path nothing was
    /// written to still yields an (empty) file rather than an error.
    pub fn finalize(
        &self,
        cache_path: &Path,
        format: &str,
        output_dir: Option<&Path>,
    ) -> io::Result<FinalizedOutput> {
        let mut written = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(cache_path)?;

        let (location, size) = match output_dir {
            None => {
                let size = written.metadata()?.len();
                (Location::Cache(cache_path.to_path_buf()), size)
            }
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let dest = dir.join(temp_file_name(format));
                let mut relocated = File::create(&dest)?;
                io::copy(&mut written, &mut relocated)?;
                relocated.sync_all()?;
                let size = relocated.metadata()?.len();
                debug!(
                    from = %cache_path.display(),
                    to = %dest.display(),
                    "relocated output"
                );
                (Location::Relocated(dest), size)
            }
        };

        let uri = to_file_uri(location.path());
        let name = name_from_uri(&uri);

        Ok(FinalizedOutput {
            location,
            uri,
            size,
            name,
        })
    }
}
