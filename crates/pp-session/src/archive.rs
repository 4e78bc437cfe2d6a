//! Upload archive packaging
//!
//! The build output directory (the directory holding the runner artifact) is
//! zipped into `upload.zip` next to it before every create. Archives are
//! rebuilt on demand and never reused across invocations.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use pp_core::error::ArchiveError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the archive uploaded on create
pub const UPLOAD_ARCHIVE_NAME: &str = "upload.zip";

/// Name of the archive written by the download command
pub const DOWNLOAD_ARCHIVE_NAME: &str = "download.zip";

/// The runner artifact produced by the local build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    path: PathBuf,
}

impl BuildArtifact {
    /// Wrap the path of the built runner artifact
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the runner artifact itself
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the artifact; this is what gets uploaded
    pub fn output_dir(&self) -> Result<&Path, ArchiveError> {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ArchiveError::MissingParent(self.path.clone()))
    }

    /// Where the upload archive is written
    pub fn upload_archive_path(&self) -> Result<PathBuf, ArchiveError> {
        self.sibling_of_output_dir(UPLOAD_ARCHIVE_NAME)
    }

    /// Where the download command stores the remote archive
    pub fn download_path(&self) -> Result<PathBuf, ArchiveError> {
        self.sibling_of_output_dir(DOWNLOAD_ARCHIVE_NAME)
    }

    fn sibling_of_output_dir(&self, name: &str) -> Result<PathBuf, ArchiveError> {
        let output_dir = self.output_dir()?;
        let base = output_dir
            .parent()
            .ok_or_else(|| ArchiveError::MissingParent(output_dir.to_path_buf()))?;
        Ok(base.join(name))
    }
}

/// A freshly built upload archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactArchive {
    path: PathBuf,
    entries: usize,
}

impl ArtifactArchive {
    /// Zip the artifact's output directory on the blocking pool
    pub async fn build(artifact: &BuildArtifact) -> Result<Self, ArchiveError> {
        let artifact = artifact.clone();
        tokio::task::spawn_blocking(move || Self::build_blocking(&artifact))
            .await
            .map_err(|e| ArchiveError::Io(io::Error::other(e)))?
    }

    /// Zip the artifact's output directory on the current thread
    pub fn build_blocking(artifact: &BuildArtifact) -> Result<Self, ArchiveError> {
        let source = artifact.output_dir()?;
        let destination = artifact.upload_archive_path()?;

        tracing::debug!("Packaging {:?} into {:?}", source, destination);

        let file = File::create(&destination)?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut entries = 0;
        add_directory(&mut writer, source, source, options, &mut entries)?;

        writer
            .finish()
            .map_err(|e| ArchiveError::Zip(e.to_string()))?;

        tracing::debug!("Packaged {} entries into {:?}", entries, destination);
        Ok(Self {
            path: destination,
            entries,
        })
    }

    /// Location of the archive on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of file and directory entries written
    pub fn entries(&self) -> usize {
        self.entries
    }
}

/// Recursively add `dir` to the archive with names relative to `root`
fn add_directory<W: io::Write + io::Seek>(
    writer: &mut ZipWriter<W>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
    entries: &mut usize,
) -> Result<(), ArchiveError> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    // Stable ordering keeps archives reproducible
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let path = child.path();
        let name = entry_name(root, &path)?;

        // Follows symlinks so a linked directory is archived as a directory
        if fs::metadata(&path)?.is_dir() {
            writer
                .add_directory(format!("{}/", name), options)
                .map_err(|e| ArchiveError::Zip(e.to_string()))?;
            *entries += 1;
            add_directory(writer, root, &path, options, entries)?;
        } else {
            writer
                .start_file(name, options)
                .map_err(|e| ArchiveError::Zip(e.to_string()))?;
            let mut input = File::open(&path)?;
            io::copy(&mut input, writer)?;
            *entries += 1;
        }
    }

    Ok(())
}

/// Archive entry name: relative to `root`, always `/`-separated
fn entry_name(root: &Path, path: &Path) -> Result<String, ArchiveError> {
    let relative = path.strip_prefix(root).map_err(|e| {
        ArchiveError::Io(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
    })?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
