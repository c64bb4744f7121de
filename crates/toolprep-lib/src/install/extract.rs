use crate::catalog::PayloadKind;
use crate::error::ToolPrepError;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Xz,
    Bzip2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar(Compression),
}

/// Identifies an archive from its first bytes.
pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] => Some(ArchiveFormat::Zip),
        [0x1F, 0x8B, ..] => Some(ArchiveFormat::Tar(Compression::Gzip)),
        [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, ..] => Some(ArchiveFormat::Tar(Compression::Xz)),
        [b'B', b'Z', b'h', ..] => Some(ArchiveFormat::Tar(Compression::Bzip2)),
        _ if data.len() >= 263 && data[257..262] == *b"ustar" => Some(ArchiveFormat::Tar(Compression::None)),
        _ => None,
    }
}

/// What to unpack and where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractRequest {
    pub archive: PathBuf,
    pub destination: PathBuf,
    pub payload: PayloadKind,
    /// Glob naming the directory whose contents become the destination.
    pub strip_pattern: Option<String>,
    pub required_files: Vec<String>,
}

pub trait ArchiveExtractor: Send + Sync {
    /// Replaces the contents of the destination with the unpacked archive.
    fn extract(&self, request: &ExtractRequest) -> Result<(), ToolPrepError>;
}

/// Unpacks tar (plain, gzip, xz, bzip2) and zip archives with the archive crates.
#[derive(Clone, Debug, Default)]
pub struct ArchiveUnpacker;

impl ArchiveExtractor for ArchiveUnpacker {
    fn extract(&self, request: &ExtractRequest) -> Result<(), ToolPrepError> {
        let archive = request.archive.as_path();
        let destination = request.destination.as_path();
        let mut file = File::open(archive).map_err(|e| extraction_error(archive, e))?;

        let offset = match request.payload {
            PayloadKind::Archive => 0,
            PayloadKind::EmbeddedArchive { marker } => payload_offset(&mut file, archive, marker)?,
        };
        let format = sniff(&mut file, archive, offset)?;
        tracing::debug!(archive = %archive.display(), ?format, offset, "Unpacking");

        empty_dir(destination)?;
        let parent = destination
            .parent()
            .ok_or_else(|| ToolPrepError::filesystem(destination, "install directory has no parent"))?;
        let staging = tempfile::Builder::new()
            .prefix(".toolprep-")
            .tempdir_in(parent)
            .map_err(|e| ToolPrepError::filesystem(parent, e))?;

        match format {
            ArchiveFormat::Tar(compression) => unpack_tar(file, compression, archive, staging.path())?,
            ArchiveFormat::Zip => {
                let mut zip = zip::ZipArchive::new(file).map_err(|e| extraction_error(archive, e))?;
                zip.extract(staging.path()).map_err(|e| extraction_error(archive, e))?;
            }
        }

        let root = match &request.strip_pattern {
            Some(pattern) => stripped_root(staging.path(), pattern, archive)?,
            None => staging.path().to_path_buf(),
        };
        move_children(&root, destination)?;
        check_required_files(destination, &request.required_files)
    }
}

fn extraction_error(path: &Path, reason: impl ToString) -> ToolPrepError {
    ToolPrepError::Extraction {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Offset of the first byte after the line starting with `marker`.
fn payload_offset(file: &mut File, archive: &Path, marker: &str) -> Result<u64, ToolPrepError> {
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let mut offset = 0u64;
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| extraction_error(archive, e))?;
        if read == 0 {
            return Err(extraction_error(archive, format!("no line starting with {marker}")));
        }
        offset += read as u64;
        if line.starts_with(marker.as_bytes()) {
            return Ok(offset);
        }
    }
}

fn sniff(file: &mut File, archive: &Path, offset: u64) -> Result<ArchiveFormat, ToolPrepError> {
    let mut header = Vec::with_capacity(512);
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| extraction_error(archive, e))?;
    Read::by_ref(file)
        .take(512)
        .read_to_end(&mut header)
        .map_err(|e| extraction_error(archive, e))?;
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| extraction_error(archive, e))?;
    detect_format(&header).ok_or_else(|| extraction_error(archive, "unrecognised archive format"))
}

fn unpack_tar(file: File, compression: Compression, archive: &Path, staging: &Path) -> Result<(), ToolPrepError> {
    let reader: Box<dyn Read> = match compression {
        Compression::None => Box::new(file),
        Compression::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
        Compression::Xz => Box::new(xz2::read::XzDecoder::new(file)),
        Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
    };
    let mut tar = tar::Archive::new(reader);
    tar.set_preserve_permissions(true);

    for entry in tar.entries().map_err(|e| extraction_error(archive, e))? {
        let mut entry = entry.map_err(|e| extraction_error(archive, e))?;
        let path = entry.path().map_err(|e| extraction_error(archive, e))?.into_owned();
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(extraction_error(
                archive,
                format!("entry {} escapes the install directory", path.display()),
            ));
        }
        entry
            .unpack_in(staging)
            .map_err(|e| extraction_error(archive, format!("{}: {e}", path.display())))?;
    }
    Ok(())
}

/// First directory of the unpacked tree matching `pattern`.
fn stripped_root(staging: &Path, pattern: &str, archive: &Path) -> Result<PathBuf, ToolPrepError> {
    let staging_str = staging
        .to_str()
        .ok_or_else(|| ToolPrepError::filesystem(staging, "path is not valid UTF-8"))?;
    let full_pattern = format!("{}/{}", glob::Pattern::escape(staging_str), pattern);
    let paths = glob::glob(&full_pattern).map_err(|e| extraction_error(archive, format!("{pattern}: {e}")))?;
    paths
        .filter_map(Result::ok)
        .find(|path| path.is_dir())
        .ok_or_else(|| extraction_error(archive, format!("no top-level directory matches {pattern}")))
}

fn empty_dir(dir: &Path) -> Result<(), ToolPrepError> {
    if dir.symlink_metadata().is_ok() {
        tracing::debug!(dir = %dir.display(), "Removing previous installation");
        std::fs::remove_dir_all(dir).map_err(|e| ToolPrepError::filesystem(dir, e))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| ToolPrepError::filesystem(dir, e))
}

fn move_children(from: &Path, to: &Path) -> Result<(), ToolPrepError> {
    for child in std::fs::read_dir(from).map_err(|e| ToolPrepError::filesystem(from, e))? {
        let child = child.map_err(|e| ToolPrepError::filesystem(from, e))?;
        let target = to.join(child.file_name());
        std::fs::rename(child.path(), &target).map_err(|e| ToolPrepError::filesystem(&target, e))?;
    }
    Ok(())
}

fn check_required_files(install_dir: &Path, required_files: &[String]) -> Result<(), ToolPrepError> {
    let missing: Vec<String> = required_files
        .iter()
        .filter(|file| !install_dir.join(file).exists())
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ToolPrepError::MissingRequiredFiles {
            install_dir: install_dir.to_path_buf(),
            missing,
        })
    }
}
