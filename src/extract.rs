//! Archive extraction: pull weather files out of downloaded archives.
//!
//! ZIP archives are the common case; plain and gzipped tarballs are handled
//! the same way. Only entries whose name ends with the configured suffix are
//! written, with their names (including sub-paths) preserved.

use crate::error::ExtractError;
use crate::util::{display_name, ends_with_ignore_case, list_files_with_suffix};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{error, info, warn};

/// Default suffix of the entries to extract.
pub const EPW_SUFFIX: &str = ".epw";

const ZIP_SUFFIXES: &[&str] = &[".zip"];
const TAR_SUFFIXES: &[&str] = &[".tar"];
const TAR_GZ_SUFFIXES: &[&str] = &[".tar.gz", ".tgz"];

/// Supported archive containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Detects the container from the file name, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let matches = |suffixes: &[&str]| suffixes.iter().any(|s| ends_with_ignore_case(name, s));
        if matches(ZIP_SUFFIXES) {
            Some(Self::Zip)
        } else if matches(TAR_GZ_SUFFIXES) {
            Some(Self::TarGz)
        } else if matches(TAR_SUFFIXES) {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// What to extract and where.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Directory scanned for archives.
    pub input_dir: PathBuf,
    /// Directory entries are extracted into.
    pub output_dir: PathBuf,
    /// Suffix an entry name must end with to be extracted.
    pub entry_suffix: String,
}

impl ExtractConfig {
    /// Extracts `.epw` entries from `input_dir` into `input_dir/epw`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            output_dir: input_dir.join("epw"),
            input_dir,
            entry_suffix: EPW_SUFFIX.to_string(),
        }
    }
}

/// Totals for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Archives opened and read to the end.
    pub archives_processed: usize,
    /// Archives that could not be read.
    pub archives_failed: usize,
    /// Entries written to the output directory.
    pub entries_extracted: usize,
}

/// Lists the supported archives directly inside `dir`, sorted.
///
/// # Errors
///
/// [`ExtractError::NoArchives`] when the directory holds none.
pub fn list_archives(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let suffixes: Vec<&str> = ZIP_SUFFIXES
        .iter()
        .chain(TAR_SUFFIXES)
        .chain(TAR_GZ_SUFFIXES)
        .copied()
        .collect();
    let archives = list_files_with_suffix(dir, &suffixes)?;

    if archives.is_empty() {
        warn!("No archive files found in the selected path");
        return Err(ExtractError::NoArchives {
            dir: dir.to_path_buf(),
        });
    }
    info!(
        "Found {} archive file(s) in the selected path ({})",
        archives.len(),
        dir.display()
    );
    Ok(archives)
}

/// Extracts the entries of `archive` whose name ends with `suffix`.
///
/// # Returns
///
/// The paths written, in archive order. An archive without matching
/// entries yields an empty list.
pub fn extract_matching_entries(
    archive: &Path,
    output_dir: &Path,
    suffix: &str,
) -> Result<Vec<PathBuf>, ExtractError> {
    let mut written = Vec::new();
    extract_into(archive, output_dir, suffix, &mut written)?;
    Ok(written)
}

/// Like [`extract_matching_entries`], but records each written path in
/// `written` as it goes, so entries finished before an error are kept.
fn extract_into(
    archive: &Path,
    output_dir: &Path,
    suffix: &str,
    written: &mut Vec<PathBuf>,
) -> Result<(), ExtractError> {
    let kind = ArchiveKind::from_path(archive).ok_or_else(|| ExtractError::Archive {
        archive: archive.to_path_buf(),
        reason: "unsupported archive type".to_string(),
    })?;
    let file = File::open(archive)?;

    match kind {
        ArchiveKind::Zip => extract_zip(file, archive, output_dir, suffix, written)?,
        ArchiveKind::Tar => extract_tar(file, archive, output_dir, suffix, written)?,
        ArchiveKind::TarGz => {
            extract_tar(GzDecoder::new(file), archive, output_dir, suffix, written)?
        }
    }

    info!(
        "Extracted {} file(s) matching '{}' from '{}'",
        written.len(),
        suffix,
        display_name(archive)
    );
    Ok(())
}

fn archive_error(archive: &Path, reason: impl std::fmt::Display) -> ExtractError {
    ExtractError::Archive {
        archive: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn extract_zip(
    file: File,
    archive_path: &Path,
    output_dir: &Path,
    suffix: &str,
    written: &mut Vec<PathBuf>,
) -> Result<(), ExtractError> {
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(archive_path, e))?;

    let mut matching = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| archive_error(archive_path, e))?;
        if ends_with_ignore_case(entry.name(), suffix) {
            matching.push(index);
        }
    }
    info!(
        "Found {} compressed file(s) matching '{}' in '{}'",
        matching.len(),
        suffix,
        display_name(archive_path)
    );

    for index in matching {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| archive_error(archive_path, e))?;
        if entry.is_dir() {
            continue;
        }
        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!("Skipping entry with unsafe path '{}'", entry.name());
            continue;
        };

        let destination = output_dir.join(relative);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&destination)?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| archive_error(archive_path, e))?;

        info!("Completed the extraction of '{}'", entry.name());
        written.push(destination);
    }
    Ok(())
}

fn extract_tar<R: Read>(
    reader: R,
    archive_path: &Path,
    output_dir: &Path,
    suffix: &str,
    written: &mut Vec<PathBuf>,
) -> Result<(), ExtractError> {
    let mut archive = Archive::new(reader);
    std::fs::create_dir_all(output_dir)?;

    for entry in archive.entries().map_err(|e| archive_error(archive_path, e))? {
        let mut entry = entry.map_err(|e| archive_error(archive_path, e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .map_err(|e| archive_error(archive_path, e))?
            .into_owned();
        let name = relative.to_string_lossy().into_owned();
        if !ends_with_ignore_case(&name, suffix) {
            continue;
        }

        // unpack_in refuses paths escaping the output directory
        if !entry
            .unpack_in(output_dir)
            .map_err(|e| archive_error(archive_path, e))?
        {
            warn!("Skipping entry with unsafe path '{}'", name);
            continue;
        }
        info!("Completed the extraction of '{}'", name);
        written.push(output_dir.join(relative));
    }
    Ok(())
}

/// Extracts matching entries from every archive in `config.input_dir`.
///
/// Archives are processed in sorted order. An archive that cannot be read
/// is logged and counted as failed; the remaining archives are still
/// processed. Entries written before an archive failed still count
/// towards `entries_extracted`.
///
/// # Errors
///
/// Only when no archive can be listed at all.
pub fn extract_all(config: &ExtractConfig) -> Result<ExtractSummary, ExtractError> {
    let archives = list_archives(&config.input_dir)?;
    let total = archives.len();
    let mut summary = ExtractSummary::default();

    for (index, archive) in archives.iter().enumerate() {
        info!(
            "({}/{}) Processing file '{}'",
            index + 1,
            total,
            display_name(archive)
        );
        let mut written = Vec::new();
        let result = extract_into(
            archive,
            &config.output_dir,
            &config.entry_suffix,
            &mut written,
        );
        summary.entries_extracted += written.len();

        match result {
            Ok(()) => {
                if written.is_empty() {
                    warn!(
                        "No '{}' entries in '{}'",
                        config.entry_suffix,
                        display_name(archive)
                    );
                }
                summary.archives_processed += 1;
            }
            Err(e) => {
                error!(
                    "({}/{}) Could not extract '{}' after {} file(s): {}",
                    index + 1,
                    total,
                    display_name(archive),
                    written.len(),
                    e
                );
                summary.archives_failed += 1;
            }
        }
        info!(
            "Running total: {} file(s) extracted",
            summary.entries_extracted
        );
    }

    info!(
        "Extracted {} file(s) from archive(s) in '{}' to directory '{}'",
        summary.entries_extracted,
        config.input_dir.display(),
        config.output_dir.display()
    );
    Ok(summary)
}
