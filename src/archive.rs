//! Archive extraction and layout normalization.
//!
//! Template archives come in two conventions: everything wrapped in a single
//! root folder (GitHub zipballs, `git archive --prefix`), or files flat at the
//! top level. [`ArchiveNormalizer::extract`] hides the difference and always
//! produces exactly one directory, named after the archive or as requested,
//! that holds the template files directly.
//!
//! Extraction is destructive: a directory already occupying the target name is
//! removed first, so re-running never merges with stale content.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path};

use crate::output::echo_command;

/// Archive formats recognised by file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.zip`
    Zip,
    /// `.tgz` or `.tar.gz`
    TarGz,
    /// `.tar.bz2`
    TarBz2,
    /// `.tar.xz`
    TarXz,
    /// Anything else.
    Unknown,
}

const SUFFIXES: [(&str, ArchiveKind); 5] = [
    (".zip", ArchiveKind::Zip),
    (".tgz", ArchiveKind::TarGz),
    (".tar.gz", ArchiveKind::TarGz),
    (".tar.bz2", ArchiveKind::TarBz2),
    (".tar.xz", ArchiveKind::TarXz),
];

impl ArchiveKind {
    /// Detects the kind of `file_name` by suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use boilerpl8::archive::ArchiveKind;
    ///
    /// assert_eq!(ArchiveKind::from_filename("tmpl.tar.gz"), ArchiveKind::TarGz);
    /// assert_eq!(ArchiveKind::from_filename("tmpl.rar"), ArchiveKind::Unknown);
    /// ```
    #[must_use]
    pub fn from_filename(file_name: &str) -> Self {
        split_suffix(file_name).map_or(Self::Unknown, |(kind, _)| kind)
    }

    /// Returns true for the tar family.
    #[must_use]
    pub const fn is_tar(self) -> bool {
        matches!(self, Self::TarGz | Self::TarBz2 | Self::TarXz)
    }

    /// Wraps `file` in the decompressor for this tar variant.
    fn tar_reader(self, file: File) -> io::Result<Box<dyn Read>> {
        match self {
            Self::TarGz => Ok(Box::new(flate2::read::GzDecoder::new(file))),
            Self::TarBz2 => Ok(Box::new(bzip2::read::BzDecoder::new(file))),
            Self::TarXz => Ok(Box::new(xz2::read::XzDecoder::new(file))),
            Self::Zip | Self::Unknown => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{self:?} is not a tar archive"),
            )),
        }
    }
}

/// Splits a recognised archive suffix off `file_name`, returning the kind and
/// the remaining base name.
///
/// # Examples
///
/// ```
/// use boilerpl8::archive::{ArchiveKind, split_suffix};
///
/// assert_eq!(split_suffix("keight.tgz"), Some((ArchiveKind::TarGz, "keight")));
/// assert_eq!(split_suffix("keight.tar"), None);
/// ```
#[must_use]
pub fn split_suffix(file_name: &str) -> Option<(ArchiveKind, &str)> {
    SUFFIXES.iter().find_map(|(suffix, kind)| {
        file_name
            .strip_suffix(suffix)
            .map(|base| (*kind, base))
    })
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The file name carries none of the recognised suffixes.
    #[error("{filename}: expected '*.zip', '*.tgz', '*.tar.gz', '*.tar.bz2' or '*.tar.xz'")]
    UnsupportedArchiveFormat {
        /// The archive file name.
        filename: String,
    },

    /// Reading the archive or rearranging the extracted files failed.
    #[error("failed to extract {path}: {source}")]
    ExtractionFailed {
        /// The archive or directory being processed.
        path: Utf8PathBuf,
        /// The underlying cause.
        #[source]
        source: io::Error,
    },
}

fn failed(path: &Utf8Path) -> impl FnOnce(io::Error) -> ExtractionError + '_ {
    move |source| ExtractionError::ExtractionFailed {
        path: path.to_owned(),
        source,
    }
}

/// The directory produced by a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDirectory {
    /// Directory name relative to the working directory.
    pub name: String,
    /// Full path of the directory.
    pub path: Utf8PathBuf,
}

/// Extracts archives into normalized directories under a working directory.
#[derive(Debug, Clone)]
pub struct ArchiveNormalizer {
    workdir: Utf8PathBuf,
}

impl ArchiveNormalizer {
    /// Creates a normalizer that places its output under `workdir`.
    #[must_use]
    pub const fn new(workdir: Utf8PathBuf) -> Self {
        Self { workdir }
    }

    /// The directory output is placed under.
    #[must_use]
    pub fn workdir(&self) -> &Utf8Path {
        &self.workdir
    }

    /// Extracts `archive` into `<workdir>/<name>`.
    ///
    /// `name` is `target_name` when given, otherwise the archive file name
    /// without its suffix. A zip whose only top-level entry is a directory,
    /// or a tarball declaring a single root directory, has that level
    /// collapsed so the files sit directly inside `<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsupportedArchiveFormat`] before touching
    /// the filesystem when the suffix is not recognised, and
    /// [`ExtractionError::ExtractionFailed`] for any I/O or decoding failure.
    /// A name that is not a single plain path component (`.`, `..`, an
    /// absolute path or one containing a separator) also fails before
    /// anything is removed.
    pub fn extract(
        &self,
        archive: &Utf8Path,
        target_name: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<NormalizedDirectory, ExtractionError> {
        let file_name = archive.file_name().unwrap_or(archive.as_str());
        let (kind, base) =
            split_suffix(file_name).ok_or_else(|| ExtractionError::UnsupportedArchiveFormat {
                filename: file_name.to_owned(),
            })?;
        let name = target_name
            .filter(|name| !name.is_empty())
            .unwrap_or(base)
            .to_owned();
        if name.is_empty() {
            return Err(failed(archive)(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot derive a directory name from the archive file name",
            )));
        }
        validate_target_name(&name).map_err(failed(archive))?;

        let file = File::open(archive).map_err(failed(archive))?;
        let layout = Layout::new(&self.workdir, &name);
        layout.clear(out)?;

        let root = if kind.is_tar() {
            echo_command(out, format_args!("tar xf {archive}"));
            let reader = kind.tar_reader(file).map_err(failed(archive))?;
            unpack_tar(reader, &layout.staging).map_err(failed(archive))?
        } else {
            echo_command(
                out,
                format_args!("unzip -q -d {} {archive}", layout.staging_name),
            );
            unpack_zip(file, &layout.staging).map_err(failed(archive))?;
            sole_directory(&layout.staging).map_err(failed(&layout.staging))?
        };

        layout.promote(root.as_deref(), out)?;
        Ok(NormalizedDirectory {
            name,
            path: layout.target,
        })
    }
}

/// Accepts only a name that resolves to a direct child of the workdir.
fn validate_target_name(name: &str) -> io::Result<()> {
    let mut components = Utf8Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    );
    if single && !name.contains(['/', '\\']) {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{name}: target must be a single directory name"),
    ))
}

/// Paths involved in one extraction.
struct Layout {
    name: String,
    staging_name: String,
    target: Utf8PathBuf,
    staging: Utf8PathBuf,
}

impl Layout {
    fn new(workdir: &Utf8Path, name: &str) -> Self {
        let staging_name = format!("{name}.tmp");
        Self {
            name: name.to_owned(),
            target: workdir.join(name),
            staging: workdir.join(&staging_name),
            staging_name,
        }
    }

    /// Destroys any previous target and leftover staging directory.
    fn clear(&self, out: &mut dyn Write) -> Result<(), ExtractionError> {
        for (path, shown) in [
            (&self.target, &self.name),
            (&self.staging, &self.staging_name),
        ] {
            if remove_existing(path).map_err(failed(path))? {
                echo_command(out, format_args!("rm -rf {shown}"));
            }
        }
        Ok(())
    }

    /// Moves the extracted payload into place. With `root`, the single inner
    /// directory becomes the target and the staging wrapper is discarded;
    /// without it, the staging directory itself becomes the target.
    fn promote(&self, root: Option<&str>, out: &mut dyn Write) -> Result<(), ExtractionError> {
        match root {
            Some(root) => {
                let inner = self.staging.join(root);
                echo_command(
                    out,
                    format_args!("mv {}/{root} {}", self.staging_name, self.name),
                );
                fs::rename(&inner, &self.target).map_err(failed(&inner))?;
                echo_command(out, format_args!("rm -rf {}", self.staging_name));
                fs::remove_dir_all(&self.staging).map_err(failed(&self.staging))?;
                log::info!("collapsed archive root {root} into {}", self.name);
            }
            None => {
                echo_command(out, format_args!("mv {} {}", self.staging_name, self.name));
                fs::rename(&self.staging, &self.target).map_err(failed(&self.staging))?;
                log::info!("archive has no single root; kept layout as {}", self.name);
            }
        }
        Ok(())
    }
}

/// Removes a file or directory tree at `path`, reporting whether anything
/// was there.
fn remove_existing(path: &Utf8Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map(|()| true),
        Ok(_) => fs::remove_file(path).map(|()| true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn unpack_zip(file: File, staging: &Utf8Path) -> io::Result<()> {
    fs::create_dir_all(staging)?;
    let mut archive = zip::ZipArchive::new(file).map_err(io::Error::other)?;
    archive.extract(staging).map_err(io::Error::other)
}

/// Returns the name of the only entry in `dir` when that entry is a
/// directory.
fn sole_directory(dir: &Utf8Path) -> io::Result<Option<String>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    if entries.len() != 1 {
        return Ok(None);
    }
    let Some(entry) = entries.pop() else {
        return Ok(None);
    };
    if !entry.file_type()?.is_dir() {
        return Ok(None);
    }
    Ok(entry.file_name().into_string().ok())
}

/// Unpacks a tar stream into `staging`, returning the root directory the
/// archive declares, if any.
///
/// Directory entries are unpacked after every file, deepest first, so a
/// read-only directory mode never blocks writing its own contents.
fn unpack_tar(reader: Box<dyn Read>, staging: &Utf8Path) -> io::Result<Option<String>> {
    fs::create_dir_all(staging)?;
    let mut archive = tar::Archive::new(reader);
    let mut root = DeclaredRoot::default();
    let mut directories = Vec::new();

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let kind = entry.header().entry_type();
        if kind.is_pax_global_extensions() || kind.is_pax_local_extensions() {
            continue;
        }
        let entry_path = entry.path()?.into_owned();
        validate_entry_path(&entry_path)?;
        root.observe(&entry_path, kind.is_dir());

        if kind.is_dir() {
            directories.push((entry_path, entry));
            continue;
        }
        if !entry.unpack_in(staging)? {
            return Err(traversal(&entry_path));
        }
    }

    directories.sort_by(|(a, _), (b, _)| b.cmp(a));
    for (entry_path, mut entry) in directories {
        if !entry.unpack_in(staging)? {
            return Err(traversal(&entry_path));
        }
    }

    Ok(root.name().map(str::to_owned))
}

/// Tracks the top-level names seen in a tarball.
#[derive(Debug, Default)]
struct DeclaredRoot {
    tops: BTreeSet<String>,
    nested: bool,
}

impl DeclaredRoot {
    fn observe(&mut self, path: &Path, is_dir: bool) {
        let mut parts = path.components().filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        });
        let Some(first) = parts.next() else {
            return;
        };
        self.tops.insert(first.to_string_lossy().into_owned());
        if is_dir || parts.next().is_some() {
            self.nested = true;
        }
    }

    fn name(&self) -> Option<&str> {
        if self.tops.len() == 1 && self.nested {
            self.tops.first().map(String::as_str)
        } else {
            None
        }
    }
}

/// Rejects entry paths that are absolute or climb out via `..`.
fn validate_entry_path(path: &Path) -> io::Result<()> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir));
    if escapes {
        return Err(traversal(path));
    }
    Ok(())
}

fn traversal(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("path traversal detected: {}", path.display()),
    )
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
