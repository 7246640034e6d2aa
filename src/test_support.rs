//! Fixture archive builders and process helpers shared by unit and
//! behaviour tests.

use crate::archive::ArchiveKind;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One entry to place in a fixture archive.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    /// A directory entry; the name should end with `/`.
    Dir(&'a str),
    /// A directory entry carrying an explicit Unix mode.
    DirWithMode(&'a str, u32),
    /// A regular file with its contents.
    File(&'a str, &'a [u8]),
}

/// Writes an archive of `kind` containing `entries` to `path`.
///
/// # Errors
///
/// Returns an I/O error when the file cannot be written or `kind` is
/// [`ArchiveKind::Unknown`].
pub fn write_archive(path: &Path, kind: ArchiveKind, entries: &[Entry<'_>]) -> io::Result<()> {
    let file = File::create(path)?;
    match kind {
        ArchiveKind::Zip => write_zip(file, entries),
        ArchiveKind::TarGz => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            write_tar(encoder, entries)?.finish().map(drop)
        }
        ArchiveKind::TarBz2 => {
            let encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
            write_tar(encoder, entries)?.finish().map(drop)
        }
        ArchiveKind::TarXz => {
            let encoder = xz2::write::XzEncoder::new(file, 6);
            write_tar(encoder, entries)?.finish().map(drop)
        }
        ArchiveKind::Unknown => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot build an archive of unknown kind",
        )),
    }
}

fn write_zip(file: File, entries: &[Entry<'_>]) -> io::Result<()> {
    let mut writer = zip::ZipWriter::new(file);
    for entry in entries {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        match *entry {
            Entry::Dir(name) => writer.add_directory(name, options).map_err(io::Error::other)?,
            Entry::DirWithMode(name, mode) => writer
                .add_directory(name, options.unix_permissions(mode))
                .map_err(io::Error::other)?,
            Entry::File(name, data) => {
                writer.start_file(name, options).map_err(io::Error::other)?;
                writer.write_all(data)?;
            }
        }
    }
    writer.finish().map_err(io::Error::other)?;
    Ok(())
}

fn write_tar<W: Write>(inner: W, entries: &[Entry<'_>]) -> io::Result<W> {
    let mut builder = tar::Builder::new(inner);
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        match *entry {
            Entry::Dir(name) => append_dir(&mut builder, &mut header, name, 0o755)?,
            Entry::DirWithMode(name, mode) => append_dir(&mut builder, &mut header, name, mode)?,
            Entry::File(name, data) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(0o644);
                header.set_size(data.len() as u64);
                builder.append_data(&mut header, name, data)?;
            }
        }
    }
    builder.into_inner()
}

fn append_dir<W: Write>(
    builder: &mut tar::Builder<W>,
    header: &mut tar::Header,
    name: &str,
    mode: u32,
) -> io::Result<()> {
    header.set_entry_type(tar::EntryType::Directory);
    header.set_mode(mode);
    header.set_size(0);
    builder.append_data(header, name, io::empty())
}

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Serialises tests that change the process working directory.
#[must_use]
pub fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}
