//! File and folder copy with progress
//!
//! Sizes are measured up front, then bytes are streamed in fixed-size
//! chunks while cumulative progress is reported to a `ProgressSink`.
//!
//! A failed copy leaves whatever was already written at the destination;
//! there is no temporary file and no rename on completion.

use super::walker::{file_size, folder_size, WalkEntry, Walker};
use crate::error::{CopybarError, IoResultExt, Result};
use crate::progress::ProgressSink;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default chunk size for streamed copies (16 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// State and outcome of one copy operation
#[derive(Debug, Clone, Default)]
pub struct CopyTask {
    /// Source path
    pub source: PathBuf,
    /// Destination path
    pub destination: PathBuf,
    /// Bytes to copy, measured before copying started
    pub total_bytes: u64,
    /// Bytes copied so far
    pub copied_bytes: u64,
    /// Regular files copied
    pub files_copied: u64,
    /// Directories created at the destination
    pub directories_created: u64,
    /// Symbolic links recreated
    pub symlinks_copied: u64,
    /// Entries left out (unsupported on this platform)
    pub skipped: u64,
    /// Wall-clock duration
    pub duration: Duration,
}

impl CopyTask {
    fn new(source: &Path, destination: &Path, total_bytes: u64) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            total_bytes,
            ..Default::default()
        }
    }

    /// Throughput in bytes/second
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.copied_bytes as f64 / secs
        } else {
            0.0
        }
    }

    /// Print summary to console
    pub fn print_summary(&self) {
        println!("Copied:   {:?} -> {:?}", self.source, self.destination);
        println!(
            "Entries:  {} files, {} directories, {} symlinks, {} skipped",
            self.files_copied, self.directories_created, self.symlinks_copied, self.skipped
        );
        println!(
            "Bytes:    {}/{}",
            humansize::format_size(self.copied_bytes, humansize::BINARY),
            humansize::format_size(self.total_bytes, humansize::BINARY)
        );
        println!("Elapsed:  {:.1?}", self.duration);
        println!(
            "Speed:    {}/s",
            humansize::format_size(self.throughput() as u64, humansize::BINARY)
        );
    }
}

/// Chunked copier reporting progress as it goes
#[derive(Debug, Clone)]
pub struct Copier {
    chunk_size: usize,
}

impl Default for Copier {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl Copier {
    /// Create a copier streaming `chunk_size` bytes at a time
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Bytes read and written per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Copy a file or a folder, depending on what `source` is
    pub fn copy_path(
        &self,
        source: &Path,
        destination: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<CopyTask> {
        let metadata = match std::fs::metadata(source).with_path(source) {
            Ok(metadata) => metadata,
            Err(e) => {
                sink.abandon();
                return Err(e);
            }
        };

        if metadata.is_dir() {
            return self.copy_folder(source, destination, sink);
        }

        // A file copied onto an existing directory lands inside it.
        match source.file_name() {
            Some(name) if destination.is_dir() => {
                self.copy_file(source, &destination.join(name), sink)
            }
            _ => self.copy_file(source, destination, sink),
        }
    }

    /// Copy one file, reporting cumulative bytes after every chunk
    pub fn copy_file(
        &self,
        source: &Path,
        destination: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<CopyTask> {
        let result = self.copy_file_inner(source, destination, sink);
        if let Err(e) = &result {
            warn!(source = %source.display(), error = %e, "file copy aborted");
            sink.abandon();
        }
        result
    }

    fn copy_file_inner(
        &self,
        source: &Path,
        destination: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<CopyTask> {
        let start = Instant::now();
        let total = file_size(source)?;

        // Creating the destination would truncate the source first.
        if destination.exists() {
            let source_canonical = source.canonicalize().with_path(source)?;
            if destination.canonicalize().with_path(destination)? == source_canonical {
                return Err(CopybarError::invalid_argument(format!(
                    "source and destination are the same: {}",
                    source_canonical.display()
                )));
            }
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_path(parent)?;
        }

        info!(
            source = %source.display(),
            destination = %destination.display(),
            bytes = total,
            "copying file"
        );

        let mut task = CopyTask::new(source, destination, total);
        task.copied_bytes = self.stream(source, destination, |copied| {
            if total > 0 {
                sink.update(copied, total)
            } else {
                Ok(())
            }
        })?;
        task.files_copied = 1;

        if total == 0 {
            sink.complete()?;
        } else {
            sink.finish()?;
        }

        task.duration = start.elapsed();
        Ok(task)
    }

    /// Copy a directory tree, reporting cumulative bytes after every file
    pub fn copy_folder(
        &self,
        source: &Path,
        destination: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<CopyTask> {
        let result = self.copy_folder_inner(source, destination, sink);
        if let Err(e) = &result {
            warn!(source = %source.display(), error = %e, "folder copy aborted");
            sink.abandon();
        }
        result
    }

    fn copy_folder_inner(
        &self,
        source: &Path,
        destination: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<CopyTask> {
        let start = Instant::now();

        let source = source.canonicalize().with_path(source)?;
        if !source.is_dir() {
            return Err(CopybarError::invalid_argument(format!(
                "{} is not a directory",
                source.display()
            )));
        }

        std::fs::create_dir_all(destination).with_path(destination)?;
        // Keep a destination nested inside the source out of the walk.
        let dest_canonical = destination.canonicalize().with_path(destination)?;
        if dest_canonical == source {
            return Err(CopybarError::invalid_argument(format!(
                "source and destination are the same: {}",
                source.display()
            )));
        }

        let total = folder_size_excluding(&source, &dest_canonical)?;
        info!(
            source = %source.display(),
            destination = %destination.display(),
            bytes = total,
            "copying folder"
        );

        let mut task = CopyTask::new(&source, destination, total);
        if total == 0 {
            sink.complete()?;
        }
        // Progress never passes the pre-scanned total, even if files grow.
        let mut position = 0u64;

        for entry in Walker::new(&source)?.skipping(&dest_canonical) {
            let entry = entry?;
            let target = destination.join(entry.relative());

            match entry {
                WalkEntry::Dir { .. } => {
                    std::fs::create_dir_all(&target).with_path(&target)?;
                    task.directories_created += 1;
                    debug!(path = %target.display(), "created directory");
                }
                WalkEntry::File { path, size, .. } => {
                    let written = self.stream(&path, &target, |_| Ok(()))?;
                    task.copied_bytes += written;
                    task.files_copied += 1;
                    debug!(path = %path.display(), bytes = written, "copied file");
                    if written != size {
                        warn!(path = %path.display(), expected = size, written, "file changed while copying");
                    }
                    // Empty files leave the bar where it is.
                    if size > 0 && total > 0 {
                        position = (position + size).min(total);
                        sink.update(position, total)?;
                    }
                }
                WalkEntry::Symlink { path, target: link, .. } => {
                    if copy_symlink(&link, &target)? {
                        task.symlinks_copied += 1;
                    } else {
                        warn!(path = %path.display(), "symbolic links are not supported here, skipping");
                        task.skipped += 1;
                    }
                }
            }
        }

        sink.finish()?;
        task.duration = start.elapsed();
        info!(
            files = task.files_copied,
            bytes = task.copied_bytes,
            elapsed = ?task.duration,
            "folder copy finished"
        );
        Ok(task)
    }

    /// Stream `source` into `destination`, calling `on_chunk` with the
    /// cumulative byte count after every chunk written.
    fn stream<F>(&self, source: &Path, destination: &Path, mut on_chunk: F) -> Result<u64>
    where
        F: FnMut(u64) -> Result<()>,
    {
        let mut reader = File::open(source).with_path(source)?;
        let mut writer = File::create(destination).with_path(destination)?;
        let mut buf = vec![0u8; self.chunk_size];
        let mut copied = 0u64;

        loop {
            let n = read_chunk(&mut reader, &mut buf).with_path(source)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buf[..n]).with_path(destination)?;
            copied += n as u64;
            on_chunk(copied)?;
        }

        writer.flush().with_path(destination)?;
        Ok(copied)
    }
}

/// Fill `buf` unless the reader hits end of file first.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn folder_size_excluding(root: &Path, excluded: &Path) -> Result<u64> {
    if !excluded.starts_with(root) {
        return folder_size(root);
    }
    Walker::new(root)?
        .skipping(excluded)
        .try_fold(0u64, |total, entry| Ok(total + entry?.size()))
}

#[cfg(unix)]
fn copy_symlink(link: &Path, destination: &Path) -> Result<bool> {
    if std::fs::symlink_metadata(destination).is_ok() {
        std::fs::remove_file(destination).with_path(destination)?;
    }
    std::os::unix::fs::symlink(link, destination).with_path(destination)?;
    Ok(true)
}

#[cfg(not(unix))]
fn copy_symlink(_link: &Path, _destination: &Path) -> Result<bool> {
    Ok(false)
}
