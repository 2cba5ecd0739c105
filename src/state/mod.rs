// Edit session
//
// This module owns one target file between scans: the bytes read from disk
// and their encoding, the current scan, and the edits queued against it.
// Applying writes a verbatim backup first and never touches the target if
// that fails.

use crate::models::{ApplyReport, BlendMode, Diagnostic, DrawEntry, EngineSettings, PendingChanges};
use crate::services::{
    self, ApplyOutcome, LineStore, ScanResult, SpecError, build_spec, build_transparency,
    build_unwrap,
};
use camino::{Utf8Path, Utf8PathBuf};
use encoding_rs::{EUC_KR, Encoding, UTF_8};
use std::io;
use thiserror::Error;

/// Byte-level access to the file system.
#[cfg_attr(test, mockall::automock)]
pub trait FileStore {
    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;
    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;
}

/// [`FileStore`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is neither UTF-8 nor CP949 text")]
    Decode { path: Utf8PathBuf },

    #[error("Edited text for {path} cannot be written back as {encoding}")]
    Encode {
        path: Utf8PathBuf,
        encoding: &'static str,
    },

    #[error("Failed to write backup {path}; target left unchanged")]
    Backup {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No drawindexed entry #{0}")]
    NoSuchEntry(usize),

    #[error(transparent)]
    Spec(#[from] SpecError),
}

/// One open `mod.ini`: scan, queue, preview, apply, rescan.
pub struct EditSession<S: FileStore = DiskStore> {
    files: S,
    path: Utf8PathBuf,
    original: Vec<u8>,
    lines: LineStore,
    scan: ScanResult,
    pending: PendingChanges,
    settings: EngineSettings,
    encoding: &'static Encoding,
    next_shader_index: u32,
}

/// Decode as UTF-8, falling back to CP949 for Korean-authored mods.
fn decode(path: &Utf8Path, bytes: &[u8]) -> Result<(String, &'static Encoding), SessionError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_string(), UTF_8));
    }
    let (text, had_errors) = EUC_KR.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(SessionError::Decode {
            path: path.to_path_buf(),
        });
    }
    tracing::info!("{} is not UTF-8; read as {}", path, EUC_KR.name());
    Ok((text.into_owned(), EUC_KR))
}

impl<S: FileStore> EditSession<S> {
    /// Read and scan `path`.
    pub fn open(files: S, path: impl AsRef<Utf8Path>, settings: EngineSettings) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let original = files.read(&path).map_err(|source| SessionError::Read {
            path: path.clone(),
            source,
        })?;
        let (text, encoding) = decode(&path, &original)?;

        let lines = LineStore::from_text(&text);
        let scan = services::scan_lines(&lines);
        tracing::info!("Opened {} ({} lines)", path, lines.len());

        Ok(Self {
            files,
            next_shader_index: scan.next_shader_index,
            path,
            original,
            lines,
            scan,
            pending: PendingChanges::new(),
            settings,
            encoding,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Encoding the file was read with; writes use the same one.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn scan_result(&self) -> &ScanResult {
        &self.scan
    }

    pub fn pending(&self) -> &PendingChanges {
        &self.pending
    }

    /// Draw entry by its 0-based position in the scan.
    pub fn entry(&self, index: usize) -> Result<&DrawEntry, SessionError> {
        self.scan
            .entries
            .get(index)
            .ok_or(SessionError::NoSuchEntry(index))
    }

    /// Queue a toggle on entry `index`.
    ///
    /// A complex block is refused with [`SpecError::UnsafeEdit`] and also
    /// recorded, so the next report counts it; the rest of the queue is
    /// unaffected.
    pub fn queue_toggle(&mut self, index: usize, variable: &str, key: &str) -> Result<(), SessionError> {
        let built = build_spec(self.entry(index)?, variable, key);
        let spec = built.map_err(|err| self.refuse(err))?;
        tracing::debug!("Queued toggle ${} on entry {}", spec.variable, index);
        self.pending.push_toggle(spec);
        Ok(())
    }

    /// Queue removal of the simple toggle around entry `index`. Complex
    /// blocks are refused as in [`queue_toggle`](Self::queue_toggle).
    pub fn queue_unwrap(&mut self, index: usize) -> Result<(), SessionError> {
        let built = build_unwrap(self.entry(index)?);
        let spec = built.map_err(|err| self.refuse(err))?;
        tracing::debug!("Queued unwrap of ${} on entry {}", spec.block.variable, index);
        self.pending.push_unwrap(spec);
        Ok(())
    }

    /// Queue a blend override and return the shader section name it will use.
    pub fn queue_transparency(&mut self, index: usize, mode: BlendMode) -> Result<String, SessionError> {
        let spec = build_transparency(self.entry(index)?, mode, self.next_shader_index)?;
        let allocated = spec.shader_name.clone();
        let name = self.pending.push_transparency(spec);
        if name == allocated {
            self.next_shader_index += 1;
        }
        tracing::debug!("Queued transparency {} on entry {}", name, index);
        Ok(name)
    }

    fn refuse(&mut self, err: SpecError) -> SessionError {
        if let SpecError::UnsafeEdit(line) = err {
            tracing::warn!("Refused edit of complex toggle block at line {}", line);
            self.pending.reject(Diagnostic::UnsafeEdit { line });
        }
        err.into()
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
        self.next_shader_index = self.scan.next_shader_index;
    }

    /// Run the queued edits without touching disk.
    pub fn preview(&self) -> ApplyOutcome {
        services::apply(&self.lines, &self.pending, &self.settings)
    }

    /// Apply the queued edits: back up the original bytes, write the new
    /// text, then rescan. Nothing is written when the pass changes nothing.
    pub fn apply(&mut self) -> Result<ApplyReport, SessionError> {
        let outcome = self.preview();
        if !outcome.report.has_changes() {
            tracing::info!("Nothing to apply to {}", self.path);
            self.clear_pending();
            return Ok(outcome.report);
        }

        let text = outcome.store.to_text();
        let (encoded, _, unmappable) = self.encoding.encode(&text);
        if unmappable {
            return Err(SessionError::Encode {
                path: self.path.clone(),
                encoding: self.encoding.name(),
            });
        }
        let encoded = encoded.into_owned();

        let backup = self.settings.backup_path(&self.path);
        self.files
            .write(&backup, &self.original)
            .map_err(|source| SessionError::Backup {
                path: backup.clone(),
                source,
            })?;
        tracing::info!("Backup written to {}", backup);

        self.files
            .write(&self.path, &encoded)
            .map_err(|source| SessionError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!("Wrote {}", self.path);

        self.original = encoded;
        self.lines = outcome.store;
        self.scan = services::scan_lines(&self.lines);
        self.pending.clear();
        self.next_shader_index = self.scan.next_shader_index;

        Ok(outcome.report)
    }
}
