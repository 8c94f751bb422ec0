use crate::bank::{parse_bank, prepare_bank, read_bank_file};
use crate::error::{Result, TyperError};
use include_dir::{include_dir, Dir};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");

const BUNDLED_BANK: &str = "texts.json";

/// Supplier of practice texts for a session engine.
pub trait TextSource {
    /// Copy of the current bank, shortest entry first.
    fn bank(&self) -> Vec<String>;

    /// Re-read the backing store. An empty read keeps the current bank.
    fn reload(&mut self);

    /// Read a custom text from disk. The result is never added to the bank.
    fn load_from_path(&self, path: &Path) -> Result<String> {
        let raw = fs::read_to_string(path).map_err(|source| TyperError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(normalize_custom(&raw))
    }
}

impl<T: TextSource + ?Sized> TextSource for Box<T> {
    fn bank(&self) -> Vec<String> {
        (**self).bank()
    }

    fn reload(&mut self) {
        (**self).reload()
    }

    fn load_from_path(&self, path: &Path) -> Result<String> {
        (**self).load_from_path(path)
    }
}

/// Line-ending cleanup for directly supplied texts: CRLF becomes LF and
/// surrounding blank lines go away. Inner whitespace is left alone.
pub fn normalize_custom(raw: &str) -> String {
    raw.replace("\r\n", "\n").trim_matches('\n').to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum BankOrigin {
    File(PathBuf),
    Bundled,
}

/// Bank backed by a JSON bank file or by the bank compiled into the binary.
#[derive(Debug, Clone)]
pub struct JsonTextSource {
    origin: BankOrigin,
    bank: Vec<String>,
}

impl JsonTextSource {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self::from_origin(BankOrigin::File(p.as_ref().to_path_buf()))
    }

    pub fn bundled() -> Self {
        Self::from_origin(BankOrigin::Bundled)
    }

    fn from_origin(origin: BankOrigin) -> Self {
        let mut source = Self {
            origin,
            bank: Vec::new(),
        };
        source.reload();
        source
    }

    pub fn origin(&self) -> &BankOrigin {
        &self.origin
    }

    fn read_raw(&self) -> Vec<String> {
        match &self.origin {
            BankOrigin::File(path) => read_bank_file(path),
            BankOrigin::Bundled => DATA_DIR
                .get_file(BUNDLED_BANK)
                .and_then(|file| file.contents_utf8())
                .map(parse_bank)
                .unwrap_or_default(),
        }
    }
}

impl TextSource for JsonTextSource {
    fn bank(&self) -> Vec<String> {
        self.bank.clone()
    }

    fn reload(&mut self) {
        let fresh = prepare_bank(self.read_raw());
        if fresh.is_empty() {
            warn!(
                origin = ?self.origin,
                kept = self.bank.len(),
                "bank reload yielded no texts, keeping current bank"
            );
            return;
        }
        info!(origin = ?self.origin, entries = fresh.len(), "bank loaded");
        self.bank = fresh;
    }
}

/// Fixed in-memory bank. `reload` has nothing to re-read.
#[derive(Debug, Clone, Default)]
pub struct StaticTextSource {
    bank: Vec<String>,
}

impl StaticTextSource {
    pub fn new<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            bank: prepare_bank(texts),
        }
    }
}

impl TextSource for StaticTextSource {
    fn bank(&self) -> Vec<String> {
        self.bank.clone()
    }

    fn reload(&mut self) {}
}
