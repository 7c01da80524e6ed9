use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::medium::{check_quota, sorted_keys};
use crate::{DurableStore, StoreError};

const RECORD_EXT: &str = "json";

/// Directory-backed medium holding one file per key.
///
/// Every record is loaded into memory by [`FileStore::open`], so reads never
/// touch the disk. Writes go through to disk first (temp file + rename) and
/// only update the in-memory view once the file is in place.
#[derive(Debug)]
pub struct FileStore {
	dir: PathBuf,
	entries: RwLock<HashMap<String, String>>,
	quota: Option<usize>,
}

impl FileStore {
	/// Opens (creating if needed) a store rooted at `dir`.
	///
	/// Unreadable records are skipped with a warning and behave as absent.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let dir = dir.into();
		fs::create_dir_all(&dir).map_err(|error| StoreError::Io { path: dir.clone(), error })?;

		let mut entries = HashMap::default();
		let listing = fs::read_dir(&dir).map_err(|error| StoreError::Io { path: dir.clone(), error })?;
		for item in listing.flatten() {
			let path = item.path();
			let Some(key) = key_for_path(&path) else {
				continue;
			};
			match fs::read_to_string(&path) {
				Ok(raw) => {
					entries.insert(key, raw);
				}
				Err(error) => tracing::warn!(path = %path.display(), %error, "skipping unreadable store record"),
			}
		}

		tracing::debug!(dir = %dir.display(), records = entries.len(), "file store opened");
		Ok(Self {
			dir,
			entries: RwLock::new(entries),
			quota: None,
		})
	}

	/// Sets a byte quota checked before every write.
	pub fn with_quota(mut self, quota: usize) -> Self {
		self.quota = Some(quota);
		self
	}

	/// Returns the backing directory.
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn record_path(&self, key: &str) -> PathBuf {
		self.dir.join(format!("{}.{RECORD_EXT}", encode_key(key)))
	}

	fn write_record(&self, path: &Path, raw: &str) -> Result<(), StoreError> {
		let io_err = |error| StoreError::Io {
			path: path.to_path_buf(),
			error,
		};
		let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
		tmp.write_all(raw.as_bytes()).map_err(io_err)?;
		tmp.persist(path).map_err(|e| io_err(e.error))?;
		Ok(())
	}
}

impl DurableStore for FileStore {
	fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.entries.read().get(key).cloned())
	}

	fn set_raw(&self, key: &str, raw: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.write();
		check_quota(&entries, self.quota, key, raw)?;
		self.write_record(&self.record_path(key), raw)?;
		entries.insert(key.to_string(), raw.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.write();
		let path = self.record_path(key);
		match fs::remove_file(&path) {
			Ok(()) => {}
			Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
			Err(error) => return Err(StoreError::Io { path, error }),
		}
		entries.remove(key);
		Ok(())
	}

	fn keys(&self) -> Vec<String> {
		sorted_keys(&self.entries.read())
	}
}

/// Encodes a key into a portable file stem: ASCII alphanumerics, `-` and `_`
/// pass through, everything else becomes `%XX` per UTF-8 byte.
fn encode_key(key: &str) -> String {
	let mut out = String::with_capacity(key.len());
	for byte in key.bytes() {
		if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
			out.push(byte as char);
		} else {
			out.push_str(&format!("%{byte:02X}"));
		}
	}
	out
}

fn decode_key(stem: &str) -> Option<String> {
	let bytes = stem.as_bytes();
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			let hex = stem.get(i + 1..i + 3)?;
			out.push(u8::from_str_radix(hex, 16).ok()?);
			i += 3;
		} else {
			out.push(bytes[i]);
			i += 1;
		}
	}
	String::from_utf8(out).ok()
}

fn key_for_path(path: &Path) -> Option<String> {
	if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
		return None;
	}
	decode_key(path.file_stem()?.to_str()?)
}
