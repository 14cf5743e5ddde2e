//! Language file storage
//!
//! A language is made of an optional top-level `<lang>.json` plus any JSON
//! files below a `<lang>/` directory:
//!
//! ```text
//! lang/
//! ├── en.json                 {"Welcome": "Welcome!"}
//! ├── en/
//! │   ├── validation.json     {"required": "The :attribute field is required."}
//! │   └── auth/login.json     {"title": "Sign in"}
//! └── texts_to_translate.json (written by scan)
//! ```
//!
//! Loading `en` gives the keys `Welcome`, `validation.required` and
//! `auth.login.title`. Nested objects are flattened with dots, keys starting
//! with `@` hold metadata and are skipped.

use crate::StringSet;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::validate_locale;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File written by a scan and read back by translate
pub const PENDING_FILE: &str = "texts_to_translate.json";

#[derive(Debug, Clone)]
pub struct CatalogStore {
    lang_path: PathBuf,
}

impl CatalogStore {
    pub fn new(lang_path: impl Into<PathBuf>) -> Self {
        Self {
            lang_path: lang_path.into(),
        }
    }

    pub fn lang_path(&self) -> &Path {
        &self.lang_path
    }

    pub fn pending_path(&self) -> PathBuf {
        self.lang_path.join(PENDING_FILE)
    }

    pub fn target_path(&self, lang: &str) -> PathBuf {
        self.lang_path.join(format!("{}.json", lang))
    }

    /// Load and flatten every source string of `lang`
    ///
    /// A language with no files at all loads as an empty set.
    pub fn load_language(&self, lang: &str) -> MtResult<StringSet> {
        validate_locale(lang)?;
        let mut texts = StringSet::new();

        let json_file = self.target_path(lang);
        if json_file.is_file() {
            let root = read_object(&json_file)?;
            flatten_into(&root, "", &json_file, &mut texts);
        }

        let lang_dir = self.lang_path.join(lang);
        if lang_dir.is_dir() {
            let mut files = Vec::new();
            collect_json_files(&lang_dir, &mut files)?;

            for file in files {
                let prefix = key_prefix(&lang_dir, &file);
                let root = read_object(&file)?;
                flatten_into(&root, &prefix, &file, &mut texts);
            }
        }

        if texts.is_empty() {
            warn!(lang, path = %self.lang_path.display(), "No language strings found");
        } else {
            debug!(lang, strings = texts.len(), "Loaded language strings");
        }

        Ok(texts)
    }

    /// Persist the strings a later translate run should work on
    pub fn store_pending(&self, texts: &StringSet) -> MtResult<()> {
        write_json(&self.pending_path(), texts)
    }

    pub fn load_pending(&self) -> MtResult<StringSet> {
        let path = self.pending_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(MtError::MissingArtifactError(
                    "No texts found. Run 'scan' first.".to_string(),
                ));
            }
            Err(err) => {
                return Err(MtError::MissingArtifactError(format!(
                    "Failed to read '{}': {}",
                    path.display(),
                    err
                )));
            }
        };

        serde_json::from_str(&content).map_err(|_| {
            MtError::MissingArtifactError(format!("Invalid format in '{}'.", PENDING_FILE))
        })
    }

    /// Existing translations for `lang`; an absent file is an empty catalog
    pub fn load_target(&self, lang: &str) -> MtResult<StringSet> {
        validate_locale(lang)?;
        let path = self.target_path(lang);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(StringSet::new()),
            Err(err) => return Err(MtError::catalog(&path, err)),
        };

        serde_json::from_str(&content).map_err(|e| MtError::catalog(&path, e))
    }

    pub fn save_target(&self, lang: &str, texts: &StringSet) -> MtResult<()> {
        validate_locale(lang)?;
        write_json(&self.target_path(lang), texts)?;
        debug!(lang, strings = texts.len(), "Saved translations");
        Ok(())
    }
}

fn read_object(path: &Path) -> MtResult<serde_json::Map<String, Value>> {
    let content = fs::read_to_string(path).map_err(|e| MtError::catalog(path, e))?;
    let json: Value = serde_json::from_str(&content).map_err(|e| MtError::catalog(path, e))?;

    match json {
        Value::Object(map) => Ok(map),
        _ => Err(MtError::catalog(path, "root must be an object")),
    }
}

fn flatten_into(
    object: &serde_json::Map<String, Value>,
    prefix: &str,
    file: &Path,
    out: &mut StringSet,
) {
    for (key, value) in object {
        if key.starts_with('@') {
            continue;
        }

        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::String(text) => {
                out.insert(full_key, text.clone());
            }
            Value::Object(nested) => flatten_into(nested, &full_key, file, out),
            _ => warn!(key = %full_key, file = %file.display(), "Message is not a string, skipping"),
        }
    }
}

/// All `*.json` files below `dir`, in a stable order
fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> MtResult<()> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| MtError::catalog(dir, e))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MtError::catalog(dir, e))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            out.push(path);
        }
    }
    Ok(())
}

/// `auth/login.json` below the language directory becomes `auth.login`
fn key_prefix(lang_dir: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(lang_dir).unwrap_or(file).with_extension("");
    relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(".")
}

/// Pretty-print `value` to `path` through a temporary file and a rename
fn write_json<T: Serialize>(path: &Path, value: &T) -> MtResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MtError::catalog(parent, e))?;
    }

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| MtError::catalog(path, e))?;
    buffer.push(b'\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &buffer).map_err(|e| MtError::catalog(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| MtError::catalog(path, e))
}
