/// Compatibility database document
///
/// The vendor database is a JSON object keyed by drive model. Each model maps
/// to an object of per-firmware (or `"default"`) compatibility intervals:
///
/// ```text
/// {"WD40EFRX-68N32N0":{"default":{"compatibility_interval":[{...}]}}, ...}
/// ```
///
/// Newer releases wrap that map in a top-level `"disk_compatbility_info"`
/// object (spelled that way by the vendor). Either shape is accepted.
///
/// Lookups run on a parsed tree. Inserts are spliced into the original text
/// just before the model map's closing brace, so every existing entry
/// (duplicate keys and string escapes included) stays byte for byte.
use super::locator::DocumentRole;
use crate::{PatchError, PatchResult};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::value::RawValue;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Wrapper key used by newer databases
pub const MODEL_MAP_KEY: &str = "disk_compatbility_info";

/// Indent used when a pretty document's indent cannot be detected
const DEFAULT_INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    Compact,
    Pretty { indent: String },
}

/// Borrows the wrapped model map's raw text out of the document
#[derive(Deserialize)]
struct WrappedModels<'a> {
    #[serde(rename = "disk_compatbility_info", borrow)]
    models: Option<&'a RawValue>,
}

#[derive(Debug, Clone)]
pub struct CompatDocument {
    path: PathBuf,
    role: DocumentRole,
    root: Value,
    text: String,
    layout: Layout,
}

impl CompatDocument {
    /// Read and parse a database file
    pub fn load(path: &Path, role: DocumentRole) -> PatchResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| PatchError::DbReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, role, &text)
    }

    /// Parse database text that came from `path`
    pub fn parse(path: &Path, role: DocumentRole, text: &str) -> PatchResult<Self> {
        let malformed = |reason: String| PatchError::MalformedDocument {
            path: path.to_path_buf(),
            reason,
        };

        let root: Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
        let Some(object) = root.as_object() else {
            return Err(malformed("top level is not an object".to_string()));
        };
        if let Some(inner) = object.get(MODEL_MAP_KEY) {
            if !inner.is_object() {
                return Err(malformed(format!("\"{}\" is not an object", MODEL_MAP_KEY)));
            }
        }
        // Fails early on a doubled wrapper key
        model_map_span(text).map_err(malformed)?;

        Ok(Self {
            path: path.to_path_buf(),
            role,
            root,
            text: text.to_string(),
            layout: detect_layout(text),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> DocumentRole {
        self.role
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// True if the model already has an entry of any kind
    pub fn contains_model(&self, model: &str) -> bool {
        self.models().is_some_and(|models| models.contains_key(model))
    }

    /// Distinct model keys; a key repeated in the file counts once
    pub fn model_count(&self) -> usize {
        self.models().map_or(0, Map::len)
    }

    /// The stored entry for a model (the last one if the key repeats)
    pub fn entry(&self, model: &str) -> Option<&Value> {
        self.models()?.get(model)
    }

    /// Current document text, including any unsaved inserts
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append an always-supported entry for `model` if it has none.
    ///
    /// Returns `false`, leaving the document untouched, when the model is
    /// already present. Only the in-memory copy changes; call [`save`].
    ///
    /// [`save`]: CompatDocument::save
    pub fn insert_model(&mut self, model: &str) -> PatchResult<bool> {
        let was_empty = match self.models() {
            Some(models) if models.contains_key(model) => return Ok(false),
            Some(models) => models.is_empty(),
            None => return Err(self.malformed("no model map".to_string())),
        };

        let (open, close) = model_map_span(&self.text).map_err(|reason| self.malformed(reason))?;
        let entry = default_compatibility();
        let key = serde_json::to_string(model).map_err(std::io::Error::from)?;
        let end_of_members = self.text[..close].trim_end().len();

        match &self.layout {
            Layout::Compact => {
                let value = serde_json::to_string(&entry).map_err(std::io::Error::from)?;
                let separator = if was_empty { "" } else { "," };
                let member = format!("{}{}:{}", separator, key, value);
                self.text.insert_str(end_of_members, &member);
            }
            Layout::Pretty { indent } => {
                let depth = if self.is_wrapped() { 2 } else { 1 };
                let inner = indent.repeat(depth);
                let value = render_pretty(&entry, indent)?.replace('\n', &format!("\n{}", inner));
                let member = format!("{}{}: {}", inner, key, value);

                if was_empty {
                    let outer = indent.repeat(depth - 1);
                    self.text
                        .replace_range(open + 1..close, &format!("\n{}\n{}", member, outer));
                } else {
                    self.text.insert_str(end_of_members, &format!(",\n{}", member));
                }
            }
        }

        if let Some(models) = self.models_mut() {
            models.insert(model.to_string(), entry);
        }
        Ok(true)
    }

    /// Write the document back to its file
    pub fn save(&self) -> PatchResult<()> {
        fs::write(&self.path, &self.text).map_err(|source| PatchError::DbWriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    fn malformed(&self, reason: String) -> PatchError {
        PatchError::MalformedDocument {
            path: self.path.clone(),
            reason,
        }
    }

    fn is_wrapped(&self) -> bool {
        self.root
            .as_object()
            .is_some_and(|root| root.contains_key(MODEL_MAP_KEY))
    }

    fn models(&self) -> Option<&Map<String, Value>> {
        let root = self.root.as_object()?;
        match root.get(MODEL_MAP_KEY) {
            Some(inner) => inner.as_object(),
            None => Some(root),
        }
    }

    fn models_mut(&mut self) -> Option<&mut Map<String, Value>> {
        let root = self.root.as_object_mut()?;
        if root.contains_key(MODEL_MAP_KEY) {
            root.get_mut(MODEL_MAP_KEY)?.as_object_mut()
        } else {
            Some(root)
        }
    }
}

/// Entry marking a model as supported for every firmware revision
pub fn default_compatibility() -> Value {
    json!({
        "default": {
            "compatibility_interval": [{
                "compatibility": "support",
                "not_yet_rolling_status": "support",
                "fw_dsm_update_status_notify": false,
                "barebone_installable": true
            }]
        }
    })
}

/// Pretty-print any JSON value with the given indent
pub(crate) fn render_pretty(value: &Value, indent: &str) -> PatchResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(std::io::Error::from)?;
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// Byte offsets of the model map's opening and closing braces in `text`.
///
/// `text` must already be known to hold a JSON object.
fn model_map_span(text: &str) -> Result<(usize, usize), String> {
    let wrapped: WrappedModels = serde_json::from_str(text).map_err(|e| e.to_string())?;

    let map = match wrapped.models {
        Some(raw) => raw.get(),
        None => text.trim(),
    };
    // Both are subslices of `text`
    let open = map.as_ptr() as usize - text.as_ptr() as usize;
    let close = open + map.len() - 1;

    if !map.starts_with('{') || !map.ends_with('}') {
        return Err("model map is not an object".to_string());
    }
    Ok((open, close))
}

/// Single-line documents stay compact; otherwise reuse the first-level
/// indent, which may be empty
fn detect_layout(text: &str) -> Layout {
    let body = text.trim();
    if !body.contains('\n') {
        return Layout::Compact;
    }

    let indent = body
        .lines()
        .skip(1)
        .find(|line| {
            let content = line.trim();
            !content.is_empty() && !content.starts_with('}')
        })
        .map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            &line[..line.len() - trimmed.len()]
        })
        .unwrap_or(DEFAULT_INDENT);

    Layout::Pretty {
        indent: indent.to_string(),
    }
}
