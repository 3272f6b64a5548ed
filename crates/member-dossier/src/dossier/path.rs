use serde_json::{Map, Value};

/// Rejections raised when a dotted path cannot address a member record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path must not be empty")]
    Empty,
    #[error("field path '{path}' contains an empty segment")]
    EmptySegment { path: String },
    #[error("field path '{path}' indexes past the end of an array at segment '{segment}'")]
    IndexOutOfBounds { path: String, segment: String },
    #[error("field path '{path}' uses non-index segment '{segment}' on an array")]
    NotAnIndex { path: String, segment: String },
}

/// Validated dot-separated key into a member record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        if trimmed.split('.').any(|segment| segment.is_empty()) {
            return Err(PathError::EmptySegment {
                path: trimmed.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// First segment, which names the top-level record group.
    pub fn root(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads the value at `path`, short-circuiting to `None` on the first absent
/// segment or on a null/scalar intermediate.
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if path.trim().is_empty() {
        return None;
    }

    let mut current = record;
    for segment in path.trim().split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns a copy of `record` with the leaf at `path` replaced by `value`.
/// The input record is never touched.
pub fn set(record: &Value, path: &str, value: Value) -> Result<Value, PathError> {
    let path = FieldPath::parse(path)?;
    let mut updated = record.clone();
    let segments: Vec<&str> = path.segments().collect();
    write_at(&mut updated, &segments, value, &path)?;
    Ok(updated)
}

fn write_at(
    target: &mut Value,
    segments: &[&str],
    value: Value,
    path: &FieldPath,
) -> Result<(), PathError> {
    let Some((segment, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };

    if let Value::Array(items) = target {
        let index = segment
            .parse::<usize>()
            .map_err(|_| PathError::NotAnIndex {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        let slot = items
            .get_mut(index)
            .ok_or_else(|| PathError::IndexOutOfBounds {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        return write_at(slot, rest, value, path);
    }

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    match target {
        Value::Object(map) => {
            let slot = map.entry(segment.to_string()).or_insert(Value::Null);
            write_at(slot, rest, value, path)
        }
        _ => Ok(()),
    }
}
