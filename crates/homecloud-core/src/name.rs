use crate::error::{ProviderError, Result};

/// Validate a single storage, catalog or file name.
///
/// Names become path segments on the file-system provider, so anything that
/// could escape the storage root is rejected.
///
/// # Errors
///
/// Returns `ProviderError::InvalidName` if the name is empty, is a dot
/// segment, or contains a path separator.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "name must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid(name, "path traversal is not allowed"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid(name, "path separators are not allowed"));
    }
    if name.contains('\0') {
        return Err(invalid(name, "NUL bytes are not allowed"));
    }
    Ok(())
}

/// Validate a `/`-separated path of entry names relative to a storage root.
///
/// # Errors
///
/// Returns `ProviderError::InvalidName` if the path is empty or any segment
/// fails [`validate_entry_name`].
pub fn validate_entry_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(path, "path must not be empty"));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(invalid(path, "empty path segments are not allowed"));
        }
        if segment == "." || segment == ".." {
            return Err(invalid(path, "path traversal is not allowed"));
        }
        if segment.contains('\\') || segment.contains('\0') {
            return Err(invalid(path, "invalid characters in path segment"));
        }
    }
    Ok(())
}

fn invalid(name: &str, reason: &'static str) -> ProviderError {
    ProviderError::InvalidName {
        name: name.to_string(),
        reason,
    }
}
