//! Entity-name syntax shared with the native library.
//!
//! `/` separates filesystem components, `@` introduces a snapshot name and
//! `#` a bookmark name. Status translation re-validates caller-supplied
//! names with these rules to disambiguate overloaded status codes.

use crate::store::codes::MAXNAMELEN;
use crate::store::error::StoreError;

/// Extract the pool component of a dataset, snapshot, or bookmark name.
pub fn pool_name(name: &[u8]) -> &[u8] {
	let end = name
		.iter()
		.position(|byte| matches!(byte, b'/' | b'@' | b'#'))
		.unwrap_or(name.len());
	&name[..end]
}

/// Extract the filesystem component of a snapshot or bookmark name.
pub fn fs_name(name: &[u8]) -> &[u8] {
	let end = name
		.iter()
		.position(|byte| matches!(byte, b'@' | b'#'))
		.unwrap_or(name.len());
	&name[..end]
}

fn is_valid_component(component: &[u8]) -> bool {
	!component.is_empty()
		&& component
			.iter()
			.all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b':' | b' '))
}

/// Whether `name` is a syntactically valid filesystem or volume name.
pub fn is_valid_fs_name(name: &[u8]) -> bool {
	!name.is_empty() && name.split(|byte| *byte == b'/').all(is_valid_component)
}

fn is_valid_suffixed_name(name: &[u8], separator: u8) -> bool {
	let mut parts = name.split(|byte| *byte == separator);
	let (Some(fs), Some(tail), None) = (parts.next(), parts.next(), parts.next()) else {
		return false;
	};
	is_valid_fs_name(fs) && is_valid_component(tail)
}

/// Whether `name` is a syntactically valid snapshot name.
pub fn is_valid_snap_name(name: &[u8]) -> bool {
	is_valid_suffixed_name(name, b'@')
}

/// Whether `name` is a syntactically valid bookmark name.
pub fn is_valid_bookmark_name(name: &[u8]) -> bool {
	is_valid_suffixed_name(name, b'#')
}

/// Reject invalid or over-long filesystem names.
pub fn validate_fs_name(name: &[u8]) -> Result<(), StoreError> {
	if !is_valid_fs_name(name) {
		Err(StoreError::FilesystemNameInvalid {
			name: Some(name.into()),
		})
	} else if name.len() > MAXNAMELEN {
		Err(StoreError::NameTooLong {
			name: Some(name.into()),
		})
	} else {
		Ok(())
	}
}

/// Reject invalid or over-long snapshot names.
pub fn validate_snap_name(name: &[u8]) -> Result<(), StoreError> {
	if !is_valid_snap_name(name) {
		Err(StoreError::SnapshotNameInvalid {
			name: Some(name.into()),
		})
	} else if name.len() > MAXNAMELEN {
		Err(StoreError::NameTooLong {
			name: Some(name.into()),
		})
	} else {
		Ok(())
	}
}

/// Reject invalid or over-long bookmark names.
pub fn validate_bookmark_name(name: &[u8]) -> Result<(), StoreError> {
	if !is_valid_bookmark_name(name) {
		Err(StoreError::BookmarkNameInvalid {
			name: Some(name.into()),
		})
	} else if name.len() > MAXNAMELEN {
		Err(StoreError::NameTooLong {
			name: Some(name.into()),
		})
	} else {
		Ok(())
	}
}

/// Reject names that are neither filesystem nor snapshot names, or too long.
pub fn validate_fs_or_snap_name(name: &[u8]) -> Result<(), StoreError> {
	if !is_valid_fs_name(name) && !is_valid_snap_name(name) {
		Err(StoreError::NameInvalid {
			name: Some(name.into()),
		})
	} else if name.len() > MAXNAMELEN {
		Err(StoreError::NameTooLong {
			name: Some(name.into()),
		})
	} else {
		Ok(())
	}
}
