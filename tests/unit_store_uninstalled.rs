#![allow(missing_docs)]

use nvstore::store::{self, StoreError};

// This binary installs no dispatch table, so every operation must fail up
// front without touching native state.

#[test]
fn operations_report_the_missing_backend() {
	assert_eq!(store::sync(b"tank", false).unwrap_err(), StoreError::NoBackend);
	assert_eq!(
		store::destroy(b"tank/fs").unwrap_err(),
		StoreError::NoBackend
	);
	assert_eq!(
		store::snapshot(&[b"tank/fs@s".to_vec()], &Default::default()).unwrap_err(),
		StoreError::NoBackend
	);
	assert_eq!(store::library().unwrap_err(), StoreError::NoBackend);
}
