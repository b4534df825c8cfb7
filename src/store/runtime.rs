use std::sync::{Mutex, OnceLock, PoisonError};

use crate::store::api::StoreApi;
use crate::store::error::{Result, StoreError};

static TABLE: OnceLock<&'static StoreApi> = OnceLock::new();
static INIT_DONE: OnceLock<()> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Install the native dispatch table for this process. The first
/// installation wins; returns whether this call installed it.
pub fn install(api: &'static StoreApi) -> bool {
	TABLE.set(api).is_ok()
}

/// Process-wide handle to the initialized native library.
///
/// The first successful call runs the native `init` entry point exactly
/// once, under a lock so concurrent first uses race safely; afterwards the
/// handle is read without the lock. A failed `init` is reported as
/// [`StoreError::InitFailed`] and attempted again on the next access rather
/// than cached as permanently broken.
pub fn library() -> Result<&'static StoreApi> {
	let api = *TABLE.get().ok_or(StoreError::NoBackend)?;
	if INIT_DONE.get().is_some() {
		return Ok(api);
	}

	let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
	if INIT_DONE.get().is_none() {
		let ret = unsafe { (api.init)() };
		if ret != 0 {
			return Err(StoreError::InitFailed { errno: ret });
		}
		let _ = INIT_DONE.set(());
	}
	Ok(api)
}
