/// Raw status codes shared with the native library.
pub mod codes;
/// Entity-name syntax validation and decomposition.
pub mod names;
/// Per-operation status translation.
pub mod translate;

mod api;
mod batch;
mod call;
mod error;
mod ops;
mod runtime;

/// Native dispatch table and ABI constants.
pub use api::{
	CryptCmd, DatasetKind, RECV_EMBED_DATA, RECV_FORCE, RECV_RAW, RECV_RESUMABLE, SEND_COMPRESS,
	SEND_EMBED_DATA, SEND_LARGE_BLOCK, SEND_RAW, StoreApi,
};
/// Batch failure reconciliation types and entry point.
pub use batch::{BatchFailure, BatchOp, reconcile};
/// Call-adapter helpers for names and pointer-to-pointer outputs.
pub use call::{OutList, c_name, take_error_list, take_mapping};
/// Error and result aliases.
pub use error::{Name, Result, StoreError};
/// Operation wrappers.
pub use ops::{
	ReceiveFlags, SendFlags, bookmark, change_key, channel_program, clone_from, create, destroy,
	destroy_bookmarks, destroy_snapshots, get_bookmarks, get_holds, get_props, hold, inherit_prop,
	load_key, pool_checkpoint, pool_checkpoint_discard, promote, receive, release, rename, reopen,
	rollback, rollback_to, send, send_space, set_prop, snaprange_space, snapshot, sync, unload_key,
};
/// Dispatch-table installation and the lazy library handle.
pub use runtime::{install, library};
