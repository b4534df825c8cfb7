mod bytes;
mod decode;
mod encode;
mod error;
mod handle;
mod list;
mod tag;
mod value;

/// Decoding entry points, including the raw-pointer and error-list views.
pub use decode::{decode_error_list, decode_list, decode_list_ptr};
/// Encoding entry point.
pub use encode::encode_mapping;
/// Error and result aliases.
pub use error::{NvError, Result};
/// Owning handle and encode-scope arena.
pub use handle::{HandleScope, NvHandle};
/// Native list container and its C-style allocation entry points.
pub use list::{NvList, NvPair, live_list_count_for_test, nv_alloc, nv_dup, nv_free};
/// Native tag numbering and the reserved-key width table.
pub use tag::{Tag, forced_int_tag};
/// Value model types.
pub use value::{Mapping, Value};
