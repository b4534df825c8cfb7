//! Client-side boundary layer for a native pooled-storage control library:
//! a value-marshalling codec for the library's tagged-value container and a
//! contextual translator from raw status codes to typed errors.

/// Value model and tagged-value list codec.
pub mod nv;
/// Storage operations, error taxonomy, and native call plumbing.
pub mod store;
