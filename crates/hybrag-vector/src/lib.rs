//! hybrag-vector
//!
//! LanceDB-backed dense index over corpus chunks. Rebuilds replace the whole
//! collection; queries apply a distance threshold with a nearest-row fallback.

pub mod schema;
pub mod table;
pub mod index;

pub use index::LanceVectorIndex;
