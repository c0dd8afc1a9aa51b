use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const ID_COLUMN: &str = "id";
pub const FILENAME_COLUMN: &str = "filename";
pub const CHUNK_INDEX_COLUMN: &str = "chunk_index";
pub const OFFSET_COLUMN: &str = "offset";
pub const CONTENT_COLUMN: &str = "content";
pub const VECTOR_COLUMN: &str = "vector";
/// Added by LanceDB to nearest-neighbor results.
pub const DISTANCE_COLUMN: &str = "_distance";

pub fn build_arrow_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new(ID_COLUMN, DataType::Utf8, false),
		Field::new(FILENAME_COLUMN, DataType::Utf8, false),
		Field::new(CHUNK_INDEX_COLUMN, DataType::Int32, false),
		Field::new(OFFSET_COLUMN, DataType::Int64, false),
		Field::new(CONTENT_COLUMN, DataType::Utf8, false),
		Field::new(VECTOR_COLUMN, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

/// Width of the `vector` column, if the schema has one.
pub fn vector_dim(schema: &Schema) -> Option<usize> {
	match schema.field_with_name(VECTOR_COLUMN).ok()?.data_type() {
		DataType::FixedSizeList(_, n) => usize::try_from(*n).ok(),
		_ => None,
	}
}
