use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Default embedding dimensionality (gemini-embedding-001 at reduced output)
pub const DEFAULT_VECTOR_DIM: usize = 768;

/// Schema for the media_vectors table
pub fn media_vectors_schema(vector_dim: usize) -> Arc<Schema> {
  Arc::new(Schema::new(vec![
    Field::new("id", DataType::Utf8, false),
    Field::new("source", DataType::Utf8, false),
    Field::new("media_type", DataType::Utf8, false),
    Field::new("native_id", DataType::Utf8, false),
    Field::new("title", DataType::Utf8, false),
    Field::new("description", DataType::Utf8, false),
    Field::new("extra", DataType::Utf8, false), // JSON object
    Field::new("created_at", DataType::Int64, false), // Unix timestamp ms
    Field::new(
      "vector",
      DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), vector_dim as i32),
      true,
    ),
  ]))
}
