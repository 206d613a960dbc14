pub mod index;
pub mod record;
pub mod schema;
pub mod store;

pub use index::{MEDIA_TABLE, MediaIndex, Result, StoreError};
pub use record::{RecordMetadata, VectorMatch, batch_to_match, record_to_batch};
pub use schema::{DEFAULT_VECTOR_DIM, media_vectors_schema};
pub use store::{MediaStore, VectorStore, id_filter};
