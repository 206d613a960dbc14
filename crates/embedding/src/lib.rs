pub mod cache;
pub mod gemini;
pub mod openai;
pub mod provider;
pub mod resilient;

pub use cache::{CacheStats, EmbeddingCache};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::{EmbeddingError, EmbeddingProvider};
pub use resilient::{ResilientProvider, RetryConfig, is_retryable_error, wrap_resilient};
