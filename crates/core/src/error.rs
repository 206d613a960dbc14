use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("No mood history for user {user_id}; analyze a journal entry first")]
  NoMoodSignal { user_id: String },

  #[error("All recommendation sources are currently unavailable")]
  AllSourcesUnavailable,

  #[error("Persistence: {0}")]
  Persistence(String),

  #[error("Config: {0}")]
  Config(String),

  #[error("IO: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
