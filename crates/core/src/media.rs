use serde::{Deserialize, Serialize};

/// Which catalog a media item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
  Youtube,
  Tmdb,
  /// Journal entries share the vector index with media records
  Journal,
}

impl MediaSource {
  pub fn as_str(&self) -> &'static str {
    match self {
      MediaSource::Youtube => "youtube",
      MediaSource::Tmdb => "tmdb",
      MediaSource::Journal => "journal",
    }
  }
}

impl std::str::FromStr for MediaSource {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "youtube" => Ok(MediaSource::Youtube),
      "tmdb" => Ok(MediaSource::Tmdb),
      "journal" => Ok(MediaSource::Journal),
      _ => Err(format!("Unknown media source: {}", s)),
    }
  }
}

/// Kind of entity held in the vector index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
  Video,
  Song,
  Movie,
  /// Embedded journal text; never surfaces as a recommendation
  Journal,
}

impl MediaType {
  pub fn as_str(&self) -> &'static str {
    match self {
      MediaType::Video => "video",
      MediaType::Song => "song",
      MediaType::Movie => "movie",
      MediaType::Journal => "journal",
    }
  }
}

impl std::str::FromStr for MediaType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "video" => Ok(MediaType::Video),
      "song" => Ok(MediaType::Song),
      "movie" => Ok(MediaType::Movie),
      "journal" => Ok(MediaType::Journal),
      _ => Err(format!("Unknown media type: {}", s)),
    }
  }
}

/// Deterministic vector record id for a media item.
///
/// Repeated upserts of the same underlying item resolve to the same id, which
/// is what makes persistence idempotent.
pub fn record_id(source: MediaSource, media_type: MediaType, native_id: &str) -> String {
  format!("{}:{}:{}", source.as_str(), media_type.as_str(), native_id)
}

/// A short-form catalog result (video or song)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortFormItem {
  pub native_id: String,
  pub title: String,
  pub description: String,
  pub thumbnail_url: Option<String>,
  pub channel_title: String,
  pub published_at: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub similarity: Option<f32>,
}

/// A film catalog result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieItem {
  pub native_id: String,
  pub title: String,
  pub overview: String,
  pub poster_url: Option<String>,
  pub release_date: String,
  pub vote_average: f32,
  pub genre_ids: Vec<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub similarity: Option<f32>,
}

/// One recommendable media entity with provider metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CandidateItem {
  Video(ShortFormItem),
  Song(ShortFormItem),
  Movie(MovieItem),
}

impl CandidateItem {
  pub fn media_type(&self) -> MediaType {
    match self {
      CandidateItem::Video(_) => MediaType::Video,
      CandidateItem::Song(_) => MediaType::Song,
      CandidateItem::Movie(_) => MediaType::Movie,
    }
  }

  pub fn source(&self) -> MediaSource {
    match self {
      CandidateItem::Video(_) | CandidateItem::Song(_) => MediaSource::Youtube,
      CandidateItem::Movie(_) => MediaSource::Tmdb,
    }
  }

  pub fn native_id(&self) -> &str {
    match self {
      CandidateItem::Video(item) | CandidateItem::Song(item) => &item.native_id,
      CandidateItem::Movie(item) => &item.native_id,
    }
  }

  pub fn title(&self) -> &str {
    match self {
      CandidateItem::Video(item) | CandidateItem::Song(item) => &item.title,
      CandidateItem::Movie(item) => &item.title,
    }
  }

  /// Text that stands in for this item's semantic content when embedding
  pub fn descriptive_text(&self) -> String {
    match self {
      CandidateItem::Video(item) | CandidateItem::Song(item) => {
        if item.description.is_empty() {
          item.title.clone()
        } else {
          format!("{}. {}", item.title, item.description)
        }
      }
      CandidateItem::Movie(item) => {
        if item.overview.is_empty() {
          item.title.clone()
        } else {
          format!("{}. {}", item.title, item.overview)
        }
      }
    }
  }

  pub fn similarity(&self) -> Option<f32> {
    match self {
      CandidateItem::Video(item) | CandidateItem::Song(item) => item.similarity,
      CandidateItem::Movie(item) => item.similarity,
    }
  }

  pub fn set_similarity(&mut self, similarity: f32) {
    let slot = match self {
      CandidateItem::Video(item) | CandidateItem::Song(item) => &mut item.similarity,
      CandidateItem::Movie(item) => &mut item.similarity,
    };
    *slot = Some(similarity.clamp(-1.0, 1.0));
  }

  /// Deterministic id used for the item's vector record
  pub fn record_id(&self) -> String {
    record_id(self.source(), self.media_type(), self.native_id())
  }
}
