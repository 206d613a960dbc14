//! Static mood taxonomies for the catalog adapters.
//!
//! Lookups are case-insensitive and always resolve: unknown labels fall back
//! to the `neutral` entry, so no input mood ever produces an empty query set.

/// Number of related queries issued concurrently per mood
pub const QUERIES_PER_MOOD: usize = 3;

/// Search-term taxonomy for the short-form catalog
#[derive(Debug)]
pub struct ShortFormQueries {
  pub videos: &'static [&'static str],
  pub songs: &'static [&'static str],
}

static HAPPY_QUERIES: ShortFormQueries = ShortFormQueries {
  videos: &["motivational videos", "uplifting content", "funny videos", "positive energy"],
  songs: &["happy songs", "uplifting music", "feel good songs", "upbeat music"],
};

static SAD_QUERIES: ShortFormQueries = ShortFormQueries {
  videos: &[
    "comforting videos",
    "emotional support",
    "calming nature videos",
    "healing content",
  ],
  songs: &["calming music", "sad songs", "emotional music", "peaceful songs"],
};

static ANGRY_QUERIES: ShortFormQueries = ShortFormQueries {
  videos: &[
    "stress relief",
    "anger management",
    "workout motivation",
    "calming exercises",
  ],
  songs: &["energetic music", "workout songs", "pump up music", "intense music"],
};

static STRESSED_QUERIES: ShortFormQueries = ShortFormQueries {
  videos: &["meditation", "relaxation techniques", "stress relief", "mindfulness"],
  songs: &["relaxing music", "meditation music", "calm music", "peaceful instrumental"],
};

static CALM_QUERIES: ShortFormQueries = ShortFormQueries {
  videos: &["nature documentaries", "peaceful scenes", "mindfulness", "zen content"],
  songs: &["ambient music", "chill music", "lo-fi", "soft music"],
};

static NEUTRAL_QUERIES: ShortFormQueries = ShortFormQueries {
  videos: &["trending videos", "popular content", "entertainment", "educational videos"],
  songs: &["popular music", "trending songs", "top hits", "chart music"],
};

/// Resolve a mood label to short-form search queries
pub fn short_form_queries(label: &str) -> &'static ShortFormQueries {
  match label.to_lowercase().as_str() {
    "happy" => &HAPPY_QUERIES,
    "sad" => &SAD_QUERIES,
    "angry" => &ANGRY_QUERIES,
    "stressed" => &STRESSED_QUERIES,
    "calm" => &CALM_QUERIES,
    _ => &NEUTRAL_QUERIES,
  }
}

/// Film discovery parameters for a mood.
///
/// Genre ids: 28=Action, 35=Comedy, 18=Drama, 53=Thriller, 10749=Romance,
/// 99=Documentary, 16=Animation
#[derive(Debug)]
pub struct MovieParams {
  pub genre_ids: &'static [u32],
  pub sort_by: &'static str,
}

static HAPPY_MOVIES: MovieParams = MovieParams {
  genre_ids: &[35, 16], // Comedy, Animation
  sort_by: "popularity.desc",
};

static SAD_MOVIES: MovieParams = MovieParams {
  genre_ids: &[18, 10749], // Drama, Romance
  sort_by: "popularity.desc",
};

static ANGRY_MOVIES: MovieParams = MovieParams {
  genre_ids: &[28, 53], // Action, Thriller
  sort_by: "popularity.desc",
};

static STRESSED_MOVIES: MovieParams = MovieParams {
  genre_ids: &[35, 99], // Comedy, Documentary
  sort_by: "popularity.desc",
};

static CALM_MOVIES: MovieParams = MovieParams {
  genre_ids: &[99, 18], // Documentary, Drama
  sort_by: "popularity.desc",
};

static NEUTRAL_MOVIES: MovieParams = MovieParams {
  genre_ids: &[],
  sort_by: "popularity.desc",
};

/// Resolve a mood label to film discovery parameters
pub fn movie_params(label: &str) -> &'static MovieParams {
  match label.to_lowercase().as_str() {
    "happy" => &HAPPY_MOVIES,
    "sad" => &SAD_MOVIES,
    "angry" => &ANGRY_MOVIES,
    "stressed" => &STRESSED_MOVIES,
    "calm" => &CALM_MOVIES,
    _ => &NEUTRAL_MOVIES,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lookup_is_case_insensitive() {
    assert_eq!(short_form_queries("Happy").videos, HAPPY_QUERIES.videos);
    assert_eq!(short_form_queries("STRESSED").songs, STRESSED_QUERIES.songs);
    assert_eq!(movie_params("Angry").genre_ids, &[28, 53]);
  }

  #[test]
  fn test_unknown_label_falls_back_to_neutral() {
    assert_eq!(short_form_queries("melancholic").videos, NEUTRAL_QUERIES.videos);
    assert_eq!(movie_params("bewildered").genre_ids, NEUTRAL_MOVIES.genre_ids);
  }

  #[test]
  fn test_every_mood_has_enough_queries() {
    for label in ["happy", "sad", "angry", "stressed", "calm", "neutral"] {
      let queries = short_form_queries(label);
      assert!(queries.videos.len() >= QUERIES_PER_MOOD);
      assert!(queries.songs.len() >= QUERIES_PER_MOOD);
    }
  }
}
