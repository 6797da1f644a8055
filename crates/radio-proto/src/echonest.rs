//! Echo Nest dynamic playlist API: endpoint names, query parameters and
//! response envelopes.
//!
//! Every response is wrapped as
//!
//! ```text
//! { "response": { "status": { "code": 0, "message": "Success" }, ...body } }
//! ```
//!
//! The status is checked before the body is decoded, so an error response
//! with a missing body surfaces as [`EchoNestError::Api`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{EchoNestError, Result};

pub const CREATE_ENDPOINT: &str = "playlist/dynamic/create";
pub const NEXT_ENDPOINT: &str = "playlist/dynamic/next";
pub const FEEDBACK_ENDPOINT: &str = "playlist/dynamic/feedback";

pub type Params = Vec<(&'static str, String)>;

/// What the radio session is seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioKind {
    Artist,
    Genre,
}

impl RadioKind {
    /// Interprets the answer to "Genre or artist radio?".  Only `artist`
    /// (any case) selects artist radio.
    pub fn from_answer(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("artist") {
            Self::Artist
        } else {
            Self::Genre
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Genre => "genre",
        }
    }

    fn type_tag(&self) -> &'static str {
        match self {
            Self::Artist => "artist-radio",
            Self::Genre => "genre-radio",
        }
    }
}

pub fn create_params(kind: RadioKind, seed: &str) -> Params {
    vec![
        (kind.label(), seed.to_string()),
        ("bucket", "id:spotify".to_string()),
        ("bucket", "tracks".to_string()),
        ("type", kind.type_tag().to_string()),
    ]
}

pub fn next_params(session_id: &str) -> Params {
    vec![("session_id", session_id.to_string())]
}

pub fn skip_params(session_id: &str, song_id: &str) -> Params {
    vec![
        ("session_id", session_id.to_string()),
        ("skip_song", song_id.to_string()),
    ]
}

/// `rate_song` is encoded as `<song id>^<rating>`.
pub fn rate_params(session_id: &str, song_id: &str, rating: &str) -> Params {
    vec![
        ("session_id", session_id.to_string()),
        ("rate_song", format!("{}^{}", song_id, rating)),
    ]
}

// ── response types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// One recommended song.  `id` is the service track identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist_name: String,
    /// Catalog references for this song; empty when the catalog has none.
    #[serde(default)]
    pub tracks: Vec<TrackRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRef {
    pub foreign_id: String,
}

impl Track {
    /// Local playback identifier, taken from the first catalog reference.
    pub fn local_id(&self) -> Option<&str> {
        self.tracks.first().map(|t| t.foreign_id.as_str())
    }

    pub fn display(&self) -> String {
        match (self.artist_name.is_empty(), self.title.is_empty()) {
            (false, false) => format!("{} - {}", self.artist_name, self.title),
            (true, false) => self.title.clone(),
            _ => self.id.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateBody {
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NextBody {
    #[serde(default)]
    songs: Vec<Track>,
}

/// Check the envelope status and decode the body.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let mut root: serde_json::Value = serde_json::from_str(body)?;
    let mut response = root
        .get_mut("response")
        .map(serde_json::Value::take)
        .ok_or(EchoNestError::MissingField("response"))?;
    let status = response
        .get_mut("status")
        .map(serde_json::Value::take)
        .ok_or(EchoNestError::MissingField("response.status"))?;
    let status: Status = serde_json::from_value(status)?;
    if status.code != 0 {
        return Err(EchoNestError::Api {
            code: status.code,
            message: status.message,
        });
    }
    Ok(serde_json::from_value(response)?)
}

pub fn decode_session_id(body: &str) -> Result<String> {
    decode::<CreateBody>(body)?
        .session_id
        .ok_or(EchoNestError::MissingField("session_id"))
}

/// First song of a `next` response, if the service returned any.
pub fn decode_next_track(body: &str) -> Result<Option<Track>> {
    Ok(decode::<NextBody>(body)?.songs.into_iter().next())
}

pub fn decode_ack(body: &str) -> Result<()> {
    decode::<serde_json::Value>(body).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_params_artist() {
        let params = create_params(RadioKind::Artist, "Radiohead");
        assert_eq!(params[0], ("artist", "Radiohead".to_string()));
        assert_eq!(params.iter().filter(|(k, _)| *k == "bucket").count(), 2);
        assert!(params.contains(&("type", "artist-radio".to_string())));
    }

    #[test]
    fn test_create_params_genre() {
        let params = create_params(RadioKind::Genre, "shoegaze");
        assert_eq!(params[0], ("genre", "shoegaze".to_string()));
        assert!(params.contains(&("type", "genre-radio".to_string())));
    }

    #[test]
    fn test_radio_kind_from_answer() {
        assert_eq!(RadioKind::from_answer("artist"), RadioKind::Artist);
        assert_eq!(RadioKind::from_answer("ARTIST"), RadioKind::Artist);
        assert_eq!(RadioKind::from_answer("genre"), RadioKind::Genre);
        assert_eq!(RadioKind::from_answer(""), RadioKind::Genre);
        assert_eq!(RadioKind::from_answer("artists"), RadioKind::Genre);
    }

    #[test]
    fn test_rate_params_encoding() {
        let params = rate_params("sess", "SOABC", "7");
        assert_eq!(params[1], ("rate_song", "SOABC^7".to_string()));
    }

    #[test]
    fn test_decode_session_id() {
        let body = r#"{"response": {"status": {"version": "4.2", "code": 0, "message": "Success"},
                       "session_id": "a1b2c3"}}"#;
        assert_eq!(decode_session_id(body).unwrap(), "a1b2c3");
    }

    #[test]
    fn test_decode_api_error() {
        let body = r#"{"response": {"status": {"code": 1, "message": "Invalid key"}}}"#;
        match decode_session_id(body) {
            Err(EchoNestError::Api { code, message }) => {
                assert_eq!(code, 1);
                assert_eq!(message, "Invalid key");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_missing_session_id() {
        let body = r#"{"response": {"status": {"code": 0, "message": "Success"}}}"#;
        assert!(matches!(
            decode_session_id(body),
            Err(EchoNestError::MissingField("session_id"))
        ));
    }

    #[test]
    fn test_decode_next_track() {
        let body = r#"{"response": {"status": {"code": 0, "message": "Success"},
            "songs": [{"id": "SOXYZ", "title": "Karma Police", "artist_name": "Radiohead",
                       "tracks": [{"catalog": "spotify", "foreign_id": "spotify:track:63OQ", "id": "TR1"}]}]}}"#;
        let track = decode_next_track(body).unwrap().unwrap();
        assert_eq!(track.id, "SOXYZ");
        assert_eq!(track.local_id(), Some("spotify:track:63OQ"));
        assert_eq!(track.display(), "Radiohead - Karma Police");
    }

    #[test]
    fn test_decode_next_track_without_references() {
        let body = r#"{"response": {"status": {"code": 0, "message": "Success"},
            "songs": [{"id": "SOXYZ", "title": "Rare Song", "tracks": []}]}}"#;
        let track = decode_next_track(body).unwrap().unwrap();
        assert!(track.local_id().is_none());
    }

    #[test]
    fn test_decode_next_no_songs() {
        let body = r#"{"response": {"status": {"code": 0, "message": "Success"}, "songs": []}}"#;
        assert!(decode_next_track(body).unwrap().is_none());
    }

    #[test]
    fn test_decode_not_json() {
        assert!(matches!(decode_ack("<html>"), Err(EchoNestError::Decode(_))));
    }
}
