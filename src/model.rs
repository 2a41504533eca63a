//! Artist entities and search payloads
//!
//! The search server is lenient about shape: ids arrive as `spotifyId` or
//! `id`, follower counts as a bare number or `{ "total": n }`, and either
//! top-level list may be missing. Everything is normalized here so the rest
//! of the crate only sees [`Entity`] and [`SearchResponse`].

use serde::{Deserialize, Serialize};

/// One image reference attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// An artist, either as a search summary or enriched by a detail fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireEntity", rename_all = "camelCase")]
pub struct Entity {
    /// Stable external id
    pub id: String,
    /// Display name
    pub name: String,
    /// Popularity metric shown next to the name
    pub followers: u64,
    /// Primary image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Alternate images, largest first as the server sends them
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    /// Detail-only enrichment
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u8>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, followers: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            followers,
            image_url: None,
            images: Vec::new(),
            genres: Vec::new(),
            popularity: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_images<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = urls
            .into_iter()
            .map(|url| ImageRef {
                url: url.into(),
                width: None,
                height: None,
            })
            .collect();
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    /// "1,234 followers"
    pub fn followers_label(&self) -> String {
        format!("{} followers", format_count(self.followers))
    }
}

/// Follower count as the server may send it
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireFollowers {
    Count(u64),
    Object {
        #[serde(default)]
        total: Option<u64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntity {
    #[serde(default)]
    spotify_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    followers: Option<WireFollowers>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    images: Option<Vec<ImageRef>>,
    #[serde(default)]
    genres: Option<Vec<String>>,
    #[serde(default)]
    popularity: Option<u8>,
}

impl From<WireEntity> for Entity {
    fn from(wire: WireEntity) -> Self {
        let id = wire
            .spotify_id
            .filter(|s| !s.is_empty())
            .or(wire.id)
            .unwrap_or_default();
        let followers = match wire.followers {
            Some(WireFollowers::Count(n)) => n,
            Some(WireFollowers::Object { total }) => total.unwrap_or(0),
            None => 0,
        };

        Self {
            id,
            name: wire.name.unwrap_or_default(),
            followers,
            image_url: wire.image_url.filter(|u| !u.is_empty()),
            images: wire.images.unwrap_or_default(),
            genres: wire.genres.unwrap_or_default(),
            popularity: wire.popularity,
        }
    }
}

/// Response of `search(query, limit)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireSearchResponse")]
pub struct SearchResponse {
    pub suggestions: Vec<Entity>,
    pub results: Vec<Entity>,
}

/// Missing or null lists are an empty success, not an error
#[derive(Debug, Deserialize)]
struct WireSearchResponse {
    #[serde(default)]
    suggestions: Option<Vec<Entity>>,
    #[serde(default)]
    results: Option<Vec<Entity>>,
}

impl From<WireSearchResponse> for SearchResponse {
    fn from(wire: WireSearchResponse) -> Self {
        Self {
            suggestions: wire.suggestions.unwrap_or_default(),
            results: wire.results.unwrap_or_default(),
        }
    }
}

/// Format a count with thousands separators: `1234567` -> `"1,234,567"`
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_spotify_id_takes_precedence() {
        let e: Entity =
            serde_json::from_str(r#"{"spotifyId":"sp1","id":"db9","name":"Taylor Swift"}"#)
                .unwrap();
        assert_eq!(e.id, "sp1");

        let e: Entity = serde_json::from_str(r#"{"spotifyId":"","id":"db9"}"#).unwrap();
        assert_eq!(e.id, "db9");
    }

    #[test]
    fn test_followers_shapes() {
        let bare: Entity = serde_json::from_str(r#"{"id":"1","followers":100}"#).unwrap();
        assert_eq!(bare.followers, 100);

        let object: Entity =
            serde_json::from_str(r#"{"id":"1","followers":{"href":null,"total":2500}}"#).unwrap();
        assert_eq!(object.followers, 2500);

        let null_total: Entity =
            serde_json::from_str(r#"{"id":"1","followers":{"total":null}}"#).unwrap();
        assert_eq!(null_total.followers, 0);

        let missing: Entity = serde_json::from_str(r#"{"id":"1"}"#).unwrap();
        assert_eq!(missing.followers, 0);
    }

    #[test]
    fn test_detail_enrichment_fields() {
        let e: Entity = serde_json::from_str(
            r#"{
                "id": "1",
                "name": "Taylor Swift",
                "followers": 100,
                "genres": ["pop"],
                "popularity": 98,
                "images": [{"url": "https://img/a.jpg", "width": 640, "height": 640}],
                "external_urls": {"spotify": "https://open.spotify.com/artist/1"}
            }"#,
        )
        .unwrap();
        assert_eq!(e.genres, vec!["pop".to_string()]);
        assert_eq!(e.popularity, Some(98));
        assert_eq!(e.images[0].width, Some(640));
    }

    #[test]
    fn test_search_response_missing_keys_is_empty() {
        let r: SearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(r, SearchResponse::default());

        let r: SearchResponse =
            serde_json::from_str(r#"{"suggestions":null,"results":[{"id":"1","name":"A"}]}"#)
                .unwrap();
        assert!(r.suggestions.is_empty());
        assert_eq!(r.results.len(), 1);
    }

    #[test]
    fn test_search_response_rejects_non_object() {
        assert!(serde_json::from_str::<SearchResponse>("[]").is_err());
        assert!(serde_json::from_str::<SearchResponse>(r#"{"results": 7}"#).is_err());
    }

    #[test]
    fn test_serialized_entity_reads_back() {
        let e = Entity::new("1", "Taylor Swift", 100)
            .with_image_url("https://img/a.jpg")
            .with_genres(["pop"]);
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains(r#""imageUrl":"https://img/a.jpg""#));
        assert_eq!(serde_json::from_str::<Entity>(&json).unwrap(), e);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(100), "100");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(Entity::new("1", "A", 100).followers_label(), "100 followers");
    }

    proptest! {
        #[test]
        fn prop_format_count_groups_digits(n in any::<u64>()) {
            let formatted = format_count(n);
            prop_assert_eq!(formatted.replace(',', ""), n.to_string());
            for group in formatted.split(',').skip(1) {
                prop_assert_eq!(group.len(), 3);
            }
        }
    }
}
