use serde::{Deserialize, Serialize};

/// A registered user. The name doubles as the identity key: case-sensitive on
/// the wire, compared case-insensitively when excluding the current user from
/// partner rosters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

/// One collected quiz rating.
///
/// The wire key for the movie id is the historical `imbdID` spelling; the
/// backend stores records under that key, so it is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRating {
    pub title: String,
    pub rating: i32,
    #[serde(rename = "imbdID")]
    pub imdb_id: Option<String>,
    #[serde(default = "watched")]
    pub status: String,
}

fn watched() -> String {
    "watched".to_string()
}

impl UserRating {
    pub fn new(title: String, rating: i32, imdb_id: Option<String>) -> Self {
        Self {
            title,
            rating,
            imdb_id,
            status: watched(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_format() {
        let user = User {
            name: "Ann".to_string(),
        };
        assert_eq!(serde_json::to_string(&user).unwrap(), r#"{"name":"Ann"}"#);

        let decoded: User = serde_json::from_str(r#"{"name":"Bea"}"#).unwrap();
        assert_eq!(decoded.name, "Bea");
    }

    #[test]
    fn test_rating_uses_historical_id_key() {
        let rating = UserRating::new("Arrival".to_string(), 5, Some("tt2543164".to_string()));
        let json = serde_json::to_value(&rating).unwrap();

        assert_eq!(json["imbdID"], "tt2543164");
        assert_eq!(json["status"], "watched");
        assert!(json.get("imdbID").is_none());
    }

    #[test]
    fn test_rating_status_defaults_to_watched() {
        let decoded: UserRating =
            serde_json::from_str(r#"{"title":"Arrival","rating":4,"imbdID":null}"#).unwrap();
        assert_eq!(decoded.status, "watched");
        assert_eq!(decoded.rating, 4);
        assert_eq!(decoded.imdb_id, None);
    }
}
