/// Remote API gateway
///
/// One trait covering the six remote operations, so the session can be driven
/// against a mock in tests and against `HttpGateway` in the binary. Every
/// operation is a single attempt: failures are returned to the caller, which
/// decides what the user sees. No retries, no backoff.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, User, UserRating};

/// Upload payload for a completed quiz run.
#[derive(Debug, Serialize)]
struct RatingsUpload<'a> {
    name: &'a str,
    results: &'a [UserRating],
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// POST `/user` — register a user by name.
    async fn create_user(&self, user: &User) -> AppResult<()>;

    /// GET `/user` — the full roster of known users.
    async fn fetch_users(&self) -> AppResult<Vec<User>>;

    /// GET `/movies/quiz` — the quiz catalog.
    async fn fetch_quiz_movies(&self) -> AppResult<Vec<Movie>>;

    /// GET `/movies/ratings/{name}` — rating history for one user.
    async fn fetch_ratings(&self, name: &str) -> AppResult<Vec<UserRating>>;

    /// POST `/movies` — upload a completed quiz run.
    async fn post_ratings(&self, name: &str, ratings: &[UserRating]) -> AppResult<()>;

    /// POST `/movies/recs` — shared recommendations for up to two users.
    /// The only operation with a request timeout; generation is slow.
    async fn fetch_recommendations(&self, users: &[User]) -> AppResult<Vec<Movie>>;
}

/// `reqwest`-backed gateway against the production API.
pub struct HttpGateway {
    http_client: HttpClient,
    base_url: String,
    recs_timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: String, recs_timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
            recs_timeout,
        }
    }

    /// User names appear as a path segment; whitespace is stripped the same
    /// way registration strips it.
    fn sanitize_name(name: &str) -> String {
        name.split_whitespace().collect()
    }

    fn status_error(status: StatusCode) -> AppError {
        AppError::HttpStatus {
            code: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        }
    }

    /// Only 200 counts as success; anything else carries the status text.
    fn ensure_ok(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::OK {
            Ok(response)
        } else {
            Err(Self::status_error(status))
        }
    }

    /// Reads the body as text before decoding so a schema mismatch surfaces
    /// as `Decode` rather than a transport error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let body = Self::ensure_ok(response)?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn create_user(&self, user: &User) -> AppResult<()> {
        let url = format!("{}/user", self.base_url);
        let response = self.http_client.post(&url).json(user).send().await?;
        Self::ensure_ok(response)?;

        tracing::info!(user = %user.name, "User created");
        Ok(())
    }

    async fn fetch_users(&self) -> AppResult<Vec<User>> {
        let url = format!("{}/user", self.base_url);
        let response = self.http_client.get(&url).send().await?;
        let users: Vec<User> = Self::decode(response).await?;

        tracing::debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    async fn fetch_quiz_movies(&self) -> AppResult<Vec<Movie>> {
        let url = format!("{}/movies/quiz", self.base_url);
        let response = self.http_client.get(&url).send().await?;
        let movies: Vec<Movie> = Self::decode(response).await?;

        tracing::debug!(count = movies.len(), "Fetched quiz catalog");
        Ok(movies)
    }

    async fn fetch_ratings(&self, name: &str) -> AppResult<Vec<UserRating>> {
        let url = format!(
            "{}/movies/ratings/{}",
            self.base_url,
            Self::sanitize_name(name)
        );
        let response = self.http_client.get(&url).send().await?;
        let ratings: Vec<UserRating> = Self::decode(response).await?;

        tracing::debug!(user = %name, count = ratings.len(), "Fetched rating history");
        Ok(ratings)
    }

    async fn post_ratings(&self, name: &str, ratings: &[UserRating]) -> AppResult<()> {
        let url = format!("{}/movies", self.base_url);
        let payload = RatingsUpload {
            name,
            results: ratings,
        };
        let response = self.http_client.post(&url).json(&payload).send().await?;
        Self::ensure_ok(response)?;

        tracing::info!(user = %name, count = ratings.len(), "Ratings uploaded");
        Ok(())
    }

    async fn fetch_recommendations(&self, users: &[User]) -> AppResult<Vec<Movie>> {
        let url = format!("{}/movies/recs", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .timeout(self.recs_timeout)
            .json(&users)
            .send()
            .await?;
        let movies: Vec<Movie> = Self::decode(response).await?;

        tracing::info!(count = movies.len(), "Recommendations fetched");
        Ok(movies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_strips_whitespace() {
        assert_eq!(HttpGateway::sanitize_name("Ann Smith"), "AnnSmith");
        assert_eq!(HttpGateway::sanitize_name("  Ann\t B "), "AnnB");
        assert_eq!(HttpGateway::sanitize_name("Ann"), "Ann");
    }

    #[test]
    fn test_status_error_carries_code_and_reason() {
        let err = HttpGateway::status_error(StatusCode::NOT_FOUND);
        match &err {
            AppError::HttpStatus { code, reason } => {
                assert_eq!(*code, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "HTTP status 404: Not Found");
    }

    #[test]
    fn test_ratings_upload_wire_shape() {
        let ratings = vec![UserRating::new(
            "Arrival".to_string(),
            5,
            Some("tt2543164".to_string()),
        )];
        let payload = RatingsUpload {
            name: "Ann",
            results: &ratings,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["name"], "Ann");
        assert_eq!(json["results"][0]["title"], "Arrival");
        assert_eq!(json["results"][0]["rating"], 5);
        assert_eq!(json["results"][0]["imbdID"], "tt2543164");
        assert_eq!(json["results"][0]["status"], "watched");
    }
}
