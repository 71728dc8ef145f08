/// Session state machine
///
/// Owns the current user, the active screen, the in-progress quiz ratings,
/// the candidate pool, and the partner roster, and drives every transition
/// between them. All mutations serialize through one `tokio::sync::Mutex`,
/// and every operation that awaits the network captures the session epoch
/// first: a completion whose epoch is no longer current is discarded instead
/// of applied, so a stale fetch can never overwrite a newer navigation.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use crate::db::UserStore;
use crate::models::{Movie, User, UserRating};
use crate::services::gateway::ApiGateway;
use crate::services::quiz::{self, QUIZ_LENGTH};

const NO_MOVIES: &str = "No movies available";

/// What the user currently sees. Exactly one variant is active; the
/// presentation layer matches it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Intro,
    Loading,
    Login,
    Quiz { movie: Movie, ratings_left: usize },
    Sync,
    Recommendation { movies: Vec<Movie> },
    Error { message: String },
}

struct State {
    user: Option<User>,
    screen: Screen,
    candidates: Vec<Movie>,
    ratings: Vec<UserRating>,
    roster: Vec<User>,
    epoch: u64,
    rng: StdRng,
}

impl State {
    /// Marks the start of a new navigation; invalidates in-flight completions.
    fn advance(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn is_current(&self, token: u64) -> bool {
        self.epoch == token
    }
}

#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<State>>,
    gateway: Arc<dyn ApiGateway>,
    store: Arc<dyn UserStore>,
    intro_delay: Duration,
}

impl Session {
    pub fn new(
        gateway: Arc<dyn ApiGateway>,
        store: Arc<dyn UserStore>,
        intro_delay: Duration,
    ) -> Self {
        Self::with_rng(gateway, store, intro_delay, StdRng::from_entropy())
    }

    /// Like [`Session::new`] but with a caller-supplied random source, so
    /// candidate selection can be made deterministic.
    pub fn with_rng(
        gateway: Arc<dyn ApiGateway>,
        store: Arc<dyn UserStore>,
        intro_delay: Duration,
        rng: StdRng,
    ) -> Self {
        let user = store.load();
        Self {
            state: Arc::new(Mutex::new(State {
                user,
                screen: Screen::Intro,
                candidates: Vec::new(),
                ratings: Vec::new(),
                roster: Vec::new(),
                epoch: 0,
                rng,
            })),
            gateway,
            store,
            intro_delay,
        }
    }

    /// Shows the intro, then routes to `Login` or `Sync` after the configured
    /// delay. The scheduled transition applies only if nothing else navigated
    /// in the meantime.
    pub async fn start(&self) {
        let token = {
            let mut state = self.state.lock().await;
            state.screen = Screen::Intro;
            state.advance()
        };

        let session = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(session.intro_delay).await;
            session.finish_intro(token).await;
        });
    }

    async fn finish_intro(&self, token: u64) {
        {
            let mut state = self.state.lock().await;
            if !state.is_current(token) {
                tracing::debug!("Intro timer fired after navigation, discarding");
                return;
            }
            if state.user.is_none() {
                state.advance();
                state.screen = Screen::Login;
                return;
            }
        }
        self.begin_sync().await;
    }

    /// Registers a new account. Whitespace is stripped from the name; an
    /// empty result is a no-op. Failure leaves the current screen untouched
    /// and is only logged, so the user retries by submitting again.
    pub async fn register_user(&self, raw_name: &str) {
        let name: String = raw_name.split_whitespace().collect();
        if name.is_empty() {
            return;
        }

        let token = self.state.lock().await.advance();
        let user = User { name };

        match self.gateway.create_user(&user).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock().await;
                    if !state.is_current(token) {
                        tracing::debug!("Registration finished after navigation, discarding");
                        return;
                    }
                    if let Err(err) = self.store.save(&user) {
                        tracing::warn!(error = %err, "Failed to persist user");
                    }
                    state.user = Some(user);
                }
                self.begin_quiz().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to create user");
            }
        }
    }

    /// Loads the quiz: fetches the catalog and the user's rating history
    /// concurrently, filters out already-rated titles, and shows a random
    /// candidate. Ratings collected so far are kept, so an interrupted quiz
    /// resumes where it left off; only a completed sync clears them.
    pub async fn begin_quiz(&self) {
        let (token, name, session_rated) = {
            let mut state = self.state.lock().await;
            let token = state.advance();
            state.screen = Screen::Loading;
            let session_rated: Vec<String> =
                state.ratings.iter().map(|r| r.title.clone()).collect();
            (token, state.user.as_ref().map(|u| u.name.clone()), session_rated)
        };

        let (catalog, history) = tokio::join!(self.fetch_catalog(), self.fetch_history(name));

        let mut rated_titles: HashSet<String> = history.into_iter().map(|r| r.title).collect();
        rated_titles.extend(session_rated);
        let pool = quiz::candidate_pool(catalog, &rated_titles);

        let mut guard = self.state.lock().await;
        if !guard.is_current(token) {
            tracing::debug!("Quiz fetch finished after navigation, discarding");
            return;
        }
        let state = &mut *guard;
        state.candidates = pool;
        match quiz::pick_random(&state.candidates, &mut state.rng) {
            Some(movie) => {
                state.screen = Screen::Quiz {
                    movie,
                    ratings_left: QUIZ_LENGTH,
                };
            }
            None => {
                state.screen = Screen::Error {
                    message: NO_MOVIES.to_string(),
                };
            }
        }
    }

    /// Records one quiz answer and shows the next candidate. An index of `-1`
    /// means skip: the movie still leaves the pool but nothing is recorded.
    /// The stored rating carries the id of the movie shown NEXT, not the one
    /// just rated; the backend has stored it that way since launch, so it is
    /// kept bug-for-bug compatible.
    pub async fn submit_rating(&self, movie: &Movie, rating_index: i32) {
        let (token, user, ratings) = {
            let mut guard = self.state.lock().await;
            let token = guard.advance();
            let state = &mut *guard;

            state.candidates.retain(|m| m.title != movie.title);

            let Some(next) = quiz::pick_random(&state.candidates, &mut state.rng) else {
                state.screen = Screen::Error {
                    message: NO_MOVIES.to_string(),
                };
                return;
            };

            if rating_index != -1 {
                state.ratings.push(UserRating::new(
                    movie.title.clone(),
                    rating_index + 1,
                    Some(next.imdb_id.clone()),
                ));
            }

            if !quiz::is_complete(&state.ratings) {
                state.screen = Screen::Quiz {
                    ratings_left: QUIZ_LENGTH - state.ratings.len(),
                    movie: next,
                };
                return;
            }

            (token, state.user.clone(), state.ratings.clone())
        };

        if let Some(user) = &user {
            match self.gateway.post_ratings(&user.name, &ratings).await {
                Ok(()) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to upload ratings");
                }
            }
        }

        {
            let state = self.state.lock().await;
            if !state.is_current(token) {
                tracing::debug!("Session navigated during ratings upload, skipping sync");
                return;
            }
        }
        self.begin_sync().await;
    }

    /// Refreshes the partner roster, dropping the current user from it
    /// (case-insensitively), then lands on `Sync`. A fetch failure keeps the
    /// previous roster. In-progress ratings are cleared either way: reaching
    /// sync ends the quiz run.
    pub async fn begin_sync(&self) {
        let token = self.state.lock().await.advance();

        let fetched = self.gateway.fetch_users().await;

        let mut state = self.state.lock().await;
        if !state.is_current(token) {
            tracing::debug!("Roster fetch finished after navigation, discarding");
            return;
        }
        match fetched {
            Ok(users) => {
                let current = state.user.as_ref().map(|u| u.name.to_lowercase());
                state.roster = users
                    .into_iter()
                    .filter(|u| current != Some(u.name.to_lowercase()))
                    .collect();
                tracing::info!(count = state.roster.len(), "Roster refreshed");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch users");
            }
        }
        state.ratings.clear();
        state.screen = Screen::Sync;
    }

    /// Fetches shared recommendations for the current user and the chosen
    /// partner. Failure routes back to `Sync` with the roster untouched.
    pub async fn request_recommendations(&self, partner_name: &str) {
        let (token, user) = {
            let mut state = self.state.lock().await;
            let Some(user) = state.user.clone() else {
                return;
            };
            (state.advance(), user)
        };

        let pair = [
            user,
            User {
                name: partner_name.to_string(),
            },
        ];

        match self.gateway.fetch_recommendations(&pair).await {
            Ok(movies) => {
                let mut state = self.state.lock().await;
                if !state.is_current(token) {
                    tracing::debug!("Recommendations arrived after navigation, discarding");
                    return;
                }
                state.screen = Screen::Recommendation { movies };
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch recommendations");
                let mut state = self.state.lock().await;
                if !state.is_current(token) {
                    return;
                }
                state.screen = Screen::Sync;
            }
        }
    }

    /// Clears the in-memory and persisted user and returns to `Login`.
    pub async fn logout(&self) {
        let mut state = self.state.lock().await;
        state.advance();
        state.user = None;
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "Failed to clear persisted user");
        }
        state.screen = Screen::Login;
    }

    pub async fn screen(&self) -> Screen {
        self.state.lock().await.screen.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.lock().await.user.clone()
    }

    pub async fn roster(&self) -> Vec<User> {
        self.state.lock().await.roster.clone()
    }

    async fn fetch_catalog(&self) -> Vec<Movie> {
        match self.gateway.fetch_quiz_movies().await {
            Ok(movies) => {
                tracing::info!(count = movies.len(), "Quiz catalog fetched");
                movies
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch quiz catalog");
                Vec::new()
            }
        }
    }

    async fn fetch_history(&self, name: Option<String>) -> Vec<UserRating> {
        let Some(name) = name else {
            return Vec::new();
        };
        match self.gateway.fetch_ratings(&name).await {
            Ok(ratings) => {
                tracing::info!(user = %name, count = ratings.len(), "Rating history fetched");
                ratings
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch rating history");
                Vec::new()
            }
        }
    }
}
