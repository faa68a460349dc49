#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! HTTP client for the remote game catalog.
//!
//! Every request carries the credential as `key=` and goes through one
//! timeout-bounded `reqwest::Client`. Responses are narrowed into typed records
//! immediately; anything that fails to decode is a `Parse`-class error. The
//! client never retries.

use async_trait::async_trait;
use gamefinder_browse::query::{self, QueryParams};
use gamefinder_browse::{CatalogSource, FetchError, FilterCriteria, ResultPage};
use gamefinder_catalog_models::{
    CatalogFacet, GameDetail, GameRecord, Paginated, ResultList, Screenshot,
};
use gamefinder_config::{CatalogConfig, ConfigError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// HTTP client type accepted by [`CatalogClient::with_http`].
pub use reqwest::Client as HttpClient;

/// Page size requested for genre/platform lookups.
const LOOKUP_PAGE_SIZE: u32 = 40;

/// Errors raised while constructing a [`CatalogClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration is missing something the client needs.
    #[error("catalog client configuration invalid")]
    Config {
        /// Source configuration error.
        #[from]
        source: ConfigError,
    },
    /// The HTTP client could not be built.
    #[error("failed to build http client")]
    Build {
        /// Source reqwest error.
        source: reqwest::Error,
    },
}

/// Catalog API client.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
    api_key: String,
    page_size: u32,
}

impl CatalogClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when no API key is configured and
    /// [`ClientError::Build`] when the TLS backend cannot be initialised.
    pub fn new(config: &CatalogConfig) -> Result<Self, ClientError> {
        let api_key = config.require_api_key()?.expose().to_string();
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("gamefinder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Build { source })?;
        Ok(Self::with_http(
            http,
            config.api_base_url.clone(),
            api_key,
            config.page_size,
        ))
    }

    /// Assemble a client from parts. `base_url` should end with `/`.
    #[must_use]
    pub fn with_http(
        http: Client,
        base_url: Url,
        api_key: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            page_size: page_size.max(1),
        }
    }

    /// Copy of this client requesting `page_size` records per page.
    #[must_use]
    pub fn with_page_size(&self, page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            ..self.clone()
        }
    }

    /// Records requested per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch one page of games.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`].
    pub async fn fetch_games(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<ResultPage, FetchError> {
        let params = query::api_params(criteria, page, self.page_size);
        let envelope: Paginated<GameRecord> = self.get_json("games", &params).await?;
        let result = ResultPage::from_wire(envelope, page);
        debug!(
            page,
            received = result.items.len(),
            total = result.total_count,
            has_more = result.has_more,
            "games page fetched"
        );
        Ok(result)
    }

    /// Fetch the detail record of a game.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`]; unknown ids map to `NotFound`.
    pub async fn fetch_game(&self, id: u64) -> Result<GameDetail, FetchError> {
        self.get_json(&format!("games/{id}"), &QueryParams::new())
            .await
    }

    /// Fetch screenshots of a game in catalog order.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`].
    pub async fn fetch_screenshots(&self, id: u64) -> Result<Vec<Screenshot>, FetchError> {
        let list: ResultList<Screenshot> = self
            .get_json(&format!("games/{id}/screenshots"), &QueryParams::new())
            .await?;
        Ok(list.results)
    }

    /// Fetch genres for filter choices.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`].
    pub async fn fetch_genres(&self) -> Result<Vec<CatalogFacet>, FetchError> {
        self.fetch_lookup("genres").await
    }

    /// Fetch platforms for filter choices.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`].
    pub async fn fetch_platforms(&self) -> Result<Vec<CatalogFacet>, FetchError> {
        self.fetch_lookup("platforms").await
    }

    async fn fetch_lookup(&self, path: &str) -> Result<Vec<CatalogFacet>, FetchError> {
        let mut params = QueryParams::new();
        params.insert(
            query::keys::PAGE_SIZE.to_string(),
            LOOKUP_PAGE_SIZE.to_string(),
        );
        let envelope: Paginated<CatalogFacet> = self.get_json(path, &params).await?;
        Ok(envelope.results)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<T, FetchError> {
        let url = self.endpoint(path, params)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| classify_transport(&err))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify_transport(&err))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            warn!(%status, path, "catalog request rejected");
            return Err(FetchError::from_status(
                status.as_u16(),
                format!("{path} returned {status}: {}", body.trim()),
            ));
        }

        serde_json::from_slice(&bytes).map_err(|err| {
            warn!(path, error = %err, "catalog response did not decode");
            FetchError::parse(format!("{path}: {err}"))
        })
    }

    fn endpoint(&self, path: &str, params: &QueryParams) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| FetchError::parse(format!("invalid endpoint {path}: {err}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_page(
        &self,
        criteria: &FilterCriteria,
        page: u32,
    ) -> Result<ResultPage, FetchError> {
        self.fetch_games(criteria, page).await
    }
}

/// Map a transport failure; anything without a status counts as `Network`.
fn classify_transport(err: &reqwest::Error) -> FetchError {
    if let Some(status) = err.status() {
        return FetchError::from_status(status.as_u16(), err.to_string());
    }
    if err.is_decode() {
        return FetchError::parse(err.to_string());
    }
    let detail = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    FetchError::network(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use gamefinder_browse::{CriteriaPatch, FetchErrorKind, FilterModel, SortOrder};
    use gamefinder_test_support::payloads;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer, page_size: u32) -> CatalogClient {
        let base = format!("{}/api/", server.base_url());
        CatalogClient::with_http(
            Client::builder()
                .timeout(Duration::from_millis(500))
                .build()
                .expect("client builds"),
            base.parse().expect("valid URL"),
            "test-key",
            page_size,
        )
    }

    #[tokio::test]
    async fn games_request_carries_criteria_and_paging() {
        let server = MockServer::start_async().await;
        let base = format!("{}/api/games", server.base_url());
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/games")
                .query_param("key", "test-key")
                .query_param("page", "1")
                .query_param("page_size", "20")
                .query_param("search", "zelda")
                .query_param("search_precise", "true")
                .query_param("ordering", "-rating")
                .query_param("genres", "4,51")
                .query_param("rating_min", "3");
            then.status(200)
                .json_body(payloads::games_page(&base, 1..=20, 1, true, 45));
        });

        let mut model = FilterModel::new();
        model.update(CriteriaPatch::search("zelda"));
        model.update(CriteriaPatch::ordering(SortOrder::RatingDesc));
        model.update(CriteriaPatch::genre_list("51,4"));
        let criteria = model.update(CriteriaPatch::rating(3.0, 5.0));

        let page = client_for(&server, 20)
            .fetch_page(&criteria, 1)
            .await
            .expect("page fetched");
        mock.assert();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.next_page, Some(2));
        assert!(page.has_more);
        assert_eq!(page.total_count, 45);
    }

    #[tokio::test]
    async fn last_page_has_no_more() {
        let server = MockServer::start_async().await;
        let base = format!("{}/api/games", server.base_url());
        server.mock(|when, then| {
            when.method(GET).path("/api/games").query_param("page", "2");
            then.status(200)
                .json_body(payloads::games_page(&base, 21..=40, 2, false, 40));
        });

        let page = client_for(&server, 20)
            .fetch_games(&FilterCriteria::default(), 2)
            .await
            .expect("page fetched");
        assert_eq!(page.page_index, 2);
        assert!(!page.has_more);
        assert_eq!(page.items.first().map(|item| item.id), Some(21));
    }

    #[tokio::test]
    async fn status_codes_are_classified() {
        let cases = [
            (401, FetchErrorKind::Auth),
            (403, FetchErrorKind::Auth),
            (404, FetchErrorKind::NotFound),
            (429, FetchErrorKind::RateLimited),
            (500, FetchErrorKind::Server),
            (503, FetchErrorKind::Server),
            (400, FetchErrorKind::Client),
        ];
        for (status, kind) in cases {
            let server = MockServer::start_async().await;
            server.mock(|when, then| {
                when.method(GET).path("/api/games");
                then.status(status)
                    .json_body(payloads::error_body("nope"));
            });
            let err = client_for(&server, 20)
                .fetch_games(&FilterCriteria::default(), 1)
                .await
                .expect_err("request fails");
            assert_eq!(err.kind, kind, "status {status}");
            assert_eq!(err.status, Some(status));
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/games");
            then.status(200).body("{\"results\": \"nope\"}");
        });
        let err = client_for(&server, 20)
            .fetch_games(&FilterCriteria::default(), 1)
            .await
            .expect_err("shape mismatch");
        assert_eq!(err.kind, FetchErrorKind::Parse);
    }

    #[tokio::test]
    async fn slow_responses_time_out_as_network_errors() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/games");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(payloads::games_page("http://x/api/games", 1..=1, 1, false, 1));
        });
        let err = client_for(&server, 20)
            .fetch_games(&FilterCriteria::default(), 1)
            .await
            .expect_err("timeout");
        assert_eq!(err.kind, FetchErrorKind::Network);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = CatalogClient::with_http(
            Client::new(),
            "http://127.0.0.1:9/api/".parse().expect("valid URL"),
            "k",
            20,
        );
        let err = client
            .fetch_games(&FilterCriteria::default(), 1)
            .await
            .expect_err("nothing listens on the discard port");
        assert_eq!(err.kind, FetchErrorKind::Network);
        assert_eq!(err.status, None);
    }

    #[tokio::test]
    async fn detail_and_screenshots() {
        let server = MockServer::start_async().await;
        let detail = server.mock(|when, then| {
            when.method(GET)
                .path("/api/games/4200")
                .query_param("key", "test-key");
            then.status(200)
                .json_body(payloads::game_detail(4200, "Portal 2"));
        });
        let shots = server.mock(|when, then| {
            when.method(GET).path("/api/games/4200/screenshots");
            then.status(200).json_body(payloads::screenshots(4200, 3));
        });

        let client = client_for(&server, 20);
        let game = client.fetch_game(4200).await.expect("detail");
        let screenshots = client.fetch_screenshots(4200).await.expect("screenshots");
        detail.assert();
        shots.assert();
        assert_eq!(game.name, "Portal 2");
        assert_eq!(game.developers.len(), 1);
        assert_eq!(screenshots.len(), 3);
        assert_eq!(screenshots[0].id, 420_001);
    }

    #[tokio::test]
    async fn lookups_request_full_pages() {
        let server = MockServer::start_async().await;
        let genres = server.mock(|when, then| {
            when.method(GET)
                .path("/api/genres")
                .query_param("page_size", "40");
            then.status(200)
                .json_body(payloads::facets(&[(4, "Action"), (51, "Indie")]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/platforms");
            then.status(200).json_body(payloads::facets(&[(4, "PC")]));
        });

        let client = client_for(&server, 20);
        let listed = client.fetch_genres().await.expect("genres");
        genres.assert();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].name, "Indie");
        assert_eq!(client.fetch_platforms().await.expect("platforms").len(), 1);
    }

    #[tokio::test]
    async fn featured_client_uses_its_own_page_size() {
        let server = MockServer::start_async().await;
        let base = format!("{}/api/games", server.base_url());
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/games")
                .query_param("page_size", "8")
                .query_param("ordering", "-rating");
            then.status(200)
                .json_body(payloads::games_page(&base, 1..=8, 1, true, 100));
        });
        let featured = client_for(&server, 20).with_page_size(8);
        let page = featured
            .fetch_page(&FilterCriteria::ordered_by(SortOrder::RatingDesc), 1)
            .await
            .expect("featured page");
        mock.assert();
        assert_eq!(page.items.len(), 8);
    }
}
