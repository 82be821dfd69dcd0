use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    StatusCode,
};
use serde::de::DeserializeOwned;

use crate::{cache::TtlCache, JournalApiConfig, JournalApiError, JournalBundle};

#[derive(Clone)]
pub struct JournalApi {
    config: JournalApiConfig,
    client: Arc<Client>,
    cache: TtlCache<JournalBundle>,
}

impl JournalApi {
    pub fn new(config: JournalApiConfig) -> Result<Self, JournalApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        if !config.access_token.is_empty() {
            let val = HeaderValue::from_str(&format!("JWT {}", config.access_token.reveal()))
                .map_err(|e| JournalApiError::Initialization(e.to_string()))?;
            headers.insert(AUTHORIZATION, val);
        }
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| JournalApiError::Initialization(e.to_string()))?;
        let cache = TtlCache::new(config.cache_timeout);
        Ok(Self { config, client: Arc::new(client), cache })
    }

    pub fn config(&self) -> &JournalApiConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned>(&self, path: &str) -> Result<T, JournalApiError> {
        let url = self.url(path);
        trace!("📚️ Sending REST query: {url}");
        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            trace!("📚️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| JournalApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| JournalApiError::RestResponseError(e.to_string()))?;
            Err(JournalApiError::QueryError { status, message })
        }
    }

    /// Fetches the journal bundle with the given uuid, serving it from the cache when a fresh copy is available.
    pub async fn fetch_journal_bundle(&self, uuid: &str) -> Result<JournalBundle, JournalApiError> {
        let key = format!("journal_bundle_{uuid}");
        if let Some(bundle) = self.cache.get(&key) {
            trace!("📚️ Journal bundle {uuid} served from cache");
            return Ok(bundle);
        }
        if uuid.is_empty() || uuid.chars().all(|c| c == '.') {
            return Err(JournalApiError::InvalidBundleId(uuid.to_string()));
        }
        let path = format!("/journal_bundles/{}/", urlencoding::encode(uuid));
        let bundle = self.rest_query::<JournalBundle>(&path).await.map_err(|e| match e {
            JournalApiError::QueryError { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                JournalApiError::NotFound(uuid.to_string())
            },
            e => e,
        })?;
        debug!("📚️ Fetched journal bundle {uuid} ({} courses, {} journals)", bundle.courses.len(), bundle.journals.len());
        self.cache.insert(&key, bundle.clone());
        Ok(bundle)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use serde_json::json;
    use spg_common::Secret;
    use wiremock::{
        matchers::{header, method, path},
        Mock,
        MockServer,
        ResponseTemplate,
    };

    use super::*;

    const UUID: &str = "4786e7be-2390-4332-a20e-e24895c38109";

    fn api(server: &MockServer) -> JournalApi {
        let config = JournalApiConfig {
            base_url: format!("{}/api/v1/", server.uri()),
            access_token: Secret::from("secret-token"),
            timeout: Duration::from_millis(500),
            cache_timeout: Duration::from_secs(3600),
        };
        JournalApi::new(config).unwrap()
    }

    fn bundle_json() -> serde_json::Value {
        json!({
            "uuid": UUID,
            "title": "Physics bundle",
            "applicable_seat_types": ["verified"],
            "courses": [{"key": "edX+PHY101", "course_runs": [{"key": "run1", "seats": [{"sku": "SKU1", "type": "verified"}]}]}],
            "journals": [{"uuid": "j1", "sku": "JSKU1", "title": "Physics Journal"}]
        })
    }

    #[tokio::test]
    async fn fetch_bundle_is_cached() {
        let _ = env_logger::try_init();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/journal_bundles/{UUID}/")))
            .and(header("Authorization", "JWT secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(bundle_json()))
            .expect(1)
            .mount(&server)
            .await;
        let api = api(&server);
        let bundle = api.fetch_journal_bundle(UUID).await.unwrap();
        assert_eq!(bundle.uuid, UUID);
        assert_eq!(bundle.journals[0].sku, "JSKU1");
        // Second call must not reach the server
        let again = api.fetch_journal_bundle(UUID).await.unwrap();
        assert_eq!(again, bundle);
    }

    #[tokio::test]
    async fn missing_bundle() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
        let err = api(&server).fetch_journal_bundle("nope").await.unwrap_err();
        assert!(matches!(err, JournalApiError::NotFound(uuid) if uuid == "nope"));
    }

    #[tokio::test]
    async fn server_errors_and_garbage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/journal_bundles/broken/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/journal_bundles/garbage/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let api = api(&server);
        let err = api.fetch_journal_bundle("broken").await.unwrap_err();
        assert!(matches!(err, JournalApiError::QueryError { status: 500, .. }));
        let err = api.fetch_journal_bundle("garbage").await.unwrap_err();
        assert!(matches!(err, JournalApiError::JsonError(_)));
    }

    #[tokio::test]
    async fn bundle_ids_stay_inside_the_bundle_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/journal_bundles/..%2Fusers%2Fme/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        let api = api(&server);
        let err = api.fetch_journal_bundle("../users/me").await.unwrap_err();
        assert!(matches!(err, JournalApiError::NotFound(uuid) if uuid == "../users/me"));
        for id in ["..", ".", ""] {
            let err = api.fetch_journal_bundle(id).await.unwrap_err();
            assert!(matches!(err, JournalApiError::InvalidBundleId(_)));
        }
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(bundle_json()).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        let err = api(&server).fetch_journal_bundle(UUID).await.unwrap_err();
        assert!(matches!(err, JournalApiError::Timeout(_)));
    }
}
