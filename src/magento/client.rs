use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use tracing::{debug, error};

use crate::business::OrderSource;
use crate::config::MagentoConfig;
use crate::domain::{Order, OrderWindow, StoreNote};
use crate::magento::error::MagentoError;
use crate::magento::models::*;

const CREATED_AT: &str = "created_at";

/// Client for the store's REST API.
pub struct MagentoClient {
    base_url: String,
    client: reqwest::Client,
}

impl MagentoClient {
    /// Create a new client; the base URL is the REST root, e.g. `https://shop/rest/`.
    pub fn new(config: MagentoConfig) -> Result<Self, MagentoError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| MagentoError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if config.bearer_token.is_empty() {
            return Err(MagentoError::AuthenticationError(
                "Store bearer token is required".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.bearer_token);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| {
                MagentoError::AuthenticationError(format!("Invalid token format: {}", e))
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(MagentoError::NetworkError)?;

        Ok(Self { base_url, client })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn window_query(window: &OrderWindow) -> Vec<(String, String)> {
        let bounds = [(0, window.from.as_str(), "from"), (1, window.to.as_str(), "to")];
        let mut params = Vec::with_capacity(bounds.len() * 3);
        for (group, value, condition) in bounds {
            let prefix = format!("searchCriteria[filter_groups][{}][filters][0]", group);
            params.push((format!("{}[field]", prefix), CREATED_AT.to_string()));
            params.push((format!("{}[value]", prefix), value.to_string()));
            params.push((format!("{}[condition_type]", prefix), condition.to_string()));
        }
        params
    }

    /// List every order whose `created_at` falls inside the window.
    pub async fn list_orders(&self, window: &OrderWindow) -> Result<Vec<Order>, MagentoError> {
        let url = self.build_url("V1/orders");
        debug!("Listing orders from {} to {}: {}", window.from, window.to, url);

        let response = self
            .client
            .get(&url)
            .query(&Self::window_query(window))
            .send()
            .await
            .map_err(MagentoError::NetworkError)?;

        let status = response.status();
        let text = response.text().await.map_err(MagentoError::NetworkError)?;

        if !status.is_success() {
            error!("Store API error: {} - {}", status, text);
            return Err(MagentoError::from_response(status.as_u16(), &text));
        }

        let search: OrderSearchResponse =
            serde_json::from_str(&text).map_err(MagentoError::SerializationError)?;
        debug!("Store reported {} orders", search.total_count);
        Ok(search.into_orders())
    }

    /// Push an operator note to the order; returns the note the store persisted.
    pub async fn update_store_note(
        &self,
        entity_id: i64,
        note: &StoreNote,
    ) -> Result<StoreNoteRecord, MagentoError> {
        let url = self.build_url(&format!(
            "V1/orderManagement/orderId/{}/updateStoreNote",
            entity_id
        ));
        debug!("Updating store note: {}", url);

        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .json(&StoreNoteRequest { store_note: note })
            .send()
            .await
            .map_err(MagentoError::NetworkError)?;

        let status = response.status();
        let text = response.text().await.map_err(MagentoError::NetworkError)?;

        if !status.is_success() {
            if status == 404 {
                return Err(MagentoError::NotFound(format!(
                    "Order with ID {} not found",
                    entity_id
                )));
            }
            error!("Store API error: {} - {}", status, text);
            return Err(MagentoError::from_response(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(MagentoError::SerializationError)
    }
}

#[async_trait]
impl OrderSource for MagentoClient {
    async fn list_orders(&self, window: &OrderWindow) -> Result<Vec<Order>, MagentoError> {
        MagentoClient::list_orders(self, window).await
    }

    async fn update_store_note(
        &self,
        entity_id: i64,
        note: &StoreNote,
    ) -> Result<StoreNoteRecord, MagentoError> {
        MagentoClient::update_store_note(self, entity_id, note).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_config(base_url: String, token: String) -> MagentoConfig {
        MagentoConfig {
            base_url,
            bearer_token: token,
        }
    }

    fn december() -> OrderWindow {
        OrderWindow {
            from: "2019-12-01 00:00:00".to_string(),
            to: "2019-12-31 23:59:59".to_string(),
        }
    }

    #[test]
    fn test_client_creation_success() {
        let config = create_test_config("http://localhost:8000/rest/".to_string(), "test-token".to_string());
        assert_ok!(MagentoClient::new(config));
    }

    #[test]
    fn test_client_creation_requires_token() {
        let config = create_test_config("http://localhost:8000/rest".to_string(), String::new());
        match MagentoClient::new(config) {
            Err(MagentoError::AuthenticationError(_)) => {}
            _ => panic!("Expected AuthenticationError"),
        }
    }

    #[test]
    fn test_client_creation_rejects_bad_url() {
        let config = create_test_config("not a url".to_string(), "test-token".to_string());
        match MagentoClient::new(config) {
            Err(MagentoError::InvalidUrl(_)) => {}
            _ => panic!("Expected InvalidUrl"),
        }
    }

    #[test]
    fn test_build_url_joins_once() {
        let config = create_test_config("http://shop.test/rest/".to_string(), "t".to_string());
        let client = MagentoClient::new(config).unwrap();
        assert_eq!(client.build_url("V1/orders"), "http://shop.test/rest/V1/orders");
        assert_eq!(client.build_url("/V1/orders"), "http://shop.test/rest/V1/orders");
    }

    #[tokio::test]
    async fn test_list_orders_sends_month_filter() {
        let mock_server = MockServer::start().await;
        let config = create_test_config(format!("{}/rest/", mock_server.uri()), "test-token".to_string());
        let client = MagentoClient::new(config).unwrap();

        Mock::given(method("GET"))
            .and(path("/rest/V1/orders"))
            .and(header("Authorization", "Bearer test-token"))
            .and(query_param("searchCriteria[filter_groups][0][filters][0][field]", "created_at"))
            .and(query_param("searchCriteria[filter_groups][0][filters][0][value]", "2019-12-01 00:00:00"))
            .and(query_param("searchCriteria[filter_groups][0][filters][0][condition_type]", "from"))
            .and(query_param("searchCriteria[filter_groups][1][filters][0][value]", "2019-12-31 23:59:59"))
            .and(query_param("searchCriteria[filter_groups][1][filters][0][condition_type]", "to"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 2,
                "items": [
                    {"entity_id": 1, "increment_id": "0001"},
                    {"entity_id": 2, "increment_id": "0002"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let orders = client.list_orders(&december()).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].entity_id, 1);
        assert_eq!(orders[1].increment_id, "0002");
    }

    #[tokio::test]
    async fn test_list_orders_empty_month() {
        let mock_server = MockServer::start().await;
        let config = create_test_config(mock_server.uri(), "test-token".to_string());
        let client = MagentoClient::new(config).unwrap();

        Mock::given(method("GET"))
            .and(path("/V1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [],
                "total_count": 0
            })))
            .mount(&mock_server)
            .await;

        let orders = client.list_orders(&december()).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_unauthorized() {
        let mock_server = MockServer::start().await;
        let config = create_test_config(mock_server.uri(), "expired".to_string());
        let client = MagentoClient::new(config).unwrap();

        Mock::given(method("GET"))
            .and(path("/V1/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "The consumer isn't authorized to access %resources."
            })))
            .mount(&mock_server)
            .await;

        let result = client.list_orders(&december()).await;
        match result.unwrap_err() {
            MagentoError::AuthenticationError(_) => {}
            other => panic!("Expected AuthenticationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_orders_not_json() {
        let mock_server = MockServer::start().await;
        let config = create_test_config(mock_server.uri(), "test-token".to_string());
        let client = MagentoClient::new(config).unwrap();

        Mock::given(method("GET"))
            .and(path("/V1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        match client.list_orders(&december()).await.unwrap_err() {
            MagentoError::SerializationError(_) => {}
            other => panic!("Expected SerializationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_store_note_success() {
        let mock_server = MockServer::start().await;
        let config = create_test_config(mock_server.uri(), "test-token".to_string());
        let client = MagentoClient::new(config).unwrap();

        Mock::given(method("PUT"))
            .and(path("/V1/orderManagement/orderId/5842/updateStoreNote"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(json!({
                "storeNote": {"note": "thanks", "status": "resolved", "erply_invoice_ids": "INV-1"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sales_order_id": 5842,
                "sales_order_increment_id": "000001234",
                "note": "thanks",
                "status": "resolved",
                "erply_invoice_ids": "INV-1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let note = StoreNote::new("resolved", "thanks", "INV-1");
        let record = client.update_store_note(5842, &note).await.unwrap();
        assert_eq!(record.sales_order_id, 5842);
        assert_eq!(record.store_note(), note);
    }

    #[tokio::test]
    async fn test_update_store_note_unknown_order() {
        let mock_server = MockServer::start().await;
        let config = create_test_config(mock_server.uri(), "test-token".to_string());
        let client = MagentoClient::new(config).unwrap();

        Mock::given(method("PUT"))
            .and(path("/V1/orderManagement/orderId/999/updateStoreNote"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = client.update_store_note(999, &StoreNote::default()).await;
        assert_err!(&result);
        match result.unwrap_err() {
            MagentoError::NotFound(_) => {}
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_network_failure() {
        // Nothing listens on port 9 (discard).
        let config = create_test_config("http://127.0.0.1:9".to_string(), "test-token".to_string());
        let client = MagentoClient::new(config).unwrap();

        match client.list_orders(&december()).await.unwrap_err() {
            MagentoError::NetworkError(_) => {}
            other => panic!("Expected NetworkError, got {:?}", other),
        }
    }
}
