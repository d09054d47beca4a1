// reqwest-backed transport to the metrics backend
use crate::application::transport::{
    BackendRequest, BackendResponse, Method, RequestBody, Transport, TransportError,
};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_url(base: &str, path: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), path)
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, base: &str, request: BackendRequest) -> Result<BackendResponse, TransportError> {
        let url = Self::build_url(base, &request.path);

        let mut builder = self.client.request(to_reqwest(request.method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            Some(RequestBody::Text(text)) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(text),
            Some(RequestBody::Json(value)) => builder.json(&value),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            tracing::debug!(url = %url, error = %e, "Request to backend failed");
            TransportError::new(format!("Failed to reach server: {}", e))
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read server response: {}", e)))?;

        Ok(BackendResponse::new(status, body))
    }
}
