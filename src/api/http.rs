//! JSON-over-HTTP client for the equipment listing service
//!
//! `GET {base}/equipment` returns the collection as a JSON array.
//! `POST {base}/equipment` takes the form data and answers with the created
//! record. An empty body, `204 No Content` or a literal `null` count as
//! "no record returned".

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::{ApiError, CancelToken, EquipmentService};
use crate::model::{EquipmentFormData, EquipmentRecord};

pub struct HttpEquipmentService {
    client: Client,
    base_url: String,
}

impl HttpEquipmentService {
    /// Build a client for `base_url`. No timeout is applied unless one is given.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/equipment", self.base_url.trim_end_matches('/'))
    }

    async fn read_body(response: reqwest::Response) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Ok((status, bytes.to_vec()))
    }
}

#[async_trait]
impl EquipmentService for HttpEquipmentService {
    async fn get_equipment(&self, cancel: &CancelToken) -> Result<Vec<EquipmentRecord>, ApiError> {
        cancel.run(self.fetch_list()).await
    }

    async fn add_equipment(
        &self,
        form: EquipmentFormData,
        cancel: &CancelToken,
    ) -> Result<Option<EquipmentRecord>, ApiError> {
        cancel.run(self.post_form(&form)).await
    }
}

impl HttpEquipmentService {
    async fn fetch_list(&self) -> Result<Vec<EquipmentRecord>, ApiError> {
        let url = self.endpoint();
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let (_, body) = Self::read_body(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_form(&self, form: &EquipmentFormData) -> Result<Option<EquipmentRecord>, ApiError> {
        let url = self.endpoint();
        tracing::debug!("POST {} ({})", url, form.name);

        let response = self.client.post(&url).json(form).send().await?;
        let (status, body) = Self::read_body(response).await?;

        if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        // `null` deserializes to None
        Ok(serde_json::from_slice::<Option<EquipmentRecord>>(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EquipmentId;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer exactly one request with `status` and `body`, returning the base URL
    /// and a handle yielding the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then as much body as Content-Length announces
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (format!("http://{}/api/", addr), handle)
    }

    fn form() -> EquipmentFormData {
        EquipmentFormData {
            name: "Seed drill".to_string(),
            description: "9 row".to_string(),
            condition: "Good".to_string(),
            expected_value: 18000.0,
            location: "Nagpur".to_string(),
            owner: "Asha".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_equipment_preserves_order() {
        let body = r#"[
            {"id":"e2","name":"Harrow","description":"","condition":"Fair","expectedValue":900,"location":"A","owner":"B"},
            {"id":"e1","name":"Tractor","description":"","condition":"Good","expectedValue":250000,"location":"C","owner":"D"}
        ]"#;
        let (base, request) = serve_once("200 OK", body).await;
        let service = HttpEquipmentService::new(base, None).unwrap();

        let records = service.get_equipment(&CancelToken::new()).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.0.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e1"]);

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /api/equipment "));
    }

    #[tokio::test]
    async fn test_get_equipment_maps_error_status() {
        let (base, _request) = serve_once("503 Service Unavailable", "").await;
        let service = HttpEquipmentService::new(base, None).unwrap();

        let err = service.get_equipment(&CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Status(503)));
    }

    #[tokio::test]
    async fn test_get_equipment_rejects_malformed_body() {
        let (base, _request) = serve_once("200 OK", r#"{"not":"a list"}"#).await;
        let service = HttpEquipmentService::new(base, None).unwrap();

        let err = service.get_equipment(&CancelToken::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_add_equipment_returns_created_record() {
        let body = r#"{"id":"e9","name":"Seed drill","description":"9 row","condition":"Good","expectedValue":18000,"location":"Nagpur","owner":"Asha"}"#;
        let (base, request) = serve_once("201 Created", body).await;
        let service = HttpEquipmentService::new(base, None).unwrap();

        let created = service.add_equipment(form(), &CancelToken::new()).await.unwrap();
        assert_eq!(created.map(|r| r.id), Some(EquipmentId::from("e9")));

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /api/equipment "));
        assert!(request.contains(r#""expectedValue":18000.0"#));
    }

    #[tokio::test]
    async fn test_add_equipment_empty_responses_are_none() {
        let (base, _r) = serve_once("200 OK", "null").await;
        let service = HttpEquipmentService::new(base, None).unwrap();
        assert!(service.add_equipment(form(), &CancelToken::new()).await.unwrap().is_none());

        let (base, _r) = serve_once("200 OK", "").await;
        let service = HttpEquipmentService::new(base, None).unwrap();
        assert!(service.add_equipment(form(), &CancelToken::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_request_is_not_sent() {
        let service = HttpEquipmentService::new("http://127.0.0.1:9", None).unwrap();
        let token = CancelToken::new();
        token.cancel();

        let err = service.get_equipment(&token).await.unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
    }
}
