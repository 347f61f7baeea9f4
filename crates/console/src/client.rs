//! HTTP client for the Comanda REST API.
//!
//! Thin wrapper over [`reqwest`] that prefixes the base URL, attaches the
//! bearer token once logged in, and turns non-2xx responses into
//! [`ApiClientError::Api`] carrying the server's error body.

use std::path::Path;

use futures::StreamExt;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Errors from the console's API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// The HTTP request itself failed (connection refused, DNS, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// * `base_url` - API root, e.g. `http://localhost:3000/api/v1`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Log in and keep the access token for later requests.
    ///
    /// Returns the `user` record from the login response.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Value, ApiClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let mut response = self.send(Method::POST, "/auth/login", &[], Some(&body)).await?;

        let token = response
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiClientError::Api {
                status: StatusCode::OK.as_u16(),
                body: "login response carried no access_token".to_string(),
            })?;
        self.token = Some(token);
        Ok(response
            .get_mut("user")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiClientError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiClientError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiClientError> {
        self.send(Method::PUT, path, &[], body).await
    }

    pub async fn delete(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiClientError> {
        self.send(Method::DELETE, path, &[], body).await
    }

    /// Stream a local file to `POST /files/upload`.
    pub async fn upload(&self, local: &Path) -> Result<Value, ApiClientError> {
        let filename = local
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiClientError::InvalidUrl(format!("{} has no file name", local.display())))?
            .to_string();
        let file = tokio::fs::File::open(local).await?;
        let length = file.metadata().await?.len();

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = reqwest::multipart::Part::stream_with_length(body, length)
            .file_name(filename)
            .mime_str(guess_content_type(local))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .request(Method::POST, self.url("/files/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Download a stored file into `dest`, returning the bytes written.
    pub async fn download(&self, filename: &str, dest: &Path) -> Result<u64, ApiClientError> {
        let url = self.file_url(filename)?;
        let response = self.request(Method::GET, url).send().await?;
        let response = Self::ensure_success(response).await?;

        let mut out = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;
        Ok(written)
    }

    pub async fn delete_file(&self, filename: &str) -> Result<Value, ApiClientError> {
        let url = self.file_url(filename)?;
        let response = self.request(Method::DELETE, url).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/files/{filename}` with the name percent-encoded as one segment.
    fn file_url(&self, filename: &str) -> Result<Url, ApiClientError> {
        let mut url =
            Url::parse(&self.url("/files")).map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiClientError::InvalidUrl(self.base_url.clone()))?
            .push(filename);
        Ok(url)
    }

    fn request<U: reqwest::IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiClientError> {
        tracing::debug!(%method, path, "Sending request");
        let mut builder = self.request(method, self.url(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        Self::parse_response(response).await
    }

    async fn ensure_success(response: Response) -> Result<Response, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(ApiClientError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Decode a JSON body; `204 No Content` becomes `null`.
    async fn parse_response(response: Response) -> Result<Value, ApiClientError> {
        let response = Self::ensure_success(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        Ok(response.json().await?)
    }
}

/// Content type sent with an upload, by extension.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(guess_content_type(Path::new("a/logo.PNG")), "image/png");
        assert_eq!(guess_content_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("menu.pdf")), "application/pdf");
        assert_eq!(guess_content_type(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/api/v1/");
        assert_eq!(client.base_url(), "http://localhost:3000/api/v1");
        assert_eq!(client.url("/users"), "http://localhost:3000/api/v1/users");
    }

    #[test]
    fn file_names_are_encoded_as_one_segment() {
        let client = ApiClient::new("http://localhost:3000/api/v1");
        let url = client.file_url("my menu/v2.pdf").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/v1/files/my%20menu%2Fv2.pdf"
        );
    }
}
