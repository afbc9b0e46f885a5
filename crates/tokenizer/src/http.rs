use crate::{Result, TokenizeOptions, TokenizeResponse, Tokenizer, TokenizerError};
use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, Uri};
use log::debug;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeRequest<'a> {
    texts: &'a [String],
    cloud: bool,
    max_tokens_per_text: usize,
}

/// Tokenizer backed by the remote tokenization service over plain HTTP.
///
/// The service is untrusted I/O; callers are expected to wrap calls in their
/// own timeout and treat any error as a whole-batch failure.
pub struct HttpTokenizer {
    client: Client<HttpConnector>,
    endpoint: Uri,
}

impl HttpTokenizer {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint: Uri = endpoint
            .parse()
            .map_err(|_| TokenizerError::InvalidEndpoint(endpoint.to_string()))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }
}

#[async_trait]
impl Tokenizer for HttpTokenizer {
    async fn tokenize(
        &self,
        texts: &[String],
        options: TokenizeOptions,
    ) -> Result<TokenizeResponse> {
        let payload = serde_json::to_vec(&TokenizeRequest {
            texts,
            cloud: options.cloud,
            max_tokens_per_text: options.max_tokens_per_text,
        })?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload))?;

        debug!("tokenize batch of {} texts via {}", texts.len(), self.endpoint);
        let response = self.client.request(request).await?;
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await?;
        if !status.is_success() {
            return Err(TokenizerError::Status(status.as_u16()));
        }

        let parsed: TokenizeResponse = serde_json::from_slice(&bytes)?;
        if parsed.results.len() != texts.len() {
            return Err(TokenizerError::Malformed(format!(
                "expected {} result entries, got {}",
                texts.len(),
                parsed.results.len()
            )));
        }
        Ok(parsed)
    }
}
