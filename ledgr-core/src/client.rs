use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use ledgr_http::{HttpClient, HttpRequest, HttpResponse, has_header};

use crate::request::JsonRequest;
use crate::util::{is_hosted_runtime, prune_absent_keys};
use crate::{ClientConfig, Error, IntDecoding, Result, decode_slice};

/// Query parameters; `None` marks a parameter the caller left unset.
pub type Query = IndexMap<String, Option<String>>;

#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: HttpClient,
    config: Arc<ClientConfig>,
}

impl LedgerClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|_| Error::InvalidBaseUrl(config.base_url.clone()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::InvalidBaseUrl(config.base_url));
        }

        Ok(Self {
            http: HttpClient::new(config.connect_timeout),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full request URL for `path`. Unset query parameters are left out.
    pub fn url(&self, path: &str, query: &Query) -> Result<String> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = url::Url::parse(&format!("{base}/{path}"))
            .map_err(|_| Error::InvalidBaseUrl(self.config.base_url.clone()))?;

        let query = prune_absent_keys(query);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url.into())
    }

    fn headers(&self, mut headers: Vec<(String, String)>) -> Vec<(String, String)> {
        if let Some(token) = &self.config.token
            && !has_header(&headers, &self.config.token_header)
        {
            headers.push((self.config.token_header.clone(), token.clone()));
        }
        for (k, v) in &self.config.default_headers {
            if !has_header(&headers, k) {
                headers.push((k.clone(), v.clone()));
            }
        }
        headers
    }

    pub async fn get(
        &self,
        path: &str,
        query: &Query,
        headers: Vec<(String, String)>,
    ) -> Result<HttpResponse> {
        let req = HttpRequest::get(self.url(path, query)?);
        self.execute(req, headers).await
    }

    pub async fn post(
        &self,
        path: &str,
        query: &Query,
        body: Bytes,
        headers: Vec<(String, String)>,
    ) -> Result<HttpResponse> {
        let req = HttpRequest::post(self.url(path, query)?, body);
        self.execute(req, headers).await
    }

    async fn execute(&self, req: HttpRequest, headers: Vec<(String, String)>) -> Result<HttpResponse> {
        let req = req
            .with_headers(self.headers(headers))
            .with_timeout(self.config.request_timeout);
        let method = req.method.clone();
        let url = req.url.clone();

        let res = self.http.request(req).await?;
        if !res.is_success() {
            let message = error_message(&res);
            tracing::warn!(%method, %url, status = res.status, %message, "request failed");
            return Err(Error::Status {
                status: res.status,
                message,
            });
        }
        Ok(res)
    }

    /// Perform `req` and return the undecoded body.
    pub async fn send_raw<R: JsonRequest>(
        &self,
        req: &R,
        headers: Vec<(String, String)>,
    ) -> Result<Bytes> {
        let headers = req.prepare_headers(headers);
        let query = req.query();
        let res = match req.body() {
            Some(body) => self.post(&req.path(), &query, body, headers).await?,
            None => self.get(&req.path(), &query, headers).await?,
        };
        Ok(res.body)
    }

    /// Perform `req`, decode the body under the request's policy and hand it to
    /// [`JsonRequest::prepare`].
    pub async fn send<R: JsonRequest>(
        &self,
        req: &R,
        headers: Vec<(String, String)>,
    ) -> Result<R::Output> {
        let body = self.send_raw(req, headers).await?;
        let value = decode_slice(&body, req.int_decoding())?;
        req.prepare(value)
    }

    /// [`LedgerClient::send`] for callers without an async runtime.
    ///
    /// Fails with [`Error::BlockingInRuntime`] when called from inside one, since blocking there
    /// would stall the runtime's worker.
    pub fn send_blocking<R: JsonRequest>(
        &self,
        req: &R,
        headers: Vec<(String, String)>,
    ) -> Result<R::Output> {
        if is_hosted_runtime() {
            return Err(Error::BlockingInRuntime);
        }
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.send(req, headers))
    }
}

// Nodes report failures as `{"message": "..."}`; fall back to the raw body text.
fn error_message(res: &HttpResponse) -> String {
    if let Ok(body) = decode_slice(&res.body, IntDecoding::Default)
        && let Some(message) = body.get("message").and_then(|m| m.as_str())
    {
        return message.to_string();
    }
    String::from_utf8_lossy(&res.body).trim().to_string()
}
