use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::Request;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use super::{Error, HttpRequest, HttpResponse, Result};

/// Pooled HTTP/1 client for node endpoints, over plain TCP or rustls.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpClient {
    /// `connect_timeout` bounds TCP connect only; per-request deadlines come from
    /// [`HttpRequest::with_timeout`].
    #[must_use]
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        let mut connector = HttpConnector::new();
        connector.enforce_http(false);
        connector.set_connect_timeout(connect_timeout);

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(connector);

        Self {
            inner: Client::builder(TokioExecutor::new()).build(connector),
        }
    }

    /// Send `req` and collect the whole body. Non-2xx statuses are returned, not raised.
    pub async fn request(&self, req: HttpRequest) -> Result<HttpResponse> {
        let timeout = req.timeout;
        let req = into_hyper(req)?;
        tracing::debug!(method = %req.method(), uri = %req.uri(), "sending request");

        let send = self.inner.request(req);
        let res = match timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => send.await?,
        };

        let status = res.status().as_u16();
        let body = res.into_body().collect().await?.to_bytes();
        tracing::debug!(status, body_len = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}

// Host and Content-Length are filled in by hyper from the URI and the sized body.
fn into_hyper(req: HttpRequest) -> Result<Request<Full<Bytes>>> {
    let parsed = url::Url::parse(&req.url).map_err(|_| Error::InvalidUrl(req.url.clone()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::UnsupportedScheme(req.url));
    }
    let uri: hyper::Uri = req.url.parse().map_err(|_| Error::InvalidUrl(req.url.clone()))?;

    let mut builder = Request::builder().method(req.method).uri(uri);
    for (k, v) in req.headers {
        let name = http::header::HeaderName::from_bytes(k.as_bytes())?;
        let value = http::header::HeaderValue::from_str(&v)?;
        builder = builder.header(name, value);
    }
    Ok(builder.body(Full::new(req.body))?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn unreachable_host_fails_fast_with_connect_timeout() {
        let client = HttpClient::new(Some(Duration::from_millis(200)));
        let req = HttpRequest::get("http://192.0.2.1:81/");

        let started = Instant::now();
        let _err = client.request(req).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(
            elapsed < Duration::from_secs(2),
            "expected fast failure, elapsed={elapsed:?}"
        );
    }

    #[test]
    fn rejects_non_http_schemes() {
        let err = into_hyper(HttpRequest::get("ftp://example.com/file")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(_)), "{err}");

        let err = into_hyper(HttpRequest::get("not a url")).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)), "{err}");
    }

    #[test]
    fn headers_and_body_carry_over() {
        let req = HttpRequest::post(
            "http://127.0.0.1:8080/v2/teal/compile",
            Bytes::from_static(b"int 1"),
        )
        .with_headers(vec![("Content-Type".to_string(), "text/plain".to_string())]);
        let req = into_hyper(req).unwrap();

        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(req.uri().path(), "/v2/teal/compile");
        assert_eq!(req.headers()[http::header::CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let req = HttpRequest::get("http://127.0.0.1/")
            .with_headers(vec![("bad name".to_string(), "v".to_string())]);
        assert!(matches!(into_hyper(req), Err(Error::HeaderName(_))));
    }
}
