use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header;
use tracing::{debug, trace};

use crate::error::{CoreError, RpcError};
use crate::rpc::RpcTransport;

use super::connection::{parse_connection, Credentials};
use super::protocol::JsonRpcRequest;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// JSON-RPC client for a coin daemon over HTTP(S).
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    credentials: Credentials,
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Create a client for `connection` (an `http://` or `https://` URL).
    ///
    /// Authentication precedence:
    /// 1. explicit `user` + `pass`
    /// 2. cookie file (`username:password`) from `cookie_file`
    /// 3. no auth
    ///
    /// If `requests_per_second` is set, outbound calls are rate-limited.
    pub fn new(
        connection: &str,
        user: Option<&str>,
        pass: Option<&str>,
        cookie_file: Option<&Path>,
        requests_per_second: Option<u32>,
    ) -> Result<Self, CoreError> {
        let credentials = Credentials::resolve(user, pass, cookie_file)?;
        let url = parse_connection(connection)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(16)
            .tcp_nodelay(true)
            .build()
            .map_err(RpcError::Transport)?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            credentials,
            limiter,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn call(&self, method: &str, params: serde_json::Value) -> Result<String, CoreError> {
        self.wait_for_rate_limit().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(rpc.id = id, rpc.method = method, rpc.params = %params, "rpc call");

        let req = JsonRpcRequest::new(id, method, &params);
        let mut builder = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req);
        if let Some((user, pass)) = self.credentials.basic_auth()? {
            builder = builder.basic_auth(user, Some(pass));
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        // Daemons answer backend errors with HTTP 404/500 and a JSON body, so
        // the status alone says nothing. Only an empty non-2xx body is fatal.
        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        if !status.is_success() && body.trim().is_empty() {
            return Err(RpcError::InvalidResponse(format!(
                "{method}: HTTP {status} with empty body"
            ))
            .into());
        }

        Ok(body)
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
