//! Redirect capture: query parsing plus a one-shot localhost listener.

use crate::error::{OAuthError, OAuthResult};
use crate::types::CallbackParams;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

const SUCCESS_HTML: &str =
    "<html><body><h1>Authorization received</h1><p>Return to the terminal to finish.</p></body></html>";
const NOT_FOUND_HTML: &str = "<html><body><h1>Not found</h1></body></html>";

/// Extracts `code` and `shop` from a redirect. Accepts a full URL, `?a=b` or a bare query string.
pub fn parse_callback(input: &str) -> Option<CallbackParams> {
    let trimmed = input.trim();
    let query = match trimmed.find('?') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    let query = query.split('#').next().unwrap_or_default();

    let mut code = None;
    let mut shop = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "shop" => shop = Some(value.into_owned()),
            _ => {}
        }
    }

    let code = code.filter(|c| !c.is_empty())?;
    Some(CallbackParams {
        code,
        shop: shop.filter(|s| !s.is_empty()),
    })
}

pub struct CallbackListener {
    listener: TcpListener,
    port: u16,
}

impl CallbackListener {
    /// The redirect URI registered with Shopify names a fixed port, so there is
    /// no fallback to a dynamic one. Port 0 is only useful in tests.
    pub async fn bind(port: u16) -> OAuthResult<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| OAuthError::Callback(format!("bind 127.0.0.1:{port} failed: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| OAuthError::Callback(format!("local_addr failed: {e}")))?
            .port();
        tracing::info!("Waiting for OAuth redirect on 127.0.0.1:{}", port);
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves requests until one carries a `code`. Returns `Ok(None)` when cancelled.
    pub async fn wait(self, cancel: CancellationToken) -> OAuthResult<Option<CallbackParams>> {
        loop {
            let (mut socket, _) = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Callback listener cancelled");
                    return Ok(None);
                }
                accepted = self.listener.accept() => accepted
                    .map_err(|e| OAuthError::Callback(format!("accept failed: {e}")))?,
            };

            let target = match read_request_target(&mut socket).await {
                Ok(target) => target,
                Err(e) => {
                    tracing::debug!("Ignoring unreadable callback request: {}", e);
                    continue;
                }
            };

            match parse_callback(&target) {
                Some(params) => {
                    respond(&mut socket, "HTTP/1.1 200 OK", SUCCESS_HTML).await;
                    return Ok(Some(params));
                }
                None => respond(&mut socket, "HTTP/1.1 404 Not Found", NOT_FOUND_HTML).await,
            }
        }
    }
}

async fn read_request_target(socket: &mut TcpStream) -> OAuthResult<String> {
    let mut buffer = vec![0u8; 8192];
    let size = socket
        .read(&mut buffer)
        .await
        .map_err(|e| OAuthError::Callback(format!("read failed: {e}")))?;
    if size == 0 {
        return Err(OAuthError::Callback("empty request".to_string()));
    }

    let request = String::from_utf8_lossy(&buffer[..size]);
    let first = request
        .lines()
        .next()
        .ok_or_else(|| OAuthError::Callback("malformed request".to_string()))?;
    let mut parts = first.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();
    if method != "GET" || target.is_empty() {
        return Err(OAuthError::Callback(format!("unexpected request line: {first}")));
    }
    Ok(target.to_string())
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "{status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
