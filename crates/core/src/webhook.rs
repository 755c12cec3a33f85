//! Client side of the automation webhook that turns a text request into a
//! text reply.

use crate::error::{AssistantError, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default hard limit on a single webhook round trip.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP verb used to reach the webhook. Both carry the same JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WebhookMethod {
    #[default]
    Get,
    Post,
}

impl FromStr for WebhookMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(WebhookMethod::Get),
            "POST" => Ok(WebhookMethod::Post),
            other => Err(format!("'{}' is not a supported webhook method", other)),
        }
    }
}

impl fmt::Display for WebhookMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookMethod::Get => write!(f, "GET"),
            WebhookMethod::Post => write!(f, "POST"),
        }
    }
}

/// Body sent to the webhook.
#[derive(Serialize, Debug)]
struct WebhookRequest<'a> {
    text: &'a str,
}

/// Anything that can answer a text request with a text reply.
#[cfg_attr(test, mockall::automock)]
pub trait Webhook {
    /// Sends `text` and returns the raw reply body.
    ///
    /// Transport failures map to [`AssistantError::Webhook`] and any status
    /// other than `200 OK` to [`AssistantError::WebhookStatus`].
    fn send(&self, text: &str) -> Result<String>;
}

/// A [`Webhook`] reached over HTTP with a blocking client.
pub struct HttpWebhook {
    client: Client,
    url: String,
    method: WebhookMethod,
}

impl HttpWebhook {
    /// Creates a webhook client whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, method: WebhookMethod, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Webhook(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, url, method))
    }

    /// Wraps a preconfigured client.
    pub fn with_client(client: Client, url: impl Into<String>, method: WebhookMethod) -> Self {
        Self {
            client,
            url: url.into(),
            method,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Webhook for HttpWebhook {
    fn send(&self, text: &str) -> Result<String> {
        let request = match self.method {
            WebhookMethod::Get => self.client.get(&self.url),
            WebhookMethod::Post => self.client.post(&self.url),
        };

        let response = request
            .json(&WebhookRequest { text })
            .send()
            .map_err(|e| AssistantError::Webhook(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AssistantError::WebhookStatus(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| AssistantError::Webhook(format!("Failed to read reply body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Reads one HTTP request (headers plus `Content-Length` body).
    fn read_request(stream: &mut impl Read) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves a single canned response and hands back the raw request.
    fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\n\
                 Content-Type: text/plain; charset=utf-8\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(request);
        });
        (format!("http://{}/webhook", addr), rx)
    }

    fn local_client(timeout: Duration) -> Client {
        Client::builder().no_proxy().timeout(timeout).build().unwrap()
    }

    fn local_webhook(url: String, method: WebhookMethod) -> HttpWebhook {
        HttpWebhook::with_client(local_client(DEFAULT_WEBHOOK_TIMEOUT), url, method)
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<WebhookMethod>().unwrap(), WebhookMethod::Get);
        assert_eq!(" Post ".parse::<WebhookMethod>().unwrap(), WebhookMethod::Post);
        assert!("PUT".parse::<WebhookMethod>().is_err());
        assert_eq!(WebhookMethod::default().to_string(), "GET");
    }

    #[test]
    fn test_ok_reply_is_returned_verbatim() {
        let (url, requests) = serve_once("200 OK", "Hallo");
        let webhook = local_webhook(url, WebhookMethod::Get);
        assert!(webhook.url().ends_with("/webhook"));

        let reply = webhook.send("wie ist das Wetter").unwrap();
        assert_eq!(reply, "Hallo");

        let request = requests.recv().unwrap();
        assert!(request.starts_with("GET /webhook"));
        assert!(request.contains(r#"{"text":"wie ist das Wetter"}"#));
    }

    #[test]
    fn test_post_method_sends_json_body() {
        let (url, requests) = serve_once("200 OK", "Grüße zurück");
        let webhook = local_webhook(url, WebhookMethod::Post);

        assert_eq!(webhook.send("user: hallo").unwrap(), "Grüße zurück");

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /webhook"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
    }

    #[test]
    fn test_non_ok_status_is_an_error() {
        let (url, _requests) = serve_once("500 Internal Server Error", "boom");
        let webhook = local_webhook(url, WebhookMethod::Get);

        match webhook.send("hallo").unwrap_err() {
            AssistantError::WebhookStatus(code) => assert_eq!(code, 500),
            other => panic!("Expected WebhookStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_other_success_statuses_are_errors() {
        let (url, _requests) = serve_once("204 No Content", "");
        let webhook = local_webhook(url, WebhookMethod::Post);

        match webhook.send("hallo").unwrap_err() {
            AssistantError::WebhookStatus(code) => assert_eq!(code, 204),
            other => panic!("Expected WebhookStatus, got {:?}", other),
        }

        let (url, _requests) = serve_once("201 Created", "angelegt");
        let webhook = local_webhook(url, WebhookMethod::Post);

        assert!(matches!(
            webhook.send("hallo").unwrap_err(),
            AssistantError::WebhookStatus(201)
        ));
    }

    #[test]
    fn test_unreachable_webhook_is_a_transport_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let webhook = HttpWebhook::with_client(
            local_client(Duration::from_secs(2)),
            format!("http://{}/webhook", addr),
            WebhookMethod::Get,
        );

        assert!(matches!(
            webhook.send("hallo").unwrap_err(),
            AssistantError::Webhook(_)
        ));
    }

    #[test]
    fn test_slow_webhook_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let _ = read_request(&mut stream);
            thread::sleep(Duration::from_secs(2));
        });
        let webhook = HttpWebhook::with_client(
            local_client(Duration::from_millis(200)),
            format!("http://{}/webhook", addr),
            WebhookMethod::Get,
        );

        assert!(matches!(
            webhook.send("hallo").unwrap_err(),
            AssistantError::Webhook(_)
        ));
    }
}
