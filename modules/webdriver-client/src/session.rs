// W3C WebDriver wire protocol over HTTP. Only the handful of endpoints the
// scrape engine needs: session create/delete, navigate, element lookup,
// text read, click.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{classify, Result, WebDriverError};
use crate::{BrowserSession, ElementHandle, SessionFactory};

/// W3C element identifier key in wire responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Client for a remote WebDriver endpoint (chromedriver or selenium-server).
pub struct WebDriverClient {
    http: reqwest::Client,
    base_url: String,
}

impl WebDriverClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SessionFactory for WebDriverClient {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": [
                            "--headless=new",
                            "--no-sandbox",
                            "--disable-gpu",
                            "--disable-dev-shm-usage",
                            "--window-size=1920,1080",
                        ]
                    }
                }
            }
        });

        let resp = self
            .http
            .post(format!("{}/session", self.base_url))
            .json(&capabilities)
            .send()
            .await?;

        let status = resp.status();
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| WebDriverError::Protocol(format!("session create: {e}")))?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(error_from_value(&value));
        }

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Protocol("missing sessionId".to_string()))?
            .to_string();

        debug!(%session_id, "Opened WebDriver session");

        Ok(Box::new(WebDriverSession {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session_id,
        }))
    }
}

/// One live browser session. Owns a navigable document; element handles are
/// only meaningful against this session.
pub struct WebDriverSession {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverSession {
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let mut req = self.http.request(method.clone(), &url);
        if method == Method::POST {
            // W3C requires a JSON body on every POST, even parameterless ones.
            req = req.json(&body.unwrap_or_else(|| json!({})));
        }

        let resp = req.send().await?;
        let status = resp.status();
        let payload: Value = resp
            .json()
            .await
            .map_err(|e| WebDriverError::Protocol(format!("{path}: {e}")))?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(error_from_value(&value));
        }
        Ok(value)
    }

    fn locator_body(locator: &str) -> Value {
        json!({ "using": "xpath", "value": locator })
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find_all(&self, locator: &str) -> Result<Vec<ElementHandle>> {
        let value = self
            .command(Method::POST, "/elements", Some(Self::locator_body(locator)))
            .await?;
        let items = value
            .as_array()
            .ok_or_else(|| WebDriverError::Protocol("elements: expected array".to_string()))?;
        items.iter().map(element_from_value).collect()
    }

    async fn find_one(&self, locator: &str) -> Result<ElementHandle> {
        let value = self
            .command(Method::POST, "/element", Some(Self::locator_body(locator)))
            .await?;
        element_from_value(&value)
    }

    async fn find_in(&self, scope: &ElementHandle, locator: &str) -> Result<ElementHandle> {
        let path = format!("/element/{}/element", scope.id());
        let value = self
            .command(Method::POST, &path, Some(Self::locator_body(locator)))
            .await?;
        element_from_value(&value)
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let path = format!("/element/{}/text", element.id());
        let value = self.command(Method::GET, &path, None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WebDriverError::Protocol("text: expected string".to_string()))
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let path = format!("/element/{}/click", element.id());
        self.command(Method::POST, &path, None).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.command(Method::DELETE, "", None).await?;
        debug!(session_id = %self.session_id, "Closed WebDriver session");
        Ok(())
    }
}

/// Pull the typed error out of a non-2xx response `value`.
fn error_from_value(value: &Value) -> WebDriverError {
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    classify(code, message)
}

/// Decode a single element reference from its wire representation.
fn element_from_value(value: &Value) -> Result<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get("ELEMENT")) // legacy JSON wire protocol
        .and_then(Value::as_str)
        .map(|id| ElementHandle(id.to_string()))
        .ok_or_else(|| WebDriverError::Protocol("missing element reference".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_w3c_element_reference() {
        let value = json!({ ELEMENT_KEY: "abc-123" });
        assert_eq!(element_from_value(&value).unwrap().id(), "abc-123");
    }

    #[test]
    fn decodes_legacy_element_reference() {
        let value = json!({ "ELEMENT": "legacy-1" });
        assert_eq!(element_from_value(&value).unwrap().id(), "legacy-1");
    }

    #[test]
    fn rejects_value_without_element_reference() {
        let value = json!({ "unrelated": true });
        assert!(matches!(
            element_from_value(&value),
            Err(WebDriverError::Protocol(_))
        ));
    }

    #[test]
    fn error_from_value_maps_code() {
        let value = json!({ "error": "stale element reference", "message": "gone" });
        assert!(error_from_value(&value).is_stale());
    }
}
