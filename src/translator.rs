use anyhow::{anyhow, Context};
use serde::Deserialize;
use tracing::debug;

use crate::config::Credential;

pub const GOOGLE_TRANSLATE_API: &str = "https://translation.googleapis.com/language/translate/v2";

pub trait Translator {
    /// Returns the language code of `text`.
    async fn detect(&self, text: &str) -> anyhow::Result<String>;

    async fn translate(&self, text: &str, to_lang: &str) -> anyhow::Result<String>;
}

pub struct GoogleTranslator {
    client: reqwest::Client,
    credential: Credential,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, GOOGLE_TRANSLATE_API)
    }

    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credential,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.post(url);
        match &self.credential {
            Credential::ApiKey(key) => builder.query(&[("key", key)]),
            Credential::AccessToken(token) => builder.bearer_auth(token),
        }
    }

    async fn call<T>(&self, url: &str, form: &[(&str, &str)]) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(url, "calling Google Translate");
        let res = self.request(url).form(form).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(anyhow!("{}: {}", status, api_error_message(&body)));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl Translator for GoogleTranslator {
    async fn detect(&self, text: &str) -> anyhow::Result<String> {
        let url = format!("{}/detect", self.base_url);
        let res: DetectResponse = self
            .call(&url, &[("q", text)])
            .await
            .context("fail to call detection API")?;
        res.into_language().context("fail to call detection API")
    }

    async fn translate(&self, text: &str, to_lang: &str) -> anyhow::Result<String> {
        let res: TranslateResponse = self
            .call(
                &self.base_url,
                &[("q", text), ("target", to_lang), ("format", "text")],
            )
            .await
            .context("fail to call translate API")?;
        res.into_text().context("fail to call translate API")
    }
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    data: DetectData,
}

#[derive(Debug, Deserialize)]
struct DetectData {
    detections: Vec<Vec<Detection>>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
}

impl DetectResponse {
    fn into_language(self) -> anyhow::Result<String> {
        self.data
            .detections
            .into_iter()
            .next()
            .and_then(|candidates| candidates.into_iter().next())
            .map(|detection| detection.language)
            .ok_or_else(|| anyhow!("no detection returned"))
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl TranslateResponse {
    fn into_text(self) -> anyhow::Result<String> {
        self.data
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.translated_text)
            .ok_or_else(|| anyhow!("no translation returned"))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pulls `error.message` out of a Google error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(res) => res.error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serves one canned HTTP response on a local port and hands back the raw
    /// request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v2", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(request).unwrap()
        });
        (base_url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        body.len() >= length
    }

    #[tokio::test]
    async fn translate_sends_key_and_form() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"data":{"translations":[{"translatedText":"こんにちは世界"}]}}"#,
        )
        .await;
        let translator =
            GoogleTranslator::with_base_url(Credential::ApiKey("secret".to_string()), base_url);
        let translated = translator.translate("hello world", "ja").await.unwrap();
        assert_eq!(translated, "こんにちは世界");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v2?key=secret HTTP/1.1\r\n"), "{}", request);
        assert!(!request.to_ascii_lowercase().contains("authorization:"));
        assert!(request.ends_with("\r\n\r\nq=hello+world&target=ja&format=text"), "{}", request);
    }

    #[tokio::test]
    async fn detect_sends_bearer_token() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"data":{"detections":[[{"language":"en","isReliable":false,"confidence":1}]]}}"#,
        )
        .await;
        let translator =
            GoogleTranslator::with_base_url(Credential::AccessToken("tok123".to_string()), base_url);
        assert_eq!(translator.detect("hello").await.unwrap(), "en");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v2/detect HTTP/1.1\r\n"), "{}", request);
        assert!(
            request
                .lines()
                .any(|line| line.eq_ignore_ascii_case("authorization: Bearer tok123")),
            "{}",
            request
        );
        assert!(request.ends_with("\r\n\r\nq=hello"), "{}", request);
    }

    #[tokio::test]
    async fn error_status_carries_google_message() {
        let (base_url, server) = serve_once(
            "400 Bad Request",
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","errors":[]}}"#,
        )
        .await;
        let translator =
            GoogleTranslator::with_base_url(Credential::ApiKey("bad".to_string()), base_url);
        let err = translator.translate("hello", "ja").await.unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "fail to call translate API: 400 Bad Request: API key not valid. Please pass a valid API key."
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn detect_error_names_detection_call() {
        let (base_url, server) = serve_once("503 Service Unavailable", "backend down").await;
        let translator =
            GoogleTranslator::with_base_url(Credential::AccessToken("tok".to_string()), base_url);
        let err = translator.detect("hello").await.unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "fail to call detection API: 503 Service Unavailable: backend down"
        );
        server.await.unwrap();
    }

    #[test]
    fn decodes_detection() {
        let res: DetectResponse = serde_json::from_str(
            r#"{"data":{"detections":[[{"language":"ja","isReliable":false,"confidence":1}]]}}"#,
        )
        .unwrap();
        assert_eq!(res.into_language().unwrap(), "ja");
    }

    #[test]
    fn empty_detection_is_an_error() {
        let res: DetectResponse = serde_json::from_str(r#"{"data":{"detections":[[]]}}"#).unwrap();
        assert_eq!(res.into_language().unwrap_err().to_string(), "no detection returned");
    }

    #[test]
    fn decodes_translation() {
        let res: TranslateResponse = serde_json::from_str(
            r#"{"data":{"translations":[{"translatedText":"Golang is great","detectedSourceLanguage":"ja"}]}}"#,
        )
        .unwrap();
        assert_eq!(res.into_text().unwrap(), "Golang is great");
    }

    #[test]
    fn empty_translation_is_an_error() {
        let res: TranslateResponse =
            serde_json::from_str(r#"{"data":{"translations":[]}}"#).unwrap();
        assert!(res.into_text().is_err());
    }

    #[test]
    fn error_message_from_google_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","errors":[]}}"#;
        assert_eq!(
            api_error_message(body),
            "API key not valid. Please pass a valid API key."
        );
        assert_eq!(api_error_message("  Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let translator = GoogleTranslator::with_base_url(
            Credential::ApiKey("key".to_string()),
            "http://localhost:8080/v2/",
        );
        assert_eq!(translator.base_url, "http://localhost:8080/v2");
    }

    #[tokio::test]
    async fn transport_failure_names_the_call() {
        // nothing listens on the discard port
        let translator = GoogleTranslator::with_base_url(
            Credential::AccessToken("token".to_string()),
            "http://127.0.0.1:9",
        );
        let err = translator.translate("hello", "ja").await.unwrap_err();
        assert!(format!("{err:#}").starts_with("fail to call translate API: "));
        let err = translator.detect("hello").await.unwrap_err();
        assert!(format!("{err:#}").starts_with("fail to call detection API: "));
    }
}
