use anyhow::Context;
use tracing::debug;

/// Web UI link that translates `text` into `to_lang`, source auto-detected.
pub fn google_translate_url(to_lang: &str, text: &str) -> String {
    format!(
        "https://translate.google.com/#auto/{}/{}",
        to_lang,
        urlencoding::encode(text)
    )
}

/// Hands `url` to the desktop's default browser.
pub fn open_in_browser(url: &str) -> anyhow::Result<()> {
    debug!(url, "opening browser");
    open::that(url).with_context(|| format!("fail to open browser for {}", url))
}
