use std::io::Write;

use tracing::debug;

use crate::translator::Translator;

/// Decides where `text` should go. With a second language configured, text that
/// is already in `to_lang` is sent to `second_lang` instead, so piping gtrans
/// into itself translates back and forth.
pub async fn resolve_target<T: Translator>(
    translator: &T,
    text: &str,
    to_lang: &str,
    second_lang: Option<&str>,
) -> anyhow::Result<String> {
    let Some(second_lang) = second_lang.filter(|lang| !lang.is_empty()) else {
        return Ok(to_lang.to_string());
    };

    let detected = translator.detect(text).await?;
    if detected == to_lang {
        debug!(detected = %detected, second_lang, "input already in target language, bouncing");
        Ok(second_lang.to_string())
    } else {
        debug!(detected = %detected, to_lang, "keeping target language");
        Ok(to_lang.to_string())
    }
}

/// Translates `text` and writes the result followed by a newline.
pub async fn run_translation<T, W>(
    translator: &T,
    out: &mut W,
    text: &str,
    to_lang: &str,
    second_lang: Option<&str>,
) -> anyhow::Result<()>
where
    T: Translator,
    W: Write,
{
    let to_lang = resolve_target(translator, text, to_lang, second_lang).await?;
    let translated = translator.translate(text, &to_lang).await?;
    writeln!(out, "{}", translated)?;
    Ok(())
}
