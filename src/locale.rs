use crate::config::{Config, ConfigError};

/// Maps a POSIX locale such as `en_US.UTF-8` to a Google Translate language code.
///
/// Chinese is split by script: mainland China and Singapore use Simplified
/// (`zh-CN`), Taiwan and Hong Kong use Traditional (`zh-TW`). Everything else is
/// the part before the first underscore. Returns `None` when nothing can be
/// derived.
pub fn lang_code_from_locale(locale: &str) -> Option<String> {
    if locale.starts_with("zh_CN") || locale.starts_with("zh_SG") {
        return Some("zh-CN".to_string());
    }
    if locale.starts_with("zh_TW") || locale.starts_with("zh_HK") {
        return Some("zh-TW".to_string());
    }

    match locale.split_once('_') {
        Some((lang, _)) if !lang.is_empty() => Some(lang.to_string()),
        _ => None,
    }
}

/// Picks the target language: the `--to` flag, then `GOOGLE_TRANSLATE_LANG`,
/// then the first locale variable that resolves.
pub fn select_target_lang(flag: Option<&str>, config: &Config) -> Result<String, ConfigError> {
    if let Some(lang) = flag.filter(|lang| !lang.is_empty()) {
        return Ok(lang.to_string());
    }
    if let Some(lang) = &config.default_lang {
        return Ok(lang.clone());
    }
    config
        .locales
        .iter()
        .flatten()
        .find_map(|locale| lang_code_from_locale(locale))
        .ok_or(ConfigError::UndetectableLanguage)
}
