use thiserror::Error;

pub const API_KEY_ENV: &str = "GOOGLE_TRANSLATE_API_KEY";
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_TRANSLATE_ACCESS_TOKEN";
pub const LANG_ENV: &str = "GOOGLE_TRANSLATE_LANG";
pub const SECOND_LANG_ENV: &str = "GOOGLE_TRANSLATE_SECOND_LANG";

/// Locale variables consulted for the target language, highest priority first.
pub const LOCALE_ENVS: [&str; 3] = ["LANGUAGE", "LC_ALL", "LANG"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("neither GOOGLE_TRANSLATE_API_KEY nor GOOGLE_TRANSLATE_ACCESS_TOKEN is set")]
    MissingCredential,
    #[error("cannot detect language. Please export $LANG or $GOOGLE_TRANSLATE_LANG (e.g. en, ja)")]
    UndetectableLanguage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    ApiKey(String),
    AccessToken(String),
}

/// Everything gtrans reads from the environment, captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub default_lang: Option<String>,
    pub second_lang: Option<String>,
    /// Values of [`LOCALE_ENVS`], in the same order.
    pub locales: Vec<Option<String>>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            api_key: get(API_KEY_ENV),
            access_token: get(ACCESS_TOKEN_ENV),
            default_lang: get(LANG_ENV),
            second_lang: get(SECOND_LANG_ENV),
            locales: LOCALE_ENVS.iter().map(|key| get(key)).collect(),
        }
    }

    /// The API key wins when both credentials are present.
    pub fn credential(&self) -> Result<Credential, ConfigError> {
        if let Some(key) = &self.api_key {
            return Ok(Credential::ApiKey(key.clone()));
        }
        if let Some(token) = &self.access_token {
            return Ok(Credential::AccessToken(token.clone()));
        }
        Err(ConfigError::MissingCredential)
    }
}
