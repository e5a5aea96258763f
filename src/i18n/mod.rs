//! Internationalization (i18n) support
//!
//! UI strings ship built in for `pt-BR` and `en`. Files in
//! `source/languages/<lang>.yml` (or `.json`) override single keys.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("pt-BR", include_str!("languages/pt-BR.yml")),
    ("en", include_str!("languages/en.yml")),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> dotted key -> translation
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18n {
    /// Create an empty i18n handler
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            translations: HashMap::new(),
        }
    }

    /// Create an i18n handler with the built-in strings loaded
    pub fn with_builtin(language: &str) -> Result<Self> {
        let mut i18n = Self::new(language);
        for (lang, content) in BUILTIN_LANGUAGES {
            i18n.load_yaml(lang, content)
                .with_context(|| format!("Invalid built-in language file {}", lang))?;
        }
        Ok(i18n)
    }

    /// Merge a YAML document into `lang`
    pub fn load_yaml(&mut self, lang: &str, content: &str) -> Result<()> {
        let data: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(content)?;
        self.merge(lang, &data);
        Ok(())
    }

    /// Load language files from a directory
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str());
            if !matches!(ext, Some("yml") | Some("yaml") | Some("json")) {
                continue;
            }
            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let lang = lang.to_string();

            let content = fs::read_to_string(&path)?;

            // Skip invalid files
            let data: Option<HashMap<String, serde_yaml::Value>> = if ext == Some("json") {
                match serde_json::from_str::<serde_json::Value>(&content) {
                    Ok(json) => Some(convert_json_to_yaml(json)),
                    Err(e) => {
                        tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                        None
                    }
                }
            } else {
                match serde_yaml::from_str(&content) {
                    Ok(data) => Some(data),
                    Err(e) => {
                        tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                        None
                    }
                }
            };

            if let Some(data) = data {
                self.merge(&lang, &data);
                tracing::debug!("Loaded language file: {:?}", path);
            }
        }

        Ok(())
    }

    fn merge(&mut self, lang: &str, data: &HashMap<String, serde_yaml::Value>) {
        let mut flat = HashMap::new();
        flatten_translations(data, "", &mut flat);
        self.translations
            .entry(lang.to_string())
            .or_default()
            .extend(flat);
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by dotted key, e.g. "post.next"
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        for candidate in fallback_chain(lang) {
            if let Some(value) = self
                .translations
                .get(&candidate)
                .and_then(|data| data.get(key))
            {
                return value.clone();
            }
        }

        // Return key as fallback
        key.to_string()
    }

    /// All translations for the current language with fallbacks merged in
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for candidate in fallback_chain(&self.language) {
            if let Some(data) = self.translations.get(&candidate) {
                for (k, v) in data {
                    result.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }
        result
    }
}

/// `pt-BR` -> [`pt-BR`, `pt`, `en`]
fn fallback_chain(lang: &str) -> Vec<String> {
    let mut chain = vec![lang.to_string()];
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        chain.push(base.to_string());
    }
    if !chain.iter().any(|l| l == "en") {
        chain.push("en".to_string());
    }
    chain
}

/// Flatten translations into a HashMap with dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::String(s) => {
                result.insert(full_key, s.clone());
            }
            serde_yaml::Value::Number(n) => {
                result.insert(full_key, n.to_string());
            }
            serde_yaml::Value::Bool(b) => {
                result.insert(full_key, b.to_string());
            }
            serde_yaml::Value::Mapping(map) => {
                let mut nested = HashMap::new();
                for (k, v) in map {
                    if let serde_yaml::Value::String(key_str) = k {
                        nested.insert(key_str.clone(), v.clone());
                    }
                }
                flatten_translations(&nested, &full_key, result);
            }
            _ => {}
        }
    }
}

/// Convert JSON value to YAML HashMap
fn convert_json_to_yaml(json: serde_json::Value) -> HashMap<String, serde_yaml::Value> {
    let mut result = HashMap::new();

    if let serde_json::Value::Object(obj) = json {
        for (key, value) in obj {
            result.insert(key, json_value_to_yaml(value));
        }
    }

    result
}

fn json_value_to_yaml(json: serde_json::Value) -> serde_yaml::Value {
    match json {
        serde_json::Value::Null => serde_yaml::Value::Null,
        serde_json::Value::Bool(b) => serde_yaml::Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_yaml::Value::Number(i.into())
            } else if let Some(f) = n.as_f64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(f))
            } else {
                serde_yaml::Value::Null
            }
        }
        serde_json::Value::String(s) => serde_yaml::Value::String(s),
        serde_json::Value::Array(arr) => {
            serde_yaml::Value::Sequence(arr.into_iter().map(json_value_to_yaml).collect())
        }
        serde_json::Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in obj {
                map.insert(serde_yaml::Value::String(k), json_value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}
