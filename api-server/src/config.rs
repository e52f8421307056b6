// Server configuration: config/main.yaml plus environment overrides

use std::path::{Path, PathBuf};

use notebook_deck_core::StyleTemplate;
use notebook_deck_generation_client::{ChatSettings, ImageSettings};
use serde::Deserialize;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "NOTEBOOK_DECK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/main.yaml";

const DEFAULT_MAX_SLIDES: u32 = 15;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定ファイルを読み込めません: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイルの形式が不正です: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Root of notebook files and the image cache
    pub data_dir: PathBuf,
    /// Daily rolling log files are written here when set
    pub log_dir: Option<PathBuf>,
    pub cors_allow_any: bool,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            log_dir: None,
            cors_allow_any: true,
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn notebook_dir(&self) -> PathBuf {
        self.data_dir.join("user").join("notebook")
    }

    pub fn image_cache_dir(&self) -> PathBuf {
        self.data_dir.join("user").join("ppt_images")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub banana_ppt: DeckExportConfig,
    /// Older PPT export block, still honored as a fallback
    pub ppt: LegacyPptConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeckExportConfig {
    pub enabled: bool,
    pub max_slides: Option<u32>,
    pub style_templates: Option<Vec<StyleTemplate>>,
    pub outline: OutlineConfig,
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub binding: Option<String>,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: 4000,
            model: None,
            api_key: None,
            base_url: None,
            binding: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub binding: Option<String>,
    pub aspect_ratio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LegacyPptConfig {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub binding: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_slides: Option<u32>,
    pub default_style_prompt: Option<String>,
    pub style_templates: Vec<StyleTemplate>,
}

impl Default for LegacyPptConfig {
    fn default() -> Self {
        Self {
            model: None,
            api_key: None,
            base_url: None,
            binding: None,
            temperature: 0.4,
            max_tokens: 2000,
            max_slides: None,
            default_style_prompt: None,
            style_templates: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Config path from `NOTEBOOK_DECK_CONFIG`, else `config/main.yaml`
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

/// Trimmed, unquoted, non-empty env value
fn env_value(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key)
        .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Settings of the legacy PPT block: YAML, then `PPT_*`, then `LLM_*`
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPptSettings {
    pub chat: ChatSettings,
    pub max_slides: u32,
    pub default_style_prompt: Option<String>,
    pub style_templates: Vec<StyleTemplate>,
}

impl LegacyPptSettings {
    pub fn resolve(config: &LegacyPptConfig, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let pick = |yaml: &Option<String>, key: &str, fallback: &str| {
            non_empty(yaml)
                .or_else(|| env_value(env, key))
                .or_else(|| env_value(env, fallback))
        };

        Self {
            chat: ChatSettings {
                model: pick(&config.model, "PPT_MODEL", "LLM_MODEL").unwrap_or_default(),
                api_key: pick(&config.api_key, "PPT_API_KEY", "LLM_API_KEY"),
                base_url: pick(&config.base_url, "PPT_BASE_URL", "LLM_HOST").unwrap_or_default(),
                binding: non_empty(&config.binding)
                    .or_else(|| env_value(env, "PPT_BINDING"))
                    .unwrap_or_else(|| "openai".to_string()),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
            max_slides: config.max_slides.unwrap_or(DEFAULT_MAX_SLIDES),
            default_style_prompt: non_empty(&config.default_style_prompt),
            style_templates: config.style_templates.clone(),
        }
    }
}

/// Everything the deck endpoints need, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct DeckSettings {
    pub enabled: bool,
    pub max_slides: u32,
    pub style_templates: Vec<StyleTemplate>,
    pub default_style_prompt: Option<String>,
    pub outline: ChatSettings,
    pub image: ImageSettings,
}

impl DeckSettings {
    pub fn from_process_env(config: &ExportConfig) -> Self {
        Self::resolve(config, &|key| std::env::var(key).ok())
    }

    pub fn resolve(config: &ExportConfig, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let deck = &config.banana_ppt;
        let legacy = LegacyPptSettings::resolve(&config.ppt, env);

        let max_slides = deck.max_slides.unwrap_or(legacy.max_slides).max(1);
        let style_templates = deck
            .style_templates
            .clone()
            .unwrap_or_else(|| legacy.style_templates.clone());

        // Outline: YAML, then the default LLM env, then the legacy block
        let outline_value = |yaml: &Option<String>, key: &str, legacy_value: Option<&str>| {
            non_empty(yaml)
                .or_else(|| env_value(env, key))
                .or_else(|| legacy_value.filter(|v| !v.is_empty()).map(str::to_string))
        };
        let outline = ChatSettings {
            model: outline_value(&deck.outline.model, "LLM_MODEL", Some(&legacy.chat.model)).unwrap_or_default(),
            api_key: outline_value(&deck.outline.api_key, "LLM_API_KEY", legacy.chat.api_key.as_deref()),
            base_url: outline_value(&deck.outline.base_url, "LLM_HOST", Some(&legacy.chat.base_url))
                .unwrap_or_default(),
            binding: outline_value(&deck.outline.binding, "LLM_BINDING", Some(&legacy.chat.binding))
                .unwrap_or_else(|| "openai".to_string()),
            temperature: deck.outline.temperature,
            max_tokens: deck.outline.max_tokens,
        };

        // Image: env first, then YAML
        let image_value = |key: &str, yaml: &Option<String>| env_value(env, key).or_else(|| non_empty(yaml));
        let image = ImageSettings {
            model: image_value("BANANA_PPT_IMAGE_MODEL", &deck.image.model).unwrap_or_default(),
            api_key: image_value("BANANA_PPT_IMAGE_API_KEY", &deck.image.api_key),
            base_url: image_value("BANANA_PPT_IMAGE_BASE_URL", &deck.image.base_url).unwrap_or_default(),
            binding: image_value("BANANA_PPT_IMAGE_BINDING", &deck.image.binding)
                .unwrap_or_else(|| "gemini".to_string()),
            aspect_ratio: image_value("BANANA_PPT_IMAGE_ASPECT_RATIO", &deck.image.aspect_ratio)
                .unwrap_or_else(|| "16:9".to_string()),
        };

        Self {
            enabled: deck.enabled,
            max_slides,
            style_templates,
            default_style_prompt: legacy.default_style_prompt.clone(),
            outline,
            image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const YAML: &str = r#"
server:
  port: 9000
  data_dir: /tmp/deck-data
export:
  banana_ppt:
    enabled: true
    outline:
      temperature: 0.2
      model: outline-model
    image:
      model: yaml-image-model
      base_url: https://images.example.com
  ppt:
    max_slides: 9
    default_style_prompt: "calm, minimal"
    style_templates:
      - name: Minimal
        prompt: white background
"#;

    #[test]
    fn test_parse_yaml_with_defaults() {
        let config = AppConfig::from_yaml(YAML).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.image_cache_dir(), PathBuf::from("/tmp/deck-data/user/ppt_images"));
        assert!(config.export.banana_ppt.enabled);
        assert_eq!(config.export.banana_ppt.outline.max_tokens, 4000);
        assert_eq!(config.export.ppt.max_tokens, 2000);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert!(!config.export.banana_ppt.enabled);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(AppConfig::from_yaml("server: [unclosed").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/main.yaml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_max_slides_and_templates_fall_back_to_legacy_block() {
        let config = AppConfig::from_yaml(YAML).unwrap();
        let settings = DeckSettings::resolve(&config.export, &env_from(&[]));
        assert_eq!(settings.max_slides, 9);
        assert_eq!(settings.style_templates.len(), 1);
        assert_eq!(settings.style_templates[0]["name"], "Minimal");
        assert_eq!(settings.default_style_prompt.as_deref(), Some("calm, minimal"));
    }

    #[test]
    fn test_max_slides_default() {
        let settings = DeckSettings::resolve(&ExportConfig::default(), &env_from(&[]));
        assert_eq!(settings.max_slides, 15);
        assert!(!settings.enabled);
    }

    #[test]
    fn test_image_env_overrides_yaml() {
        let config = AppConfig::from_yaml(YAML).unwrap();
        let env = env_from(&[
            ("BANANA_PPT_IMAGE_MODEL", "  \"env-image-model\" "),
            ("BANANA_PPT_IMAGE_BINDING", "openai"),
        ]);
        let settings = DeckSettings::resolve(&config.export, &env);
        assert_eq!(settings.image.model, "env-image-model");
        assert_eq!(settings.image.binding, "openai");
        assert_eq!(settings.image.base_url, "https://images.example.com");
        assert_eq!(settings.image.aspect_ratio, "16:9");
    }

    #[test]
    fn test_outline_yaml_wins_over_llm_env() {
        let config = AppConfig::from_yaml(YAML).unwrap();
        let env = env_from(&[
            ("LLM_MODEL", "env-model"),
            ("LLM_HOST", "https://llm.example.com/v1"),
            ("LLM_API_KEY", "k"),
        ]);
        let settings = DeckSettings::resolve(&config.export, &env);
        assert_eq!(settings.outline.model, "outline-model");
        assert_eq!(settings.outline.base_url, "https://llm.example.com/v1");
        assert_eq!(settings.outline.api_key.as_deref(), Some("k"));
        assert!((settings.outline.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_legacy_block_resolution_order() {
        let env = env_from(&[("PPT_MODEL", "ppt-model"), ("LLM_MODEL", "llm-model"), ("LLM_HOST", "h")]);
        let legacy = LegacyPptSettings::resolve(&LegacyPptConfig::default(), &env);
        assert_eq!(legacy.chat.model, "ppt-model");
        assert_eq!(legacy.chat.base_url, "h");
        assert_eq!(legacy.chat.binding, "openai");
        assert_eq!(legacy.max_slides, 15);
    }

    #[test]
    fn test_outline_falls_back_to_legacy_settings() {
        let env = env_from(&[("PPT_MODEL", "ppt-model")]);
        let settings = DeckSettings::resolve(&ExportConfig::default(), &env);
        assert_eq!(settings.outline.model, "ppt-model");
    }
}
