//! Configuração do servidor, lida de um arquivo JSON indicado por `JIAGU_CONFIG`.

use std::path::{Path, PathBuf};

use jiagu_core::{Resources, SegmentConfig};
use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_ENV: &str = "JIAGU_CONFIG";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub dictionary: Option<PathBuf>,
    #[serde(default)]
    pub user_dictionary: Option<PathBuf>,
    #[serde(default)]
    pub seg_model: Option<PathBuf>,
    #[serde(default)]
    pub pos_model: Option<PathBuf>,
    #[serde(default)]
    pub ner_model: Option<PathBuf>,
    #[serde(default)]
    pub knowledge_model: Option<PathBuf>,
    #[serde(default)]
    pub segment: SegmentConfig,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            dictionary: None,
            user_dictionary: None,
            seg_model: None,
            pos_model: None,
            ner_model: None,
            knowledge_model: None,
            segment: SegmentConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Lê o arquivo de `JIAGU_CONFIG`; sem variável ou com arquivo inválido usa os padrões.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                info!("{CONFIG_ENV} não definido, usando configuração padrão");
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(error) => {
                warn!(path = %path.display(), %error, "configuração inválida, usando padrões");
                Self::default()
            }
        }
    }

    pub fn resources(&self) -> Resources<'_> {
        Resources {
            dictionary: self.dictionary.as_deref(),
            user_dictionary: self.user_dictionary.as_deref(),
            seg_model: self.seg_model.as_deref(),
            pos_model: self.pos_model.as_deref(),
            ner_model: self.ner_model.as_deref(),
            knowledge_model: self.knowledge_model.as_deref(),
            segment: self.segment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"dictionary": "dict/jiagu.dict", "segment": {"probe": {"max_len": 5}}}"#).unwrap();
        assert_eq!(config.bind, "0.0.0.0:3000");
        assert_eq!(config.dictionary, Some(PathBuf::from("dict/jiagu.dict")));
        assert!(config.seg_model.is_none());
        assert_eq!(config.segment.probe.max_len, 5);
        assert_eq!(config.segment.probe.max_window, 2);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = ServerConfig::from_file(Path::new("/nonexistent/jiagu.json"));
        assert_eq!(config, ServerConfig::default());
    }
}
