//! # Configuração do Segmentador
//!
//! Parâmetros ajustáveis do modo *probe* (descoberta de palavras novas).
//! Pode ser lida de JSON; campos ausentes assumem os valores padrão.

use serde::{Deserialize, Serialize};

/// Limites usados pelo modo probe ao montar n-gramas candidatos.
///
/// Os n-gramas são formados por `min_window..=max_window` tokens consecutivos do
/// corte por dicionário e só sobrevivem se o comprimento em code points estiver
/// em `min_len..=max_len`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// Menor quantidade de tokens unidos num n-grama.
    #[serde(default = "default_min_window")]
    pub min_window: usize,
    /// Maior quantidade de tokens unidos num n-grama (inclusive).
    #[serde(default = "default_max_window")]
    pub max_window: usize,
    /// Menor comprimento aceito (code points).
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    /// Maior comprimento aceito (code points).
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

fn default_min_window() -> usize {
    1
}

fn default_max_window() -> usize {
    2
}

fn default_min_len() -> usize {
    2
}

fn default_max_len() -> usize {
    4
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            min_window: default_min_window(),
            max_window: default_max_window(),
            min_len: default_min_len(),
            max_len: default_max_len(),
        }
    }
}

impl ProbeConfig {
    /// Verifica se um candidato com `len` code points passa no filtro de tamanho.
    pub fn accepts_len(&self, len: usize) -> bool {
        len >= self.min_len && len <= self.max_len
    }
}

/// Configuração completa do [`Segmenter`](crate::segment::Segmenter).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SegmentConfig {
    #[serde(default)]
    pub probe: ProbeConfig,
}
