//! # Templates de Features
//!
//! Para cada token, um template gera uma lista fixa de features binárias que o
//! [`AveragedPerceptron`](crate::perceptron::AveragedPerceptron) pontua. O mesmo
//! contrato serve segmentação (BMES por caractere), POS, NER e extração de
//! relações: só mudam o template e os pesos treinados.
//!
//! ## Features do [`ContextTemplate`]
//!
//! ### Token atual
//! - `bias` (sempre ativa)
//! - `i word`, `i suffix` (últimos 3 caracteres), `i pref1` (primeiro caractere)
//!
//! ### Contexto (janela de 2 tokens)
//! - `i-1 word`, `i-1 suffix`, `i-2 word`
//! - `i+1 word`, `i+1 suffix`, `i+2 word`
//!
//! ### Tags previstas anteriormente
//! - `i-1 tag`, `i-2 tag`, `i tag+i-2 tag`, `i-1 tag+i word`
//!
//! Se o template mudar, o modelo precisa ser retreinado: as chaves são strings e
//! não existe nenhuma compatibilidade entre versões.

use serde::{Deserialize, Serialize};

/// Quantidade de sentinelas colocadas antes e depois da sentença no contexto.
pub const CONTEXT_PADDING: usize = 2;

/// Uma ativação nomeada. `value == 0` significa feature inativa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Chave da feature (ex: `"i-1 tag ns"`).
    pub label: String,
    /// Contribuição da feature; convencionalmente `1.0`.
    pub value: f64,
}

impl Feature {
    /// Feature binária ativa (valor 1).
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: 1.0,
        }
    }

    pub fn with_value(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// Features com valor nulo são ignoradas pelo classificador.
    pub fn is_zero(&self) -> bool {
        self.value.abs() < 1e-15
    }
}

/// Função pura que mapeia um token em contexto para suas features.
///
/// # Parâmetros
/// - `i`: índice do token na sentença (sem contar sentinelas).
/// - `word`: o token.
/// - `context`: sentença com [`CONTEXT_PADDING`] sentinelas de cada lado.
/// - `prev`, `prev2`: as duas últimas tags previstas.
pub trait FeatureTemplate: Send + Sync {
    fn features(&self, i: usize, word: &str, context: &[String], prev: &str, prev2: &str) -> Vec<Feature>;
}

/// Template padrão, usado por todos os modelos treinados do toolkit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextTemplate;

impl FeatureTemplate for ContextTemplate {
    fn features(&self, i: usize, word: &str, context: &[String], prev: &str, prev2: &str) -> Vec<Feature> {
        let i = i + CONTEXT_PADDING;
        let minus1 = context[i - 1].as_str();
        let minus2 = context[i - 2].as_str();
        let plus1 = context[i + 1].as_str();
        let plus2 = context[i + 2].as_str();
        let current = context[i].as_str();

        let parts: [&[&str]; 14] = [
            &["bias"],
            &["i suffix", suffix(word, 3)],
            &["i pref1", prefix(word, 1)],
            &["i-1 tag", prev],
            &["i-2 tag", prev2],
            &["i tag+i-2 tag", prev, prev2],
            &["i word", current],
            &["i-1 tag+i word", prev, current],
            &["i-1 word", minus1],
            &["i-1 suffix", suffix(minus1, 3)],
            &["i-2 word", minus2],
            &["i+1 word", plus1],
            &["i+1 suffix", suffix(plus1, 3)],
            &["i+2 word", plus2],
        ];

        parts.iter().map(|p| Feature::new(p.join(" "))).collect()
    }
}

/// Últimos `n` caracteres (code points) de `word`, ou a palavra inteira se for menor.
pub fn suffix(word: &str, n: usize) -> &str {
    match word.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &word[idx..],
        _ if n == 0 => "",
        _ => word,
    }
}

/// Primeiros `n` caracteres (code points) de `word`.
pub fn prefix(word: &str, n: usize) -> &str {
    match word.char_indices().nth(n) {
        Some((idx, _)) => &word[..idx],
        None => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(words: &[&str]) -> Vec<String> {
        ["-START-", "-START2-"]
            .iter()
            .chain(words.iter())
            .chain(["-END-", "-END2-"].iter())
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_suffix_prefix_by_code_point() {
        assert_eq!(suffix("黑龙江省", 3), "龙江省");
        assert_eq!(suffix("明天", 3), "明天");
        assert_eq!(suffix("abc", 0), "");
        assert_eq!(prefix("厦门", 1), "厦");
        assert_eq!(prefix("", 1), "");
    }

    #[test]
    fn test_context_template_keys() {
        let context = padded(&["厦门", "明天", "会不会", "下雨"]);
        let feats = ContextTemplate.features(1, "明天", &context, "ns", "-START-");
        let keys: Vec<&str> = feats.iter().map(|f| f.label.as_str()).collect();

        assert_eq!(feats.len(), 14);
        assert!(keys.contains(&"bias"));
        assert!(keys.contains(&"i word 明天"));
        assert!(keys.contains(&"i pref1 明"));
        assert!(keys.contains(&"i-1 tag ns"));
        assert!(keys.contains(&"i tag+i-2 tag ns -START-"));
        assert!(keys.contains(&"i-1 tag+i word ns 明天"));
        assert!(keys.contains(&"i-1 word 厦门"));
        assert!(keys.contains(&"i-2 word -START2-"));
        assert!(keys.contains(&"i+1 suffix 会不会"));
        assert!(keys.contains(&"i+2 word 下雨"));
        assert!(feats.iter().all(|f| f.value == 1.0));
    }

    #[test]
    fn test_sentinels_at_sentence_end() {
        let context = padded(&["雨"]);
        let feats = ContextTemplate.features(0, "雨", &context, "-START-", "-START2-");
        let keys: Vec<&str> = feats.iter().map(|f| f.label.as_str()).collect();
        assert!(keys.contains(&"i+1 word -END-"));
        assert!(keys.contains(&"i+2 word -END2-"));
        assert!(keys.contains(&"i-1 word -START2-"));
        assert!(keys.contains(&"i-2 word -START-"));
    }

    #[test]
    fn test_zero_feature() {
        assert!(Feature::with_value("x", 0.0).is_zero());
        assert!(!Feature::new("x").is_zero());
    }
}
