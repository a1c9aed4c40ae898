//! # Reconhecimento de Entidades Nomeadas
//!
//! O modelo NER é um [`SequenceTagger`] comum treinado com rótulos no esquema
//! BIOES (`B-PER`, `I-PER`, `E-PER`, `S-LOC`, `O`). Este módulo interpreta os
//! rótulos e reconstrói as entidades com várias palavras.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::perceptron::Class;
use crate::tagger::SequenceTagger;

/// Rótulo de entidade decomposto em posição + categoria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Fora de qualquer entidade (`O` e rótulos desconhecidos).
    Outside,
    Begin(String),
    Inside(String),
    End(String),
    Single(String),
}

impl Tag {
    /// `"B-PER"` → `Tag::Begin("PER")`. Sem categoria ou prefixo desconhecido → `Outside`.
    pub fn from_label(label: &str) -> Self {
        let Some((prefix, category)) = label.split_once('-') else {
            return Tag::Outside;
        };
        if category.is_empty() {
            return Tag::Outside;
        }
        let category = category.to_string();
        match prefix {
            "B" => Tag::Begin(category),
            "I" | "M" => Tag::Inside(category),
            "E" => Tag::End(category),
            "S" => Tag::Single(category),
            _ => Tag::Outside,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Tag::Outside => None,
            Tag::Begin(c) | Tag::Inside(c) | Tag::End(c) | Tag::Single(c) => Some(c),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Tag::Outside => "O".to_string(),
            Tag::Begin(c) => format!("B-{c}"),
            Tag::Inside(c) => format!("I-{c}"),
            Tag::End(c) => format!("E-{c}"),
            Tag::Single(c) => format!("S-{c}"),
        }
    }
}

/// Uma entidade reconhecida (uma ou mais palavras consecutivas).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Palavras da entidade concatenadas (ex: "厦门大学")
    pub text: String,
    pub category: String,
    /// Índice da primeira palavra
    pub start_token: usize,
    /// Índice da última palavra (inclusivo)
    pub end_token: usize,
}

/// Agrupa palavras rotuladas em entidades.
///
/// - `B-X` abre uma entidade, `I-X` a continua e `E-X` a fecha.
/// - `S-X` é uma entidade de uma palavra.
/// - `O`, outra categoria ou um `I-X`/`E-X` sem abertura encerram a atual.
///
/// Uma entidade aberta até o fim da sentença é emitida.
///
/// ```rust
/// use jiagu_core::ner::entities;
/// use jiagu_core::perceptron::Class;
///
/// let words = ["厦门", "大学", "在", "厦门"];
/// let labels: Vec<Class> = ["B-ORG", "E-ORG", "O", "S-LOC"]
///     .iter()
///     .map(|l| Class { label: l.to_string(), score: 1.0 })
///     .collect();
/// let spans = entities(&words, &labels);
/// assert_eq!(spans[0].text, "厦门大学");
/// assert_eq!(spans[1].category, "LOC");
/// ```
pub fn entities<S: AsRef<str>>(words: &[S], labels: &[Class]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut current: Option<EntitySpan> = None;

    for (i, (word, class)) in words.iter().zip(labels).enumerate() {
        let word = word.as_ref();
        match Tag::from_label(&class.label) {
            Tag::Begin(category) => {
                spans.extend(current.take());
                current = Some(EntitySpan {
                    text: word.to_string(),
                    category,
                    start_token: i,
                    end_token: i,
                });
            }
            Tag::Inside(category) | Tag::End(category) if current.as_ref().is_some_and(|c| c.category == category) => {
                if let Some(span) = current.as_mut() {
                    span.text.push_str(word);
                    span.end_token = i;
                }
                if class.label.starts_with("E-") {
                    spans.extend(current.take());
                }
            }
            Tag::Single(category) => {
                spans.extend(current.take());
                spans.push(EntitySpan {
                    text: word.to_string(),
                    category,
                    start_token: i,
                    end_token: i,
                });
            }
            _ => spans.extend(current.take()),
        }
    }
    spans.extend(current);
    spans
}

/// Rotulador NER.
#[derive(Debug, Clone)]
pub struct NerTagger {
    tagger: SequenceTagger,
}

impl NerTagger {
    pub fn new(tagger: SequenceTagger) -> Self {
        Self { tagger }
    }

    /// Carrega um modelo gzip+JSON.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(SequenceTagger::load(reader)?))
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SequenceTagger::load_file(path)?))
    }

    /// Um rótulo por palavra.
    pub fn predict<S: AsRef<str>>(&self, words: &[S]) -> Vec<Class> {
        self.tagger.predict(words)
    }

    /// Rotula e agrupa em entidades.
    pub fn entities<S: AsRef<str>>(&self, words: &[S]) -> Vec<EntitySpan> {
        let labels = self.predict(words);
        entities(words, &labels)
    }

    pub fn tagger(&self) -> &SequenceTagger {
        &self.tagger
    }
}
