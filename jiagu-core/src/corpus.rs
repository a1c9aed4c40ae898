//! # Corpus Anotado
//!
//! Leitura de corpora no formato de uma linha por token:
//!
//! ```text
//! 厦门	ns
//! 明天	nt
//!
//! 下雨	v
//! ```
//!
//! Cada linha é `palavra<TAB>tag`; uma linha em branco fecha a sentença.
//! Linhas com outro número de campos são ignoradas.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{JiaguError, Result};

/// Uma sentença de treino/avaliação: tokens e tags paralelos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl Sentence {
    pub fn new(words: Vec<String>, tags: Vec<String>) -> Result<Self> {
        let sentence = Self { words, tags };
        sentence.validate()?;
        Ok(sentence)
    }

    /// Constrói a partir de pares `(palavra, tag)`.
    pub fn from_pairs<W: Into<String>, T: Into<String>>(pairs: impl IntoIterator<Item = (W, T)>) -> Self {
        let (words, tags) = pairs.into_iter().map(|(w, t)| (w.into(), t.into())).unzip();
        Self { words, tags }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Garante `words.len() == tags.len()`.
    pub fn validate(&self) -> Result<()> {
        if self.words.len() != self.tags.len() {
            return Err(JiaguError::InvalidArgument(format!(
                "sentença com {} tokens e {} tags",
                self.words.len(),
                self.tags.len()
            )));
        }
        Ok(())
    }

    /// Converte uma sentença já segmentada em exemplos BMES por caractere,
    /// o formato de treino do modelo de segmentação.
    pub fn bmes_from_words<S: AsRef<str>>(words: &[S]) -> Self {
        let mut sentence = Self::default();
        for word in words {
            let chars: Vec<char> = word.as_ref().chars().collect();
            let last = chars.len().saturating_sub(1);
            for (i, c) in chars.iter().enumerate() {
                let tag = match (i, chars.len()) {
                    (_, 1) => "S",
                    (0, _) => "B",
                    (i, _) if i == last => "E",
                    _ => "M",
                };
                sentence.words.push(c.to_string());
                sentence.tags.push(tag.to_string());
            }
        }
        sentence
    }
}

/// Lê um corpus `palavra<TAB>tag` inteiro.
pub fn read_corpus<R: BufRead>(reader: R) -> Result<Vec<Sentence>> {
    let mut sentences = Vec::new();
    let mut current = Sentence::default();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 {
            skipped += 1;
            continue;
        }
        current.words.push(fields[0].to_string());
        current.tags.push(fields[1].to_string());
    }
    if !current.is_empty() {
        sentences.push(current);
    }

    if skipped > 0 {
        warn!(skipped, "linhas malformadas ignoradas no corpus");
    }
    debug!(sentences = sentences.len(), "corpus carregado");
    Ok(sentences)
}
