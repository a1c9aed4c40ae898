//! # Extração de Relações
//!
//! Um [`SequenceTagger`] rotula as palavras com `B-`/`I-`/`E-` seguidos de uma
//! categoria. A categoria `实体` marca o **sujeito**; qualquer outra marca um
//! **valor**, cujo atributo é a categoria sem o último caractere
//! (`出生地1` → `出生地`).
//!
//! Triplas só são produzidas quando a sentença tem exatamente um sujeito.

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::perceptron::Class;
use crate::tagger::SequenceTagger;

/// Categoria que identifica o sujeito.
pub const SUBJECT_LABEL: &str = "实体";

/// Relação `sujeito —atributo→ valor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub attribute: String,
    pub value: String,
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.subject, self.attribute, self.value)
    }
}

#[derive(Debug)]
struct Mention {
    word: String,
    category: String,
}

/// Converte rótulos em triplas.
pub fn triples<S: AsRef<str>>(words: &[S], labels: &[Class]) -> Vec<Triple> {
    let mut subjects: Vec<Mention> = Vec::new();
    let mut objects: Vec<Mention> = Vec::new();

    for (word, class) in words.iter().zip(labels) {
        let word = word.as_ref();
        let Some((prefix, category)) = class.label.split_once('-') else {
            continue;
        };
        let mentions = if category == SUBJECT_LABEL {
            &mut subjects
        } else {
            &mut objects
        };
        match prefix {
            "B" => mentions.push(Mention {
                word: word.to_string(),
                category: category.to_string(),
            }),
            "I" | "E" => {
                if let Some(last) = mentions.last_mut() {
                    last.word.push_str(word);
                }
            }
            _ => {}
        }
    }

    if subjects.len() != 1 {
        return Vec::new();
    }
    let subject = &subjects[0].word;
    objects
        .into_iter()
        .map(|obj| {
            let mut attribute = obj.category;
            attribute.pop();
            Triple {
                subject: subject.clone(),
                attribute,
                value: obj.word,
            }
        })
        .collect()
}

/// Extrator de relações.
#[derive(Debug, Clone)]
pub struct Knowledge {
    tagger: SequenceTagger,
}

impl Knowledge {
    pub fn new(tagger: SequenceTagger) -> Self {
        Self { tagger }
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(SequenceTagger::load(reader)?))
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SequenceTagger::load_file(path)?))
    }

    /// Rotula palavras já segmentadas e extrai as triplas.
    pub fn extract<S: AsRef<str>>(&self, words: &[S]) -> Vec<Triple> {
        let labels = self.tagger.predict(words);
        triples(words, &labels)
    }
}
