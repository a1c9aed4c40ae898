//! Etiquetagem morfossintática (POS) sobre palavras já segmentadas.

use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::perceptron::Class;
use crate::tagger::SequenceTagger;

/// Rotulador POS: uma classe gramatical (`n`, `v`, `ns`...) por palavra.
#[derive(Debug, Clone)]
pub struct PosTagger {
    tagger: SequenceTagger,
}

impl PosTagger {
    pub fn new(tagger: SequenceTagger) -> Self {
        Self { tagger }
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::new(SequenceTagger::load(reader)?))
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SequenceTagger::load_file(path)?))
    }

    pub fn predict<S: AsRef<str>>(&self, words: &[S]) -> Vec<Class> {
        self.tagger.predict(words)
    }

    /// Pares `(palavra, tag)`.
    pub fn tag<S: AsRef<str>>(&self, words: &[S]) -> Vec<(String, String)> {
        words
            .iter()
            .zip(self.predict(words))
            .map(|(w, class)| (w.as_ref().to_string(), class.label))
            .collect()
    }

    pub fn tagger(&self) -> &SequenceTagger {
        &self.tagger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::read_corpus;
    use crate::tagger::TrainOptions;
    use std::io::Cursor;

    #[test]
    fn test_pos_tag_pairs() {
        let data = "厦门\tns\n明天\tnt\n下雨\tv\n\n明天\tnt\n下雨\tv\n";
        let mut corpus = read_corpus(Cursor::new(data)).unwrap();
        let mut tagger = SequenceTagger::new();
        tagger
            .train(&mut corpus, TrainOptions { iterations: 10, shuffle: false, seed: None })
            .unwrap();

        let pos = PosTagger::new(tagger);
        assert_eq!(
            pos.tag(&["厦门", "明天", "下雨"]),
            vec![
                ("厦门".to_string(), "ns".to_string()),
                ("明天".to_string(), "nt".to_string()),
                ("下雨".to_string(), "v".to_string()),
            ]
        );
        assert!(pos.predict::<&str>(&[]).is_empty());
    }
}
