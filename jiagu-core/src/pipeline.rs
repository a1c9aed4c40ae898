//! # Fachada Jiagu
//!
//! Reúne o segmentador e os rotuladores opcionais (POS, NER, relações) num
//! único valor, construído uma vez e compartilhado (ex: atrás de um `Arc`).
//!
//! ```rust
//! use std::io::Cursor;
//! use jiagu_core::{Jiagu, SegMode, Segmenter, Vocabulary};
//!
//! let vocab = Vocabulary::from_reader(Cursor::new("厦门\t10\n明天\t10\n下雨\t10\n"))?;
//! let jiagu = Jiagu::new(Segmenter::new(vocab));
//! assert_eq!(jiagu.seg("厦门明天下雨", SegMode::Default)?, vec!["厦门", "明天", "下雨"]);
//! # Ok::<(), jiagu_core::JiaguError>(())
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::config::SegmentConfig;
use crate::error::{JiaguError, Result};
use crate::knowledge::{Knowledge, Triple};
use crate::ner::{EntitySpan, NerTagger};
use crate::perceptron::Class;
use crate::pos::PosTagger;
use crate::segment::{SegMode, Segmenter};
use crate::tagger::SequenceTagger;
use crate::vocab::Vocabulary;

/// Caminhos dos recursos carregados por [`Jiagu::open`]. Campos `None` ficam desativados.
#[derive(Debug, Clone, Default)]
pub struct Resources<'a> {
    pub dictionary: Option<&'a Path>,
    pub user_dictionary: Option<&'a Path>,
    pub seg_model: Option<&'a Path>,
    pub pos_model: Option<&'a Path>,
    pub ner_model: Option<&'a Path>,
    pub knowledge_model: Option<&'a Path>,
    pub segment: SegmentConfig,
}

#[derive(Debug)]
pub struct Jiagu {
    segmenter: Segmenter,
    pos: Option<PosTagger>,
    ner: Option<NerTagger>,
    knowledge: Option<Knowledge>,
}

impl Jiagu {
    pub fn new(segmenter: Segmenter) -> Self {
        Self {
            segmenter,
            pos: None,
            ner: None,
            knowledge: None,
        }
    }

    /// Carrega dicionários e modelos a partir de arquivos.
    pub fn open(resources: &Resources<'_>) -> Result<Self> {
        let vocab = match resources.dictionary {
            Some(path) => Vocabulary::from_reader(BufReader::new(File::open(path)?))?,
            None => Vocabulary::new(),
        };
        let segmenter = match resources.seg_model {
            Some(path) => Segmenter::with_model(vocab, SequenceTagger::load_file(path)?),
            None => Segmenter::new(vocab),
        }
        .with_config(resources.segment.clone());
        if let Some(path) = resources.user_dictionary {
            segmenter.load_user_dict(BufReader::new(File::open(path)?))?;
        }

        let mut jiagu = Self::new(segmenter);
        if let Some(path) = resources.pos_model {
            jiagu.pos = Some(PosTagger::load_file(path)?);
        }
        if let Some(path) = resources.ner_model {
            jiagu.ner = Some(NerTagger::load_file(path)?);
        }
        if let Some(path) = resources.knowledge_model {
            jiagu.knowledge = Some(Knowledge::load_file(path)?);
        }
        info!(
            words = jiagu.segmenter.vocab().len(),
            seg_model = jiagu.segmenter.has_model(),
            pos = jiagu.pos.is_some(),
            ner = jiagu.ner.is_some(),
            knowledge = jiagu.knowledge.is_some(),
            "recursos carregados"
        );
        Ok(jiagu)
    }

    pub fn with_pos(mut self, pos: PosTagger) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn with_ner(mut self, ner: NerTagger) -> Self {
        self.ner = Some(ner);
        self
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn seg(&self, text: &str, mode: SegMode) -> Result<Vec<String>> {
        self.segmenter.seg(text, mode)
    }

    pub fn pos<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<Class>> {
        Ok(self.pos.as_ref().ok_or(JiaguError::ModelNotLoaded)?.predict(words))
    }

    pub fn ner<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<Class>> {
        Ok(self.ner.as_ref().ok_or(JiaguError::ModelNotLoaded)?.predict(words))
    }

    pub fn entities<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<EntitySpan>> {
        Ok(self.ner.as_ref().ok_or(JiaguError::ModelNotLoaded)?.entities(words))
    }

    /// Segmenta (modo padrão) e extrai relações do texto.
    pub fn knowledge(&self, text: &str) -> Result<Vec<Triple>> {
        let knowledge = self.knowledge.as_ref().ok_or(JiaguError::ModelNotLoaded)?;
        let words = self.segmenter.seg(text, SegMode::Default)?;
        Ok(knowledge.extract(&words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Sentence;
    use crate::tagger::TrainOptions;
    use std::io::Cursor;

    fn segmenter() -> Segmenter {
        Segmenter::new(Vocabulary::from_reader(Cursor::new("姚明\t10\n出生\t10\n于\t10\n上海\t10\n")).unwrap())
    }

    #[test]
    fn test_missing_models() {
        let jiagu = Jiagu::new(segmenter());
        assert!(matches!(jiagu.pos(&["姚明"]), Err(JiaguError::ModelNotLoaded)));
        assert!(matches!(jiagu.ner(&["姚明"]), Err(JiaguError::ModelNotLoaded)));
        assert!(matches!(jiagu.entities(&["姚明"]), Err(JiaguError::ModelNotLoaded)));
        assert!(matches!(jiagu.knowledge("姚明"), Err(JiaguError::ModelNotLoaded)));
        assert!(matches!(jiagu.seg("姚明", SegMode::Probe), Err(JiaguError::ModelNotLoaded)));
    }

    #[test]
    fn test_knowledge_end_to_end() {
        let mut corpus = vec![Sentence::from_pairs([
            ("姚明", "B-实体"),
            ("出生", "O"),
            ("于", "O"),
            ("上海", "B-出生地1"),
        ])];
        let mut tagger = SequenceTagger::new();
        tagger
            .train(&mut corpus, TrainOptions { iterations: 10, shuffle: false, seed: None })
            .unwrap();
        let jiagu = Jiagu::new(segmenter()).with_knowledge(Knowledge::new(tagger));

        let found = jiagu.knowledge("姚明出生于上海").unwrap();
        assert_eq!(
            found,
            vec![Triple {
                subject: "姚明".into(),
                attribute: "出生地".into(),
                value: "上海".into(),
            }]
        );
    }

    #[test]
    fn test_open_missing_dictionary_is_io_error() {
        let resources = Resources {
            dictionary: Some(Path::new("/nonexistent/jiagu/jiagu.dict")),
            ..Resources::default()
        };
        assert!(matches!(Jiagu::open(&resources), Err(JiaguError::Io(_))));
    }

    #[test]
    fn test_open_with_nothing() {
        let jiagu = Jiagu::open(&Resources::default()).unwrap();
        assert!(jiagu.segmenter().vocab().is_empty());
        assert_eq!(jiagu.seg("下雨", SegMode::Default).unwrap(), vec!["下", "雨"]);
    }
}
