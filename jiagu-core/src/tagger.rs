//! # Rotulador de Sequências
//!
//! Combina um [`AveragedPerceptron`], um [`FeatureTemplate`] e o enquadramento
//! da sentença (sentinelas de início e fim) para produzir uma tag por token.
//!
//! A decodificação é **gulosa** da esquerda para a direita: cada predição
//! alimenta `prev`/`prev2` do token seguinte. Não há Viterbi global sobre as
//! sequências de tags; é uma troca consciente de precisão por simplicidade.
//!
//! ## Persistência
//!
//! O modelo ([`PerceptronModel`]) é serializado em JSON e, por padrão,
//! comprimido com gzip:
//!
//! ```rust,no_run
//! use jiagu_core::tagger::SequenceTagger;
//!
//! let tagger = SequenceTagger::load_file("model/pos.model")?;
//! let tags = tagger.predict(&["厦门", "明天"]);
//! # Ok::<(), jiagu_core::error::JiaguError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::corpus::Sentence;
use crate::error::Result;
use crate::features::{ContextTemplate, FeatureTemplate, CONTEXT_PADDING};
use crate::perceptron::{AveragedPerceptron, Class, PerceptronModel};

/// Sentinelas que precedem a sentença. Também são as tags iniciais de `prev`/`prev2`.
pub const START: [&str; CONTEXT_PADDING] = ["-START-", "-START2-"];
/// Sentinelas que encerram a sentença.
pub const END: [&str; CONTEXT_PADDING] = ["-END-", "-END2-"];

/// Parâmetros de [`SequenceTagger::train`].
#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    /// Épocas (passadas completas pelo corpus).
    pub iterations: usize,
    /// Embaralha a ordem das sentenças entre épocas.
    pub shuffle: bool,
    /// Semente do embaralhamento; `None` usa entropia do sistema.
    pub seed: Option<u64>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            shuffle: false,
            seed: None,
        }
    }
}

/// Rotulador guloso sobre um perceptron médio.
#[derive(Debug, Clone, Default)]
pub struct SequenceTagger<F: FeatureTemplate = ContextTemplate> {
    model: AveragedPerceptron,
    template: F,
}

impl SequenceTagger<ContextTemplate> {
    /// Rotulador vazio com o template padrão, pronto para treino.
    pub fn new() -> Self {
        Self::with_template(ContextTemplate)
    }

    /// Carrega um modelo gzip+JSON.
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Self::load_with_template(reader, ContextTemplate)
    }

    /// Carrega um modelo gzip+JSON de um arquivo.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let tagger = Self::load(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), classes = tagger.model.classes().count(), "modelo carregado");
        Ok(tagger)
    }
}

impl<F: FeatureTemplate> SequenceTagger<F> {
    pub fn with_template(template: F) -> Self {
        Self {
            model: AveragedPerceptron::new(),
            template,
        }
    }

    pub fn from_model(model: PerceptronModel, template: F) -> Self {
        Self {
            model: AveragedPerceptron::from_model(model),
            template,
        }
    }

    pub fn load_with_template<R: Read>(reader: R, template: F) -> Result<Self> {
        Self::read_json(GzDecoder::new(reader), template)
    }

    /// Lê um modelo em JSON puro (sem compressão).
    pub fn read_json<R: Read>(reader: R, template: F) -> Result<Self> {
        let model: PerceptronModel = serde_json::from_reader(reader)?;
        Ok(Self::from_model(model, template))
    }

    /// Grava o modelo em JSON comprimido com gzip.
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        self.write_json(&mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "modelo salvo");
        Ok(())
    }

    /// Grava o modelo em JSON puro.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.model.to_model())?;
        Ok(())
    }

    pub fn perceptron(&self) -> &AveragedPerceptron {
        &self.model
    }

    /// Monta o contexto com sentinelas: `START + words + END`.
    fn context<S: AsRef<str>>(words: &[S]) -> Vec<String> {
        START
            .iter()
            .map(|s| s.to_string())
            .chain(words.iter().map(|w| w.as_ref().to_string()))
            .chain(END.iter().map(|s| s.to_string()))
            .collect()
    }

    /// Uma tag por token, da esquerda para a direita.
    ///
    /// Lista vazia → resultado vazio. Tokens sem nenhuma feature conhecida
    /// recebem `Class::default()`.
    pub fn predict<S: AsRef<str>>(&self, words: &[S]) -> Vec<Class> {
        if words.is_empty() {
            return Vec::new();
        }
        let context = Self::context(words);
        let mut prev = START[0].to_string();
        let mut prev2 = START[1].to_string();
        let mut classes = Vec::with_capacity(words.len());

        for (i, word) in words.iter().enumerate() {
            let features = self.template.features(i, word.as_ref(), &context, &prev, &prev2);
            let class = self.model.predict(&features);
            prev2 = std::mem::replace(&mut prev, class.label.clone());
            classes.push(class);
        }
        classes
    }

    /// Rotula várias sentenças em paralelo (somente leitura).
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, sentences: &[Vec<S>]) -> Vec<Vec<Class>> {
        sentences.par_iter().map(|words| self.predict(words)).collect()
    }

    /// Treina o perceptron e calcula os pesos médios ao final.
    ///
    /// O algoritmo itera pelo corpus `iterations` vezes. Para cada token:
    /// 1. Faz uma predição com os pesos atuais.
    /// 2. Atualiza os pesos (promove a tag correta, penaliza a errada).
    ///
    /// Devolve a acurácia de treino da última época.
    pub fn train(&mut self, sentences: &mut [Sentence], options: TrainOptions) -> Result<f64> {
        let mut total = 0usize;
        for sentence in sentences.iter() {
            sentence.validate()?;
            for tag in &sentence.tags {
                self.model.add_class(tag.as_str());
            }
            total += sentence.len();
        }

        let mut rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut accuracy = 0.0;
        for epoch in 1..=options.iterations {
            let mut correct = 0usize;
            for sentence in sentences.iter() {
                correct += self.train_sentence(sentence);
            }
            accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };
            info!(epoch, iterations = options.iterations, accuracy, "época de treino concluída");

            if options.shuffle {
                sentences.shuffle(&mut rng);
            }
        }

        self.model.average_weights()?;
        Ok(accuracy)
    }

    /// Uma passada sobre uma sentença; devolve o número de acertos.
    fn train_sentence(&mut self, sentence: &Sentence) -> usize {
        let context = Self::context(&sentence.words);
        let mut prev = START[0].to_string();
        let mut prev2 = START[1].to_string();
        let mut correct = 0;

        for (i, (word, tag)) in sentence.words.iter().zip(&sentence.tags).enumerate() {
            let features = self.template.features(i, word, &context, &prev, &prev2);
            let guess = self.model.predict(&features);
            self.model.update(tag, &guess.label, &features);
            if &guess.label == tag {
                correct += 1;
            }
            prev2 = std::mem::replace(&mut prev, guess.label);
        }
        correct
    }

    /// Acurácia por token sobre sentenças com gabarito.
    pub fn evaluate(&self, sentences: &[Sentence]) -> f64 {
        let (correct, total) = sentences
            .par_iter()
            .map(|sentence| {
                let hits = self
                    .predict(&sentence.words)
                    .iter()
                    .zip(&sentence.tags)
                    .filter(|(class, tag)| &class.label == *tag)
                    .count();
                (hits, sentence.tags.len())
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

        debug!(correct, total, "avaliação concluída");
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;

    fn pos_corpus() -> Vec<Sentence> {
        vec![
            Sentence::from_pairs([("厦门", "ns"), ("明天", "nt"), ("下雨", "v")]),
            Sentence::from_pairs([("北京", "ns"), ("今天", "nt"), ("下雨", "v")]),
            Sentence::from_pairs([("厦门", "ns"), ("今天", "nt"), ("晴", "a")]),
        ]
    }

    #[test]
    fn test_predict_empty_input() {
        let tagger = SequenceTagger::new();
        let words: [&str; 0] = [];
        assert!(tagger.predict(&words).is_empty());
    }

    #[test]
    fn test_train_and_predict() {
        let mut corpus = pos_corpus();
        let mut tagger = SequenceTagger::new();
        let accuracy = tagger
            .train(&mut corpus, TrainOptions { iterations: 5, shuffle: true, seed: Some(7) })
            .unwrap();
        assert!(accuracy > 0.5);

        let tags: Vec<String> = tagger
            .predict(&["厦门", "明天", "下雨"])
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(tags, vec!["ns", "nt", "v"]);
        assert_eq!(tagger.evaluate(&pos_corpus()), 1.0);
    }

    #[test]
    fn test_train_rejects_mismatched_sentence() {
        let mut corpus = vec![Sentence {
            words: vec!["厦门".into()],
            tags: vec![],
        }];
        let mut tagger = SequenceTagger::new();
        assert!(tagger.train(&mut corpus, TrainOptions::default()).is_err());
    }

    #[test]
    fn test_train_on_empty_corpus_fails_on_average() {
        let mut tagger = SequenceTagger::new();
        let result = tagger.train(&mut [], TrainOptions::default());
        assert!(matches!(result, Err(crate::error::JiaguError::NoTrainingInstances)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = SequenceTagger::load_file("/nonexistent/jiagu/seg.model");
        assert!(matches!(result, Err(crate::error::JiaguError::Io(_))));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut corpus = pos_corpus();
        let mut tagger = SequenceTagger::new();
        tagger
            .train(&mut corpus, TrainOptions { iterations: 3, shuffle: false, seed: None })
            .unwrap();

        let mut buf = Vec::new();
        tagger.save(&mut buf).unwrap();
        let restored = SequenceTagger::load(buf.as_slice()).unwrap();
        assert_eq!(restored.perceptron().to_model(), tagger.perceptron().to_model());

        let mut json = Vec::new();
        tagger.write_json(&mut json).unwrap();
        let from_json = SequenceTagger::read_json(json.as_slice(), ContextTemplate).unwrap();
        assert_eq!(from_json.perceptron().to_model(), tagger.perceptron().to_model());
    }

    #[test]
    fn test_load_corrupted_model_fails() {
        assert!(SequenceTagger::load(&b"isto nao e gzip"[..]).is_err());
        assert!(SequenceTagger::read_json(&b"{\"weights\": 3}"[..], ContextTemplate).is_err());
    }

    /// Template mínimo: apenas o próprio token.
    struct WordOnly;

    impl FeatureTemplate for WordOnly {
        fn features(&self, _i: usize, word: &str, _c: &[String], _p: &str, _p2: &str) -> Vec<Feature> {
            vec![Feature::new(format!("w {word}"))]
        }
    }

    #[test]
    fn test_custom_template() {
        let mut corpus = vec![Sentence::from_pairs([("a", "X"), ("b", "Y")])];
        let mut tagger = SequenceTagger::with_template(WordOnly);
        tagger
            .train(&mut corpus, TrainOptions { iterations: 2, shuffle: false, seed: None })
            .unwrap();
        let labels: Vec<String> = tagger.predict(&["b", "a", "c"]).into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Y", "X", ""]);
    }
}
