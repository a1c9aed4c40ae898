//! # Segmentador — Orquestração dos Modos de Corte
//!
//! Compõe dicionário ([`Vocabulary`]), DAG/rota ([`crate::dag`]) e o modelo
//! BMES ([`SequenceTagger`]) nos modos de segmentação:
//!
//! | Método | Comportamento |
//! |---|---|
//! | [`cut_vocab`](Segmenter::cut_vocab) | corte ótimo pelo dicionário |
//! | [`cut_words`](Segmenter::cut_words) | `cut_vocab` + fusão de caracteres ASCII |
//! | [`cut_search`](Segmenter::cut_search) | todos os candidatos do DAG (tokens sobrepostos) |
//! | [`model_cut`](Segmenter::model_cut) | rótulos BMES do perceptron por caractere |
//! | [`seg`](Segmenter::seg) | texto bruto → blocos → um dos modos acima |
//!
//! ## Modo Probe
//!
//! Descobre palavras novas comparando o corte por dicionário com o corte por
//! modelo. N-gramas do corte por dicionário que o modelo também produziu são
//! adicionados **temporariamente** ao dicionário, o bloco é cortado de novo e
//! as palavras são retiradas. A retirada acontece em qualquer caminho de saída
//! (inclusive pânico) via [`ProbeGuard`].

use std::collections::HashSet;
use std::io::{BufRead, Read};
use std::sync::Mutex;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ProbeConfig, SegmentConfig};
use crate::dag::{build_dag, calc_route, walk_route, CharIndexed};
use crate::error::{JiaguError, Result};
use crate::perceptron::Class;
use crate::tagger::SequenceTagger;
use crate::tokenizer::{coalesce_ascii, split_blocks, split_chars, Block};
use crate::vocab::Vocabulary;

/// Modo de segmentação do texto bruto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegMode {
    /// Corte ótimo pelo dicionário.
    #[default]
    Default,
    /// Corte pelo modelo BMES.
    Model,
    /// Dicionário aumentado temporariamente com palavras descobertas pelo modelo.
    Probe,
}

/// Segmentador de texto chinês.
///
/// É `Sync`: várias threads podem segmentar em paralelo. Chamadas em modo
/// probe são serializadas internamente; enquanto uma está em curso, cortes
/// concorrentes de outros modos podem enxergar as palavras temporárias.
#[derive(Debug)]
pub struct Segmenter {
    vocab: Vocabulary,
    model: Option<SequenceTagger>,
    config: SegmentConfig,
    probe_lock: Mutex<()>,
}

impl Segmenter {
    /// Segmentador somente com dicionário (modos `Model`/`Probe` indisponíveis).
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            model: None,
            config: SegmentConfig::default(),
            probe_lock: Mutex::new(()),
        }
    }

    /// Segmentador com dicionário e modelo BMES.
    pub fn with_model(vocab: Vocabulary, model: SequenceTagger) -> Self {
        Self {
            model: Some(model),
            ..Self::new(vocab)
        }
    }

    /// Lê dicionário e modelo (gzip+JSON) de leitores.
    pub fn from_readers<V: BufRead, M: Read>(vocab: V, model: M) -> Result<Self> {
        let model = SequenceTagger::load(model)?;
        let vocab = Vocabulary::from_reader(vocab)?;
        Ok(Self::with_model(vocab, model))
    }

    pub fn with_config(mut self, config: SegmentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn add_vocab(&self, word: &str, freq: u64) {
        self.vocab.add_word(word, freq);
    }

    pub fn delete_vocab(&self, word: &str, freq: u64) {
        self.vocab.delete_word(word, freq);
    }

    /// Carrega um dicionário de usuário sobre o dicionário atual.
    pub fn load_user_dict<R: BufRead>(&self, reader: R) -> Result<()> {
        self.vocab.load(reader)
    }

    /// Corte de máxima verossimilhança pelo dicionário.
    ///
    /// A concatenação dos tokens é sempre igual à entrada.
    pub fn cut_vocab(&self, sentence: &str) -> Vec<String> {
        let chars = CharIndexed::new(sentence);
        let view = self.vocab.view();
        let dag = build_dag(&chars, &view);
        let route = calc_route(&chars, &dag, &view);
        walk_route(&chars, &route).into_iter().map(String::from).collect()
    }

    /// [`cut_vocab`](Self::cut_vocab) seguido da fusão de caracteres ASCII avulsos.
    pub fn cut_words(&self, sentence: &str) -> Vec<String> {
        coalesce_ascii(&self.cut_vocab(sentence))
    }

    /// Todos os candidatos do DAG, para indexação orientada a recall.
    ///
    /// Para cada início emite toda palavra mais longa que um caractere; se não
    /// houver nenhuma, emite o próprio caractere. A saída pode se sobrepor e
    /// **não** é uma partição da entrada.
    pub fn cut_search(&self, sentence: &str) -> Vec<String> {
        let chars = CharIndexed::new(sentence);
        let dag = build_dag(&chars, &self.vocab.view());
        let mut words = Vec::new();
        for (idx, candidates) in dag.iter().enumerate() {
            let longer: Vec<usize> = candidates.iter().copied().filter(|&x| x > idx).collect();
            if longer.is_empty() {
                words.push(chars.slice(idx, idx + 1).to_string());
            }
            words.extend(longer.into_iter().map(|x| chars.slice(idx, x + 1).to_string()));
        }
        words
    }

    /// Corte pelo modelo BMES, caractere a caractere.
    pub fn model_cut(&self, sentence: &str) -> Result<Vec<String>> {
        let model = self.model.as_ref().ok_or(JiaguError::ModelNotLoaded)?;
        if sentence.is_empty() {
            return Ok(Vec::new());
        }
        let chars = split_chars(sentence);
        let labels = model.predict(&chars);
        Ok(labels_to_words(&chars, &labels))
    }

    /// Segmenta texto bruto.
    pub fn seg(&self, text: &str, mode: SegMode) -> Result<Vec<String>> {
        if mode != SegMode::Default && self.model.is_none() {
            return Err(JiaguError::ModelNotLoaded);
        }
        // Uma chamada probe por vez: as palavras temporárias de uma não podem vazar para a outra
        let _probe = match mode {
            SegMode::Probe => Some(self.probe_lock.lock().unwrap_or_else(|p| p.into_inner())),
            _ => None,
        };

        let mut words = Vec::new();
        for block in split_blocks(text) {
            match block {
                Block::Segmentable(s) => match mode {
                    SegMode::Default => words.extend(self.cut_words(s)),
                    SegMode::Model => words.extend(coalesce_ascii(&self.model_cut(s)?)),
                    SegMode::Probe => words.extend(self.probe_block(s)?),
                },
                Block::Other(s) => words.extend(split_chars(s)),
            }
        }
        Ok(words)
    }

    /// Segmenta vários textos em paralelo.
    pub fn seg_batch<S: AsRef<str> + Sync>(&self, texts: &[S], mode: SegMode) -> Result<Vec<Vec<String>>> {
        texts.par_iter().map(|t| self.seg(t.as_ref(), mode)).collect()
    }

    fn probe_block(&self, block: &str) -> Result<Vec<String>> {
        let dict_words = self.cut_words(block);
        let model_words: HashSet<String> = self.model_cut(block)?.into_iter().collect();
        let candidates = probe_candidates(&dict_words, &model_words, &self.config.probe);
        if candidates.is_empty() {
            return Ok(dict_words);
        }

        let guard = ProbeGuard::insert(&self.vocab, candidates);
        debug!(block, words = ?guard.words(), "palavras temporárias adicionadas");
        Ok(self.cut_words(block))
    }
}

/// N-gramas do corte por dicionário que o modelo também produziu.
///
/// Descarta os que o dicionário já produziu literalmente e os fora do
/// intervalo de comprimento configurado. Sem repetições, em ordem de descoberta.
pub fn probe_candidates(dict_words: &[String], model_words: &HashSet<String>, config: &ProbeConfig) -> Vec<String> {
    let produced: HashSet<&str> = dict_words.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for n in config.min_window.max(1)..=config.max_window {
        for window in dict_words.windows(n) {
            let ngram = window.concat();
            if !config.accepts_len(ngram.chars().count())
                || produced.contains(ngram.as_str())
                || !model_words.contains(&ngram)
            {
                continue;
            }
            if seen.insert(ngram.clone()) {
                out.push(ngram);
            }
        }
    }
    out
}

/// Converte rótulos BMES por caractere em palavras.
///
/// `B`/`M` acumulam, `E` fecha a palavra, qualquer outro rótulo (`S`, vazio)
/// emite o caractere sozinho. Uma palavra aberta no fim da sentença é emitida.
pub fn labels_to_words<S: AsRef<str>>(chars: &[S], labels: &[Class]) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for (c, label) in chars.iter().zip(labels) {
        let c = c.as_ref();
        match label.label.as_str() {
            "B" | "M" => current.push_str(c),
            "E" => {
                current.push_str(c);
                words.push(std::mem::take(&mut current));
            }
            _ => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(c.to_string());
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Palavras adicionadas temporariamente ao dicionário; removidas no `Drop`.
///
/// Palavras que já existiam recebem +1 e voltam à frequência original;
/// palavras novas são removidas por completo. A maior frequência do
/// dicionário também volta ao valor anterior.
pub struct ProbeGuard<'a> {
    vocab: &'a Vocabulary,
    added: Vec<(String, bool)>,
    max_freq: u64,
}

impl<'a> ProbeGuard<'a> {
    pub fn insert(vocab: &'a Vocabulary, words: Vec<String>) -> Self {
        let max_freq = vocab.max_frequency();
        let mut added = Vec::with_capacity(words.len());
        for word in words {
            let existed = vocab.contains(&word);
            // Entradas de frequência zero não sobreviveriam ao decremento
            if existed && vocab.frequency(&word) == 0 {
                continue;
            }
            vocab.add_word(&word, 1);
            added.push((word, existed));
        }
        Self { vocab, added, max_freq }
    }

    pub fn words(&self) -> Vec<&str> {
        self.added.iter().map(|(w, _)| w.as_str()).collect()
    }
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        for (word, existed) in &self.added {
            let freq = if *existed { 1 } else { 0 };
            self.vocab.delete_word(word, freq);
        }
        // Inserções com freq 1 só elevam um máximo que estava em 0
        if !self.added.is_empty() && self.max_freq == 0 {
            self.vocab.reset_max_frequency(1, 0);
        }
    }
}
