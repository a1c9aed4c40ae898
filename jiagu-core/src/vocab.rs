//! # Dicionário de Frequências
//!
//! Mapa `palavra → frequência` com os agregados que o roteador precisa:
//! frequência total e comprimento máximo de palavra (em code points).
//!
//! ## Concorrência
//!
//! Disciplina leitor/escritor com [`RwLock`]: várias segmentações leem em
//! paralelo; `add_word`/`delete_word`/`load` são exclusivos. Cada mutação
//! atualiza entrada e agregados sob a mesma trava.
//!
//! ## Formato do arquivo
//!
//! UTF-8, uma entrada por linha: `palavra` ou `palavra<TAB>frequência`.
//! Linhas em branco são ignoradas e frequências ilegíveis valem 0
//! (isto é, "use a maior frequência atual").

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::Result;

#[derive(Debug, Default)]
struct VocabInner {
    entries: HashMap<String, u64>,
    total_freq: u64,
    /// Maior frequência já inserida (não diminui com remoções).
    max_freq: u64,
    max_word_len: usize,
}

impl VocabInner {
    fn add(&mut self, word: &str, freq: u64) {
        let freq = if freq == 0 {
            self.max_freq
        } else {
            self.max_freq = self.max_freq.max(freq);
            freq
        };
        *self.entries.entry(word.to_string()).or_insert(0) += freq;
        self.total_freq += freq;
        let len = word.chars().count();
        if freq > 0 && len > self.max_word_len {
            self.max_word_len = len;
        }
    }

    fn delete(&mut self, word: &str, freq: u64) {
        let Some(current) = self.entries.get_mut(word) else {
            return;
        };
        if freq == 0 || freq >= *current {
            let removed = *current;
            self.entries.remove(word);
            self.total_freq -= removed;
            if word.chars().count() >= self.max_word_len {
                self.recompute_max_len();
            }
        } else {
            *current -= freq;
            self.total_freq -= freq;
        }
    }

    fn recompute_max_len(&mut self) {
        self.max_word_len = self
            .entries
            .iter()
            .filter(|(_, f)| **f > 0)
            .map(|(w, _)| w.chars().count())
            .max()
            .unwrap_or(0);
    }
}

/// Dicionário compartilhável entre threads.
#[derive(Debug, Default)]
pub struct Vocabulary {
    inner: RwLock<VocabInner>,
}

/// Leitura consistente do dicionário, com a trava de leitura mantida.
///
/// Usada pelo construtor de DAG e pelo roteador para enxergar um único estado
/// durante toda a chamada.
pub struct VocabView<'a> {
    guard: RwLockReadGuard<'a, VocabInner>,
}

impl VocabView<'_> {
    pub fn frequency(&self, word: &str) -> Option<u64> {
        self.guard.entries.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.guard.entries.contains_key(word)
    }

    pub fn total_frequency(&self) -> u64 {
        self.guard.total_freq
    }

    pub fn max_word_len(&self) -> usize {
        self.guard.max_word_len
    }
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria e carrega um dicionário de um leitor.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let vocab = Self::new();
        vocab.load(reader)?;
        Ok(vocab)
    }

    // Uma thread que entrou em pânico com a trava não deixa o mapa inconsistente:
    // cada mutação é concluída antes de qualquer ponto que possa falhar.
    fn read(&self) -> RwLockReadGuard<'_, VocabInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, VocabInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Trava de leitura para uma sequência de consultas consistentes.
    pub fn view(&self) -> VocabView<'_> {
        VocabView { guard: self.read() }
    }

    /// Adiciona `freq` à palavra; `freq == 0` usa a maior frequência já vista.
    pub fn add_word(&self, word: &str, freq: u64) {
        self.write().add(word, freq);
    }

    /// Remove a palavra (`freq == 0` ou `freq >= atual`) ou decrementa sua frequência.
    pub fn delete_word(&self, word: &str, freq: u64) {
        self.write().delete(word, freq);
    }

    /// Carrega linhas `palavra` ou `palavra<TAB>freq`.
    ///
    /// Erros de I/O são propagados; o que já foi lido permanece no dicionário.
    pub fn load<R: BufRead>(&self, reader: R) -> Result<()> {
        let mut loaded = 0usize;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let Some(word) = fields.next() else {
                continue;
            };
            let freq = fields.next().and_then(|f| f.trim().parse::<u64>().ok()).unwrap_or(0);
            self.write().add(word, freq);
            loaded += 1;
        }
        let inner = self.read();
        debug!(loaded, words = inner.entries.len(), total = inner.total_freq, "dicionário carregado");
        Ok(())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.read().entries.contains_key(word)
    }

    /// Frequência da palavra (0 se ausente).
    pub fn frequency(&self, word: &str) -> u64 {
        self.read().entries.get(word).copied().unwrap_or(0)
    }

    pub fn total_frequency(&self) -> u64 {
        self.read().total_freq
    }

    pub fn max_word_len(&self) -> usize {
        self.read().max_word_len
    }

    pub fn max_frequency(&self) -> u64 {
        self.read().max_freq
    }

    /// Troca a maior frequência de `from` para `to`; no-op se ela mudou nesse meio tempo.
    pub(crate) fn reset_max_frequency(&self, from: u64, to: u64) {
        let mut inner = self.write();
        if inner.max_freq == from {
            inner.max_freq = to;
        }
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Cópia instantânea das entradas, tirada sob a trava de leitura e
    /// percorrida sem ela.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        self.read().entries.iter().map(|(w, f)| (w.clone(), *f)).collect()
    }

    /// Iterador sobre um [`snapshot`](Self::snapshot).
    pub fn iter(&self) -> impl Iterator<Item = (String, u64)> {
        self.snapshot().into_iter()
    }
}
