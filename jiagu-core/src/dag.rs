//! # DAG de Candidatos e Rota de Máxima Verossimilhança
//!
//! Para uma sentença de `n` caracteres, o DAG guarda, para cada índice inicial
//! `i`, os índices finais **inclusivos** `x` tais que `sentence[i..=x]` está no
//! dicionário com frequência positiva. O próprio `i` sempre entra (fallback de
//! um caractere), então sempre existe uma rota.
//!
//! ## Programação Dinâmica
//!
//! ```text
//! route[n]   = (n-1, 0.0)
//! route[idx] = max_{x ∈ DAG[idx]} ln(freq(sentence[idx..=x])) - ln(total) + route[x+1].score
//! ```
//!
//! Percorrida da direita para a esquerda, a recursão produz a segmentação de
//! máxima verossimilhança sob um modelo unigrama. Empates ficam com o menor `x`.

use crate::vocab::VocabView;

/// Candidatos de fim (inclusivos) para cada índice inicial, em ordem crescente.
pub type Dag = Vec<Vec<usize>>;

/// Decisão de roteamento de uma posição.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    /// Índice final (inclusivo) da palavra escolhida a partir desta posição.
    pub end: usize,
    /// Log-verossimilhança acumulada até o fim da sentença.
    pub score: f64,
}

/// Sentença indexável por code point sem realocar substrings.
#[derive(Debug, Clone)]
pub struct CharIndexed<'a> {
    text: &'a str,
    /// Offsets em bytes de cada caractere, mais `text.len()` ao final.
    offsets: Vec<usize>,
}

impl<'a> CharIndexed<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    /// Número de caracteres.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Substring dos caracteres `from..to` (exclusivo).
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        &self.text[self.offsets[from]..self.offsets[to]]
    }
}

/// Constrói o DAG consultando o dicionário até `max_word_len` caracteres à frente.
pub fn build_dag(sentence: &CharIndexed<'_>, vocab: &VocabView<'_>) -> Dag {
    let n = sentence.len();
    let max_len = vocab.max_word_len();
    (0..n)
        .map(|idx| {
            let limit = idx + max_len.min(n - idx);
            let mut candidates = vec![idx];
            // Entradas de frequência zero valeriam ln(0): nunca são candidatas
            candidates.extend(
                (idx + 1..limit).filter(|&x| vocab.frequency(sentence.slice(idx, x + 1)).is_some_and(|f| f > 0)),
            );
            candidates
        })
        .collect()
}

/// Calcula a rota ótima para cada posição (`n + 1` entradas, a última é sentinela).
pub fn calc_route(sentence: &CharIndexed<'_>, dag: &Dag, vocab: &VocabView<'_>) -> Vec<Route> {
    let n = sentence.len();
    let log_total = (vocab.total_frequency().max(1) as f64).ln();
    let mut route = vec![
        Route {
            end: 0,
            score: 0.0
        };
        n + 1
    ];
    route[n] = Route {
        end: n.saturating_sub(1),
        score: 0.0,
    };

    for idx in (0..n).rev() {
        let mut best: Option<Route> = None;
        for &x in &dag[idx] {
            let freq = vocab
                .frequency(sentence.slice(idx, x + 1))
                .filter(|f| *f > 0)
                .unwrap_or(1);
            let score = (freq as f64).ln() - log_total + route[x + 1].score;
            // Candidatos chegam em ordem crescente: só troca em score estritamente maior
            if best.map_or(true, |b| score > b.score) {
                best = Some(Route { end: x, score });
            }
        }
        route[idx] = best.unwrap_or(Route { end: idx, score: f64::NEG_INFINITY });
    }
    route
}

/// Percorre a rota a partir de 0 emitindo uma palavra por salto.
pub fn walk_route<'a>(sentence: &CharIndexed<'a>, route: &[Route]) -> Vec<&'a str> {
    let n = sentence.len();
    let mut words = Vec::new();
    let mut x = 0;
    while x < n {
        let y = route[x].end + 1;
        words.push(sentence.slice(x, y));
        x = y;
    }
    words
}
