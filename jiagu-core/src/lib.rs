//! # jiagu-core — Segmentação de Chinês e Rotulagem de Sequências
//!
//! Este crate implementa o núcleo de um analisador de texto chinês:
//! segmentação de palavras por dicionário e por modelo, e rotulagem de
//! sequências (POS, NER, relações) com um perceptron médio.
//!
//! ## Arquitetura do Sistema
//!
//! O texto flui pelas etapas abaixo:
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Blocos** ([`tokenizer`]): o texto é dividido em trechos segmentáveis
//!     (ideogramas, ASCII) e o resto (pontuação), que vira tokens avulsos.
//! 3.  **Segmentação** ([`segment`]):
//!     *   **Dicionário** ([`vocab`], [`dag`]): DAG de candidatos + rota de máxima verossimilhança.
//!     *   **Modelo**: rótulos BMES por caractere vindos de um [`tagger::SequenceTagger`].
//!     *   **Probe**: o dicionário é aumentado temporariamente com palavras que o modelo descobriu.
//! 4.  **Rotulagem** ([`tagger`], [`perceptron`], [`features`]): uma tag por palavra
//!     ([`pos`], [`ner`], [`knowledge`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::io::Cursor;
//! use jiagu_core::{SegMode, Segmenter, Vocabulary};
//!
//! let vocab = Vocabulary::from_reader(Cursor::new(
//!     "厦门\t10\n明天\t10\n会\t5\n不\t5\n会不会\t8\n下雨\t10\n",
//! ))?;
//! let segmenter = Segmenter::new(vocab);
//!
//! let words = segmenter.seg("厦门明天会不会下雨？", SegMode::Default)?;
//! assert_eq!(words, vec!["厦门", "明天", "会不会", "下雨", "？"]);
//! # Ok::<(), jiagu_core::JiaguError>(())
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: fachada [`Jiagu`] que reúne segmentador e rotuladores.
//! - [`segment`]: modos de segmentação.
//! - [`tagger`]: treino, predição e persistência de modelos.
//! - [`corpus`]: leitura de dados anotados.

pub mod config;
pub mod corpus;
pub mod dag;
pub mod error;
pub mod features;
pub mod knowledge;
pub mod ner;
pub mod perceptron;
pub mod pipeline;
pub mod pos;
pub mod segment;
pub mod tagger;
pub mod tokenizer;
pub mod vocab;
pub mod weights;

pub use config::{ProbeConfig, SegmentConfig};
pub use error::{JiaguError, Result};
pub use knowledge::{Knowledge, Triple};
pub use ner::{EntitySpan, NerTagger};
pub use perceptron::{AveragedPerceptron, Class, PerceptronModel};
pub use pipeline::{Jiagu, Resources};
pub use pos::PosTagger;
pub use segment::{SegMode, Segmenter};
pub use tagger::{SequenceTagger, TrainOptions};
pub use vocab::Vocabulary;
