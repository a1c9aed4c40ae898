//! # Divisão em Blocos e Pós-processamento de Tokens
//!
//! Antes da segmentação, o texto bruto é particionado em **blocos**:
//!
//! - **Segmentáveis**: sequências máximas de ideogramas CJK, letras/dígitos
//!   ASCII e conectores (`+ # & . _ % -`). Vão para o corte por dicionário ou
//!   por modelo.
//! - **Outros**: pontuação, espaços, símbolos. Viram tokens de um caractere,
//!   espaços inclusive, de modo que a concatenação da saída reproduz a entrada.
//!
//! ## Exemplo
//!
//! ```rust
//! use jiagu_core::tokenizer::{split_blocks, Block};
//!
//! let blocks = split_blocks("汉服和服装、维基图谱");
//! assert_eq!(blocks, vec![
//!     Block::Segmentable("汉服和服装"),
//!     Block::Other("、"),
//!     Block::Segmentable("维基图谱"),
//! ]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SEGMENTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{4E00}-\x{9FD5}a-zA-Z0-9+#&._%\-]+").expect("regex de blocos válida"));

/// Um trecho contíguo do texto de entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    /// Trecho que passa pelo segmentador.
    Segmentable(&'a str),
    /// Trecho dividido em caracteres avulsos.
    Other(&'a str),
}

/// Particiona o texto em blocos segmentáveis e não segmentáveis, na ordem original.
pub fn split_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut last = 0;
    for m in RE_SEGMENTABLE.find_iter(text) {
        if m.start() > last {
            blocks.push(Block::Other(&text[last..m.start()]));
        }
        blocks.push(Block::Segmentable(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        blocks.push(Block::Other(&text[last..]));
    }
    blocks
}

/// Um token por caractere (code point).
pub fn split_chars(text: &str) -> Vec<String> {
    text.chars().map(String::from).collect()
}

fn is_single_ascii_alnum(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphanumeric())
}

/// Une tokens consecutivos de um único caractere ASCII alfanumérico.
///
/// `["1", "0", "0", "万"]` → `["100", "万"]`.
pub fn coalesce_ascii<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(words.len());
    let mut buf = String::new();
    for word in words {
        let word = word.as_ref();
        if is_single_ascii_alnum(word) {
            buf.push_str(word);
            continue;
        }
        if !buf.is_empty() {
            out.push(std::mem::take(&mut buf));
        }
        out.push(word.to_string());
    }
    if !buf.is_empty() {
        out.push(buf);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_blocks_keeps_order_and_coverage() {
        let text = "abc 103.25明天，100%会不会!";
        let blocks = split_blocks(text);
        let joined: String = blocks
            .iter()
            .map(|b| match b {
                Block::Segmentable(s) | Block::Other(s) => *s,
            })
            .collect();
        assert_eq!(joined, text);
        assert_eq!(
            blocks,
            vec![
                Block::Segmentable("abc"),
                Block::Other(" "),
                Block::Segmentable("103.25明天"),
                Block::Other("，"),
                Block::Segmentable("100%会不会"),
                Block::Other("!"),
            ]
        );
    }

    #[test]
    fn test_split_chars_keeps_whitespace() {
        assert_eq!(split_chars("、 \n!"), vec!["、", " ", "\n", "!"]);
    }

    #[test]
    fn test_split_chars() {
        assert_eq!(split_chars("下雨"), vec!["下", "雨"]);
        assert!(split_chars("").is_empty());
    }

    #[test]
    fn test_coalesce_ascii() {
        let words = ["1", "0", "0", "万", "a", "b", "下雨", "x"];
        assert_eq!(coalesce_ascii(&words), vec!["100", "万", "ab", "下雨", "x"]);
        // tokens ASCII com mais de um caractere não são fundidos
        assert_eq!(coalesce_ascii(&["ab", "c"]), vec!["ab", "c"]);
    }
}
