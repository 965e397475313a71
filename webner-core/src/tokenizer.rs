//! # Tokenizador de Texto Bruto
//!
//! Divide o texto de um segmento HTML (cabeça ou cauda de um elemento) em
//! tokens. Pontuação isolada é descartada — para o CRF de entidades, os
//! sinais úteis vêm das palavras e de sua forma, não das vírgulas.
//!
//! Os pseudo-tokens de fronteira de entidade (`__START_PER__`,
//! `__END_PER__`...) inseridos pelos loaders de anotação são palavras
//! normais do ponto de vista deste módulo: eles atravessam a tokenização
//! intactos e são consumidos depois pelo [`crate::sequence::IobEncoder`].
//!
//! ## Exemplo
//!
//! ```rust
//! use webner_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("hello, __START_PER__ John ");
//! assert_eq!(tokens, vec!["hello", "__START_PER__", "John"]);
//! ```

use regex::Regex;

/// Tokenizador com o padrão de palavra compilado uma única vez.
///
/// Uma "palavra" é uma sequência de caracteres alfanuméricos que pode
/// conter apóstrofos, hífens e pontos internos (`it's`, `U.S.A`, `3.14`,
/// `guarda-chuva`). Pontuação solta não vira token.
#[derive(Debug, Clone)]
pub struct TextTokenizer {
    word_re: Regex,
}

impl TextTokenizer {
    pub fn new() -> Self {
        Self {
            // Padrão literal e válido; o unwrap nunca dispara.
            word_re: Regex::new(r"\w(?:[\w'.-]*\w)?").unwrap(),
        }
    }

    /// Tokeniza um texto em palavras, na ordem em que aparecem.
    /// Texto vazio ou só de espaços produz um vetor vazio.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.word_re
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl Default for TextTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokeniza um texto com o tokenizador padrão (conveniência).
pub fn tokenize(text: &str) -> Vec<String> {
    TextTokenizer::new().tokenize(text)
}
