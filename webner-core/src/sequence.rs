//! # Codificação de Sequência IOB
//!
//! Converte um fluxo de tokens contendo pseudo-tokens de fronteira
//! (`__START_PER__` ... `__END_PER__`) em pares `(token, tag)` no esquema
//! BIO/IOB: `B-X` para o primeiro token de uma entidade, `I-X` para os
//! seguintes, `O` fora de qualquer entidade.
//!
//! O codificador é um objeto de estado explícito: o estado ("dentro de
//! qual entidade estamos") sobrevive entre chamadas de `encode_split`,
//! porque um mesmo documento HTML é codificado segmento a segmento (texto
//! de cabeça de um elemento, depois seus filhos, depois a cauda) e uma
//! entidade pode atravessar fronteiras de elemento. `reset()` inicia uma
//! nova sessão, uma por documento.
//!
//! ## Exemplo
//!
//! ```rust
//! use webner_core::sequence::IobEncoder;
//!
//! let mut encoder = IobEncoder::new();
//! let tokens = ["hello", "__START_PER__", "John", "Doe", "__END_PER__"];
//! let (tokens, tags) = encoder.encode_split(tokens.iter().map(|t| t.to_string()));
//! assert_eq!(tokens, vec!["hello", "John", "Doe"]);
//! assert_eq!(tags, vec!["O", "B-PER", "I-PER"]);
//! ```

use regex::Regex;

/// Classificação de um token bruto vindo do tokenizador de texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Pseudo-token de abertura de entidade; carrega o nome da entidade.
    Start(String),
    /// Pseudo-token de fechamento de entidade; carrega o nome da entidade.
    End(String),
    /// Token comum de texto.
    Plain,
}

/// Reconhece os pseudo-tokens de fronteira no meio do fluxo de tokens.
///
/// O formato dos marcadores (`__START_X__` / `__END_X__`) é o contrato
/// entre os loaders de anotação e este módulo.
#[derive(Debug, Clone)]
pub struct TokenClassifier {
    start_re: Regex,
    end_re: Regex,
}

impl TokenClassifier {
    pub fn new() -> Self {
        Self {
            // Padrões literais e válidos; os unwraps nunca disparam.
            start_re: Regex::new(r"^__START_(\w+)__$").unwrap(),
            end_re: Regex::new(r"^__END_(\w+)__$").unwrap(),
        }
    }

    /// Classifica um token: marcador de início, marcador de fim, ou token
    /// comum.
    pub fn classify(&self, token: &str) -> TokenKind {
        if let Some(caps) = self.start_re.captures(token) {
            return TokenKind::Start(caps[1].to_string());
        }
        if let Some(caps) = self.end_re.captures(token) {
            return TokenKind::End(caps[1].to_string());
        }
        TokenKind::Plain
    }
}

impl Default for TokenClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Codificador IOB com estado por documento.
///
/// Autômato de três regras:
/// - marcador de início → a próxima tag emitida será `B-X`;
/// - marcador de fim → volta para `O`;
/// - token comum → é emitido com a tag corrente, e `B-X` degrada para
///   `I-X` (só o primeiro token da entidade é `B`).
#[derive(Debug, Clone)]
pub struct IobEncoder {
    classifier: TokenClassifier,
    tag: String,
}

impl IobEncoder {
    pub fn new() -> Self {
        Self {
            classifier: TokenClassifier::new(),
            tag: "O".to_string(),
        }
    }

    /// Descarta o estado corrente. Deve ser chamado uma vez por documento,
    /// antes do primeiro segmento.
    pub fn reset(&mut self) {
        self.tag = "O".to_string();
    }

    /// O classificador usado para reconhecer marcadores (o tokenizador
    /// HTML o consulta para filtrar entidades fora do tagset).
    pub fn classifier(&self) -> &TokenClassifier {
        &self.classifier
    }

    /// Codifica um segmento de tokens, devolvendo pares `(token, tag)`
    /// apenas para os tokens reais (marcadores são consumidos).
    pub fn encode(&mut self, tokens: impl IntoIterator<Item = String>) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for token in tokens {
            match self.classifier.classify(&token) {
                TokenKind::Start(entity) => {
                    self.tag = format!("B-{entity}");
                }
                TokenKind::End(_) => {
                    self.tag = "O".to_string();
                }
                TokenKind::Plain => {
                    out.push((token, self.tag.clone()));
                    if let Some(rest) = self.tag.strip_prefix("B-") {
                        self.tag = format!("I-{rest}");
                    }
                }
            }
        }
        out
    }

    /// Como [`IobEncoder::encode`], mas devolve tokens e tags em dois
    /// vetores paralelos de mesmo comprimento.
    pub fn encode_split(
        &mut self,
        tokens: impl IntoIterator<Item = String>,
    ) -> (Vec<String>, Vec<String>) {
        self.encode(tokens).into_iter().unzip()
    }
}

impl Default for IobEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify() {
        let c = TokenClassifier::new();
        assert_eq!(c.classify("__START_PER__"), TokenKind::Start("PER".to_string()));
        assert_eq!(c.classify("__END_ORG__"), TokenKind::End("ORG".to_string()));
        assert_eq!(c.classify("Maria"), TokenKind::Plain);
        // Marcador malformado é token comum
        assert_eq!(c.classify("__START_PER"), TokenKind::Plain);
    }

    #[test]
    fn test_encode_basic() {
        let mut enc = IobEncoder::new();
        let (tokens, tags) =
            enc.encode_split(toks(&["__START_PER__", "John", "Doe", "__END_PER__", "said"]));
        assert_eq!(tokens, vec!["John", "Doe", "said"]);
        assert_eq!(tags, vec!["B-PER", "I-PER", "O"]);
    }

    #[test]
    fn test_state_carries_across_segments() {
        // Uma entidade aberta num segmento continua no seguinte.
        let mut enc = IobEncoder::new();
        let (_, tags1) = enc.encode_split(toks(&["__START_PER__", "John"]));
        let (_, tags2) = enc.encode_split(toks(&["Doe"]));
        let (_, tags3) = enc.encode_split(toks(&["__END_PER__", "said"]));
        assert_eq!(tags1, vec!["B-PER"]);
        assert_eq!(tags2, vec!["I-PER"]);
        assert_eq!(tags3, vec!["O"]);
    }

    #[test]
    fn test_reset_starts_fresh_session() {
        let mut enc = IobEncoder::new();
        enc.encode(toks(&["__START_PER__", "John"]));
        enc.reset();
        let (_, tags) = enc.encode_split(toks(&["Doe"]));
        assert_eq!(tags, vec!["O"]);
    }

    #[test]
    fn test_consecutive_entities() {
        let mut enc = IobEncoder::new();
        let (_, tags) = enc.encode_split(toks(&[
            "__START_PER__",
            "Ana",
            "__END_PER__",
            "__START_PER__",
            "Bia",
            "__END_PER__",
        ]));
        assert_eq!(tags, vec!["B-PER", "B-PER"]);
    }

    #[test]
    fn test_empty_segment() {
        let mut enc = IobEncoder::new();
        let (tokens, tags) = enc.encode_split(Vec::<String>::new());
        assert!(tokens.is_empty());
        assert!(tags.is_empty());
    }
}
