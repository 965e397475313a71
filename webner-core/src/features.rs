//! # Valores e Funções de Feature
//!
//! Define o dicionário de features que descreve cada token e um conjunto
//! de funções de feature prontas, no espírito da engenharia de features
//! clássica para CRF: forma da palavra, prefixos/sufixos, tag do elemento
//! pai, posição no bloco.
//!
//! ## Funções de feature
//!
//! - **Função de token** ([`TokenFeature`]): recebe um [`HtmlToken`] e
//!   devolve um dicionário parcial. Os dicionários de todas as funções
//!   são unidos por token (a última função vence em caso de conflito de
//!   nome).
//! - **Função global** ([`GlobalFeature`]): recebe o documento inteiro
//!   como uma arena mutável de pares `(token, dicionário)` e escreve
//!   features de contexto de sequência (ex: "algum token deste bloco
//!   parece um telefone").
//!
//! ## Chaves privadas
//!
//! Nomes começando com `_` são canais de comunicação entre funções de
//! feature dentro de um documento: funções globais podem lê-los e
//! escrevê-los, mas eles são removidos de todo dicionário antes de sair
//! do extrator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::html_tokenizer::HtmlToken;

/// Prefixo que marca uma chave de feature como privada.
pub const PRIVATE_PREFIX: &str = "_";

/// Verifica se um nome de feature é privado (não sai do extrator).
pub fn is_private(name: &str) -> bool {
    name.starts_with(PRIVATE_PREFIX)
}

/// Valor de uma feature: texto, número ou booleano.
///
/// Uma união fechada (em vez de um mapa sem tipo) garante que a
/// serialização colunar do encoder Wapiti seja total: todo valor tem uma
/// única representação textual via [`FeatureValue::to_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FeatureValue {
    /// Representação textual única do valor, usada nas colunas do arquivo
    /// de dados do Wapiti e na contagem de frequência documental.
    pub fn to_text(&self) -> String {
        match self {
            FeatureValue::Text(s) => s.clone(),
            FeatureValue::Int(n) => n.to_string(),
            FeatureValue::Float(x) => x.to_string(),
            FeatureValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Text(s)
    }
}

impl From<i64> for FeatureValue {
    fn from(n: i64) -> Self {
        FeatureValue::Int(n)
    }
}

impl From<usize> for FeatureValue {
    fn from(n: usize) -> Self {
        FeatureValue::Int(n as i64)
    }
}

impl From<f64> for FeatureValue {
    fn from(x: f64) -> Self {
        FeatureValue::Float(x)
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Bool(b)
    }
}

/// Dicionário de features de um token: nome → valor.
pub type FeatureDict = HashMap<String, FeatureValue>;

/// Função de feature de token: um token → dicionário parcial.
pub type TokenFeature = Box<dyn Fn(&HtmlToken) -> FeatureDict>;

/// Função de feature global: muta os dicionários do documento inteiro.
pub type GlobalFeature = Box<dyn Fn(&mut [(HtmlToken, FeatureDict)])>;

/// O texto do token, tal qual.
pub fn token_identity(token: &HtmlToken) -> FeatureDict {
    HashMap::from([("token".to_string(), token.token().into())])
}

/// O texto do token em minúsculas.
pub fn token_lower(token: &HtmlToken) -> FeatureDict {
    HashMap::from([("token_lower".to_string(), token.token().to_lowercase().into())])
}

/// A "forma" do token: maiúsculas viram `X`, minúsculas `x`, dígitos `8`,
/// o resto fica como está. Ex: "Dr.Who3" → "Xx.Xxx8".
pub fn token_shape(token: &HtmlToken) -> FeatureDict {
    let shape: String = token
        .token()
        .graphemes(true)
        .map(|g| match g.chars().next() {
            Some(c) if c.is_uppercase() => "X".to_string(),
            Some(c) if c.is_lowercase() => "x".to_string(),
            Some(c) if c.is_numeric() => "8".to_string(),
            _ => g.to_string(),
        })
        .collect();
    HashMap::from([("shape".to_string(), shape.into())])
}

/// Prefixos e sufixos de 2 a 4 grafemas (apenas os que couberem).
pub fn prefixes_and_suffixes(token: &HtmlToken) -> FeatureDict {
    let graphemes: Vec<&str> = token.token().graphemes(true).collect();
    let mut out = FeatureDict::new();
    for n in 2..=4usize {
        if graphemes.len() >= n {
            let prefix: String = graphemes[..n].concat().to_lowercase();
            let suffix: String = graphemes[graphemes.len() - n..].concat().to_lowercase();
            out.insert(format!("prefix{n}"), prefix.into());
            out.insert(format!("suffix{n}"), suffix.into());
        }
    }
    out
}

/// A tag do elemento pai do token (o elemento a cujo fluxo de conteúdo o
/// token pertence).
pub fn parent_tag(token: &HtmlToken) -> FeatureDict {
    HashMap::from([("parent_tag".to_string(), token.parent_tag().into())])
}

/// Posição do token dentro do seu segmento de texto.
pub fn borders(token: &HtmlToken) -> FeatureDict {
    HashMap::from([
        ("first_in_block".to_string(), (token.index == 0).into()),
        (
            "last_in_block".to_string(),
            (token.index + 1 == token.tokens.len()).into(),
        ),
    ])
}

/// Comprimento do segmento de texto, em faixas ("1", "2-10", "10+").
pub fn block_length(token: &HtmlToken) -> FeatureDict {
    let bucket = match token.tokens.len() {
        1 => "1",
        2..=10 => "2-10",
        _ => "10+",
    };
    HashMap::from([("block_length".to_string(), bucket.into())])
}

/// Padrões numéricos simples do token.
pub fn number_pattern(token: &HtmlToken) -> FeatureDict {
    let text = token.token();
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let all_digits = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
    HashMap::from([
        ("has_digit".to_string(), has_digit.into()),
        ("all_digits".to_string(), all_digits.into()),
    ])
}

/// Marca tokens com cara de número de telefone (só dígitos e separadores
/// usuais, com pelo menos 7 dígitos). Além da feature pública, escreve a
/// chave privada `_phone`, consumida por [`block_has_phone`].
pub fn looks_like_phone(token: &HtmlToken) -> FeatureDict {
    let text = token.token();
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    let only_phone_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | '(' | ')' | '+'));
    if digits >= 7 && only_phone_chars {
        HashMap::from([
            ("looks_like_phone".to_string(), true.into()),
            ("_phone".to_string(), true.into()),
        ])
    } else {
        FeatureDict::new()
    }
}

/// Feature global: se algum token do documento parece um telefone, todos
/// os tokens recebem `block_has_phone=true`.
pub fn block_has_phone(token_data: &mut [(HtmlToken, FeatureDict)]) {
    let found = token_data.iter().any(|(_, dict)| dict.contains_key("_phone"));
    if found {
        for (_, dict) in token_data.iter_mut() {
            dict.insert("block_has_phone".to_string(), true.into());
        }
    }
}
