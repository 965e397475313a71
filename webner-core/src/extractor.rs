//! # Extrator de Features de Tokens HTML
//!
//! Aplica as funções de feature configuradas sobre listas de
//! [`HtmlToken`] e devolve um dicionário de features por token, alinhado
//! posicionalmente com a entrada.
//!
//! O processamento de um documento tem duas fases:
//!
//! 1. **Fase de token**: cada função de token produz um dicionário
//!    parcial e os dicionários são unidos por token. A ordem das funções
//!    importa: em conflito de nome, a última função aplicada vence.
//! 2. **Fase global**: cada função global recebe a arena completa de
//!    pares `(token, dicionário)` com acesso mutável e escreve features
//!    de contexto de sequência.
//!
//! Antes de devolver, toda chave privada (prefixo `_`) é removida.
//!
//! `fit_transform` adiciona a poda por frequência documental: pares
//! `(nome, valor)` que aparecem em menos de `min_df` documentos do corpus
//! são descartados. A poda é por valor — um nome pode sobreviver com os
//! valores comuns e perder os raros.

use std::collections::{HashMap, HashSet};

use crate::features::{is_private, FeatureDict, GlobalFeature, TokenFeature};
use crate::html_tokenizer::HtmlToken;

/// Extrator de features configurável.
///
/// As funções de feature são colaboradoras de confiança: o extrator não
/// as isola nem intercepta — um pânico dentro de uma função de feature
/// propaga para o chamador.
pub struct HtmlFeatureExtractor {
    token_features: Vec<TokenFeature>,
    global_features: Vec<GlobalFeature>,
    min_df: usize,
}

impl HtmlFeatureExtractor {
    /// Cria um extrator com as funções de token dadas (a ordem define a
    /// política de conflito: a última vence).
    pub fn new(token_features: Vec<TokenFeature>) -> Self {
        Self {
            token_features,
            global_features: Vec::new(),
            min_df: 1,
        }
    }

    /// Adiciona funções de feature globais.
    pub fn with_global_features(mut self, global_features: Vec<GlobalFeature>) -> Self {
        self.global_features = global_features;
        self
    }

    /// Define o limiar de frequência documental usado por
    /// `fit_transform`. Com `min_df <= 1` a poda é a identidade.
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Extrai features de um documento: um dicionário por token, na mesma
    /// ordem. Lista vazia produz saída vazia.
    pub fn transform_single(&self, html_tokens: &[HtmlToken]) -> Vec<FeatureDict> {
        // Fase 1: união dos dicionários das funções de token.
        let mut token_data: Vec<(HtmlToken, FeatureDict)> = html_tokens
            .iter()
            .map(|token| {
                let mut dict = FeatureDict::new();
                for feature in &self.token_features {
                    dict.extend(feature(token));
                }
                (token.clone(), dict)
            })
            .collect();

        // Fase 2: funções globais mutam a arena inteira.
        for feature in &self.global_features {
            feature(&mut token_data);
        }

        // Chaves privadas nunca saem do extrator.
        token_data
            .into_iter()
            .map(|(_, mut dict)| {
                dict.retain(|name, _| !is_private(name));
                dict
            })
            .collect()
    }

    /// Extrai features de um corpus, documento a documento, sem poda.
    pub fn transform(&self, corpus: &[Vec<HtmlToken>]) -> Vec<Vec<FeatureDict>> {
        corpus
            .iter()
            .map(|html_tokens| self.transform_single(html_tokens))
            .collect()
    }

    /// Extrai features de um corpus e poda os pares `(nome, valor)` com
    /// frequência documental abaixo de `min_df`.
    pub fn fit_transform(&self, corpus: &[Vec<HtmlToken>]) -> Vec<Vec<FeatureDict>> {
        let extracted = self.transform(corpus);
        self.pruned(extracted)
    }

    fn pruned(&self, corpus: Vec<Vec<FeatureDict>>) -> Vec<Vec<FeatureDict>> {
        if self.min_df <= 1 {
            return corpus;
        }
        let counts = document_frequency(&corpus);
        let keep: HashSet<(String, String)> = counts
            .into_iter()
            .filter(|(_, count)| *count >= self.min_df)
            .map(|(pair, _)| pair)
            .collect();

        corpus
            .into_iter()
            .map(|doc| {
                doc.into_iter()
                    .map(|mut dict| {
                        dict.retain(|name, value| {
                            keep.contains(&(name.clone(), value.to_text()))
                        });
                        dict
                    })
                    .collect()
            })
            .collect()
    }
}

/// Conta, para cada par `(nome, valor)` distinto, em quantos documentos
/// do corpus ele aparece pelo menos uma vez (presença, não contagem).
fn document_frequency(corpus: &[Vec<FeatureDict>]) -> HashMap<(String, String), usize> {
    let mut counts: HashMap<(String, String), usize> = HashMap::new();
    for doc in corpus {
        let seen: HashSet<(String, String)> = doc
            .iter()
            .flat_map(|dict| {
                dict.iter()
                    .map(|(name, value)| (name.clone(), value.to_text()))
            })
            .collect();
        for pair in seen {
            *counts.entry(pair).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{
        block_has_phone, looks_like_phone, token_identity, FeatureValue, TokenFeature,
    };
    use crate::html_tokenizer::HtmlTokenizer;
    use crate::tree::HtmlTree;

    fn tokens_from(text: &str) -> Vec<HtmlToken> {
        let mut tree = HtmlTree::with_root("p");
        tree.set_text(tree.root(), text);
        HtmlTokenizer::new().tokenize_single(&tree).0
    }

    /// Árvore do exemplo canônico:
    /// `<p>hello, <PER>John <b>Doe</b></PER> <br> <PER>Mary</PER> said</p>`
    fn annotated_tokens() -> Vec<HtmlToken> {
        let mut tree = HtmlTree::with_root("p");
        tree.set_text(tree.root(), "hello, __START_PER__ John ");
        let b = tree.add_child(tree.root(), "b");
        tree.set_text(b, "Doe");
        tree.set_tail(b, " __END_PER__ ");
        let br = tree.add_child(tree.root(), "br");
        tree.set_tail(br, " __START_PER__ Mary __END_PER__ said");
        HtmlTokenizer::new().tokenize_single(&tree).0
    }

    #[test]
    fn test_one_dict_per_token() {
        let tokens = annotated_tokens();
        let extractor = HtmlFeatureExtractor::new(vec![Box::new(|t: &HtmlToken| {
            HashMap::from([("tok".to_string(), FeatureValue::Text(t.token().to_string()))])
        })]);
        let dicts = extractor.transform_single(&tokens);
        assert_eq!(dicts.len(), tokens.len());
        for (token, dict) in tokens.iter().zip(&dicts) {
            assert_eq!(dict.len(), 1);
            assert_eq!(dict["tok"], token.token().into());
        }
    }

    #[test]
    fn test_last_function_wins_on_conflict() {
        let tokens = tokens_from("abc");
        let first: TokenFeature =
            Box::new(|_| HashMap::from([("x".to_string(), FeatureValue::Text("first".to_string()))]));
        let second: TokenFeature =
            Box::new(|_| HashMap::from([("x".to_string(), FeatureValue::Text("second".to_string()))]));
        let extractor = HtmlFeatureExtractor::new(vec![first, second]);
        let dicts = extractor.transform_single(&tokens);
        assert_eq!(dicts[0]["x"], "second".into());
    }

    #[test]
    fn test_private_keys_never_returned() {
        let tokens = tokens_from("ligue 555-123-4567 agora");
        let extractor = HtmlFeatureExtractor::new(vec![
            Box::new(token_identity),
            Box::new(looks_like_phone),
        ])
        .with_global_features(vec![Box::new(block_has_phone)]);

        let dicts = extractor.transform_single(&tokens);
        // A global leu a chave privada e propagou a pública para todos
        assert!(dicts.iter().all(|d| d["block_has_phone"] == true.into()));
        // ...mas nenhuma chave privada escapou
        assert!(dicts.iter().all(|d| d.keys().all(|k| !is_private(k))));
    }

    #[test]
    fn test_global_feature_absent_when_no_match() {
        let tokens = tokens_from("nenhum telefone aqui");
        let extractor = HtmlFeatureExtractor::new(vec![Box::new(looks_like_phone)])
            .with_global_features(vec![Box::new(block_has_phone)]);
        let dicts = extractor.transform_single(&tokens);
        assert!(dicts.iter().all(|d| !d.contains_key("block_has_phone")));
    }

    #[test]
    fn test_min_df_one_is_identity() {
        let corpus = vec![tokens_from("a b"), tokens_from("c")];
        let extractor = HtmlFeatureExtractor::new(vec![Box::new(token_identity)]);
        let plain = extractor.transform(&corpus);
        let fitted = extractor.fit_transform(&corpus);
        assert_eq!(plain, fitted);
    }

    #[test]
    fn test_min_df_above_corpus_empties_dicts() {
        let corpus = vec![tokens_from("a b"), tokens_from("c")];
        let extractor =
            HtmlFeatureExtractor::new(vec![Box::new(token_identity)]).with_min_df(10);
        let fitted = extractor.fit_transform(&corpus);
        assert!(fitted.iter().flatten().all(|dict| dict.is_empty()));
        // O alinhamento posicional se mantém mesmo com dicionários vazios
        assert_eq!(fitted[0].len(), 2);
        assert_eq!(fitted[1].len(), 1);
    }

    #[test]
    fn test_value_level_pruning() {
        // "comum" aparece nos dois documentos; "raro" só num deles.
        let corpus = vec![tokens_from("comum raro"), tokens_from("comum")];
        let extractor =
            HtmlFeatureExtractor::new(vec![Box::new(token_identity)]).with_min_df(2);
        let fitted = extractor.fit_transform(&corpus);

        assert_eq!(fitted[0][0]["token"], "comum".into());
        // O mesmo nome "token" foi podado apenas para o valor raro
        assert!(fitted[0][1].is_empty());
        assert_eq!(fitted[1][0]["token"], "comum".into());
    }

    #[test]
    fn test_empty_input() {
        let extractor = HtmlFeatureExtractor::new(vec![Box::new(token_identity)]);
        assert!(extractor.transform_single(&[]).is_empty());
        assert!(extractor.fit_transform(&[]).is_empty());
    }
}
