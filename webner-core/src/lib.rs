//! # webner-core — Extração de Features de HTML Anotado para CRF
//!
//! Este crate converte árvores HTML anotadas em sequências de tokens com
//! tags BIO e vetores de features nomeadas, prontos para treinar (ou
//! aplicar) um modelo CRF sequencial com o treinador externo Wapiti.
//!
//! ## Arquitetura do Pipeline
//!
//! O dado flui em etapas, cada uma num módulo próprio:
//!
//! 1.  **Árvore HTML** ([`tree`]): a estrutura que os loaders produzem,
//!     com texto de cabeça/cauda por elemento e utilitários de
//!     normalização (remover/renomear tags).
//! 2.  **Tokenização** ([`tokenizer`], [`sequence`], [`html_tokenizer`]):
//!     a árvore é percorrida em ordem de documento; o texto vira tokens e
//!     os marcadores de anotação (`__START_PER__`...) viram tags BIO via
//!     o codificador de sequência com estado.
//! 3.  **Extração de Features** ([`features`], [`extractor`]): cada token
//!     vira um dicionário de features (forma, prefixos, tag do pai...),
//!     com funções globais para contexto de sequência e poda por
//!     frequência documental.
//! 4.  **Codificação Colunar** ([`wapiti`]): os dicionários viram linhas
//!     colunares e os templates simbólicos viram templates numéricos, no
//!     formato que o binário wapiti consome.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use webner_core::{HtmlFeatureExtractor, HtmlTokenizer, WapitiFeatureEncoder};
//! use webner_core::features::{parent_tag, token_identity};
//! use webner_core::tree::HtmlTree;
//! use webner_core::wapiti::to_wapiti_data;
//!
//! // 1. Árvore anotada (normalmente vinda de um loader):
//! //    <p>hello __START_PER__ John __END_PER__</p>
//! let mut tree = HtmlTree::with_root("p");
//! tree.set_text(tree.root(), "hello __START_PER__ John __END_PER__");
//!
//! // 2. Tokeniza, alinhando tokens e tags BIO
//! let mut tokenizer = HtmlTokenizer::new().with_tagset(["PER"]);
//! let (token_lists, tag_lists) = tokenizer.tokenize(&[tree]);
//!
//! // 3. Extrai um dicionário de features por token
//! let extractor = HtmlFeatureExtractor::new(vec![
//!     Box::new(token_identity),
//!     Box::new(parent_tag),
//! ]);
//! let feature_dicts = extractor.fit_transform(&token_lists);
//!
//! // 4. Achata no formato colunar do Wapiti
//! let mut encoder = WapitiFeatureEncoder::new(["token"]);
//! encoder.fit(&feature_dicts);
//! let data = to_wapiti_data(&encoder, &feature_dicts, Some(&tag_lists)).unwrap();
//! assert_eq!(data, "hello p O\nJohn p B-PER\n");
//! ```

pub mod extractor;
pub mod features;
pub mod html_tokenizer;
pub mod sequence;
pub mod tokenizer;
pub mod tree;
pub mod wapiti;

pub use extractor::HtmlFeatureExtractor;
pub use features::{FeatureDict, FeatureValue, GlobalFeature, TokenFeature};
pub use html_tokenizer::{HtmlToken, HtmlTokenizer};
pub use sequence::IobEncoder;
pub use tree::{HtmlTree, NodeId};
pub use wapiti::{WapitiError, WapitiFeatureEncoder};
