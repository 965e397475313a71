//! # Encoder Colunar e Templates Wapiti
//!
//! O treinador CRF externo (Wapiti) consome um arquivo de dados colunar
//! (um token por linha, colunas separadas por espaço, linha em branco
//! entre sequências) e um arquivo de template cujas macros referenciam
//! colunas por índice. Este módulo faz a ponte entre os dicionários de
//! features nomeadas do [`crate::extractor::HtmlFeatureExtractor`] e esse
//! formato:
//!
//! - [`WapitiFeatureEncoder`] fixa um vocabulário (nome de feature →
//!   índice de coluna) e achata dicionários em linhas de texto;
//! - `prepare_template` reescreve macros `%x[offset,coluna]` trocando
//!   nomes simbólicos de coluna pelos índices do vocabulário;
//! - `unigram_features_template` gera a seção de unigramas do template a
//!   partir do vocabulário.
//!
//! A invocação do binário wapiti (treino, rotulagem, arquivos de modelo)
//! fica fora deste crate; daqui saem apenas os textos prontos.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use thiserror::Error;

use crate::features::FeatureDict;

/// Texto emitido numa coluna quando o dicionário não tem a feature.
/// Colunas são separadas por espaço, então o vazio não é uma opção.
pub const MISSING_VALUE: &str = "?";

/// Erros das operações de encoder e template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WapitiError {
    /// Operação que exige vocabulário chamada antes de `fit`.
    #[error("encoder sem vocabulário: chame fit/partial_fit antes de transformar")]
    NotFitted,
    /// Template referencia uma feature que nunca foi vista no ajuste.
    #[error("feature desconhecida no template: {name}")]
    UnknownFeature { name: String },
}

/// Encoder colunar com vocabulário estável.
///
/// Os nomes em `move_to_front` ocupam sempre as colunas `0..k-1`, na
/// ordem declarada; os demais nomes observados durante o ajuste vêm em
/// seguida. Re-ajustar com mais dados apenas acrescenta nomes novos ao
/// final — colunas já atribuídas nunca mudam de posição, então os índices
/// usados em linhas de dados e templates já gerados continuam válidos.
#[derive(Debug, Clone)]
pub struct WapitiFeatureEncoder {
    move_to_front: Vec<String>,
    feature_names: Option<Vec<String>>,
    vocabulary: HashMap<String, usize>,
    macro_re: Regex,
}

impl WapitiFeatureEncoder {
    /// Cria um encoder com os nomes fixados nas primeiras colunas.
    pub fn new<I, S>(move_to_front: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            move_to_front: move_to_front.into_iter().map(Into::into).collect(),
            feature_names: None,
            vocabulary: HashMap::new(),
            // Padrão literal e válido; o unwrap nunca dispara.
            macro_re: Regex::new(
                r"(?P<macro>%[xXtTmM])\[\s*(?P<offset>-?\d+)\s*,\s*(?P<column>[^\],\s]+)\s*(?P<rest>[\],])",
            )
            .unwrap(),
        }
    }

    /// Ajusta o vocabulário sobre um corpus de dicionários de features.
    /// Equivalente a [`WapitiFeatureEncoder::partial_fit`].
    pub fn fit(&mut self, corpus: &[Vec<FeatureDict>]) -> &mut Self {
        self.partial_fit(corpus)
    }

    /// Ajuste incremental: acrescenta ao vocabulário os nomes ainda não
    /// vistos, em ordem lexicográfica, sem reordenar os existentes.
    /// Idempotente sobre os mesmos dados.
    pub fn partial_fit(&mut self, corpus: &[Vec<FeatureDict>]) -> &mut Self {
        let pinned: HashSet<&str> = self.move_to_front.iter().map(String::as_str).collect();
        let mut names = match self.feature_names.take() {
            Some(names) => names,
            None => self.move_to_front.clone(),
        };
        let known: HashSet<String> = names.iter().cloned().collect();

        let mut fresh: Vec<String> = corpus
            .iter()
            .flatten()
            .flat_map(|dict| dict.keys())
            .filter(|name| !pinned.contains(name.as_str()) && !known.contains(*name))
            .cloned()
            .collect::<HashSet<String>>()
            .into_iter()
            .collect();
        fresh.sort();
        names.extend(fresh);

        self.vocabulary = names
            .iter()
            .enumerate()
            .map(|(col, name)| (name.clone(), col))
            .collect();
        self.feature_names = Some(names);
        self
    }

    /// Descarta o vocabulário; o encoder volta ao estado não ajustado.
    pub fn reset(&mut self) {
        self.feature_names = None;
        self.vocabulary.clear();
    }

    /// Os nomes de feature na ordem das colunas (`None` antes do ajuste).
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// O vocabulário nome → índice de coluna.
    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    fn fitted_names(&self) -> Result<&[String], WapitiError> {
        self.feature_names.as_deref().ok_or(WapitiError::NotFitted)
    }

    /// Achata os dicionários de um documento em linhas de dados: uma
    /// linha por token, toda coluna do vocabulário presente, valores
    /// ausentes como [`MISSING_VALUE`].
    pub fn transform_single(&self, dicts: &[FeatureDict]) -> Result<Vec<String>, WapitiError> {
        let names = self.fitted_names()?;
        Ok(dicts
            .iter()
            .map(|dict| {
                names
                    .iter()
                    .map(|name| {
                        dict.get(name)
                            .map(|value| value.to_text())
                            .unwrap_or_else(|| MISSING_VALUE.to_string())
                    })
                    .collect::<Vec<String>>()
                    .join(" ")
            })
            .collect())
    }

    /// Achata um corpus inteiro, documento a documento.
    pub fn transform(&self, corpus: &[Vec<FeatureDict>]) -> Result<Vec<Vec<String>>, WapitiError> {
        corpus
            .iter()
            .map(|dicts| self.transform_single(dicts))
            .collect()
    }

    /// Reescreve um template Wapiti trocando nomes simbólicos de coluna
    /// pelos índices do vocabulário dentro das macros `%x[offset,coluna]`
    /// (e variantes `%X`/`%t`/`%T`/`%m`/`%M`).
    ///
    /// Linhas de comentário (iniciadas por `#`) passam intocadas; colunas
    /// já numéricas ficam como estão (apenas o espaçamento interno da
    /// macro é normalizado). Nome fora do vocabulário é erro.
    pub fn prepare_template(&self, template: &str) -> Result<String, WapitiError> {
        self.fitted_names()?;
        let lines: Vec<String> = template
            .split('\n')
            .map(|line| {
                if line_is_comment(line) {
                    Ok(line.to_string())
                } else {
                    self.rewrite_macros(line)
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Reescreve as macros de uma linha, copiando intacto o texto entre
    /// elas (um rewriter explícito, não uma substituição cega).
    fn rewrite_macros(&self, line: &str) -> Result<String, WapitiError> {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        for caps in self.macro_re.captures_iter(line) {
            // O grupo 0 existe sempre que há captura.
            let whole = caps.get(0).unwrap();
            out.push_str(&line[last..whole.start()]);

            let column = &caps["column"];
            let resolved = if column.chars().all(|c| c.is_ascii_digit()) {
                column.to_string()
            } else {
                self.vocabulary
                    .get(column)
                    .ok_or_else(|| WapitiError::UnknownFeature {
                        name: column.to_string(),
                    })?
                    .to_string()
            };

            out.push_str(&caps["macro"]);
            out.push('[');
            out.push_str(&caps["offset"]);
            out.push(',');
            out.push_str(&resolved);
            out.push_str(&caps["rest"]);
            last = whole.end();
        }
        out.push_str(&line[last..]);
        Ok(out)
    }

    /// Gera a seção de unigramas do template: uma linha
    /// `{scope}feat:{nome}=%x[0,{coluna}]` por entrada do vocabulário.
    pub fn unigram_features_template(&self, scope: &str) -> Result<String, WapitiError> {
        let names = self.fitted_names()?;
        let mut lines = vec!["\n# Unigrams for all custom features".to_string()];
        for (col, name) in names.iter().enumerate() {
            lines.push(format!("{scope}feat:{name}=%x[0,{col}]"));
        }
        Ok(lines.join("\n") + "\n")
    }
}

fn line_is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Junta linhas de dados com suas tags: `linha tag`, uma por token.
/// Este é o formato de treino do Wapiti (a tag é a última coluna).
pub fn to_train_sequence(rows: &[String], tags: &[String]) -> String {
    rows.iter()
        .zip(tags)
        .map(|(row, tag)| format!("{row} {tag}"))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Monta o texto completo de um arquivo de dados Wapiti para um corpus:
/// sequências separadas por linha em branco; com `tags`, cada linha
/// termina com a tag do token (dados de treino), sem `tags` saem só as
/// colunas de features (dados para rotular).
pub fn to_wapiti_data(
    encoder: &WapitiFeatureEncoder,
    corpus: &[Vec<FeatureDict>],
    tags: Option<&[Vec<String>]>,
) -> Result<String, WapitiError> {
    let transformed = encoder.transform(corpus)?;
    let sequences: Vec<String> = match tags {
        Some(tags) => transformed
            .iter()
            .zip(tags)
            .map(|(rows, doc_tags)| to_train_sequence(rows, doc_tags))
            .collect(),
        None => transformed.iter().map(|rows| rows.join("\n")).collect(),
    };
    Ok(sequences.join("\n\n") + "\n")
}
