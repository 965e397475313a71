//! # Tokenizador de HTML Anotado
//!
//! Percorre uma árvore HTML em ordem de documento e produz a sequência
//! linear de tokens com suas tags BIO, pronta para a extração de features.
//!
//! A caminhada visita, para cada elemento: o texto de cabeça, depois cada
//! filho recursivamente, depois o texto de cauda — exatamente a ordem de
//! leitura do conteúdo misto texto/marcação. O [`IobEncoder`] mantém
//! estado ao longo da caminhada inteira, de modo que uma entidade aberta
//! dentro de um elemento continua corretamente marcada nos elementos
//! seguintes.
//!
//! ## Exemplo
//!
//! ```rust
//! use webner_core::html_tokenizer::HtmlTokenizer;
//! use webner_core::tree::HtmlTree;
//!
//! // <p>hello __START_PER__ John __END_PER__</p>
//! let mut tree = HtmlTree::with_root("p");
//! tree.set_text(tree.root(), "hello __START_PER__ John __END_PER__");
//!
//! let mut tokenizer = HtmlTokenizer::new();
//! let (tokens, tags) = tokenizer.tokenize_single(&tree);
//! let texts: Vec<&str> = tokens.iter().map(|t| t.token()).collect();
//! assert_eq!(texts, vec!["hello", "John"]);
//! assert_eq!(tags, vec!["O", "B-PER"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::sequence::{IobEncoder, TokenKind};
use crate::tokenizer::TextTokenizer;
use crate::tree::{Element, HtmlTree, NodeId};

/// Um token de texto ancorado no elemento HTML de onde veio.
///
/// Todos os tokens de um mesmo segmento de texto (a cabeça ou a cauda de
/// um elemento) compartilham o mesmo `Rc<Vec<String>>`, então funções de
/// feature podem olhar os vizinhos do token dentro do segmento sem copiar
/// texto. `index` é a posição deste token dentro dessa lista.
#[derive(Debug, Clone)]
pub struct HtmlToken {
    /// Posição do token em `tokens`.
    pub index: usize,
    /// Todos os tokens do segmento de texto de origem (compartilhado).
    pub tokens: Rc<Vec<String>>,
    /// A cópia privada da árvore de onde o token foi extraído.
    pub tree: Rc<HtmlTree>,
    /// O elemento dono do segmento de texto.
    pub node: NodeId,
    /// `true` se o token veio da cauda do elemento (texto após a tag de
    /// fechamento), `false` se veio da cabeça.
    pub is_tail: bool,
}

impl HtmlToken {
    /// O texto deste token.
    pub fn token(&self) -> &str {
        &self.tokens[self.index]
    }

    /// O elemento dono do segmento.
    pub fn elem(&self) -> &Element {
        self.tree.get(self.node)
    }

    /// O elemento a cujo fluxo de conteúdo o token pertence: o próprio
    /// elemento para texto de cabeça, o pai para texto de cauda (`None`
    /// apenas para a cauda da raiz).
    pub fn parent(&self) -> Option<&Element> {
        if !self.is_tail {
            return Some(self.elem());
        }
        self.elem().parent.map(|p| self.tree.get(p))
    }

    /// Tag do elemento pai (string vazia quando não há pai).
    pub fn parent_tag(&self) -> &str {
        self.parent().map(|e| e.tag.as_str()).unwrap_or("")
    }
}

/// Converte árvores HTML anotadas em sequências alinhadas de
/// ([`HtmlToken`], tag BIO).
///
/// Configurações opcionais:
/// - `tagset`: conjunto de entidades permitidas; marcadores de outras
///   entidades são descartados antes da codificação;
/// - `kill_tags`: tags removidas da árvore preservando o conteúdo;
/// - `rename_tags`: tags renomeadas (ex: normalizar `b` para `strong`).
///
/// Todo o pré-processamento acontece numa cópia privada da árvore; a
/// árvore do chamador nunca é modificada.
#[derive(Debug)]
pub struct HtmlTokenizer {
    tagset: Option<HashSet<String>>,
    kill_tags: Vec<String>,
    rename_tags: HashMap<String, String>,
    text_tokenizer: TextTokenizer,
    encoder: IobEncoder,
}

impl HtmlTokenizer {
    pub fn new() -> Self {
        Self {
            tagset: None,
            kill_tags: Vec::new(),
            rename_tags: HashMap::new(),
            text_tokenizer: TextTokenizer::new(),
            encoder: IobEncoder::new(),
        }
    }

    /// Restringe as entidades reconhecidas ao conjunto dado.
    pub fn with_tagset<I, S>(mut self, tagset: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tagset = Some(tagset.into_iter().map(Into::into).collect());
        self
    }

    /// Remove as tags dadas (preservando filhos) antes de tokenizar.
    pub fn with_kill_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kill_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Renomeia tags antes de tokenizar (ex: `{"b": "strong"}`).
    pub fn with_rename_tags(mut self, mapping: HashMap<String, String>) -> Self {
        self.rename_tags = mapping;
        self
    }

    /// Tokeniza um documento, devolvendo tokens e tags alinhados
    /// posicionalmente. Documento sem texto devolve dois vetores vazios.
    pub fn tokenize_single(&mut self, tree: &HtmlTree) -> (Vec<HtmlToken>, Vec<String>) {
        // Cópia defensiva: kill/rename operam só na cópia.
        let mut copy = tree.clone();
        self.encoder.reset();
        self.prepare_tree(&mut copy);

        let tree = Rc::new(copy);
        let mut tokens = Vec::new();
        let mut tags = Vec::new();
        self.process_element(&tree, tree.root(), &mut tokens, &mut tags);
        (tokens, tags)
    }

    /// Tokeniza um corpus de documentos.
    pub fn tokenize(&mut self, trees: &[HtmlTree]) -> (Vec<Vec<HtmlToken>>, Vec<Vec<String>>) {
        trees.iter().map(|tree| self.tokenize_single(tree)).unzip()
    }

    fn prepare_tree(&self, tree: &mut HtmlTree) {
        if !self.kill_tags.is_empty() {
            let tags: Vec<&str> = self.kill_tags.iter().map(String::as_str).collect();
            tree.kill_tags(&tags);
        }
        if !self.rename_tags.is_empty() {
            tree.rename_tags(&self.rename_tags);
        }
    }

    fn process_element(
        &mut self,
        tree: &Rc<HtmlTree>,
        node: NodeId,
        tokens: &mut Vec<HtmlToken>,
        tags: &mut Vec<String>,
    ) {
        let text = tree.get(node).text.clone();
        self.process_segment(tree, node, &text, false, tokens, tags);

        let children = tree.get(node).children.clone();
        for child in children {
            self.process_element(tree, child, tokens, tags);
        }

        let tail = tree.get(node).tail.clone();
        self.process_segment(tree, node, &tail, true, tokens, tags);
    }

    fn process_segment(
        &mut self,
        tree: &Rc<HtmlTree>,
        node: NodeId,
        text: &str,
        is_tail: bool,
        tokens: &mut Vec<HtmlToken>,
        tags: &mut Vec<String>,
    ) {
        let raw = self.text_tokenizer.tokenize(text);
        let filtered = self.limit_tags(raw);
        let (segment_tokens, segment_tags) = self.encoder.encode_split(filtered);
        if segment_tokens.is_empty() {
            return;
        }

        let shared = Rc::new(segment_tokens);
        for (index, tag) in segment_tags.into_iter().enumerate() {
            tokens.push(HtmlToken {
                index,
                tokens: Rc::clone(&shared),
                tree: Rc::clone(tree),
                node,
                is_tail,
            });
            tags.push(tag);
        }
    }

    /// Descarta marcadores de fronteira de entidades fora do tagset
    /// configurado (os tokens comuns passam sempre).
    fn limit_tags(&self, input_tokens: Vec<String>) -> Vec<String> {
        let tagset = match &self.tagset {
            Some(set) => set,
            None => return input_tokens,
        };
        let classifier = self.encoder.classifier();
        input_tokens
            .into_iter()
            .filter(|token| match classifier.classify(token) {
                TokenKind::Start(entity) | TokenKind::End(entity) => tagset.contains(&entity),
                TokenKind::Plain => true,
            })
            .collect()
    }
}

impl Default for HtmlTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Árvore equivalente a
    /// `<p>hello, <PER>John <b>Doe</b></PER> <br> <PER>Mary</PER> said</p>`
    /// depois que o loader trocou as tags PER por marcadores.
    fn annotated_tree() -> HtmlTree {
        let mut tree = HtmlTree::with_root("p");
        tree.set_text(tree.root(), "hello, __START_PER__ John ");
        let b = tree.add_child(tree.root(), "b");
        tree.set_text(b, "Doe");
        tree.set_tail(b, " __END_PER__ ");
        let br = tree.add_child(tree.root(), "br");
        tree.set_tail(br, " __START_PER__ Mary __END_PER__ said");
        tree
    }

    #[test]
    fn test_tokenize_annotated_document() {
        let mut tokenizer = HtmlTokenizer::new()
            .with_tagset(["PER"])
            .with_rename_tags(HashMap::from([("b".to_string(), "strong".to_string())]));
        let (tokens, tags) = tokenizer.tokenize_single(&annotated_tree());

        let texts: Vec<&str> = tokens.iter().map(|t| t.token()).collect();
        assert_eq!(texts, vec!["hello", "John", "Doe", "Mary", "said"]);
        assert_eq!(tags, vec!["O", "B-PER", "I-PER", "B-PER", "O"]);

        let elems: Vec<&str> = tokens.iter().map(|t| t.elem().tag.as_str()).collect();
        assert_eq!(elems, vec!["p", "p", "strong", "br", "br"]);

        let is_tail: Vec<bool> = tokens.iter().map(|t| t.is_tail).collect();
        assert_eq!(is_tail, vec![false, false, false, true, true]);

        let parents: Vec<&str> = tokens.iter().map(|t| t.parent_tag()).collect();
        assert_eq!(parents, vec!["p", "p", "strong", "p", "p"]);
    }

    #[test]
    fn test_tokens_share_segment_list() {
        let mut tokenizer = HtmlTokenizer::new();
        let (tokens, _) = tokenizer.tokenize_single(&annotated_tree());
        // "hello" e "John" vêm do mesmo segmento (cabeça do <p>)
        assert!(Rc::ptr_eq(&tokens[0].tokens, &tokens[1].tokens));
        assert_eq!(tokens[0].index, 0);
        assert_eq!(tokens[1].index, 1);
        // "Doe" vem de outro segmento (cabeça do <b>)
        assert!(!Rc::ptr_eq(&tokens[0].tokens, &tokens[2].tokens));
    }

    #[test]
    fn test_tagset_filters_other_entities() {
        let mut tree = HtmlTree::with_root("p");
        tree.set_text(tree.root(), "__START_ORG__ Acme __END_ORG__ __START_PER__ Ana __END_PER__");

        let mut tokenizer = HtmlTokenizer::new().with_tagset(["PER"]);
        let (tokens, tags) = tokenizer.tokenize_single(&tree);
        let texts: Vec<&str> = tokens.iter().map(|t| t.token()).collect();
        assert_eq!(texts, vec!["Acme", "Ana"]);
        assert_eq!(tags, vec!["O", "B-PER"]);
    }

    #[test]
    fn test_kill_tags_before_tokenizing() {
        // <p>a <script>ignored()</script> b</p> — sem kill, o conteúdo do
        // script viraria tokens; com kill, ele continua no fluxo de texto.
        let mut tree = HtmlTree::with_root("p");
        tree.set_text(tree.root(), "a ");
        let script = tree.add_child(tree.root(), "script");
        tree.set_text(script, "x");
        tree.set_tail(script, " b");

        let mut tokenizer = HtmlTokenizer::new().with_kill_tags(["script"]);
        let (tokens, _) = tokenizer.tokenize_single(&tree);
        let texts: Vec<&str> = tokens.iter().map(|t| t.token()).collect();
        assert_eq!(texts, vec!["a", "x", "b"]);
        // Todos no fluxo do <p> após o kill
        assert!(tokens.iter().all(|t| t.elem().tag == "p"));
    }

    #[test]
    fn test_caller_tree_untouched() {
        let tree = annotated_tree();
        let before = tree.clone();
        let mut tokenizer = HtmlTokenizer::new()
            .with_kill_tags(["b"])
            .with_rename_tags(HashMap::from([("br".to_string(), "hr".to_string())]));
        tokenizer.tokenize_single(&tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_empty_document() {
        let tree = HtmlTree::with_root("p");
        let mut tokenizer = HtmlTokenizer::new();
        let (tokens, tags) = tokenizer.tokenize_single(&tree);
        assert!(tokens.is_empty());
        assert!(tags.is_empty());
    }

    #[test]
    fn test_determinism() {
        let tree = annotated_tree();
        let mut tokenizer = HtmlTokenizer::new();
        let (tokens_a, tags_a) = tokenizer.tokenize_single(&tree);
        let (tokens_b, tags_b) = tokenizer.tokenize_single(&tree);
        let texts_a: Vec<&str> = tokens_a.iter().map(|t| t.token()).collect();
        let texts_b: Vec<&str> = tokens_b.iter().map(|t| t.token()).collect();
        assert_eq!(texts_a, texts_b);
        assert_eq!(tags_a, tags_b);
    }

    #[test]
    fn test_tokenize_corpus() {
        let trees = vec![annotated_tree(), HtmlTree::with_root("div")];
        let mut tokenizer = HtmlTokenizer::new();
        let (token_lists, tag_lists) = tokenizer.tokenize(&trees);
        assert_eq!(token_lists.len(), 2);
        assert_eq!(tag_lists.len(), 2);
        assert_eq!(token_lists[0].len(), 5);
        assert!(token_lists[1].is_empty());
    }
}
