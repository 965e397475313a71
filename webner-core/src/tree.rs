//! # Árvore de Elementos HTML
//!
//! Representação em memória da árvore HTML que o tokenizador percorre.
//! O parsing do HTML em si fica fora deste crate (é responsabilidade dos
//! loaders); aqui definimos apenas a estrutura que eles produzem.
//!
//! ## Modelo texto/cauda
//!
//! Seguimos o modelo clássico de árvores com texto misto: cada elemento
//! carrega o texto que aparece logo após sua tag de abertura (`text`) e o
//! texto que aparece logo após sua tag de fechamento (`tail`). Assim,
//! `<p>a <b>b</b> c</p>` vira `p{text: "a "}` com filho `b{text: "b", tail: " c"}`.
//!
//! ## Arena de nós
//!
//! Os nós vivem num `Vec` e se referenciam por índice ([`NodeId`]). Isso
//! permite que múltiplos tokens apontem para seus elementos de origem sem
//! disputa de ownership, e torna a cópia defensiva da árvore um simples
//! `Clone`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identificador de um nó dentro da arena da árvore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Um elemento HTML com seu texto de cabeça e de cauda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Nome da tag (ex: "p", "div", "strong").
    pub tag: String,
    /// Texto entre a tag de abertura e o primeiro filho.
    pub text: String,
    /// Texto entre a tag de fechamento deste elemento e o próximo irmão.
    pub tail: String,
    /// Nó pai (`None` apenas para a raiz).
    pub parent: Option<NodeId>,
    /// Filhos em ordem de documento.
    pub children: Vec<NodeId>,
}

impl Element {
    fn new(tag: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            tail: String::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// Árvore HTML baseada em arena. O nó 0 é sempre a raiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlTree {
    nodes: Vec<Element>,
}

impl HtmlTree {
    /// Cria uma árvore contendo apenas o elemento raiz com a tag dada.
    pub fn with_root(tag: impl Into<String>) -> Self {
        Self {
            nodes: vec![Element::new(tag, None)],
        }
    }

    /// O nó raiz da árvore.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Acessa um elemento pelo id.
    pub fn get(&self, id: NodeId) -> &Element {
        &self.nodes[id.0]
    }

    /// Acessa um elemento mutável pelo id.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.0]
    }

    /// Número de nós na arena (inclui nós destacados por `kill_tags`).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Anexa um novo filho ao final da lista de filhos de `parent`.
    pub fn add_child(&mut self, parent: NodeId, tag: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element::new(tag, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Define o texto de cabeça de um elemento.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.nodes[id.0].text = text.into();
    }

    /// Define o texto de cauda de um elemento.
    pub fn set_tail(&mut self, id: NodeId, tail: impl Into<String>) {
        self.nodes[id.0].tail = tail.into();
    }

    /// Remove da árvore todos os elementos com as tags dadas, preservando
    /// filhos e fluxo de texto.
    ///
    /// O texto de cabeça do elemento removido é emendado no texto que o
    /// precede (cauda do irmão anterior, ou texto de cabeça do pai); os
    /// filhos sobem para a posição do elemento no pai; a cauda do elemento
    /// é emendada na cauda do último filho promovido (ou no mesmo lugar do
    /// texto de cabeça, se não houver filhos).
    ///
    /// Tags ausentes na árvore são simplesmente ignoradas; a raiz nunca é
    /// removida.
    pub fn kill_tags(&mut self, tags: &[&str]) {
        // Filhos de um nó removido também podem ser removíveis, então
        // repetimos até não haver mais candidatos alcançáveis.
        loop {
            let victim = self.find_reachable(|elem| tags.contains(&elem.tag.as_str()));
            match victim {
                Some(id) if id != self.root() => self.drop_node(id),
                _ => break,
            }
        }
    }

    /// Renomeia tags conforme o mapeamento (ex: `{"b": "strong"}`).
    /// Tags de origem ausentes são ignoradas.
    pub fn rename_tags(&mut self, mapping: &HashMap<String, String>) {
        for elem in &mut self.nodes {
            if let Some(new_tag) = mapping.get(&elem.tag) {
                elem.tag = new_tag.clone();
            }
        }
    }

    /// Procura, em ordem de documento, o primeiro nó alcançável a partir da
    /// raiz que satisfaz o predicado (a raiz não conta).
    fn find_reachable(&self, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.get(self.root()).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if pred(self.get(id)) {
                return Some(id);
            }
            stack.extend(self.get(id).children.iter().rev().copied());
        }
        None
    }

    /// Destaca `id` da árvore promovendo seus filhos e emendando os textos.
    /// O nó fica órfão na arena (ids nunca são invalidados).
    fn drop_node(&mut self, id: NodeId) {
        let parent = match self.get(id).parent {
            Some(p) => p,
            None => return,
        };
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == id)
            .unwrap_or(0);

        let node = self.nodes[id.0].clone();

        // 1. Texto de cabeça vai para o texto que precede o nó.
        if !node.text.is_empty() {
            match pos.checked_sub(1).map(|i| self.nodes[parent.0].children[i]) {
                Some(prev) => self.nodes[prev.0].tail.push_str(&node.text),
                None => self.nodes[parent.0].text.push_str(&node.text),
            }
        }

        // 2. Filhos sobem para a posição do nó no pai.
        self.nodes[parent.0]
            .children
            .splice(pos..=pos, node.children.iter().copied());
        for &child in &node.children {
            self.nodes[child.0].parent = Some(parent);
        }

        // 3. Cauda vai para a cauda do último filho promovido, ou para o
        // mesmo destino do texto de cabeça.
        if !node.tail.is_empty() {
            match node.children.last() {
                Some(&last) => self.nodes[last.0].tail.push_str(&node.tail),
                None => match pos.checked_sub(1).map(|i| self.nodes[parent.0].children[i]) {
                    Some(prev) => self.nodes[prev.0].tail.push_str(&node.tail),
                    None => self.nodes[parent.0].text.push_str(&node.tail),
                },
            }
        }

        let orphan = &mut self.nodes[id.0];
        orphan.parent = None;
        orphan.children.clear();
        orphan.text.clear();
        orphan.tail.clear();
    }
}
