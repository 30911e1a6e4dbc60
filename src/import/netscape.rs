//! Netscape bookmark file parser.
//!
//! The format is nested `<DL>` lists whose `<DT>` entries lead either with an
//! `<H3>` heading (a folder whose contents follow in the next `<DL>`) or with an
//! `<A HREF>` anchor (a link). Closing `</DT>` and `<p>` tags are optional and
//! ignored.

use super::markup::{decode_entities, normalize_whitespace, tokenize, Token};
use crate::error::ApiError;
use crate::tree::node::Node;
use crate::types::{generate_node_id, NodeId, ROOT};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Parse a Netscape bookmark document into nodes in document order.
///
/// Folders that would nest deeper than `max_depth`, and folders with an empty
/// heading, are not created: their entries are lifted into the enclosing
/// folder. Anchors with an empty label or without `href` are skipped.
pub fn parse(text: &str, max_depth: usize) -> Result<Vec<Node>, ApiError> {
    let tokens = tokenize(text);
    let start = tokens
        .iter()
        .position(|token| token.is_start("dl"))
        .ok_or_else(|| ApiError::FormatError("no <DL> bookmark list found".to_string()))?;

    let mut parser = Parser {
        tokens,
        pos: start + 1,
        max_depth,
        nodes: Vec::new(),
        ids: HashSet::new(),
        next_order: HashMap::new(),
        skipped: 0,
    };
    parser.run();
    debug!(
        nodes = parser.nodes.len(),
        skipped = parser.skipped,
        "Parsed Netscape bookmark document"
    );
    Ok(parser.nodes)
}

/// One open `<DL>`: the folder its entries land in and that folder's depth
#[derive(Debug, Clone)]
struct Frame {
    parent: NodeId,
    depth: usize,
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    max_depth: usize,
    nodes: Vec<Node>,
    ids: HashSet<NodeId>,
    /// Siblings emitted so far, per parent
    next_order: HashMap<NodeId, i64>,
    skipped: usize,
}

impl<'a> Parser<'a> {
    /// Walk the token stream with an explicit stack of open lists, so nesting
    /// depth in the input never turns into call depth.
    ///
    /// Ends at the `</DL>` closing the top-level list, or at end of input.
    fn run(&mut self) {
        let mut frames = vec![Frame {
            parent: ROOT.to_string(),
            depth: 0,
        }];
        while let Some(token) = self.tokens.get(self.pos) {
            let Some(frame) = frames.last().cloned() else {
                break;
            };
            if token.is_end("dl") {
                self.pos += 1;
                frames.pop();
            } else if token.is_start("dl") {
                // list without a heading: its entries belong to this folder
                self.pos += 1;
                frames.push(frame);
            } else if token.is_start("h3") {
                self.pos += 1;
                let name = self.read_label("h3");
                if let Some(inner) = self.open_folder(&frame, name) {
                    frames.push(inner);
                }
            } else if token.is_start("a") {
                let href = token.attr("href").map(str::trim).unwrap_or_default().to_string();
                self.pos += 1;
                let name = self.read_label("a");
                if name.is_empty() || href.is_empty() {
                    self.skipped += 1;
                    continue;
                }
                let id = self.fresh_id();
                let order = self.take_order(&frame.parent);
                self.nodes
                    .push(Node::link(id, name, href, frame.parent).with_order(order));
            } else {
                self.pos += 1;
            }
        }
    }

    /// Handle a heading. Returns the frame for the list that follows it, if any.
    ///
    /// An empty or too-deep heading creates no folder; its list stays in
    /// `frame`'s folder.
    fn open_folder(&mut self, frame: &Frame, name: String) -> Option<Frame> {
        let has_list = self.nested_list_follows();
        if name.is_empty() || frame.depth + 1 > self.max_depth {
            self.skipped += 1;
            return has_list.then(|| frame.clone());
        }
        let id = self.fresh_id();
        let order = self.take_order(&frame.parent);
        self.nodes
            .push(Node::folder(id.clone(), name, frame.parent.clone()).with_order(order));
        has_list.then(|| Frame {
            parent: id,
            depth: frame.depth + 1,
        })
    }

    fn take_order(&mut self, parent: &str) -> i64 {
        let slot = self.next_order.entry(parent.to_string()).or_insert(0);
        let order = *slot;
        *slot += 1;
        order
    }

    /// After a heading, look for the `<DL>` holding the folder's entries.
    ///
    /// Descriptions (`<DD>`), paragraph tags and whitespace may sit in between;
    /// the next entry or the end of the enclosing list means the folder is
    /// empty. On success the position is just past the `<DL>`.
    fn nested_list_follows(&mut self) -> bool {
        let mut look = self.pos;
        while let Some(token) = self.tokens.get(look) {
            if token.is_start("dl") {
                self.pos = look + 1;
                return true;
            }
            if token.is_start("dt") || token.is_start("h3") || token.is_start("a") || token.is_end("dl")
            {
                return false;
            }
            look += 1;
        }
        false
    }

    /// Text content up to `</tag>`, entity-decoded and whitespace-collapsed.
    ///
    /// Stops early at the start of the next entry so an unclosed label cannot
    /// swallow its siblings.
    fn read_label(&mut self, tag: &str) -> String {
        let mut label = String::new();
        while let Some(token) = self.tokens.get(self.pos) {
            match token {
                Token::Text(text) => label.push_str(&decode_entities(text)),
                Token::End { name } if name == tag => {
                    self.pos += 1;
                    break;
                }
                _ if token.is_start("dt") || token.is_start("dl") || token.is_end("dl") => break,
                _ => {}
            }
            self.pos += 1;
        }
        normalize_whitespace(&label)
    }

    fn fresh_id(&mut self) -> NodeId {
        let ids = &self.ids;
        let id = generate_node_id(|candidate| ids.contains(candidate));
        self.ids.insert(id.clone());
        id
    }
}
