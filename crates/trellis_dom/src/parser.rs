//! Minimal markup parser.
//!
//! Parses a markup string into a fragment of the arena tree. The grammar
//! is the subset the template runtime emits: elements with double-quoted,
//! single-quoted or unquoted attributes, self-closing and void elements,
//! comments, and verbatim text. Entities are not decoded; text round-trips
//! byte-exact. Stray close tags are ignored.

use tracing::debug;

use crate::arena::{NodeId, Tree};
use crate::error::{DomError, DomResult};

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Whether a tag never takes children.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| tag.eq_ignore_ascii_case(v))
}

impl Tree {
    /// Parse a markup string into this tree, returning the fragment that
    /// contains the parsed nodes.
    pub fn parse_into(&mut self, markup: &str) -> DomResult<NodeId> {
        let fragment = self.create_fragment();
        let mut parser = Parser {
            input: markup,
            pos: 0,
        };
        parser.parse(self, fragment)?;
        debug!(len = markup.len(), "parsed markup fragment");
        Ok(fragment)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn parse(&mut self, tree: &mut Tree, fragment: NodeId) -> DomResult<()> {
        // Stack of open elements; the innermost is the insertion point.
        let mut open: Vec<NodeId> = vec![fragment];

        while self.pos < self.input.len() {
            if self.rest().starts_with("<!--") {
                self.pos += 4;
                let end = self
                    .rest()
                    .find("-->")
                    .ok_or_else(|| DomError::Parse("unterminated comment".to_string()))?;
                let text = &self.rest()[..end];
                let comment = tree.create_comment(text);
                tree.append_child(*open.last().unwrap(), comment);
                self.pos += end + 3;
            } else if self.rest().starts_with("</") {
                self.pos += 2;
                let tag = self.read_tag_name();
                while self.peek().is_some_and(|c| c != '>') {
                    self.bump();
                }
                self.bump();
                // Pop to the matching open element; ignore stray closes.
                if let Some(depth) = open
                    .iter()
                    .rposition(|&id| tree.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(&tag)))
                {
                    open.truncate(depth);
                }
            } else if self.starts_open_tag() {
                self.pos += 1;
                let tag = self.read_tag_name();
                let element = tree.create_element(tag.clone());
                self.parse_attributes(tree, element)?;
                let self_closed = self.eat("/>");
                if !self_closed && !self.eat(">") {
                    return Err(DomError::Parse(format!("unterminated tag <{tag}")));
                }
                tree.append_child(*open.last().unwrap(), element);
                if !self_closed && !is_void_element(&tag) {
                    open.push(element);
                }
            } else {
                self.parse_text(tree, *open.last().unwrap());
            }
        }
        Ok(())
    }

    fn starts_open_tag(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn read_tag_name(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attributes(&mut self, tree: &mut Tree, element: NodeId) -> DomResult<()> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(DomError::Parse("unterminated tag".to_string())),
                Some('>') => return Ok(()),
                Some('/') if self.rest().starts_with("/>") => return Ok(()),
                _ => {}
            }
            let start = self.pos;
            while self
                .peek()
                .is_some_and(|c| !c.is_whitespace() && c != '=' && c != '>' && c != '/')
            {
                self.bump();
            }
            let name = self.input[start..self.pos].to_string();
            if name.is_empty() {
                // Lone '/' not followed by '>'; skip it.
                self.bump();
                continue;
            }
            self.skip_whitespace();
            let value = if self.eat("=") {
                self.skip_whitespace();
                self.read_attribute_value()?
            } else {
                String::new()
            };
            tree.set_attribute(element, name, value);
        }
    }

    fn read_attribute_value(&mut self) -> DomResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.bump();
                }
                let value = self.input[start..self.pos].to_string();
                if self.bump().is_none() {
                    return Err(DomError::Parse("unterminated attribute value".to_string()));
                }
                Ok(value)
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| !c.is_whitespace() && c != '>' && c != '/')
                {
                    self.bump();
                }
                Ok(self.input[start..self.pos].to_string())
            }
        }
    }

    fn parse_text(&mut self, tree: &mut Tree, parent: NodeId) {
        let start = self.pos;
        // Consume at least one char so a stray '<' becomes text.
        self.bump();
        while let Some(c) = self.peek() {
            if c == '<'
                && (self.starts_open_tag()
                    || self.rest().starts_with("</")
                    || self.rest().starts_with("<!--"))
            {
                break;
            }
            self.bump();
        }
        let text = tree.create_text(&self.input[start..self.pos]);
        tree.append_child(parent, text);
    }
}
