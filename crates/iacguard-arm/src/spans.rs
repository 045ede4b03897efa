//! JSON tree with line positions.
//!
//! Input is validated by `serde_json` first; this walker only recovers where each value sits.

use anyhow::{Context, bail};
use serde_json::Value as JsonValue;

/// `serde_json` refuses deeper documents, so validated input never exceeds this.
const MAX_DEPTH: usize = 128;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Keys keep document order.
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
    Scalar(JsonValue),
}

/// A JSON value and the 1-based lines it spans.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub start_line: u32,
    pub end_line: u32,
}

impl Node {
    /// Object member lookup. ARM property names are case-insensitive.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match &self.kind {
            NodeKind::Object(members) => members
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn get_path(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn members(&self) -> &[(String, Node)] {
        match &self.kind {
            NodeKind::Object(members) => members,
            _ => &[],
        }
    }

    pub fn items(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Array(items) => items,
            _ => &[],
        }
    }

    pub fn as_scalar(&self) -> Option<&JsonValue> {
        match &self.kind {
            NodeKind::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(JsonValue::as_str)
    }

    /// Booleans, plus the `"true"`/`"false"` strings templates sometimes carry.
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_scalar()? {
            JsonValue::Bool(b) => Some(*b),
            JsonValue::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            JsonValue::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.as_scalar()? {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match &self.kind {
            NodeKind::Object(members) => JsonValue::Object(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            NodeKind::Array(items) => JsonValue::Array(items.iter().map(Node::to_json).collect()),
            NodeKind::Scalar(v) => v.clone(),
        }
    }
}

/// Build the positioned tree for `text`, which must already be valid JSON.
pub fn parse(text: &str) -> anyhow::Result<Node> {
    let mut walker = Walker {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        newlines: text
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i)
            .collect(),
    };
    walker.skip_ws();
    let node = walker.value(0)?;
    walker.skip_ws();
    if walker.pos != walker.bytes.len() {
        bail!("trailing characters at byte {}", walker.pos);
    }
    Ok(node)
}

struct Walker<'t> {
    text: &'t str,
    bytes: &'t [u8],
    pos: usize,
    newlines: Vec<usize>,
}

impl Walker<'_> {
    /// 1-based line holding byte `offset`.
    fn line(&self, offset: usize) -> u32 {
        let before = self.newlines.partition_point(|&nl| nl < offset);
        u32::try_from(before + 1).unwrap_or(u32::MAX)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> anyhow::Result<()> {
        if self.peek() != Some(byte) {
            bail!("expected '{}' at byte {}", byte as char, self.pos);
        }
        self.pos += 1;
        Ok(())
    }

    fn node(&self, kind: NodeKind, start: usize) -> Node {
        Node {
            kind,
            start_line: self.line(start),
            end_line: self.line(self.pos.saturating_sub(1)),
        }
    }

    fn value(&mut self, depth: usize) -> anyhow::Result<Node> {
        if depth > MAX_DEPTH {
            bail!("nesting deeper than {MAX_DEPTH}");
        }
        let start = self.pos;
        match self.peek() {
            Some(b'{') => self.object(start, depth),
            Some(b'[') => self.array(start, depth),
            Some(b'"') => {
                let s = self.string()?;
                Ok(self.node(NodeKind::Scalar(JsonValue::String(s)), start))
            }
            Some(_) => {
                while let Some(b) = self.peek() {
                    if matches!(b, b',' | b']' | b'}' | b' ' | b'\t' | b'\n' | b'\r') {
                        break;
                    }
                    self.pos += 1;
                }
                let raw = &self.text[start..self.pos];
                let scalar: JsonValue =
                    serde_json::from_str(raw).with_context(|| format!("scalar at byte {start}"))?;
                Ok(self.node(NodeKind::Scalar(scalar), start))
            }
            None => bail!("unexpected end of input"),
        }
    }

    fn object(&mut self, start: usize, depth: usize) -> anyhow::Result<Node> {
        self.expect(b'{')?;
        let mut members = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(self.node(NodeKind::Object(members), start));
        }
        loop {
            self.skip_ws();
            let key = self.string()?;
            self.skip_ws();
            self.expect(b':')?;
            self.skip_ws();
            let value = self.value(depth + 1)?;
            members.push((key, value));
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(self.node(NodeKind::Object(members), start));
                }
                _ => bail!("expected ',' or '}}' at byte {}", self.pos),
            }
        }
    }

    fn array(&mut self, start: usize, depth: usize) -> anyhow::Result<Node> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(self.node(NodeKind::Array(items), start));
        }
        loop {
            self.skip_ws();
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(self.node(NodeKind::Array(items), start));
                }
                _ => bail!("expected ',' or ']' at byte {}", self.pos),
            }
        }
    }

    fn string(&mut self) -> anyhow::Result<String> {
        let start = self.pos;
        self.expect(b'"')?;
        loop {
            match self.peek() {
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
                None => bail!("unterminated string at byte {start}"),
            }
        }
        let raw = self
            .text
            .get(start..self.pos)
            .with_context(|| format!("string at byte {start}"))?;
        serde_json::from_str(raw).with_context(|| format!("string at byte {start}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_layout() {
        let text = "{\n  \"a\": {\n    \"b\": true\n  },\n  \"c\": [1,\n 2]\n}\n";
        let root = parse(text).expect("parse");
        assert_eq!((root.start_line, root.end_line), (1, 7));

        let a = root.get("a").expect("a");
        assert_eq!((a.start_line, a.end_line), (2, 4));
        let b = a.get("B").expect("case-insensitive");
        assert_eq!((b.start_line, b.end_line), (3, 3));
        assert_eq!(b.as_bool(), Some(true));

        let c = root.get("c").expect("c");
        assert_eq!((c.start_line, c.end_line), (5, 6));
        assert_eq!(c.items()[1].as_i64(), Some(2));
    }

    #[test]
    fn escapes_and_unicode_survive() {
        let root = parse(r#"{"k\"ey": "vé\\", "n": -1.5e3, "z": null}"#).expect("parse");
        assert_eq!(root.get("k\"ey").and_then(Node::as_str), Some("vé\\"));
        assert_eq!(root.to_json()["n"], serde_json::json!(-1500.0));
        assert!(root.get("z").expect("z").as_scalar().expect("scalar").is_null());
    }

    #[test]
    fn to_json_matches_serde() {
        let text = r#"{"a": [1, {"b": "c"}], "d": false}"#;
        let expected: JsonValue = serde_json::from_str(text).expect("serde");
        assert_eq!(parse(text).expect("parse").to_json(), expected);
    }

    #[test]
    fn string_bools_and_ints() {
        let root = parse(r#"{"a": "TRUE", "b": "42", "c": "x"}"#).expect("parse");
        assert_eq!(root.get("a").and_then(Node::as_bool), Some(true));
        assert_eq!(root.get("b").and_then(Node::as_i64), Some(42));
        assert_eq!(root.get("c").and_then(Node::as_bool), None);
    }
}
