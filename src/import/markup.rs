//! Lenient tag-soup tokenizer for bookmark exports and fetched pages.
//!
//! Never fails: unterminated tags run to the end of input, stray `<` is kept as
//! text, comments and doctypes are dropped. Tag and attribute names are
//! lowercased; attribute values and text are entity-decoded on demand.

/// One lexical item of a markup document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Text(&'a str),
}

impl<'a> Token<'a> {
    pub fn is_start(&self, tag: &str) -> bool {
        matches!(self, Token::Start { name, .. } if name == tag)
    }

    pub fn is_end(&self, tag: &str) -> bool {
        matches!(self, Token::End { name } if name == tag)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::Start { attrs, .. } => attrs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }
}

/// Split `input` into tokens
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }
        let next = bytes.get(pos + 1).copied();
        let end = if input[pos..].starts_with("<!--") {
            let end = input[pos + 4..]
                .find("-->")
                .map(|i| pos + 4 + i + 3)
                .unwrap_or(bytes.len());
            Some((end, None))
        } else {
            match next {
                Some(b'!') | Some(b'?') => Some((skip_past(bytes, pos, b'>'), None)),
                Some(b'/') => read_end_tag(input, pos).map(|(end, token)| (end, Some(token))),
                Some(c) if c.is_ascii_alphabetic() => {
                    let (end, token) = read_start_tag(input, pos);
                    Some((end, Some(token)))
                }
                _ => None,
            }
        };
        match end {
            Some((end, token)) => {
                push_text(&mut tokens, &input[text_start..pos]);
                if let Some(token) = token {
                    tokens.push(token);
                }
                pos = end;
                text_start = end;
            }
            None => pos += 1,
        }
    }
    push_text(&mut tokens, &input[text_start..]);
    tokens
}

fn push_text<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
}

/// Index just past the next `delim` at or after `from`, or end of input
fn skip_past(bytes: &[u8], from: usize, delim: u8) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == delim)
        .map(|i| from + i + 1)
        .unwrap_or(bytes.len())
}

fn read_name(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'-') {
        pos += 1;
    }
    pos
}

fn read_end_tag(input: &str, start: usize) -> Option<(usize, Token<'_>)> {
    let bytes = input.as_bytes();
    let name_start = start + 2;
    let name_end = read_name(bytes, name_start);
    if name_end == name_start {
        return None;
    }
    let name = input[name_start..name_end].to_ascii_lowercase();
    Some((skip_past(bytes, name_end, b'>'), Token::End { name }))
}

fn read_start_tag(input: &str, start: usize) -> (usize, Token<'_>) {
    let bytes = input.as_bytes();
    let name_end = read_name(bytes, start + 1);
    let name = input[start + 1..name_end].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut pos = name_end;

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        match bytes.get(pos) {
            None => break,
            Some(b'>') => {
                pos += 1;
                break;
            }
            Some(b'/') => {
                pos += 1;
                continue;
            }
            _ => {}
        }
        let attr_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        let attr_name = input[attr_start..pos].to_ascii_lowercase();
        if attr_name.is_empty() {
            pos += 1;
            continue;
        }
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let mut value = String::new();
        if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            match bytes.get(pos) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = pos + 1;
                    let value_end = bytes[value_start..]
                        .iter()
                        .position(|&b| b == quote)
                        .map(|i| value_start + i)
                        .unwrap_or(bytes.len());
                    value = decode_entities(&input[value_start..value_end]);
                    pos = (value_end + 1).min(bytes.len());
                }
                _ => {
                    let value_start = pos;
                    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>'
                    {
                        pos += 1;
                    }
                    value = decode_entities(&input[value_start..pos]);
                }
            }
        }
        attrs.push((attr_name, value));
    }

    (pos, Token::Start { name, attrs })
}

/// Decode the character references that show up in bookmark exports
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            decode_entity(entity).map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Collapse runs of whitespace to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first `<title>` element, if any
pub fn extract_title(html: &str) -> Option<String> {
    let tokens = tokenize(html);
    let start = tokens.iter().position(|t| t.is_start("title"))?;
    let mut title = String::new();
    for token in &tokens[start + 1..] {
        match token {
            Token::Text(text) => title.push_str(&decode_entities(text)),
            _ => break,
        }
    }
    let title = normalize_whitespace(&title);
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
