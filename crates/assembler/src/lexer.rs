//! Tokenizer for TinyVM assembly text.

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// A mnemonic, method name or label reference. Case is preserved.
    Ident(String),
    /// A numeric literal (decimal or hex, optionally negative).
    Number(i64),
    /// A directive such as `.method`, lowercased and without the dot.
    Directive(String),
    /// A label definition, without the trailing colon.
    Label(String),
}

impl Token {
    /// The token as it would appear in source, for error messages.
    pub(crate) fn text(&self) -> String {
        match self {
            Token::Ident(s) => s.clone(),
            Token::Number(n) => n.to_string(),
            Token::Directive(d) => format!(".{d}"),
            Token::Label(l) => format!("{l}:"),
        }
    }
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let mut tokens = Vec::new();
    for word in line.split_whitespace() {
        let token = if looks_numeric(word) {
            Token::Number(parse_number(word).ok_or_else(|| AsmError::InvalidNumber {
                line: line_num,
                token: word.to_string(),
            })?)
        } else if let Some(directive) = word.strip_prefix('.') {
            Token::Directive(directive.to_ascii_lowercase())
        } else if let Some(label) = word.strip_suffix(':').filter(|l| !l.is_empty()) {
            Token::Label(label.to_string())
        } else {
            Token::Ident(word.to_string())
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn looks_numeric(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    digits.as_bytes().first().is_some_and(|b| b.is_ascii_digit())
}

fn parse_number(word: &str) -> Option<i64> {
    let (negative, digits) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) if hex.starts_with(['+', '-']) => return None,
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}
