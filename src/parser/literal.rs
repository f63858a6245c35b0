//! Reader for the small subset of Python literal syntax the flow emits:
//! nested lists and tuples of quoted strings and numbers.

use std::iter::Peekable;
use std::str::Chars;

/// Deepest list/tuple nesting the reader accepts
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    Str(String),
    /// Number, `True`, `False` or `None`, kept as written
    Scalar(String),
    /// A list or a tuple
    Seq(Vec<Literal>),
}

impl Literal {
    pub(crate) fn as_text(&self) -> Option<String> {
        match self {
            Literal::Str(s) | Literal::Scalar(s) => Some(s.clone()),
            Literal::Seq(_) => None,
        }
    }
}

pub(crate) fn parse_literal(input: &str) -> Result<Literal, String> {
    let mut reader = LiteralReader {
        chars: input.chars().peekable(),
        depth: 0,
    };
    let value = reader.value()?;
    reader.skip_whitespace();
    match reader.chars.next() {
        None => Ok(value),
        Some(c) => Err(format!("unexpected trailing '{}'", c)),
    }
}

struct LiteralReader<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl LiteralReader<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn value(&mut self) -> Result<Literal, String> {
        self.skip_whitespace();
        match self.chars.peek().copied() {
            Some('[') => {
                self.chars.next();
                self.sequence(']')
            }
            Some('(') => {
                self.chars.next();
                self.sequence(')')
            }
            Some(quote @ ('\'' | '"')) => {
                self.chars.next();
                self.string(quote)
            }
            Some(_) => self.scalar(),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn sequence(&mut self, close: char) -> Result<Literal, String> {
        if self.depth >= MAX_DEPTH {
            return Err("nesting too deep".to_string());
        }
        self.depth += 1;
        let result = self.items(close);
        self.depth -= 1;
        result
    }

    fn items(&mut self, close: char) -> Result<Literal, String> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some(&c) if c == close => {
                    self.chars.next();
                    return Ok(Literal::Seq(items));
                }
                None => return Err(format!("missing closing '{}'", close)),
                _ => {}
            }

            items.push(self.value()?);

            self.skip_whitespace();
            match self.chars.next() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(Literal::Seq(items)),
                Some(c) => return Err(format!("unexpected '{}' in sequence", c)),
                None => return Err(format!("missing closing '{}'", close)),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<Literal, String> {
        let mut out = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(escaped) => out.push(escaped),
                    None => break,
                },
                c if c == quote => return Ok(Literal::Str(out)),
                c => out.push(c),
            }
        }
        Err("unterminated string".to_string())
    }

    fn scalar(&mut self) -> Result<Literal, String> {
        let mut token = String::new();
        while let Some(c) = self.chars.next_if(|c| !matches!(c, ',' | ']' | ')')) {
            token.push(c);
        }
        let token = token.trim();

        let is_constant = matches!(token, "True" | "False" | "None");
        if is_constant || token.parse::<f64>().is_ok() {
            Ok(Literal::Scalar(token.to_string()))
        } else {
            Err(format!("unquoted value {:?}", token))
        }
    }
}
