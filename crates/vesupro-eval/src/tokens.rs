//! Token sources for streamed dispatch.

use vesupro_types::{WireKind, WireToken};

/// The two tokenizer operations generated code relies on.
pub trait TokenSource {
    /// Advance to the next token and return its kind. Returns
    /// [`WireKind::End`] once the stream is exhausted.
    fn scan(&mut self) -> WireKind;

    /// Raw text of the token last scanned; empty before the first scan and
    /// after the end.
    fn current_token(&self) -> &str;
}

/// A pre-classified token sequence.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<WireToken>,
    next: usize,
    current: Option<usize>,
}

impl TokenStream {
    pub fn new(tokens: Vec<WireToken>) -> Self {
        Self {
            tokens,
            next: 0,
            current: None,
        }
    }

    /// Tokens not yet scanned.
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.next)
    }
}

impl FromIterator<WireToken> for TokenStream {
    fn from_iter<I: IntoIterator<Item = WireToken>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TokenSource for TokenStream {
    fn scan(&mut self) -> WireKind {
        match self.tokens.get(self.next) {
            Some(token) => {
                self.current = Some(self.next);
                self.next += 1;
                token.kind
            }
            None => {
                self.current = None;
                WireKind::End
            }
        }
    }

    fn current_token(&self) -> &str {
        self.current
            .and_then(|idx| self.tokens.get(idx))
            .map_or("", |token| token.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_until_end() {
        let mut stream: TokenStream = [WireToken::integer("10"), WireToken::separator()]
            .into_iter()
            .collect();
        assert_eq!(stream.current_token(), "");
        assert_eq!(stream.scan(), WireKind::Integer);
        assert_eq!(stream.current_token(), "10");
        assert_eq!(stream.remaining(), 1);
        assert_eq!(stream.scan(), WireKind::Separator);
        assert_eq!(stream.scan(), WireKind::End);
        assert_eq!(stream.scan(), WireKind::End);
        assert_eq!(stream.current_token(), "");
        assert_eq!(stream.remaining(), 0);
    }
}
