/// A byte scanner over markup source with position tracking.
///
/// Delimiters are all ASCII, so every position the scanner stops at on a
/// delimiter is also a valid `char` boundary for slicing.
#[derive(Clone)]
pub struct Scanner<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Current byte position.
    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Peeks `n` bytes ahead of the current one.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i..].starts_with(pat)
    }

    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.s.len());
    }

    /// Consumes bytes while `pred` holds and returns them.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.i;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.i += 1;
        }
        &self.s[start..self.i]
    }

    pub fn skip_whitespace(&mut self) {
        self.eat_while(|b| b.is_ascii_whitespace());
    }

    /// Consumes up to and including `pat`, returning what came before it.
    /// Leaves the scanner untouched when `pat` never occurs.
    pub fn take_until(&mut self, pat: &str) -> Option<&'a str> {
        let rest = &self.s[self.i..];
        let found = rest.find(pat)?;
        let taken = &rest[..found];
        self.i += found + pat.len();
        Some(taken)
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.s[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_basics() {
        let mut sc = Scanner::new("<b>");
        assert_eq!(sc.pos(), 0);
        assert_eq!(sc.peek(), Some(b'<'));
        assert_eq!(sc.peek_at(1), Some(b'b'));
        assert_eq!(sc.bump(), Some(b'<'));
        assert_eq!(sc.eat_while(|b| b.is_ascii_alphabetic()), "b");
        assert!(sc.starts_with(b">"));
        sc.bump_n(5);
        assert!(sc.eof());
        assert_eq!(sc.bump(), None);
    }

    #[test]
    fn take_until_consumes_pattern() {
        let mut sc = Scanner::new("a comment --> rest");
        assert_eq!(sc.take_until("-->"), Some("a comment "));
        assert_eq!(sc.slice(sc.pos(), sc.pos() + 5), " rest");
    }

    #[test]
    fn take_until_missing_pattern_leaves_position() {
        let mut sc = Scanner::new("abc");
        sc.bump();
        assert_eq!(sc.take_until("zz"), None);
        assert_eq!(sc.pos(), 1);
    }

    #[test]
    fn eat_while_stops_before_multibyte() {
        let mut sc = Scanner::new("abé");
        assert_eq!(sc.eat_while(|b| b.is_ascii_alphanumeric()), "ab");
        assert_eq!(sc.pos(), 2);
    }
}
