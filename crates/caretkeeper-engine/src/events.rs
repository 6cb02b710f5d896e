//! Input signals delivered by the host.

/// A key-down, named the way browsers name them: `key` is the produced
/// value (`"a"`, `"Enter"`, `"ArrowLeft"`), `code` the physical key
/// (`"KeyA"`, `"Digit1"`, `"Enter"`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub key: String,
    pub code: String,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    /// A named key whose `code` equals its `key` (`Enter`, `Backspace`,
    /// arrows).
    pub fn named(key: &str) -> Self {
        Self::new(key, key)
    }

    /// The key-down for typing `c` on a US layout.
    pub fn for_char(c: char) -> Self {
        let code = if c.is_ascii_alphabetic() {
            format!("Key{}", c.to_ascii_uppercase())
        } else if c.is_ascii_digit() {
            format!("Digit{c}")
        } else if c == ' ' {
            "Space".to_string()
        } else {
            String::new()
        };
        let mut event = Self::new(c.to_string(), code);
        event.shift = c.is_uppercase();
        event
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Ctrl or Cmd held.
    pub fn is_chorded(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A `beforeinput` signal: the text about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputEvent {
    pub data: String,
    pub is_composing: bool,
}

impl InputEvent {
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            is_composing: false,
        }
    }

    pub fn composing(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            is_composing: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_codes_follow_physical_keys() {
        assert_eq!(KeyEvent::for_char('a').code, "KeyA");
        assert_eq!(KeyEvent::for_char('7').code, "Digit7");
        assert_eq!(KeyEvent::for_char(' ').code, "Space");
        assert!(KeyEvent::for_char('Q').shift);
        assert!(KeyEvent::named("Enter").with_meta().is_chorded());
    }
}
