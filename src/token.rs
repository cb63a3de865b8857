//! Token escaping for the BODY and HEAD sections.
//!
//! Three characters are structural in the artifact and can never appear
//! literally in a token stream: `@` introduces dictionary references,
//! `/` delimits matrix literals and header fields, and newline separates
//! the three sections. Each is escaped to a fixed 3-digit code:
//!
//! | char | code   |
//! |------|--------|
//! | `@`  | `@000` |
//! | `\n` | `@999` |
//! | `/`  | `@998` |
//!
//! The codes 000/998/999 are reserved: dictionary ranks only ever use
//! 001–997, so a 3-digit sequence after `@` is always unambiguous once
//! dictionary references have been resolved.

/// One of the three reserved escape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EscapeCode {
    At,
    Slash,
    Newline,
}

impl EscapeCode {
    /// The three digits following `@` in the escaped form.
    pub fn digits(self) -> &'static str {
        match self {
            EscapeCode::At => "000",
            EscapeCode::Slash => "998",
            EscapeCode::Newline => "999",
        }
    }

    /// Full escaped form, e.g. `@998`.
    pub fn text(self) -> &'static str {
        match self {
            EscapeCode::At => "@000",
            EscapeCode::Slash => "@998",
            EscapeCode::Newline => "@999",
        }
    }

    /// The character this code stands for.
    pub fn literal(self) -> char {
        match self {
            EscapeCode::At => '@',
            EscapeCode::Slash => '/',
            EscapeCode::Newline => '\n',
        }
    }
}

/// True if `digits` is one of the three reserved codes.
pub fn is_reserved_code(digits: &str) -> bool {
    matches!(digits, "000" | "998" | "999")
}

/// One element of the escaped token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(char),
    Escaped(EscapeCode),
}

impl Token {
    pub fn push_text(&self, out: &mut String) {
        match self {
            Token::Literal(c) => out.push(*c),
            Token::Escaped(code) => out.push_str(code.text()),
        }
    }

    pub fn text(&self) -> String {
        let mut s = String::new();
        self.push_text(&mut s);
        s
    }
}

/// Escape a string into the token stream the pipeline scans.
pub fn escape(text: &str) -> Vec<Token> {
    text.chars()
        .map(|c| match c {
            '@' => Token::Escaped(EscapeCode::At),
            '\n' => Token::Escaped(EscapeCode::Newline),
            '/' => Token::Escaped(EscapeCode::Slash),
            other => Token::Literal(other),
        })
        .collect()
}

/// Resolve every remaining `@NNN` escape to its literal character.
///
/// This is the last decode pass: by the time it runs, dictionary
/// references have already been substituted, so any 3-digit sequence
/// after `@` is an escape. `000` and `998` map to `@` and `/`; every
/// other numeric code maps to newline.
pub fn resolve_escapes(body: &str) -> String {
    let bytes = body.as_bytes();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'@'
            && i + 4 <= bytes.len()
            && bytes[i + 1..i + 4].iter().all(u8::is_ascii_digit)
        {
            match &body[i + 1..i + 4] {
                "000" => out.push('@'),
                "998" => out.push('/'),
                _ => out.push('\n'),
            }
            i += 4;
        } else {
            // Body text is ASCII throughout, single-byte advance is safe.
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_marks_reserved_chars() {
        let tokens = escape("a@b/c\nd");
        let texts: Vec<String> = tokens.iter().map(Token::text).collect();
        assert_eq!(texts, vec!["a", "@000", "b", "@998", "c", "@999", "d"]);
    }

    #[test]
    fn escape_then_resolve_is_identity() {
        let input = "plain text with @ and / and\nnewlines, plus @@//";
        let stream: String = escape(input).iter().map(Token::text).collect();
        assert_eq!(resolve_escapes(&stream), input);
    }

    #[test]
    fn resolve_leaves_short_at_runs_alone() {
        assert_eq!(resolve_escapes("@12"), "@12");
        assert_eq!(resolve_escapes("x@"), "x@");
    }

    #[test]
    fn reserved_codes_are_exactly_three() {
        assert!(is_reserved_code("000"));
        assert!(is_reserved_code("998"));
        assert!(is_reserved_code("999"));
        assert!(!is_reserved_code("001"));
        assert!(!is_reserved_code("997"));
    }
}
