// [libs/core/keyspace/src/mask.rs]
//! Hashcat mask tokenizer: turns a mask string like `?u?l?l?d?d?d?d` into a
//! sequence of per-position charset sizes. Only the tokenizing/sizing half
//! of mask syntax is implemented; nothing here ever generates candidates.

use crate::{CustomCharsets, KeyspaceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Literal,
    Lower,
    Upper,
    Digit,
    Special,
    All,
    Byte,
    Custom(u8),
}

impl Token {
    pub(crate) fn charset_size(self, charsets: &CustomCharsets) -> Result<u128, KeyspaceError> {
        Ok(match self {
            Token::Literal => 1,
            Token::Lower => 26,
            Token::Upper => 26,
            Token::Digit => 10,
            // hashcat's ?s: the 33 printable ASCII symbols outside l/u/d.
            Token::Special => 33,
            Token::All => 95,
            Token::Byte => 256,
            Token::Custom(n) => {
                let set = charsets
                    .slot(n)
                    .ok_or(KeyspaceError::UnknownCustomCharset(n))?;
                set.chars().count() as u128
            }
        })
    }
}

/// Parses a mask into its position tokens. `??` is an escaped literal `?`;
/// any other `?x` with `x` not in `lud sab1234` is an error.
pub(crate) fn parse(pattern: &str) -> Result<Vec<Token>, KeyspaceError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '?' {
            let next = chars.get(i + 1).copied().ok_or_else(|| KeyspaceError::InvalidMask {
                mask: pattern.to_string(),
                reason: "trailing '?' with no charset selector".to_string(),
            })?;
            let token = match next {
                'l' => Token::Lower,
                'u' => Token::Upper,
                'd' => Token::Digit,
                's' => Token::Special,
                'a' => Token::All,
                'b' => Token::Byte,
                '?' => Token::Literal,
                '1' => Token::Custom(1),
                '2' => Token::Custom(2),
                '3' => Token::Custom(3),
                '4' => Token::Custom(4),
                other => {
                    return Err(KeyspaceError::InvalidMask {
                        mask: pattern.to_string(),
                        reason: format!("unknown charset selector '?{other}'"),
                    })
                }
            };
            tokens.push(token);
            i += 2;
        } else {
            tokens.push(Token::Literal);
            i += 1;
        }
    }
    Ok(tokens)
}

/// Number of candidate positions in a mask, after resolving escapes —
/// used by the increment range bound check.
pub fn mask_token_count(pattern: &str) -> Result<usize, KeyspaceError> {
    Ok(parse(pattern)?.len())
}

/// Charset size of the token at `position` (0-indexed), resolving custom
/// charset slots against `charsets`.
pub fn charset_size_at(pattern: &str, position: usize, charsets: &CustomCharsets) -> Result<u128, KeyspaceError> {
    let tokens = parse(pattern)?;
    let token = tokens.get(position).ok_or_else(|| KeyspaceError::InvalidMask {
        mask: pattern.to_string(),
        reason: format!("position {position} is out of range"),
    })?;
    token.charset_size(charsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_question_mark_is_literal() {
        let tokens = parse("pass??").unwrap();
        assert_eq!(tokens.len(), 5);
        assert!(tokens.iter().all(|t| *t == Token::Literal));
    }

    #[test]
    fn unknown_selector_errors() {
        assert!(parse("?x").is_err());
    }

    #[test]
    fn trailing_question_mark_errors() {
        assert!(parse("abc?").is_err());
    }
}
