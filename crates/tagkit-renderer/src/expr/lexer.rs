//! Tokenizer for directive expressions.

use super::ExprError;

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    Dot,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Question,
    Colon,
}

impl Token {
    pub(super) fn describe(&self) -> String {
        match self {
            Self::Ident(name) => name.clone(),
            Self::Number(n) => n.to_string(),
            Self::Str(s) => format!("'{s}'"),
            Self::Dot => ".".to_owned(),
            Self::LBracket => "[".to_owned(),
            Self::RBracket => "]".to_owned(),
            Self::LParen => "(".to_owned(),
            Self::RParen => ")".to_owned(),
            Self::Bang => "!".to_owned(),
            Self::AndAnd => "&&".to_owned(),
            Self::OrOr => "||".to_owned(),
            Self::EqEq => "==".to_owned(),
            Self::NotEq => "!=".to_owned(),
            Self::Lt => "<".to_owned(),
            Self::Le => "<=".to_owned(),
            Self::Gt => ">".to_owned(),
            Self::Ge => ">=".to_owned(),
            Self::Question => "?".to_owned(),
            Self::Colon => ":".to_owned(),
        }
    }
}

/// Token with its byte position in the expression.
pub(super) type Spanned = (Token, usize);

pub(super) fn tokenize(input: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let mut ident = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push((Token::Ident(ident), pos));
            continue;
        }

        if ch.is_ascii_digit() {
            let mut literal = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    literal.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let number = literal
                .parse::<f64>()
                .map_err(|_| ExprError::InvalidNumber { literal, pos })?;
            tokens.push((Token::Number(number), pos));
            continue;
        }

        if ch == '\'' || ch == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            for (_, c) in chars.by_ref() {
                if c == ch {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                return Err(ExprError::UnterminatedString { pos });
            }
            tokens.push((Token::Str(value), pos));
            continue;
        }

        chars.next();
        let next = chars.peek().map(|&(_, c)| c);
        let (token, double) = match (ch, next) {
            ('&', Some('&')) => (Token::AndAnd, true),
            ('|', Some('|')) => (Token::OrOr, true),
            ('=', Some('=')) => (Token::EqEq, true),
            ('!', Some('=')) => (Token::NotEq, true),
            ('<', Some('=')) => (Token::Le, true),
            ('>', Some('=')) => (Token::Ge, true),
            ('!', _) => (Token::Bang, false),
            ('<', _) => (Token::Lt, false),
            ('>', _) => (Token::Gt, false),
            ('.', _) => (Token::Dot, false),
            ('[', _) => (Token::LBracket, false),
            (']', _) => (Token::RBracket, false),
            ('(', _) => (Token::LParen, false),
            (')', _) => (Token::RParen, false),
            ('?', _) => (Token::Question, false),
            (':', _) => (Token::Colon, false),
            _ => return Err(ExprError::UnexpectedChar { ch, pos }),
        };
        if double {
            chars.next();
        }
        tokens.push((token, pos));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenize_path() {
        assert_eq!(
            kinds("User.Identity.IsAuthenticated"),
            vec![
                Token::Ident("User".to_owned()),
                Token::Dot,
                Token::Ident("Identity".to_owned()),
                Token::Dot,
                Token::Ident("IsAuthenticated".to_owned()),
            ]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("a==1 && !b || c!=2 <= >= < >"),
            vec![
                Token::Ident("a".to_owned()),
                Token::EqEq,
                Token::Number(1.0),
                Token::AndAnd,
                Token::Bang,
                Token::Ident("b".to_owned()),
                Token::OrOr,
                Token::Ident("c".to_owned()),
                Token::NotEq,
                Token::Number(2.0),
                Token::Le,
                Token::Ge,
                Token::Lt,
                Token::Gt,
            ]
        );
    }

    #[test]
    fn test_tokenize_strings() {
        assert_eq!(
            kinds(r#"'a b' "c""#),
            vec![Token::Str("a b".to_owned()), Token::Str("c".to_owned())]
        );
    }

    #[test]
    fn test_tokenize_positions() {
        let tokens = tokenize("a  == b").unwrap();
        let positions: Vec<_> = tokens.iter().map(|(_, p)| *p).collect();
        assert_eq!(positions, vec![0, 3, 6]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            tokenize("'abc"),
            Err(ExprError::UnterminatedString { pos: 0 })
        );
    }

    #[test]
    fn test_unexpected_char() {
        assert_eq!(
            tokenize("a # b"),
            Err(ExprError::UnexpectedChar { ch: '#', pos: 2 })
        );
    }

    #[test]
    fn test_single_ampersand_is_rejected() {
        assert_eq!(
            tokenize("a & b"),
            Err(ExprError::UnexpectedChar { ch: '&', pos: 2 })
        );
    }

    #[test]
    fn test_invalid_number() {
        assert!(matches!(
            tokenize("1.2.3"),
            Err(ExprError::InvalidNumber { .. })
        ));
    }
}
