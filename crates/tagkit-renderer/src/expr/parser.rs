//! Recursive-descent parser producing an expression tree.
//!
//! Precedence, lowest first: `?:`, `||`, `&&`, `==` `!=`,
//! `<` `<=` `>` `>=`, unary `!`.

use serde_json::{Number, Value};

use super::ExprError;
use super::lexer::{Spanned, Token, tokenize};

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Segment {
    Field(String),
    Index(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum BinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub(super) fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(super) enum Expr {
    Literal(Value),
    Path { root: String, segments: Vec<Segment> },
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// Deepest nesting of `!`, parentheses, `?:` branches and chained binary
/// operators. Parsing and evaluation both recurse once per level.
pub(super) const MAX_NESTING_DEPTH: usize = 128;

pub(super) fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.ternary()?;

    if let Some((token, pos)) = parser.tokens.get(parser.pos) {
        return Err(ExprError::UnexpectedToken {
            found: token.describe(),
            pos: *pos,
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Enter one nesting level; callers restore `depth` when done.
    fn descend(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ExprError::TooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExprError> {
        match self.advance() {
            Some((token, _)) if &token == expected => Ok(()),
            Some((token, pos)) => Err(ExprError::UnexpectedToken {
                found: token.describe(),
                pos,
            }),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn ternary(&mut self) -> Result<Expr, ExprError> {
        let condition = self.or()?;
        if !self.eat(&Token::Question) {
            return Ok(condition);
        }
        self.descend()?;
        let then = self.ternary()?;
        self.expect(&Token::Colon)?;
        let otherwise = self.ternary()?;
        self.depth -= 1;
        Ok(Expr::Ternary(
            Box::new(condition),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn or(&mut self) -> Result<Expr, ExprError> {
        let start = self.depth;
        let mut left = self.and()?;
        while self.eat(&Token::OrOr) {
            self.descend()?;
            let right = self.and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        self.depth = start;
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, ExprError> {
        let start = self.depth;
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            self.descend()?;
            let right = self.equality()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        self.depth = start;
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, ExprError> {
        let start = self.depth;
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::NotEq,
                _ => {
                    self.depth = start;
                    return Ok(left);
                }
            };
            self.pos += 1;
            self.descend()?;
            let right = self.comparison()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let left = self.unary()?;
        let op = match self.peek() {
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.unary()?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Bang) {
            self.descend()?;
            let operand = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let Some((token, pos)) = self.advance() else {
            return Err(ExprError::UnexpectedEnd);
        };

        match token {
            Token::LParen => {
                self.descend()?;
                let inner = self.ternary()?;
                self.expect(&Token::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            Token::Number(n) => Ok(Expr::Literal(number_value(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "null" => Ok(Expr::Literal(Value::Null)),
                _ => self.path(name),
            },
            other => Err(ExprError::UnexpectedToken {
                found: other.describe(),
                pos,
            }),
        }
    }

    fn path(&mut self, root: String) -> Result<Expr, ExprError> {
        let mut segments = Vec::new();
        loop {
            if self.eat(&Token::Dot) {
                match self.advance() {
                    Some((Token::Ident(field), _)) => segments.push(Segment::Field(field)),
                    Some((token, pos)) => {
                        return Err(ExprError::UnexpectedToken {
                            found: token.describe(),
                            pos,
                        });
                    }
                    None => return Err(ExprError::UnexpectedEnd),
                }
            } else if self.eat(&Token::LBracket) {
                match self.advance() {
                    Some((Token::Number(n), pos)) => {
                        segments.push(Segment::Index(index_from(n, pos)?));
                    }
                    Some((Token::Str(key), _)) => segments.push(Segment::Field(key)),
                    Some((token, pos)) => {
                        return Err(ExprError::UnexpectedToken {
                            found: token.describe(),
                            pos,
                        });
                    }
                    None => return Err(ExprError::UnexpectedEnd),
                }
                self.expect(&Token::RBracket)?;
            } else {
                return Ok(Expr::Path { root, segments });
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn index_from(n: f64, pos: usize) -> Result<usize, ExprError> {
    if n.fract() != 0.0 || n < 0.0 || n > u32::MAX.into() {
        return Err(ExprError::InvalidNumber {
            literal: n.to_string(),
            pos,
        });
    }
    Ok(n as usize)
}

#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(root: &str, fields: &[&str]) -> Expr {
        Expr::Path {
            root: root.to_owned(),
            segments: fields
                .iter()
                .map(|f| Segment::Field((*f).to_owned()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("true").unwrap(), Expr::Literal(Value::Bool(true)));
        assert_eq!(parse("null").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(parse("42").unwrap(), Expr::Literal(Value::from(42)));
        assert_eq!(parse("'x'").unwrap(), Expr::Literal(Value::from("x")));
    }

    #[test]
    fn test_parse_path_with_index() {
        assert_eq!(
            parse("Model.Items[2].Name").unwrap(),
            Expr::Path {
                root: "Model".to_owned(),
                segments: vec![
                    Segment::Field("Items".to_owned()),
                    Segment::Index(2),
                    Segment::Field("Name".to_owned()),
                ],
            }
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a || b && c").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Or,
                Box::new(path("a", &[])),
                Box::new(Expr::Binary(
                    BinaryOp::And,
                    Box::new(path("b", &[])),
                    Box::new(path("c", &[])),
                )),
            )
        );
    }

    #[test]
    fn test_parse_ternary_with_parens() {
        let expr = parse("(Now.Year==2021)?(true):(false)").unwrap();
        assert!(matches!(expr, Expr::Ternary(..)));
    }

    #[test]
    fn test_parse_not() {
        assert_eq!(
            parse("!User.IsAdmin").unwrap(),
            Expr::Not(Box::new(path("User", &["IsAdmin"])))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(""), Err(ExprError::Empty));
        assert_eq!(parse("   "), Err(ExprError::Empty));
        assert_eq!(parse("a &&"), Err(ExprError::UnexpectedEnd));
        assert_eq!(
            parse("a b"),
            Err(ExprError::UnexpectedToken {
                found: "b".to_owned(),
                pos: 2
            })
        );
        assert_eq!(parse("(a"), Err(ExprError::UnexpectedEnd));
        assert_eq!(parse("a ? b"), Err(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_nesting_limit() {
        let too_deep = ExprError::TooDeep {
            limit: MAX_NESTING_DEPTH,
        };
        let nots = format!("{}true", "!".repeat(100_000));
        let parens = format!("{}a{}", "(".repeat(100_000), ")".repeat(100_000));
        let chain = vec!["a"; 100_000].join(" && ");
        let ternaries = "a ? b : ".repeat(100_000) + "c";

        assert_eq!(parse(&nots), Err(too_deep.clone()));
        assert_eq!(parse(&parens), Err(too_deep.clone()));
        assert_eq!(parse(&chain), Err(too_deep.clone()));
        assert_eq!(parse(&ternaries), Err(too_deep));
    }

    #[test]
    fn test_nesting_within_limit() {
        let depth = MAX_NESTING_DEPTH - 1;
        let parens = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&parens).unwrap(), path("a", &[]));

        // Each chained operator nests the tree one level deeper.
        let chain = vec!["(a && b)"; MAX_NESTING_DEPTH].join(" || ");
        assert!(matches!(parse(&chain), Err(ExprError::TooDeep { .. })));
        let chain = vec!["((a))"; 50].join(" || ");
        assert!(parse(&chain).is_ok());
    }

    #[test]
    fn test_parse_rejects_fractional_index() {
        assert!(matches!(
            parse("a[1.5]"),
            Err(ExprError::InvalidNumber { .. })
        ));
    }
}
