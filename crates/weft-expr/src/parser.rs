//! Recursive-descent parser producing the expression tree.
//!
//! Precedence, lowest first: conditional, `??`, `||`, `&&`, equality,
//! relational, additive, multiplicative, unary, member/index access.

use serde_json::Value;

use crate::error::EvalError;
use crate::lexer::{Spanned, Token, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    And,
    Or,
    Coalesce,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    This,
    Ident(String),
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
}

/// Deepest nesting of sub-expressions and unary operators accepted.
pub(crate) const MAX_DEPTH: usize = 128;

/// Parse a complete expression.
pub(crate) fn parse(source: &str) -> Result<Expr, EvalError> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression()?;
    match parser.tokens.get(parser.pos) {
        Some(extra) => Err(unexpected(extra)),
        None => Ok(expr),
    }
}

fn unexpected(spanned: &Spanned) -> EvalError {
    EvalError::UnexpectedToken {
        found: spanned.token.describe(),
        offset: spanned.offset,
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek_punct(&self) -> Option<&'static str> {
        match self.tokens.get(self.pos) {
            Some(Spanned {
                token: Token::Punct(p),
                ..
            }) => Some(*p),
            _ => None,
        }
    }

    /// Consume the punctuator if it is next.
    fn eat(&mut self, punct: &str) -> bool {
        if self.peek_punct() == Some(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<(), EvalError> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.error_here())
        }
    }

    fn error_here(&self) -> EvalError {
        self.tokens
            .get(self.pos)
            .map_or(EvalError::UnexpectedEnd, unexpected)
    }

    fn next(&mut self) -> Result<Spanned, EvalError> {
        let spanned = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(EvalError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(spanned)
    }

    /// Run `rule` one nesting level deeper.
    fn nested(&mut self, rule: fn(&mut Self) -> Result<Expr, EvalError>) -> Result<Expr, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Expr, EvalError> {
        let test = self.coalesce()?;
        if !self.eat("?") {
            return Ok(test);
        }
        let consequent = self.expression()?;
        self.expect(":")?;
        let alternate = self.expression()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn coalesce(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.or()?;
        while self.eat("??") {
            let right = self.or()?;
            left = Expr::Logical(LogicalOp::Coalesce, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn or(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.and()?;
        while self.eat("||") {
            let right = self.and()?;
            left = Expr::Logical(LogicalOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.equality()?;
        while self.eat("&&") {
            let right = self.equality()?;
            left = Expr::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn binary_level(
        &mut self,
        ops: &[(&str, BinaryOp)],
        operand: fn(&mut Self) -> Result<Expr, EvalError>,
    ) -> Result<Expr, EvalError> {
        let mut left = operand(self)?;
        'outer: loop {
            for (punct, op) in ops {
                if self.eat(punct) {
                    let right = operand(self)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn equality(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(
            &[
                ("===", BinaryOp::StrictEq),
                ("!==", BinaryOp::StrictNe),
                ("==", BinaryOp::Eq),
                ("!=", BinaryOp::Ne),
            ],
            Self::relational,
        )
    }

    fn relational(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(
            &[
                ("<=", BinaryOp::Le),
                (">=", BinaryOp::Ge),
                ("<", BinaryOp::Lt),
                (">", BinaryOp::Gt),
            ],
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(
            &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(
            &[
                ("*", BinaryOp::Mul),
                ("/", BinaryOp::Div),
                ("%", BinaryOp::Rem),
            ],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = if self.eat("!") {
            UnaryOp::Not
        } else if self.eat("-") {
            UnaryOp::Neg
        } else if self.eat("+") {
            UnaryOp::Plus
        } else {
            return self.postfix();
        };
        Ok(Expr::Unary(op, Box::new(self.nested(Self::unary)?)))
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.primary()?;
        loop {
            let optional = if self.eat(".") {
                false
            } else if self.eat("?.") {
                true
            } else if self.eat("[") {
                expr = self.index(expr, false)?;
                continue;
            } else {
                return Ok(expr);
            };

            if optional && self.eat("[") {
                expr = self.index(expr, true)?;
                continue;
            }

            let Spanned { token, offset } = self.next()?;
            let property = match token {
                Token::Ident(name) => name,
                other => {
                    return Err(EvalError::UnexpectedToken {
                        found: other.describe(),
                        offset,
                    });
                }
            };
            expr = Expr::Member {
                object: Box::new(expr),
                property,
                optional,
            };
        }
    }

    /// Rest of `object[index]` after the opening bracket.
    fn index(&mut self, object: Expr, optional: bool) -> Result<Expr, EvalError> {
        let index = self.expression()?;
        self.expect("]")?;
        Ok(Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
            optional,
        })
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let Spanned { token, offset } = self.next()?;
        match token {
            Token::Number(n) => Ok(Expr::Literal(crate::value::number(n))),
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                "this" => Expr::This,
                _ => Expr::Ident(name),
            }),
            Token::Punct("(") => {
                let expr = self.expression()?;
                self.expect(")")?;
                Ok(expr)
            }
            Token::Punct("[") => self.array(),
            Token::Punct("{") => self.object(),
            Token::Punct(p) => Err(EvalError::UnexpectedToken {
                found: p.to_owned(),
                offset,
            }),
        }
    }

    fn array(&mut self) -> Result<Expr, EvalError> {
        let mut items = Vec::new();
        while !self.eat("]") {
            items.push(self.expression()?);
            if !self.eat(",") {
                self.expect("]")?;
                break;
            }
        }
        Ok(Expr::Array(items))
    }

    fn object(&mut self) -> Result<Expr, EvalError> {
        let mut properties = Vec::new();
        while !self.eat("}") {
            let Spanned { token, offset } = self.next()?;
            let key = match token {
                Token::Ident(name) => name,
                Token::Str(s) => s,
                Token::Number(n) => crate::value::to_display_string(&crate::value::number(n)),
                Token::Punct(p) => {
                    return Err(EvalError::UnexpectedToken {
                        found: p.to_owned(),
                        offset,
                    });
                }
            };
            let value = if self.eat(":") {
                self.expression()?
            } else {
                // Shorthand `{name}` reads the field of the same name.
                Expr::Ident(key.clone())
            };
            properties.push((key, value));
            if !self.eat(",") {
                self.expect("}")?;
                break;
            }
        }
        Ok(Expr::Object(properties))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ident(name: &str) -> Box<Expr> {
        Box::new(Expr::Ident(name.to_owned()))
    }

    #[test]
    fn test_parse_precedence() {
        let expr = parse("a + b * c").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Add,
                ident("a"),
                Box::new(Expr::Binary(BinaryOp::Mul, ident("b"), ident("c"))),
            )
        );
    }

    #[test]
    fn test_parse_member_chain() {
        let expr = parse("user?.tags[0]").unwrap();
        assert_eq!(
            expr,
            Expr::Index {
                object: Box::new(Expr::Member {
                    object: ident("user"),
                    property: "tags".to_owned(),
                    optional: true,
                }),
                index: Box::new(Expr::Literal(Value::from(0))),
                optional: false,
            }
        );
    }

    #[test]
    fn test_parse_conditional_is_right_associative() {
        let expr = parse("a ? b : c ? d : e").unwrap();
        let Expr::Conditional { alternate, .. } = expr else {
            panic!("expected conditional");
        };
        assert!(matches!(*alternate, Expr::Conditional { .. }));
    }

    #[test]
    fn test_parse_object_literal() {
        let expr = parse("{a: 1, 'b': x, c}").unwrap();
        let Expr::Object(properties) = expr else {
            panic!("expected object");
        };
        let keys: Vec<_> = properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_trailing_comma() {
        assert_eq!(
            parse("[1, 2,]").unwrap(),
            Expr::Array(vec![
                Expr::Literal(Value::from(1)),
                Expr::Literal(Value::from(2)),
            ])
        );
    }

    #[test]
    fn test_parse_trailing_tokens() {
        assert_eq!(
            parse("a b"),
            Err(EvalError::UnexpectedToken {
                found: "b".to_owned(),
                offset: 2,
            })
        );
    }

    #[test]
    fn test_parse_depth_limit() {
        let nots = format!("{}a", "!".repeat(10_000));
        assert_eq!(parse(&nots), Err(EvalError::TooDeep(MAX_DEPTH)));

        let parens = format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse(&parens), Err(EvalError::TooDeep(MAX_DEPTH)));

        let arrays = format!("{}1{}", "[".repeat(500), "]".repeat(500));
        assert_eq!(parse(&arrays), Err(EvalError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_parse_moderate_nesting() {
        let parens = format!("{}a{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse(&parens), Ok(Expr::Ident("a".to_owned())));
        assert!(parse(&format!("{}a", "!".repeat(50))).is_ok());
    }

    #[test]
    fn test_parse_unexpected_end() {
        assert_eq!(parse("a +"), Err(EvalError::UnexpectedEnd));
        assert_eq!(parse("(a"), Err(EvalError::UnexpectedEnd));
    }
}
