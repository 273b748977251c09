//! Arithmetic expression evaluation.
//!
//! A recursive-descent parser over numeric literals, `+ - * /`, unary minus
//! and parentheses. Input is parsed into an [`Expr`] tree and evaluated; no
//! other syntax is accepted.
//!
//! Grammar:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('-' | '+') unary | atom
//! atom   := NUMBER | '(' expr ')'
//! ```

use thiserror::Error;

/// Maximum nesting depth of parentheses and unary operators.
const MAX_DEPTH: usize = 64;

/// Errors produced while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// A character outside the accepted alphabet.
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },

    /// A numeric literal that does not parse.
    #[error("malformed number '{literal}' at position {position}")]
    MalformedNumber { literal: String, position: usize },

    /// A token that does not fit the grammar.
    #[error("unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    /// Input ended in the middle of an expression.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// Nesting exceeded [`MAX_DEPTH`].
    #[error("expression nested too deeply")]
    TooDeep,

    /// Division by zero during evaluation.
    #[error("Cannot divide by zero")]
    DivisionByZero,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Evaluates the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::DivisionByZero`] when a divisor is zero.
    pub fn eval(&self) -> Result<f64, ExpressionError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Neg(inner) => Ok(-inner.eval()?),
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval()?;
                let rhs = rhs.eval()?;
                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div if rhs == 0.0 => Err(ExpressionError::DivisionByZero),
                    BinaryOp::Div => Ok(lhs / rhs),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Star => "'*'".to_string(),
            Self::Slash => "'/'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let token = match c {
            ' ' | '\t' => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::MalformedNumber {
                        literal: literal.clone(),
                        position: start,
                    })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            other => {
                return Err(ExpressionError::UnexpectedChar {
                    found: other,
                    position: i,
                })
            }
        };
        tokens.push((token, i));
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|&(token, _)| token)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.pos).copied();
        self.pos += 1;
        next
    }

    fn descend(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek().and_then(|t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        }) {
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek().and_then(|t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            _ => None,
        }) {
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExpressionError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.descend()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(inner)
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<Expr, ExpressionError> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(Expr::Number(n)),
            Some((Token::LParen, _)) => {
                self.descend()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((token, position)) => Err(ExpressionError::UnexpectedToken {
                        found: token.describe(),
                        position,
                    }),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some((token, position)) => Err(ExpressionError::UnexpectedToken {
                found: token.describe(),
                position,
            }),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }
}

/// Parses `input` into an expression tree.
///
/// # Errors
///
/// Returns an error for any input outside the grammar, including empty input
/// and trailing tokens.
pub fn parse(input: &str) -> Result<Expr, ExpressionError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.advance() {
        None => Ok(expr),
        Some((token, position)) => Err(ExpressionError::UnexpectedToken {
            found: token.describe(),
            position,
        }),
    }
}

/// Parses and evaluates `input`.
///
/// # Errors
///
/// Returns any parse or evaluation error.
pub fn evaluate(input: &str) -> Result<f64, ExpressionError> {
    parse(input)?.eval()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("100 / 10 / 5").unwrap(), 2.0);
    }

    #[test]
    fn unary_minus_and_decimals() {
        assert_eq!(evaluate("-3 + 5").unwrap(), 2.0);
        assert_eq!(evaluate("-(2 * 3)").unwrap(), -6.0);
        assert_eq!(evaluate("--4").unwrap(), 4.0);
        assert!((evaluate("0.1 + 0.2").unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(evaluate(".5 * 4").unwrap(), 2.0);
    }

    #[test]
    fn builds_explicit_tree() {
        assert_eq!(
            parse("1 - 2").unwrap(),
            Expr::Binary {
                op: BinaryOp::Sub,
                lhs: Box::new(Expr::Number(1.0)),
                rhs: Box::new(Expr::Number(2.0)),
            }
        );
    }

    #[test]
    fn rejects_code() {
        assert_eq!(
            evaluate("alert(1)"),
            Err(ExpressionError::UnexpectedChar {
                found: 'a',
                position: 0
            })
        );
        assert!(matches!(
            evaluate("1; 2"),
            Err(ExpressionError::UnexpectedChar { found: ';', .. })
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(evaluate(""), Err(ExpressionError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(ExpressionError::UnexpectedEnd));
        assert!(matches!(
            evaluate("1 2"),
            Err(ExpressionError::UnexpectedToken { position: 2, .. })
        ));
        assert!(matches!(
            evaluate("1.2.3"),
            Err(ExpressionError::MalformedNumber { .. })
        ));
        assert!(matches!(
            evaluate("* 3"),
            Err(ExpressionError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("1 / (2 - 2)"), Err(ExpressionError::DivisionByZero));
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(evaluate(&deep), Err(ExpressionError::TooDeep));
    }
}
