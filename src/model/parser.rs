//! Tokenizer and parser for model expressions.
//!
//! Grammar (standard precedence; `^` is right-associative and binds tighter
//! than unary minus):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := primary ('^' unary)?
//! primary := number | ident | ident '[' integer ']' | ident '(' expr ')' | '(' expr ')'
//! ```
//!
//! Identifier resolution depends on how the model declared its parameters:
//! an indexed vector `a[i]` or a list of names in positional order. `x`,
//! `pi`, and `e` are always available. Every failure is a model-shape error.

use crate::error::FitError;
use crate::model::ast::{Ast, Func};

/// How parameter identifiers resolve during parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSymbols {
    /// Parameters form a vector named `a` with `count` entries, referenced
    /// as `a[0]`, `a[1]`, …
    Indexed { count: usize },
    /// Parameters are individual names; position in the list is the slot.
    Named(Vec<String>),
}

impl ParamSymbols {
    pub fn count(&self) -> usize {
        match self {
            ParamSymbols::Indexed { count } => *count,
            ParamSymbols::Named(names) => names.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

fn token_text(token: &Token) -> String {
    match token {
        Token::Num(v) => v.to_string(),
        Token::Ident(s) => s.clone(),
        Token::Plus => "+".to_string(),
        Token::Minus => "-".to_string(),
        Token::Star => "*".to_string(),
        Token::Slash => "/".to_string(),
        Token::Caret => "^".to_string(),
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::LBracket => "[".to_string(),
        Token::RBracket => "]".to_string(),
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, FitError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent part only when 'e'/'E' is followed by a digit or a
                // signed digit; a bare 'e' is the Euler constant.
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let after_sign = if i + 1 < chars.len() && (chars[i + 1] == '+' || chars[i + 1] == '-')
                    {
                        i + 2
                    } else {
                        i + 1
                    };
                    if after_sign < chars.len() && chars[after_sign].is_ascii_digit() {
                        i = after_sign;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| {
                    FitError::model_shape(format!("malformed number '{text}' in expression"))
                })?;
                tokens.push(Token::Num(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => {
                return Err(FitError::model_shape(format!(
                    "unexpected character {c:?} in expression"
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    symbols: &'a ParamSymbols,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), FitError> {
        match self.bump() {
            Some(ref t) if t == expected => Ok(()),
            Some(t) => Err(FitError::model_shape(format!(
                "expected {what}, found '{}'",
                token_text(&t)
            ))),
            None => Err(FitError::model_shape(format!(
                "expected {what}, found end of expression"
            ))),
        }
    }

    fn expr(&mut self) -> Result<Ast, FitError> {
        let mut node = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.bump();
                    node = Ast::Add(Box::new(node), Box::new(self.term()?));
                }
                Some(Token::Minus) => {
                    self.bump();
                    node = Ast::Sub(Box::new(node), Box::new(self.term()?));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<Ast, FitError> {
        let mut node = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.bump();
                    node = Ast::Mul(Box::new(node), Box::new(self.unary()?));
                }
                Some(Token::Slash) => {
                    self.bump();
                    node = Ast::Div(Box::new(node), Box::new(self.unary()?));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<Ast, FitError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.bump();
            return Ok(Ast::Neg(Box::new(self.unary()?)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Ast, FitError> {
        let base = self.primary()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.bump();
            return Ok(Ast::Pow(Box::new(base), Box::new(self.unary()?)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Ast, FitError> {
        match self.bump() {
            Some(Token::Num(v)) => Ok(Ast::Num(v)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.ident(name),
            Some(t) => Err(FitError::model_shape(format!(
                "expected a value, found '{}'",
                token_text(&t)
            ))),
            None => Err(FitError::model_shape("unexpected end of expression")),
        }
    }

    fn ident(&mut self, name: String) -> Result<Ast, FitError> {
        if matches!(self.peek(), Some(Token::LParen)) {
            let func = Func::from_name(&name)
                .ok_or_else(|| FitError::model_shape(format!("unknown function '{name}'")))?;
            self.bump();
            let arg = self.expr()?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(Ast::Call(func, Box::new(arg)));
        }
        if matches!(self.peek(), Some(Token::LBracket)) {
            self.bump();
            let index = self.index_literal()?;
            self.expect(&Token::RBracket, "']'")?;
            return match self.symbols {
                ParamSymbols::Indexed { count } => {
                    if name != "a" {
                        return Err(FitError::model_shape(format!(
                            "the parameter vector is named 'a'; found '{name}[{index}]'"
                        )));
                    }
                    if index >= *count {
                        return Err(FitError::model_shape(format!(
                            "parameter index {index} is out of range: the model declares {count} parameters"
                        )));
                    }
                    Ok(Ast::Param(index))
                }
                ParamSymbols::Named(_) => Err(FitError::model_shape(format!(
                    "'{name}[{index}]' is indexed, but this model declares named parameters"
                ))),
            };
        }
        self.plain_symbol(&name)
    }

    fn index_literal(&mut self) -> Result<usize, FitError> {
        match self.bump() {
            Some(Token::Num(v)) if v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
            Some(t) => Err(FitError::model_shape(format!(
                "parameter index must be a non-negative integer, found '{}'",
                token_text(&t)
            ))),
            None => Err(FitError::model_shape(
                "parameter index must be a non-negative integer, found end of expression",
            )),
        }
    }

    fn plain_symbol(&self, name: &str) -> Result<Ast, FitError> {
        if name == "x" {
            return Ok(Ast::X);
        }
        if name == "pi" {
            return Ok(Ast::Num(std::f64::consts::PI));
        }
        if name == "e" {
            return Ok(Ast::Num(std::f64::consts::E));
        }
        match self.symbols {
            ParamSymbols::Indexed { .. } if name == "a" => Err(FitError::model_shape(
                "the parameter vector 'a' must be indexed, e.g. a[0]",
            )),
            ParamSymbols::Named(names) => match names.iter().position(|n| n == name) {
                Some(slot) => Ok(Ast::Param(slot)),
                None => Err(FitError::model_shape(format!(
                    "unknown symbol '{name}' in expression"
                ))),
            },
            _ => Err(FitError::model_shape(format!(
                "unknown symbol '{name}' in expression"
            ))),
        }
    }
}

/// Parse one expression with the given parameter symbols.
pub fn parse_expression(src: &str, symbols: &ParamSymbols) -> Result<Ast, FitError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(FitError::model_shape("expression is empty"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        symbols,
    };
    let ast = parser.expr()?;
    if let Some(t) = parser.peek() {
        return Err(FitError::model_shape(format!(
            "unexpected '{}' after the end of the expression",
            token_text(t)
        )));
    }
    Ok(ast)
}
