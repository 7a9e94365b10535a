//! Lexer for layout programs using logos

use std::fmt::{self, Write};

use logos::Logos;

use crate::error::ParseError;

use crate::language::{BinaryOption, CyclicOption, UnaryOption};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Rule keywords
    #[token("IF")]
    If,
    #[token("THEN")]
    Then,
    #[token("Cycle")]
    Cycle,
    #[token("Group")]
    Group,

    // Separation qualifier
    #[token("separation")]
    Separation,
    #[token("at")]
    At,
    #[token("least")]
    Least,
    #[token("exactly")]
    Exactly,

    // Layout options
    #[token("LeftOfCenter", |_| UnaryOption::LeftOfCenter)]
    #[token("RightOfCenter", |_| UnaryOption::RightOfCenter)]
    #[token("AboveCenter", |_| UnaryOption::AboveCenter)]
    #[token("BelowCenter", |_| UnaryOption::BelowCenter)]
    Unary(UnaryOption),

    #[token("LeftOf", |_| BinaryOption::LeftOf)]
    #[token("RightOf", |_| BinaryOption::RightOf)]
    #[token("Above", |_| BinaryOption::Above)]
    #[token("Below", |_| BinaryOption::Below)]
    #[token("DirectlyLeftOf", |_| BinaryOption::DirectlyLeftOf)]
    #[token("DirectlyRightOf", |_| BinaryOption::DirectlyRightOf)]
    #[token("DirectlyAbove", |_| BinaryOption::DirectlyAbove)]
    #[token("DirectlyBelow", |_| BinaryOption::DirectlyBelow)]
    #[token("HorizontallyAligned", |_| BinaryOption::HorizontallyAligned)]
    #[token("VerticallyAligned", |_| BinaryOption::VerticallyAligned)]
    #[token("OutsideRingOf", |_| BinaryOption::OutsideRingOf)]
    #[token("InsideRingOf", |_| BinaryOption::InsideRingOf)]
    #[token("Contains", |_| BinaryOption::Contains)]
    Binary(BinaryOption),

    #[token("Clockwise", |_| CyclicOption::Clockwise)]
    #[token("Counterclockwise", |_| CyclicOption::Counterclockwise)]
    Cyclic(CyclicOption),

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // Identifiers must come after keywords; `$` and `/` appear in atom names.
    // Any other name is written in double quotes with `\"` and `\\` escapes.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_$/]*", |lex| lex.slice().to_string(), priority = 1)]
    #[regex(r#""([^"\\]|\\["\\])*""#, |lex| unquote(lex.slice()))]
    Ident(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::If => write!(f, "keyword 'IF'"),
            Token::Then => write!(f, "keyword 'THEN'"),
            Token::Cycle => write!(f, "keyword 'Cycle'"),
            Token::Group => write!(f, "keyword 'Group'"),
            Token::Separation => write!(f, "keyword 'separation'"),
            Token::At => write!(f, "keyword 'at'"),
            Token::Least => write!(f, "keyword 'least'"),
            Token::Exactly => write!(f, "keyword 'exactly'"),
            Token::Unary(o) => write!(f, "option '{}'", o.as_str()),
            Token::Binary(o) => write!(f, "option '{}'", o.as_str()),
            Token::Cyclic(o) => write!(f, "option '{}'", o.as_str()),
            Token::ParenOpen => write!(f, "'('"),
            Token::ParenClose => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Colon => write!(f, "':'"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LineComment => write!(f, "comment"),
        }
    }
}

/// Strip the quotes of a quoted identifier and resolve its escapes
fn unquote(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Tokenize input; every unrecognized stretch becomes an error
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Vec<ParseError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(t) => tokens.push((t, span)),
            Err(()) => errors.push(ParseError::unrecognized(span.clone(), &input[span])),
        }
    }
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

/// A name as it appears in program text: bare when it lexes back to
/// itself as one identifier, quoted otherwise
#[derive(Debug, Clone, Copy)]
pub struct Name<'a>(pub &'a str);

impl Name<'_> {
    fn is_bare(&self) -> bool {
        let mut lexer = Token::lexer(self.0);
        matches!(
            (lexer.next(), lexer.next()),
            (Some(Ok(Token::Ident(s))), None) if s == self.0
        )
    }
}

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            return f.write_str(self.0);
        }
        f.write_char('"')?;
        for c in self.0.chars() {
            if c == '"' || c == '\\' {
                f.write_char('\\')?;
            }
            f.write_char(c)?;
        }
        f.write_char('"')
    }
}
