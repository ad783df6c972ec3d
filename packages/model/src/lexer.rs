use logos::Logos;
use std::fmt;

/// Token types for the markup subset the model understands.
///
/// Text is not its own token: the parser re-slices the raw source between
/// tag tokens, so every non-tag token just needs to cover its span. That
/// keeps the lexer context-free where real markup is not.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // <figure, <p, <img ...
    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    // </figure> as one token, name only
    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*>", |lex| {
        let s = lex.slice();
        &s[2..s.len() - 1]
    })]
    TagClose(&'src str),

    #[token(">")]
    TagEnd,

    #[token("/>")]
    SelfClose,

    #[token("=")]
    Eq,

    // Attribute values; never cross a tag boundary
    #[regex(r#""[^"<]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    DoubleQuoted(&'src str),

    #[regex(r#"'[^'<]*'"#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    SingleQuoted(&'src str),

    // Attribute names and unquoted values
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice(), priority = 3)]
    Name(&'src str),

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    // Anything else outside tags (entities, punctuation, numbers)
    #[regex(r#"[^<>='"\s]+"#, |lex| lex.slice(), priority = 1)]
    Chunk(&'src str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::TagOpen(name) => write!(f, "<{}", name),
            Token::TagClose(name) => write!(f, "</{}>", name),
            Token::TagEnd => f.write_str(">"),
            Token::SelfClose => f.write_str("/>"),
            Token::Eq => f.write_str("="),
            Token::DoubleQuoted(value) => write!(f, "\"{}\"", value),
            Token::SingleQuoted(value) => write!(f, "'{}'", value),
            Token::Name(name) => f.write_str(name),
            Token::Whitespace => f.write_str(" "),
            Token::Chunk(chunk) => f.write_str(chunk),
        }
    }
}

/// Tokenize markup into spanned tokens.
///
/// Spans that match no token (an unpaired quote starting a text run, say)
/// surface as chunks over the raw slice instead of being dropped; the
/// parser reconstructs text from contiguous spans, so losing one would
/// lose its text.
pub fn tokenize(source: &str) -> Vec<(Token, std::ops::Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| {
            let token = result.unwrap_or_else(|_| Token::Chunk(&source[span.clone()]));
            (token, span)
        })
        .collect()
}
