//! Lexer Module for Lamina Compiler
//!
//! Lossless GLSL tokenizer. Whitespace, comments and preprocessor lines are
//! kept as tokens so that `stringify(tokenize(s)) == s` for every input.
//! Malformed input never fails: stray bytes become `Unknown` tokens and
//! unterminated comments or strings run to the end of the source.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    Operator,
    String,
    LineComment,
    BlockComment,
    Whitespace,
    Preprocessor,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the source the token was read from.
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Tokens that carry no syntax for the function extractor.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::Preprocessor
        )
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }
}

lazy_static! {
    /// GLSL ES keywords and built-in type names.
    static ref GLSL_KEYWORDS: HashSet<&'static str> = {
        [
            // storage and flow
            "attribute", "const", "uniform", "varying", "buffer", "shared", "layout",
            "centroid", "flat", "smooth", "noperspective", "patch", "sample",
            "break", "continue", "do", "for", "while", "switch", "case", "default",
            "if", "else", "subroutine", "in", "out", "inout", "invariant", "precise",
            "discard", "return", "struct", "precision", "highp", "mediump", "lowp",
            "true", "false",
            // scalar and vector types
            "void", "bool", "int", "uint", "float", "double",
            "vec2", "vec3", "vec4", "ivec2", "ivec3", "ivec4",
            "uvec2", "uvec3", "uvec4", "bvec2", "bvec3", "bvec4",
            "dvec2", "dvec3", "dvec4",
            "mat2", "mat3", "mat4", "mat2x2", "mat2x3", "mat2x4",
            "mat3x2", "mat3x3", "mat3x4", "mat4x2", "mat4x3", "mat4x4",
            // samplers
            "sampler2D", "sampler3D", "samplerCube", "sampler2DShadow",
            "samplerCubeShadow", "sampler2DArray", "sampler2DArrayShadow",
            "isampler2D", "isampler3D", "isamplerCube", "isampler2DArray",
            "usampler2D", "usampler3D", "usamplerCube", "usampler2DArray",
        ]
        .into_iter()
        .collect()
    };
}

const OPERATORS_3: [&str; 2] = ["<<=", ">>="];
const OPERATORS_2: [&str; 19] = [
    "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "^^", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=",
];
const OPERATORS_1: &str = "+-*/%<>=!&|^~?:;,.(){}[]";

pub fn is_keyword(name: &str) -> bool {
    GLSL_KEYWORDS.contains(name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════════

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).lex()
}

/// Concatenate token texts back into source.
pub fn stringify(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for token in tokens {
        out.push_str(&token.text);
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEXER
// ═══════════════════════════════════════════════════════════════════════════════

struct Lexer<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, index: 0 }
    }

    fn lex(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(ch) = self.peek_char() {
            let start = self.index;
            let kind = if ch.is_whitespace() {
                self.eat_while(char::is_whitespace);
                TokenKind::Whitespace
            } else if ch == '/' && self.peek_second_char() == Some('/') {
                self.eat_while(|c| c != '\n');
                TokenKind::LineComment
            } else if ch == '/' && self.peek_second_char() == Some('*') {
                self.lex_block_comment();
                TokenKind::BlockComment
            } else if ch == '#' && self.at_line_start() {
                self.lex_preprocessor();
                TokenKind::Preprocessor
            } else if ch == '"' {
                self.lex_string();
                TokenKind::String
            } else if ch.is_ascii_alphabetic() || ch == '_' {
                self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
                if is_keyword(&self.source[start..self.index]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                }
            } else if ch.is_ascii_digit()
                || (ch == '.' && self.peek_second_char().is_some_and(|c| c.is_ascii_digit()))
            {
                self.lex_number();
                TokenKind::Number
            } else if self.lex_operator() {
                TokenKind::Operator
            } else {
                self.index += ch.len_utf8();
                TokenKind::Unknown
            };
            tokens.push(Token::new(
                kind,
                &self.source[start..self.index],
                start..self.index,
            ));
        }
        tokens
    }

    fn rest(&self) -> &'a str {
        &self.source[self.index..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second_char(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.index += ch.len_utf8();
        }
    }

    /// True when only horizontal whitespace precedes the cursor on its line.
    fn at_line_start(&self) -> bool {
        self.source[..self.index]
            .chars()
            .rev()
            .take_while(|&c| c != '\n')
            .all(|c| c == ' ' || c == '\t' || c == '\r')
    }

    fn lex_block_comment(&mut self) {
        match self.rest()[2..].find("*/") {
            Some(end) => self.index += 2 + end + 2,
            None => self.index = self.source.len(),
        }
    }

    fn lex_preprocessor(&mut self) {
        // Runs to end of line; a trailing backslash continues the directive.
        loop {
            self.eat_while(|c| c != '\n');
            let line = self.source[..self.index].trim_end_matches('\r');
            if line.ends_with('\\') && self.peek_char() == Some('\n') {
                self.index += 1;
                continue;
            }
            break;
        }
    }

    fn lex_string(&mut self) {
        self.index += 1;
        let mut escaped = false;
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                return;
            }
            self.index += ch.len_utf8();
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                return;
            }
        }
    }

    fn lex_number(&mut self) {
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.index += 2;
            self.eat_while(|c| c.is_ascii_hexdigit());
        } else {
            self.eat_while(|c| c.is_ascii_digit());
            if self.peek_char() == Some('.') {
                self.index += 1;
                self.eat_while(|c| c.is_ascii_digit());
            }
            self.lex_exponent();
        }
        // Type suffixes: 1u, 1.0f, 1.0lf
        let rest = self.rest();
        if rest.starts_with("lf") || rest.starts_with("LF") {
            self.index += 2;
        } else if let Some(c) = self.peek_char() {
            if matches!(c, 'u' | 'U' | 'f' | 'F') {
                self.index += 1;
            }
        }
    }

    fn lex_exponent(&mut self) {
        let bytes = self.rest().as_bytes();
        if bytes.first().map_or(true, |b| *b != b'e' && *b != b'E') {
            return;
        }
        let digits_at = match bytes.get(1) {
            Some(b'+') | Some(b'-') => 2,
            _ => 1,
        };
        if bytes.get(digits_at).is_some_and(|b| b.is_ascii_digit()) {
            self.index += digits_at;
            self.eat_while(|c| c.is_ascii_digit());
        }
    }

    fn lex_operator(&mut self) -> bool {
        let rest = self.rest();
        for op in OPERATORS_3.iter().chain(OPERATORS_2.iter()) {
            if rest.starts_with(op) {
                self.index += op.len();
                return true;
            }
        }
        match self.peek_char() {
            Some(c) if OPERATORS_1.contains(c) => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }
}
