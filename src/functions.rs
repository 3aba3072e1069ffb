//! Function extraction over a GLSL token stream.
//!
//! Finds top-level function definitions and splits a layer template into the
//! declarations that precede `main` and the statements inside it.

use std::ops::Range;

use crate::lexer::{stringify, Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    /// Token indices from the return type through the closing brace.
    pub outer: Range<usize>,
    /// Token indices strictly inside the braces.
    pub body: Range<usize>,
    /// Token indices strictly inside the parameter parentheses.
    pub params: Range<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMain {
    pub variables: String,
    pub body: String,
}

/// List top-level function definitions in declaration order.
///
/// A definition is `<type> <name> ( ... ) { ... }` at brace depth zero.
/// Prototypes ending in `;` are skipped. Unbalanced input degrades to a body
/// that runs to the end of the stream.
pub fn find_functions(tokens: &[Token]) -> Vec<FunctionDecl> {
    let significant: Vec<usize> = (0..tokens.len())
        .filter(|&i| !tokens[i].is_trivia())
        .collect();

    let mut functions = Vec::new();
    let mut depth: usize = 0;
    let mut cursor = 0;

    while cursor < significant.len() {
        let idx = significant[cursor];
        let token = &tokens[idx];

        if token.is_operator("{") {
            depth += 1;
        } else if token.is_operator("}") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && is_type_like(token) {
            if let Some((decl, next_cursor)) = match_definition(tokens, &significant, cursor) {
                functions.push(decl);
                cursor = next_cursor;
                continue;
            }
        }
        cursor += 1;
    }

    functions
}

/// Split at `main`: everything before the declaration, and its body.
///
/// No `main` yields empty strings. When several definitions are named
/// `main` the first one wins.
pub fn extract_main(tokens: &[Token]) -> ExtractedMain {
    let functions = find_functions(tokens);
    match functions.iter().find(|f| f.name == "main") {
        Some(main) => ExtractedMain {
            variables: stringify(&tokens[..main.outer.start]),
            body: stringify(&tokens[main.body.clone()]),
        },
        None => ExtractedMain::default(),
    }
}

fn is_type_like(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword)
}

/// Try to read a definition whose return type sits at `significant[cursor]`.
/// Returns the declaration and the cursor just past its closing brace.
fn match_definition(
    tokens: &[Token],
    significant: &[usize],
    cursor: usize,
) -> Option<(FunctionDecl, usize)> {
    let type_idx = significant[cursor];
    let name_idx = *significant.get(cursor + 1)?;
    let open_paren_idx = *significant.get(cursor + 2)?;

    if tokens[name_idx].kind != TokenKind::Identifier || !tokens[open_paren_idx].is_operator("(")
    {
        return None;
    }

    // Match the parameter list.
    let mut paren_depth = 0usize;
    let mut pos = cursor + 2;
    let close_paren_pos = loop {
        let idx = *significant.get(pos)?;
        if tokens[idx].is_operator("(") {
            paren_depth += 1;
        } else if tokens[idx].is_operator(")") {
            paren_depth -= 1;
            if paren_depth == 0 {
                break pos;
            }
        }
        pos += 1;
    };

    let open_brace_pos = close_paren_pos + 1;
    let open_brace_idx = *significant.get(open_brace_pos)?;
    if !tokens[open_brace_idx].is_operator("{") {
        return None;
    }

    let mut brace_depth = 0usize;
    let mut pos = open_brace_pos;
    let mut close_brace_idx = None;
    while let Some(&idx) = significant.get(pos) {
        if tokens[idx].is_operator("{") {
            brace_depth += 1;
        } else if tokens[idx].is_operator("}") {
            brace_depth -= 1;
            if brace_depth == 0 {
                close_brace_idx = Some(idx);
                break;
            }
        }
        pos += 1;
    }

    let (body_end, outer_end, next_cursor) = match close_brace_idx {
        Some(idx) => (idx, idx + 1, pos + 1),
        None => (tokens.len(), tokens.len(), significant.len()),
    };

    let decl = FunctionDecl {
        name: tokens[name_idx].text.clone(),
        outer: type_idx..outer_end,
        body: open_brace_idx + 1..body_end,
        params: open_paren_idx + 1..significant[close_paren_pos],
    };
    Some((decl, next_cursor))
}
