#[cfg(test)]
mod tests {
    use crate::lexer::{is_keyword, stringify, tokenize, TokenKind};
    use proptest::prelude::*;

    fn significant(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_layout() {
        let source = r#"
            #define PI 3.14159
            // comment with u_name inside
            uniform vec3 u_color; /* block
               comment */
            void main() {
                float f_x = 1.0e-3 + .5 + 0x1F + 2u;
                return vec4(u_color, 1.);
            }
        "#;
        assert_eq!(stringify(&tokenize(source)), source);
    }

    #[test]
    fn test_identifier_and_keyword_classification() {
        let tokens = significant("uniform vec3 u_color;");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "uniform".to_string()),
                (TokenKind::Keyword, "vec3".to_string()),
                (TokenKind::Identifier, "u_color".to_string()),
                (TokenKind::Operator, ";".to_string()),
            ]
        );
        assert!(is_keyword("sampler2D"));
        assert!(!is_keyword("lamina_finalColor"));
    }

    #[test]
    fn test_comments_are_trivia() {
        let tokens = tokenize("// u_a\n/* u_b */ u_c");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LineComment,
                TokenKind::Whitespace,
                TokenKind::BlockComment,
                TokenKind::Whitespace,
                TokenKind::Identifier,
            ]
        );
        assert!(tokens[0].is_trivia());
        assert!(tokens[2].is_trivia());
    }

    #[test]
    fn test_preprocessor_line_with_continuation() {
        let source = "#define MIX(a, b) \\\n  mix(a, b, 0.5)\nfloat x;";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Preprocessor);
        assert_eq!(tokens[0].text, "#define MIX(a, b) \\\n  mix(a, b, 0.5)");
        assert_eq!(stringify(&tokens), source);
    }

    #[test]
    fn test_multi_char_operators() {
        let ops: Vec<String> = significant("a += b << 2; c >>= d; e && f")
            .into_iter()
            .filter(|(k, _)| *k == TokenKind::Operator)
            .map(|(_, t)| t)
            .collect();
        assert_eq!(ops, vec!["+=", "<<", ";", ">>=", ";", "&&"]);
    }

    #[test]
    fn test_member_access_after_identifier() {
        let tokens = significant("v_position.axes_template");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], (TokenKind::Operator, ".".to_string()));
        assert_eq!(tokens[2].0, TokenKind::Identifier);
    }

    #[test]
    fn test_unterminated_input_degrades() {
        for source in ["/* never closed", "\"open string", "void main() {", "@ $ `"] {
            let tokens = tokenize(source);
            assert!(!tokens.is_empty());
            assert_eq!(stringify(&tokens), source);
        }
        assert_eq!(tokenize("@")[0].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_spans_index_source() {
        let source = "float f_x = 1.0;";
        for token in tokenize(source) {
            assert_eq!(&source[token.span.clone()], token.text);
        }
    }

    proptest! {
        #[test]
        fn prop_stringify_inverts_tokenize(source in "\\PC*") {
            prop_assert_eq!(stringify(&tokenize(&source)), source);
        }

        #[test]
        fn prop_glsl_like_round_trip(source in "[a-z_ (){};=+*/.0-9\n#\"]*") {
            prop_assert_eq!(stringify(&tokenize(&source)), source);
        }
    }
}
