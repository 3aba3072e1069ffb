#[cfg(test)]
mod tests {
    use crate::blend::BlendMode;
    use crate::functions::{extract_main, find_functions};
    use crate::lexer::{stringify, tokenize};
    use crate::renamer::{descope, LayerRenamer};
    use crate::transform::{final_assignment, process_final, ShaderStage};
    use proptest::prelude::*;

    fn descoped(source: &str, id: &str) -> String {
        let renamer = LayerRenamer::new(id);
        stringify(&descope(&tokenize(source), |n| renamer.rename(n)))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DESCOPE
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_descope_namespaces_prefixed_identifiers() {
        let out = descoped("uniform float u_alpha; varying vec3 v_pos; float f_x;", "L1");
        assert_eq!(
            out,
            "uniform float u_L1_alpha; varying vec3 v_L1_pos; float f_L1_x;"
        );
    }

    #[test]
    fn test_descope_leaves_other_names_alone() {
        let source = "lamina_finalColor = mix(color, uv_coord, position); // u_comment";
        assert_eq!(descoped(source, "L1"), source);
    }

    #[test]
    fn test_descope_is_case_sensitive() {
        assert_eq!(descoped("U_alpha F_x", "L1"), "U_alpha F_x");
    }

    #[test]
    fn test_uniform_key() {
        let renamer = LayerRenamer::new("abc");
        assert_eq!(renamer.uniform_key("color"), "u_abc_color");
        assert!(renamer.is_namespaced("f_abc_x"));
        assert!(!renamer.is_namespaced("f_x"));
        assert!(!renamer.is_namespaced("f_abcd_x"));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXTRACT MAIN
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_extract_main_splits_variables_and_body() {
        let source = "uniform float u_a;\nvoid main() {\n  gl_FragColor = vec4(u_a);\n}\n";
        let extracted = extract_main(&tokenize(source));
        assert_eq!(extracted.variables, "uniform float u_a;\n");
        assert_eq!(extracted.body, "\n  gl_FragColor = vec4(u_a);\n");
    }

    #[test]
    fn test_extract_main_keeps_helper_functions_as_variables() {
        let source = "vec3 helper(vec3 p) { return p * 2.0; }\nvoid main() { return vec4(helper(vec3(1.)), 1.); }";
        let extracted = extract_main(&tokenize(source));
        assert!(extracted.variables.contains("vec3 helper(vec3 p) { return p * 2.0; }"));
        assert_eq!(extracted.body.trim(), "return vec4(helper(vec3(1.)), 1.);");
    }

    #[test]
    fn test_extract_main_handles_nested_braces() {
        let source = "void main() { if (true) { x = 1; } else { x = 2; } }";
        let extracted = extract_main(&tokenize(source));
        assert_eq!(extracted.body.trim(), "if (true) { x = 1; } else { x = 2; }");
    }

    #[test]
    fn test_extract_main_missing_main_is_empty() {
        let extracted = extract_main(&tokenize("uniform float u_a;\nfloat helper() { return 1.; }"));
        assert_eq!(extracted.variables, "");
        assert_eq!(extracted.body, "");
    }

    #[test]
    fn test_extract_main_first_definition_wins() {
        let source = "void main() { a = 1; }\nvoid main() { b = 2; }";
        let extracted = extract_main(&tokenize(source));
        assert_eq!(extracted.body.trim(), "a = 1;");
    }

    #[test]
    fn test_find_functions_skips_prototypes() {
        let source = "float noise(vec3 p);\nfloat noise(vec3 p) { return 0.; }\nvoid main() {}";
        let names: Vec<String> = find_functions(&tokenize(source))
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["noise", "main"]);
    }

    #[test]
    fn test_extract_main_unbalanced_body_runs_to_end() {
        let extracted = extract_main(&tokenize("void main() { x = 1;"));
        assert_eq!(extracted.body.trim(), "x = 1;");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RETURN REWRITING
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_fragment_return_becomes_blend_assignment() {
        let out = process_final(
            "\n  return vec4(u_L1_color, u_L1_alpha);\n",
            ShaderStage::Fragment,
            "L1",
            BlendMode::Normal,
        );
        assert!(!out.contains("return"));
        assert!(out.ends_with(
            "lamina_finalColor = lamina_blend_alpha(lamina_finalColor, vec4(u_L1_color, u_L1_alpha), vec4(u_L1_color, u_L1_alpha).a);"
        ));
    }

    #[test]
    fn test_single_line_body() {
        let out = process_final("float f_x = 1.; return vec4(f_x);", ShaderStage::Fragment, "A", BlendMode::Add);
        assert_eq!(
            out,
            "float f_A_x = 1.;\nlamina_finalColor = lamina_blend_add(lamina_finalColor, vec4(f_A_x), vec4(f_A_x).a);"
        );
    }

    #[test]
    fn test_vertex_return_assigns_position() {
        let out = process_final("\n  return position * 2.0;\n", ShaderStage::Vertex, "V", BlendMode::Multiply);
        assert!(out.ends_with("lamina_finalPosition = position * 2.0;"));
        assert!(!out.contains("lamina_blend"));
    }

    #[test]
    fn test_last_return_wins() {
        let out = process_final(
            "if (x > 0.) {\n  return vec4(1.);\n}\nreturn vec4(0.);",
            ShaderStage::Fragment,
            "L",
            BlendMode::Normal,
        );
        assert!(!out.contains("return"));
        assert!(out.ends_with("lamina_blend_alpha(lamina_finalColor, vec4(0.), vec4(0.).a);"));
    }

    #[test]
    fn test_body_without_return_is_unchanged() {
        let body = "\n  v_L1_uv = uv;\n";
        assert_eq!(process_final(body, ShaderStage::Vertex, "L1", BlendMode::Normal), body);
    }

    #[test]
    fn test_namespaced_locals_are_not_renamed_twice() {
        let out = process_final(" f_L1_x = 1.;", ShaderStage::Fragment, "L1", BlendMode::Normal);
        assert_eq!(out, " f_L1_x = 1.;");
    }

    #[test]
    fn test_final_assignment_uses_mode_function() {
        for mode in BlendMode::ALL {
            let out = final_assignment(ShaderStage::Fragment, "c", mode);
            assert_eq!(
                out,
                format!("lamina_finalColor = {}(lamina_finalColor, c, c.a);", mode.function_name())
            );
        }
    }

    proptest! {
        #[test]
        fn prop_distinct_ids_give_disjoint_names(
            name in "[a-zA-Z][a-zA-Z0-9]{0,8}",
            a in "[a-z][a-z0-9]{0,5}",
            b in "[a-z][a-z0-9]{0,5}",
        ) {
            prop_assume!(a != b);
            let source = format!("uniform float u_{0}; varying vec3 v_{0}; float f_{0};", name);
            let left = descoped(&source, &a);
            let right = descoped(&source, &b);
            for prefix in ["u_", "v_", "f_"] {
                let renamed_a = format!("{}{}_{}", prefix, a, name);
                let renamed_b = format!("{}{}_{}", prefix, b, name);
                prop_assert!(left.contains(&renamed_a));
                prop_assert!(right.contains(&renamed_b));
                prop_assert_ne!(renamed_a, renamed_b);
            }
        }
    }
}
