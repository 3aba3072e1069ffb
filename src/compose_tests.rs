#[cfg(test)]
mod tests {
    use crate::blend::BlendMode;
    use crate::compose::{compose, merge_uniforms};
    use crate::definition::LayerDefinition;
    use crate::hooks::Hook;
    use crate::kinds::LayerKind;
    use crate::layer::{Layer, LayerOverrides, ProcessedPart};
    use crate::material::{Lighting, Material, MaterialOptions};
    use crate::property::UniformTable;
    use crate::validate::LaminaError;
    use crate::value::{Color, Value};

    fn color_layer(id: &str, mode: BlendMode) -> Layer {
        Layer::new(&LayerKind::Color, LayerOverrides::new().id(id).mode(mode)).unwrap()
    }

    fn occurrences(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    fn mark_steps(layer: &mut Layer) {
        layer.rebuild_on_set("steps");
    }

    fn inline_steps(layer: &mut Layer) {
        let steps = layer.get("steps").and_then(|v| v.as_f64()).unwrap_or(0.0);
        layer.replace_processed(ProcessedPart::Fragment, "lamina_steps_template", &format!("{:.1}", steps));
    }

    fn stepped_layer(id: &str) -> Layer {
        let def = LayerDefinition::builder("Stepped")
            .default("u_steps", 2.0)
            .fragment("void main() { vec4 f_c = vec4(vec3(lamina_steps_template), 1.); return f_c; }")
            .on_uniforms_parse(Hook::new("mark_steps", mark_steps))
            .on_shader_parse(Hook::new("inline_steps", inline_steps))
            .build()
            .unwrap();
        Layer::from_definition(&def, LayerOverrides::new().id(id)).unwrap()
    }

    fn index_of(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("'{}' not found", needle))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMPOSE
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_program_skeleton() {
        let program = compose(&[], &UniformTable::new());
        assert!(program
            .fragment_source
            .contains("vec4 lamina_finalColor = vec4(u_lamina_color, u_lamina_alpha);"));
        assert!(program.fragment_source.contains("uniform vec3 u_lamina_color;"));
        assert!(program.fragment_source.contains("csm_DiffuseColor = lamina_finalColor;"));
        assert!(program.fragment_source.contains("vec4 lamina_blend_alpha("));
        assert!(program.vertex_source.contains("vec3 lamina_finalPosition = position;"));
        assert!(program.vertex_source.contains("csm_Position = lamina_finalPosition;"));
        assert!(program.vertex_source.contains("csm_Normal = lamina_finalNormal;"));
        assert!(!program.vertex_source.contains("lamina_blend_alpha"));
    }

    #[test]
    fn test_layer_order_is_blend_order() {
        let layers = vec![
            color_layer("A1", BlendMode::Normal),
            color_layer("B1", BlendMode::Add),
        ];
        let program = compose(&layers, &UniformTable::new());
        let a = index_of(&program.fragment_source, "lamina_blend_alpha(lamina_finalColor, vec4(u_A1_color");
        let b = index_of(&program.fragment_source, "lamina_blend_add(lamina_finalColor, vec4(u_B1_color");
        assert!(a < b);

        let reversed: Vec<Layer> = layers.into_iter().rev().collect();
        let swapped = compose(&reversed, &UniformTable::new());
        assert_ne!(swapped.fragment_source, program.fragment_source);
        let a = index_of(&swapped.fragment_source, "vec4(u_A1_color");
        let b = index_of(&swapped.fragment_source, "vec4(u_B1_color");
        assert!(b < a);
    }

    #[test]
    fn test_invisible_layers_contribute_nothing() {
        let mut hidden = color_layer("B1", BlendMode::Add);
        hidden.set_visible(false).unwrap();
        let layers = vec![color_layer("A1", BlendMode::Normal), hidden];

        let program = compose(&layers, &UniformTable::new());
        assert!(!program.fragment_source.contains("u_B1_color"));
        assert!(!program.uniforms.contains_key("u_B1_color"));
        assert!(program.uniforms.contains_key("u_A1_color"));
    }

    #[test]
    fn test_base_uniforms_merge_last() {
        let layers = vec![color_layer("A1", BlendMode::Normal)];
        let mut base = UniformTable::new();
        base.insert("u_lamina_alpha".to_string(), Value::Number(1.0));
        base.insert("u_A1_alpha".to_string(), Value::Number(0.25));

        let merged = merge_uniforms(&layers, &base);
        assert_eq!(merged["u_A1_alpha"], Value::Number(0.25));
        assert_eq!(merged["u_lamina_alpha"], Value::Number(1.0));
        assert!(merged.contains_key("u_A1_color"));
    }

    #[test]
    fn test_variables_precede_main() {
        let layers = vec![Layer::new(&LayerKind::Noise, LayerOverrides::new().id("N1")).unwrap()];
        let program = compose(&layers, &UniformTable::new());
        let decl = index_of(&program.fragment_source, "uniform vec3 u_N1_colorA;");
        let main = index_of(&program.fragment_source, "void main()");
        assert!(decl < main);
        assert!(program.vertex_source.contains("v_N1_position = position;"));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MATERIAL
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_material_defaults() {
        let material = Material::new(MaterialOptions::default()).unwrap();
        assert_eq!(material.name(), "LayerMaterial");
        assert_eq!(material.lighting(), Lighting::Basic);
        assert_eq!(material.alpha(), 1.0);
        assert_eq!(
            material.program().uniforms["u_lamina_color"],
            Value::Color(Color::from_hex(0xffffff).to_linear())
        );
    }

    #[test]
    fn test_material_rejects_bad_color() {
        let options = MaterialOptions {
            color: Some("not-a-color".to_string()),
            ..Default::default()
        };
        assert_eq!(Material::new(options).unwrap_err().code(), "L-ERR-VALUE-001");
    }

    #[test]
    fn test_non_uniform_change_recomposes() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        let id = material.add_layer(color_layer("M1", BlendMode::Normal)).unwrap();
        assert!(material.program().fragment_source.contains("lamina_blend_alpha(lamina_finalColor, vec4(u_M1_color"));

        material.set_layer_property(&id, "mode", "multiply").unwrap();
        assert!(material
            .program()
            .fragment_source
            .contains("lamina_blend_multiply(lamina_finalColor, vec4(u_M1_color"));
    }

    #[test]
    fn test_uniform_change_pushes_value_only() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        let id = material.add_layer(color_layer("M2", BlendMode::Normal)).unwrap();
        let fragment = material.program().fragment_source.clone();

        material.set_layer_property(&id, "alpha", 0.3).unwrap();
        assert_eq!(material.program().fragment_source, fragment);
        assert_eq!(material.program().uniforms["u_M2_alpha"], Value::Number(0.3));
    }

    #[test]
    fn test_visibility_through_material() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        let id = material.add_layer(color_layer("M3", BlendMode::Normal)).unwrap();
        material
            .with_layer_mut(&id, |layer| layer.set_visible(false))
            .unwrap()
            .unwrap();
        assert!(!material.program().fragment_source.contains("u_M3_color"));
        assert!(!material.program().uniforms.contains_key("u_M3_color"));
    }

    #[test]
    fn test_unknown_layer_id() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        let err = material.set_layer_property("ghost", "alpha", 1.0).unwrap_err();
        assert_eq!(err.code(), "L-ERR-LAYER-001");
        assert!(material.remove_layer("ghost").is_none());
        assert!(!material.move_layer("ghost", 0));
    }

    #[test]
    fn test_stack_operations() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        material.add_layer(color_layer("S1", BlendMode::Normal)).unwrap();
        material.add_layer(color_layer("S2", BlendMode::Add)).unwrap();
        material.insert_layer(0, color_layer("S0", BlendMode::Screen)).unwrap();

        let ids: Vec<&str> = material.layers().iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["S0", "S1", "S2"]);

        assert!(material.move_layer("S0", 10));
        let ids: Vec<&str> = material.layers().iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["S1", "S2", "S0"]);
        let fragment = &material.program().fragment_source;
        assert!(index_of(fragment, "vec4(u_S2_color") < index_of(fragment, "vec4(u_S0_color"));

        let removed = material.remove_layer("S1").unwrap();
        assert_eq!(removed.id(), "S1");
        assert!(!material.program().fragment_source.contains("u_S1_color"));
    }

    #[test]
    fn test_removed_layer_no_longer_notifies() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        material.add_layer(color_layer("R1", BlendMode::Normal)).unwrap();
        let mut removed = material.remove_layer("R1").unwrap();
        removed.set_blend_mode(BlendMode::Add).unwrap();
        material.refresh();
        assert!(!material.program().fragment_source.contains("u_R1_color"));
    }

    #[test]
    fn test_base_color_and_alpha() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        material.set_color("#ff0000").unwrap();
        material.set_alpha(0.5);
        material.set_lighting(Lighting::Phong);

        let uniforms = &material.program().uniforms;
        assert_eq!(
            uniforms["u_lamina_color"],
            Value::Color(Color::from_hex(0xff0000).to_linear())
        );
        assert_eq!(uniforms["u_lamina_alpha"], Value::Number(0.5));
        assert_eq!(material.lighting(), Lighting::Phong);
        assert_eq!("standard".parse::<Lighting>().unwrap(), Lighting::Standard);
    }

    #[test]
    fn test_duplicate_layer_id_rejected() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        let red = Layer::new(&LayerKind::Color, LayerOverrides::new().id("A").set("color", "red")).unwrap();
        let blue = Layer::new(&LayerKind::Color, LayerOverrides::new().id("A").set("color", "blue")).unwrap();

        material.add_layer(red).unwrap();
        let err = material.add_layer(blue).unwrap_err();
        assert!(matches!(err, LaminaError::DuplicateLayer(ref id) if id == "A"));
        assert_eq!(err.code(), "L-ERR-LAYER-002");

        assert_eq!(material.layers().len(), 1);
        assert_eq!(
            material.program().uniforms["u_A_color"],
            Value::Color(Color::from_hex(0xff0000))
        );
        assert_eq!(occurrences(&material.program().fragment_source, "uniform vec3 u_A_color;"), 1);
    }

    #[test]
    fn test_with_layers_rejects_shared_id() {
        let layers = vec![
            color_layer("Dup", BlendMode::Normal),
            color_layer("Dup", BlendMode::Add),
        ];
        let err = Material::with_layers(MaterialOptions::default(), layers).unwrap_err();
        assert_eq!(err.code(), "L-ERR-LAYER-002");
    }

    #[test]
    fn test_marked_uniform_write_recomposes() {
        let mut material = Material::new(MaterialOptions::default()).unwrap();
        let id = material.add_layer(stepped_layer("P1")).unwrap();
        assert!(material.program().fragment_source.contains("vec4(vec3(2.0), 1.)"));

        material.set_layer_property(&id, "steps", 5.0).unwrap();
        let fragment = &material.program().fragment_source;
        assert!(fragment.contains("vec4(vec3(5.0), 1.)"));
        assert!(!fragment.contains("vec3(2.0)"));
        assert_eq!(material.program().uniforms["u_P1_steps"], Value::Number(5.0));
    }

    #[test]
    fn test_exported_alpha_is_rounded() {
        let options = MaterialOptions {
            alpha: Some(0.3333),
            ..Default::default()
        };
        let material = Material::new(options).unwrap();
        assert_eq!(material.options().alpha, Some(0.33));
        assert_eq!(material.program().uniforms["u_lamina_alpha"], Value::Number(0.3333));
    }
}
