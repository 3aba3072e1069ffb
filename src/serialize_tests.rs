#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use crate::blend::BlendMode;
    use crate::hooks::HookRegistry;
    use crate::kinds::LayerKind;
    use crate::layer::{Layer, LayerOverrides};
    use crate::loader::{discover_files, load_directory, load_file};
    use crate::material::{Lighting, Material, MaterialOptions};
    use crate::serialize::{export_layer, export_material, import_str, Imported, FORMAT_VERSION};
    use crate::validate::LaminaError;
    use crate::value::{round_to_two, Value};

    fn depth_layer() -> Layer {
        let mut layer = Layer::new(&LayerKind::Depth, LayerOverrides::new().id("D1")).unwrap();
        layer.set("mapping", "camera").unwrap();
        layer.set("near", 4.0).unwrap();
        layer.set("colorA", "#00ff00").unwrap();
        layer
    }

    fn import_layer_json(json: &str) -> Layer {
        match import_str(json, &HookRegistry::with_builtins()).unwrap() {
            Imported::Layer(layer) => layer,
            other => panic!("expected a layer, got {:?}", other),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lamina-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LAYERS
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_layer_file_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&export_layer(&depth_layer()).unwrap()).unwrap();

        assert_eq!(json["metadata"]["type"], "layer");
        assert_eq!(json["metadata"]["version"], FORMAT_VERSION);
        let base = &json["base"];
        assert_eq!(base["constructor"], "Depth");
        assert_eq!(base["functions"]["onShaderParse"], "depth");
        assert_eq!(base["uniforms"]["colorA"], "#ffffff");
        assert_eq!(base["uniforms"]["origin"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(base["nonUniforms"]["mapping"], "vector");
        assert_eq!(base["currents"]["mapping"], "camera");
        assert_eq!(base["currents"]["near"], 4.0);
        assert_eq!(base["currents"]["colorA"], "#00ff00");
        assert!(base["fragment"].as_str().unwrap().contains("lamina_mapping_template"));
    }

    #[test]
    fn test_numbers_round_half_up() {
        assert_eq!(round_to_two(0.125), 0.13);
        assert_eq!(round_to_two(-0.125), -0.12);
        assert_eq!(round_to_two(-1.005), -1.0);
        assert_eq!(round_to_two(0.29), 0.29);
        assert_eq!(Value::Number(-0.125).to_json(), serde_json::json!(-0.12));
        assert_eq!(
            Value::Vec2([-0.125, 0.125]).to_json(),
            serde_json::json!([-0.12, 0.13])
        );
    }

    #[test]
    fn test_layer_round_trip_preserves_hash() {
        let original = depth_layer();
        let restored = import_layer_json(&export_layer(&original).unwrap());

        assert_eq!(restored.kind(), "Depth");
        assert_ne!(restored.id(), original.id());
        assert_eq!(restored.hash(), original.hash());
        assert_eq!(restored.get("mapping"), original.get("mapping"));
        assert!(restored
            .processed()
            .fragment
            .contains("cameraPosition"));
    }

    #[test]
    fn test_unknown_hook_still_loads() {
        let mut file = depth_layer().to_file();
        file.base.functions.on_shader_parse = Some("mystery".to_string());
        let json = serde_json::to_string(&file).unwrap();

        let restored = import_layer_json(&json);
        assert!(restored.hooks().on_shader_parse.is_none());
        assert!(restored.processed().fragment.contains("lamina_mapping_template"));
    }

    #[test]
    fn test_invalid_currents_are_skipped() {
        let mut file = depth_layer().to_file();
        file.base
            .currents
            .insert("bogus".to_string(), serde_json::json!(1));
        file.base
            .currents
            .insert("mode".to_string(), serde_json::json!("burn"));
        let json = serde_json::to_string(&file).unwrap();

        let restored = import_layer_json(&json);
        assert_eq!(restored.blend_mode(), BlendMode::Normal);
        assert!(restored.get("bogus").is_none());
        assert_eq!(restored.get("near"), depth_layer().get("near"));
    }

    #[test]
    fn test_runtime_uniforms_survive_round_trip() {
        let mut shader = Layer::new(&LayerKind::Shader, LayerOverrides::new()).unwrap();
        shader.register_uniform("time", 1.5).unwrap();
        shader.set_fragment_source("uniform float u_time;\nvoid main() { return vec4(u_time); }");

        let restored = import_layer_json(&export_layer(&shader).unwrap());
        assert_eq!(restored.hash(), shader.hash());
        let key = format!("u_{}_time", restored.id());
        assert!(restored.uniforms().contains_key(&key));
        assert!(restored.processed().fragment.contains(&key));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MATERIALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn sample_material() -> Material {
        let options = MaterialOptions {
            color: Some("#336699".to_string()),
            alpha: Some(0.5),
            lighting: Some(Lighting::Phong),
            name: None,
        };
        let mut material = Material::new(options).unwrap();
        material.add_layer(depth_layer()).unwrap();
        material
            .add_layer(
                Layer::new(
                    &LayerKind::Noise,
                    LayerOverrides::new().mode(BlendMode::Multiply).set("type", "simplex"),
                )
                .unwrap(),
            )
            .unwrap();
        material
    }

    #[test]
    fn test_material_round_trip() {
        let material = sample_material();
        let json = export_material(&material).unwrap();
        let restored = match import_str(&json, &HookRegistry::with_builtins()).unwrap() {
            Imported::Material(material) => material,
            other => panic!("expected a material, got {:?}", other),
        };

        assert_eq!(restored.lighting(), Lighting::Phong);
        assert_eq!(restored.alpha(), 0.5);
        assert_eq!(restored.color().to_hex(), "#336699");
        assert_eq!(restored.layers().len(), 2);
        for (a, b) in material.layers().iter().zip(restored.layers()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.hash(), b.hash());
        }
        assert!(restored
            .program()
            .fragment_source
            .contains("lamina_blend_multiply("));
        assert!(restored.program().fragment_source.contains("lamina_noise_simplex("));
    }

    #[test]
    fn test_material_file_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&export_material(&sample_material()).unwrap()).unwrap();
        assert_eq!(json["metadata"]["type"], "mat");
        assert_eq!(json["base"]["constructor"], "LayerMaterial");
        assert_eq!(json["base"]["currents"]["lighting"], "phong");
        assert_eq!(json["layers"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unsupported_and_malformed_files() {
        let registry = HookRegistry::with_builtins();

        let err = import_str(r#"{"metadata":{"version":1,"type":"scene"}}"#, &registry).unwrap_err();
        assert!(matches!(err, LaminaError::UnsupportedFile(ref t) if t == "scene"));
        assert_eq!(err.code(), "L-ERR-FILE-001");

        let err = import_str(r#"{"base":{}}"#, &registry).unwrap_err();
        assert!(matches!(err, LaminaError::UnsupportedFile(_)));

        let err = import_str("{ not json", &registry).unwrap_err();
        assert_eq!(err.code(), "L-ERR-JSON-001");
    }

    #[test]
    fn test_builtin_registry_contents() {
        let registry = HookRegistry::with_builtins();
        assert_eq!(registry.len(), 4);
        for name in ["depth", "noise", "gradient", "displace"] {
            assert!(registry.resolve(name).is_some());
        }
        assert!(HookRegistry::new().resolve("depth").is_none());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOADER
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_load_directory_skips_broken_files() {
        let dir = scratch_dir("load");
        let nested = dir.join("nested");
        fs::create_dir_all(&nested).unwrap();

        fs::write(dir.join("a.json"), export_material(&sample_material()).unwrap()).unwrap();
        fs::write(nested.join("b.json"), export_layer(&depth_layer()).unwrap()).unwrap();
        fs::write(dir.join("broken.json"), "{ nope").unwrap();
        fs::write(dir.join("notes.txt"), "not a lamina file").unwrap();

        let files = discover_files(&dir);
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| p.extension().unwrap() == "json"));

        let registry = HookRegistry::with_builtins();
        let loaded = load_directory(&dir, &registry);
        assert_eq!(loaded.len(), 2);
        assert!(loaded
            .iter()
            .any(|(_, imported)| matches!(imported, Imported::Material(_))));
        assert!(loaded
            .iter()
            .any(|(_, imported)| matches!(imported, Imported::Layer(_))));

        let err = load_file(&dir.join("missing.json"), &registry).unwrap_err();
        assert_eq!(err.code(), "L-ERR-IO-001");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = std::env::temp_dir().join("lamina-does-not-exist-3f9a");
        assert!(load_directory(&dir, &HookRegistry::with_builtins()).is_empty());
    }
}
