#[cfg(test)]
mod tests {
    use crate::blend::{BlendMode, BLEND_MODES_CHUNK};

    const EPS: f64 = 1e-9;

    #[test]
    fn test_every_mode_function_exists_in_library() {
        for mode in BlendMode::ALL {
            let signature = format!("vec4 {}(", mode.function_name());
            assert!(
                BLEND_MODES_CHUNK.contains(&signature),
                "missing GLSL for {}",
                mode
            );
        }
    }

    #[test]
    fn test_normal_maps_to_alpha_blend() {
        assert_eq!(BlendMode::Normal.function_name(), "lamina_blend_alpha");
        assert_eq!(BlendMode::default(), BlendMode::Normal);
    }

    #[test]
    fn test_parse_and_display() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.as_str().parse::<BlendMode>().unwrap(), mode);
            assert_eq!(mode.to_string(), mode.as_str());
        }
        let err = "burn".parse::<BlendMode>().unwrap_err();
        assert_eq!(err.code(), "L-ERR-VALUE-001");
    }

    #[test]
    fn test_divide_by_zero_saturates() {
        assert_eq!(BlendMode::Divide.blend_channel(0.4, 0.0), 1.0);
        assert!((BlendMode::Divide.blend_channel(0.2, 0.4) - 0.5).abs() < EPS);
        assert_eq!(BlendMode::Divide.blend_channel(0.8, 0.4), 1.0);
    }

    #[test]
    fn test_reflect_at_one_saturates() {
        assert_eq!(BlendMode::Reflect.blend_channel(0.3, 1.0), 1.0);
        assert!((BlendMode::Reflect.blend_channel(0.5, 0.5) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_normal_clamps_opacity_to_incoming_alpha() {
        let base = [0.0, 0.0, 0.0, 1.0];
        let incoming = [1.0, 1.0, 1.0, 0.25];
        let out = BlendMode::Normal.apply(base, incoming, 1.0);
        for channel in &out[..3] {
            assert!((channel - 0.25).abs() < EPS);
        }
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_non_normal_modes_use_given_opacity() {
        let base = [0.5, 0.5, 0.5, 1.0];
        let incoming = [0.25, 0.25, 0.25, 0.0];
        let out = BlendMode::Add.apply(base, incoming, 1.0);
        assert!((out[0] - 0.75).abs() < EPS);
    }

    #[test]
    fn test_screen_and_multiply_are_commutative() {
        for (x, y) in [(0.1, 0.7), (0.5, 0.5), (0.9, 0.2)] {
            for mode in [BlendMode::Screen, BlendMode::Multiply] {
                let a = mode.blend_channel(x, y);
                let b = mode.blend_channel(y, x);
                assert!((a - b).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_results_stay_in_unit_range() {
        let samples = [0.0, 0.1, 0.5, 0.9, 1.0];
        for mode in BlendMode::ALL {
            for x in samples {
                for y in samples {
                    let z = mode.blend_channel(x, y);
                    assert!((0.0..=1.0).contains(&z), "{} gave {} for ({}, {})", mode, z, x, y);
                }
            }
        }
    }
}
