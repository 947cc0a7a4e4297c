//! Tests for routine bodies, backends and the generator.

use super::*;
use crate::config::GeneratorConfig;
use crate::cpu::Microarchitecture as M;
use crate::kernels::{self, core::ADD_V32F_V32F_V32F};
use crate::schedule::TARGETS;

fn spec(identity: &str) -> &'static KernelSpec {
    kernels::find(identity).unwrap().spec()
}

// =========================================================================
// RoutineBody
// =========================================================================

#[test]
fn test_every_kernel_builds_on_every_target() {
    for microarch in TARGETS {
        let bodies = Generator::bodies(microarch).unwrap();
        assert_eq!(bodies.len(), kernels::catalog().len());
        for body in &bodies {
            assert!(body.batch() > 0, "{} on {microarch}", body.identity);
            assert!(body.steady_state().count() > 0);
        }
    }
}

#[test]
fn test_shapes_follow_the_signature() {
    let cases = [
        ("Core_Add_V32fV32f_V32f", KernelShape::Binary),
        ("Core_Add_V8sV8s_V16s", KernelShape::Widening),
        ("Core_Multiply_V64fS64f_V64f", KernelShape::Unary),
        ("Core_Subtract_S32sV32s_V32s", KernelShape::Unary),
        ("Core_Add_IV64fV64f_IV64f", KernelShape::Binary),
        ("Core_Sum_V32f_S32f", KernelShape::Reduce),
        ("Core_MinMax_V8u_S8uS8u", KernelShape::Reduce),
        ("Core_DotProduct_V64fV64f_S64f", KernelShape::DotReduce),
        ("Math_Exp_V64f_V64f", KernelShape::Transcendental),
        ("Math_EvaluatePolynomial_V64fV64f_V64f", KernelShape::Transcendental),
    ];
    for (identity, shape) in cases {
        let body = RoutineBody::build(spec(identity), M::Nehalem).unwrap();
        assert_eq!(body.shape, shape, "{identity}");
        assert_eq!(body.combine.is_some(), shape.is_reduction(), "{identity}");
    }
}

#[test]
fn test_bindings_and_anchor() {
    let body = RoutineBody::build(spec("Core_Subtract_S32sV32s_V32s"), M::Haswell).unwrap();
    assert_eq!(body.bindings.broadcast, [Operand::X]);
    assert_eq!(body.bindings.name(Operand::Y), "y");
    assert_eq!(body.anchor, "z");

    let widening = RoutineBody::build(spec("Core_Multiply_V16uV16u_V32u"), M::K10).unwrap();
    assert_eq!(widening.anchor, "x");
    assert_eq!(widening.input_element, ElementType::U16);
    assert_eq!(widening.element, ElementType::U32);

    let poly = RoutineBody::build(spec("Math_EvaluatePolynomial_V32fV32f_V32f"), M::CortexA15).unwrap();
    assert_eq!(poly.coefficients.as_deref(), Some("coef"));
    assert_eq!(poly.bindings.name(Operand::X), "x");

    let in_place = RoutineBody::build(spec("Core_Add_IV32fS32f_IV32f"), M::Haswell).unwrap();
    assert_eq!(in_place.bindings.name(Operand::Z), "x");
}

#[test]
fn test_checks_follow_prototype_order() {
    let body = RoutineBody::build(spec("Math_EvaluatePolynomial_V64fV64f_V64f"), M::Haswell).unwrap();
    assert_eq!(
        body.checks,
        [
            Check::NonNull { name: "coef".into() },
            Check::Aligned { name: "coef".into(), bytes: 8 },
            Check::NonNull { name: "x".into() },
            Check::Aligned { name: "x".into(), bytes: 8 },
            Check::NonNull { name: "y".into() },
            Check::Aligned { name: "y".into(), bytes: 8 },
            Check::NonZero { name: "coef_count".into() },
        ]
    );
    assert!(!body.requires_elements());

    let bytes = RoutineBody::build(spec("Core_Add_V8uV8u_V8u"), M::Haswell).unwrap();
    assert!(!bytes.checks.iter().any(|c| matches!(c, Check::Aligned { .. })));

    let min = RoutineBody::build(spec("Core_Min_V32f_S32f"), M::Haswell).unwrap();
    assert!(min.requires_elements());
}

// =========================================================================
// Backends
// =========================================================================

#[test]
fn test_backend_support_follows_architecture() {
    assert!(X86Backend.supports(M::Haswell));
    assert!(!X86Backend.supports(M::CortexA9));
    assert!(NeonBackend.supports(M::CortexA15));
    assert!(!NeonBackend.supports(M::K10));
    assert!(TARGETS.iter().all(|&m| PortableBackend.supports(m)));
    assert_eq!("NEON".parse::<BackendKind>().unwrap(), BackendKind::Neon);
    assert!("sparc".parse::<BackendKind>().is_err());
}

#[test]
fn test_x86_listing_sections() {
    let body = RoutineBody::build(ADD_V32F_V32F_V32F.spec(), M::Haswell).unwrap();
    let text = X86Backend.render(&body);
    assert!(text.starts_with("# Core_Add_V32fV32f_V32f (Haswell)"));
    for label in ["align", "ramp_up", "steady", "ramp_down", "tail"] {
        assert!(text.contains(&format!(".LCore_Add_V32fV32f_V32f_{label}:")), "{label}");
    }
    assert!(text.contains("vaddps %ymm_y0, %ymm_x0, %ymm_z0"));
    assert!(text.contains("vzeroupper"));
    assert!(!text.contains("_combine:"));
    assert_eq!(
        text.matches("vaddps").count(),
        body.ramp_up().chain(body.steady_state()).chain(body.ramp_down())
            .filter(|op| matches!(op, MicroOp::Compute { .. }))
            .count()
    );
}

#[test]
fn test_sse_listing_uses_two_operand_forms() {
    let body = RoutineBody::build(spec("Core_Max_V16sV16s_V16s"), M::Nehalem).unwrap();
    let text = X86Backend.render(&body);
    assert!(text.contains("pmaxsw"));
    assert!(text.contains("%xmm_"));
    assert!(!text.contains("vzeroupper"));
}

#[test]
fn test_reduction_listings_combine_accumulators() {
    let body = RoutineBody::build(spec("Core_DotProduct_V32fV32f_S32f"), M::Haswell).unwrap();
    let text = X86Backend.render(&body);
    assert!(text.contains("_combine:"));
    assert!(text.contains("vfmadd231ps"));
    assert!(text.contains("(%result)"));

    let neon = RoutineBody::build(spec("Core_MinMax_V32s_S32sS32s"), M::CortexA9).unwrap();
    let text = NeonBackend.render(&neon);
    assert!(text.contains("vmin.s32"));
    assert!(text.contains("vmax.s32"));
    assert!(text.contains("[minimum]"));
    assert!(text.contains("[maximum]"));
}

#[test]
fn test_missing_instructions_call_helpers() {
    let body = RoutineBody::build(spec("Core_Multiply_V64uV64u_V64u"), M::Nehalem).unwrap();
    assert!(X86Backend.render(&body).contains("call lanesmith_multiply_epi64"));
    let log = RoutineBody::build(spec("Math_Log_V64f_V64f"), M::CortexA15).unwrap();
    assert!(NeonBackend.render(&log).contains("bl lanesmith_log_f64"));
}

#[test]
fn test_portable_listing_is_readable() {
    let body = RoutineBody::build(spec("Core_Add_V8sV8s_V16s"), M::SandyBridge).unwrap();
    let text = PortableBackend.render(&body);
    assert!(text.contains("fn Core_Add_V8sV8s_V16s("));
    assert!(text.contains("if x.is_null() { return NullPointer }"));
    assert!(text.contains("x0 = x0.map(|e| e as i16)"));
    assert!(text.contains("steady:"));
}

// =========================================================================
// Generator
// =========================================================================

#[test]
fn test_generator_writes_listings_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        output_dir: dir.path().to_path_buf(),
        targets: vec!["Haswell".into(), "CortexA9".into()],
        backends: BackendKind::ALL.to_vec(),
        ..GeneratorConfig::default()
    };
    let report = Generator::new(config).run().unwrap();

    // x86 and NEON each support one target, portable both.
    assert_eq!(report.listings.len(), 4);
    assert_eq!(report.routines, 4 * kernels::catalog().len());
    for path in &report.listings {
        assert!(path.exists(), "{}", path.display());
    }
    assert!(dir.path().join("x86/haswell.s").exists());
    assert!(dir.path().join("neon/cortexa9.s").exists());
    assert!(dir.path().join("portable/haswell.txt").exists());

    let manifest_path = report.manifest.unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(manifest_path).unwrap()).unwrap();
    let kernels_json = json["kernels"].as_array().unwrap();
    assert_eq!(kernels_json.len(), kernels::catalog().len());
    let add = kernels_json
        .iter()
        .find(|k| k["identity"] == "Core_Add_V32sV32s_V32s")
        .unwrap();
    assert_eq!(add["schedules"].as_array().unwrap().len(), 2);
    assert_eq!(add["implementations"].as_array().unwrap().last().unwrap()["provenance"], "portable");
}

#[test]
fn test_manifest_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        output_dir: dir.path().join("nested"),
        targets: vec!["K10".into()],
        backends: vec![BackendKind::Neon],
        manifest: false,
        ..GeneratorConfig::default()
    };
    let report = Generator::new(config).run().unwrap();
    assert!(report.listings.is_empty());
    assert!(report.manifest.is_none());
    assert!(!dir.path().join("nested/manifest.json").exists());
}
