//! Full-pipeline tests: JSON design in, complete source bundle out.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use blas2aie::codegen;

const DOT_DESIGN: &str = r#"{
    "platform": "xilinx_vck5000_gen4x8_qdma_2_202220_1",
    "kernels": [
        {
            "blas_op": "dot",
            "user_name": "d0",
            "type": "float",
            "vector_size": 8,
            "window_size": 128
        }
    ],
    "connections": []
}"#;

const CHAINED_DESIGN: &str = r#"{
    "platform": "xilinx_vck5000_gen4x8_qdma_2_202220_1",
    "profile": true,
    "kernels": [
        {
            "blas_op": "scal",
            "user_name": "s0",
            "type": "float",
            "vector_size": 8,
            "window_size": 256
        },
        {
            "blas_op": "axpy",
            "user_name": "a0",
            "type": "float",
            "vector_size": 8,
            "window_size": 256,
            "extra": {"alpha": 2},
            "tile": [10, 0]
        }
    ],
    "connections": [
        {"in": {"kernel": "s0", "parameter": "out"},
         "out": {"kernel": "a0", "parameter": "x"}}
    ]
}"#;

fn generate(json: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("design.json");
    fs::write(&json_path, json).unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();
    codegen(&json_path, &out).unwrap();
    dir
}

fn read(dir: &Path, rel: &str) -> String {
    fs::read_to_string(dir.join("out").join(rel))
        .unwrap_or_else(|_| panic!("missing artifact {}", rel))
}

#[test]
fn test_single_kernel_bundle() {
    let dir = generate(DOT_DESIGN);

    for rel in [
        "aie/kernels/d0.cpp",
        "aie/kernels/d0.hpp",
        "aie/graph.cpp",
        "aie/graph.hpp",
        "pl_kernels/d0_mm2s.cpp",
        "pl_kernels/d0_s2mm.cpp",
        "link.cfg",
        "CMakeLists.txt",
    ] {
        assert!(dir.path().join("out").join(rel).exists(), "missing {}", rel);
    }

    let kernel = read(dir.path(), "aie/kernels/d0.cpp");
    assert!(kernel.contains("#define NUM_SAMPLES 32"));
    assert!(kernel.contains("void d0("));
    assert!(kernel.contains("aie::reduce_add_v(result)"));

    let header = read(dir.path(), "aie/kernels/d0.hpp");
    assert!(header.starts_with("#pragma once\n"));
    assert!(header.contains("input_window<float> *__restrict x"));

    let graph = read(dir.path(), "aie/graph.hpp");
    assert!(graph.contains("class simpleGraph : public graph {"));
    assert!(graph.contains("d0k = kernel::create(d0);"));
    assert!(graph.contains("connect<window<128>> net0(d0_x.out[0], d0k.in[0]);"));
    assert!(graph.contains("source(d0k) = \"kernels/d0.cpp\";"));

    let config = read(dir.path(), "link.cfg");
    assert!(config.starts_with("platform=xilinx_vck5000_gen4x8_qdma_2_202220_1\n"));
    assert!(!config.contains("[profile]"));
    assert!(config.contains("nk=d0_mm2s:1:d0_mm2s"));
    assert!(config.contains("sc=d0_mm2s.stream_x:ai_engine_0.d0_x"));
    assert!(config.contains("sc=ai_engine_0.d0_out:d0_s2mm.stream_out"));

    let cmake = read(dir.path(), "CMakeLists.txt");
    assert!(cmake.contains("aie/kernels/d0.cpp"));
    assert!(cmake.contains("pl_kernels/d0_mm2s.cpp"));
}

#[test]
fn test_chained_kernels_share_no_bridge() {
    let dir = generate(CHAINED_DESIGN);
    let out = dir.path().join("out");

    // The s0 -> a0 edge is an on-fabric window, so neither side gets a
    // host bridge for it.
    assert!(out.join("pl_kernels/s0_mm2s.cpp").exists());
    assert!(!out.join("pl_kernels/s0_s2mm.cpp").exists());
    assert!(out.join("pl_kernels/a0_mm2s.cpp").exists());
    assert!(out.join("pl_kernels/a0_s2mm.cpp").exists());

    let graph = read(dir.path(), "aie/graph.hpp");
    assert!(graph.contains("connect<window<256>> net1(s0k.out[0], a0k.in[0]);"));
    assert!(!graph.contains("s0_out"));
    assert!(!graph.contains("a0_x ="));
    assert!(!graph.contains("a0_alpha"));
    assert!(graph.contains("location<kernel>(a0k) = tile(10, 0);"));

    // Immediate alpha disables a0's scalar port entirely.
    let kernel = read(dir.path(), "aie/kernels/a0.cpp");
    assert!(!kernel.contains("input_stream<float> *__restrict alpha"));
    assert!(!kernel.contains("alpha_storage"));

    let config = read(dir.path(), "link.cfg");
    assert!(config.contains("[profile]"));
    assert!(!config.contains("s0_s2mm"));
}

#[test]
fn test_generation_is_deterministic() {
    let first = generate(CHAINED_DESIGN);
    let second = generate(CHAINED_DESIGN);

    for rel in [
        "aie/kernels/s0.cpp",
        "aie/kernels/a0.cpp",
        "aie/graph.cpp",
        "aie/graph.hpp",
        "pl_kernels/a0_mm2s.cpp",
        "link.cfg",
        "CMakeLists.txt",
    ] {
        assert_eq!(
            read(first.path(), rel),
            read(second.path(), rel),
            "artifact {} differs between runs",
            rel
        );
    }
}

#[test]
fn test_unknown_peer_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("design.json");
    fs::write(
        &json_path,
        r#"{"platform": "p", "kernels": [
            {"blas_op": "dot", "user_name": "d0", "type": "float"}],
            "connections": [
            {"in": {"kernel": "ghost", "parameter": "out"},
             "out": {"kernel": "d0", "parameter": "x"}}]}"#,
    )
    .unwrap();
    let out = dir.path().join("out");
    fs::create_dir(&out).unwrap();

    let err = codegen(&json_path, &out).unwrap_err();
    assert!(err.to_string().contains("ghost"));
}
