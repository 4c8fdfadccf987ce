//! Link configuration emission: the directive file consumed by the
//! system linker, aggregating every kernel's bridge directives.

use std::io::{self, Write};

use crate::emitter::SourceWriter;
use crate::kernels;
use crate::model::Design;

pub fn emit_config<W: Write>(w: &mut SourceWriter<W>, design: &Design) -> io::Result<()> {
    w.line(&format!("platform={}", design.platform))?;
    w.blank()?;

    if design.profile {
        w.line("[profile]")?;
        w.line("data=all:all:all # Monitor data on all kernels and CUs")?;
        w.line("memory=all       # Monitor transfers for all memories")?;
        w.line("stall=all:all    # Monitor stalls for all CUs of all kernels")?;
        w.line("exec=all:all     # Monitor execution times for all CUs")?;
        w.line("aie=all          # Monitor all AIE streams")?;
        w.blank()?;
    }

    w.line("[connectivity]")?;
    for k in &design.kernels {
        if kernels::bridges(k).is_empty() {
            continue;
        }
        kernels::emit_link(w, k)?;
        w.blank()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_design;

    fn render(json: &str) -> String {
        let design = load_design(json).unwrap();
        let mut w = SourceWriter::new(Vec::new());
        emit_config(&mut w, &design).unwrap();
        String::from_utf8(w.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_platform_header_and_connectivity_section() {
        let text = render(
            r#"{"platform": "xilinx_vck5000", "kernels":
                [{"blas_op": "dot", "user_name": "d0", "type": "float"}]}"#,
        );
        assert!(text.starts_with("platform=xilinx_vck5000\n"));
        assert!(text.contains("[connectivity]"));
        assert!(!text.contains("[profile]"));
        assert!(text.contains("nk=d0_mm2s:1:d0_mm2s"));
    }

    #[test]
    fn test_profile_section_when_enabled() {
        let text = render(
            r#"{"platform": "p", "profile": true, "kernels":
                [{"blas_op": "dot", "user_name": "d0", "type": "float"}]}"#,
        );
        assert!(text.contains("[profile]"));
        assert!(text.contains("aie=all          # Monitor all AIE streams"));
        let profile_pos = text.find("[profile]").unwrap();
        let connectivity_pos = text.find("[connectivity]").unwrap();
        assert!(profile_pos < connectivity_pos);
    }

    #[test]
    fn test_fully_connected_kernel_contributes_nothing() {
        // s0.out -> d0.x; d0.y and d0.out remain host-bound
        let text = render(
            r#"{"platform": "p", "kernels": [
                {"blas_op": "scal", "user_name": "s0", "type": "float"},
                {"blas_op": "dot", "user_name": "d0", "type": "float"}],
                "connections": [
                {"in": {"kernel": "s0", "parameter": "out"},
                 "out": {"kernel": "d0", "parameter": "x"}}]}"#,
        );
        assert!(text.contains("nk=s0_mm2s:1:s0_mm2s"));
        assert!(!text.contains("s0_s2mm"));
        assert!(text.contains("nk=d0_s2mm:1:d0_s2mm"));
    }
}
