//! Per-operation code generation.
//!
//! One module per BLAS primitive, dispatched by exhaustive matching on
//! the kernel's options variant. Each operation contributes the kernel
//! globals, parameter list, body, host-bridge bodies and link
//! directives; the shared source/header scaffolding lives here.

use std::io::{self, Write};

use crate::args::kernel_args;
use crate::emitter::SourceWriter;
use crate::model::{Direction, Kernel, KernelOptions};

mod asum;
mod axpy;
mod bridge;
mod dot;
mod gemv;
mod iamax;
mod nrm2;
mod rot;
mod scal;

/// A host-memory bridge instance required by a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bridge {
    Mm2s,
    S2mm,
    Mm2sA,
    Mm2sX,
    Mm2sY,
    Mm2sScalar,
}

impl Bridge {
    /// Suffix appended to the kernel name for the bridge function and
    /// its source file.
    pub fn suffix(self) -> &'static str {
        match self {
            Bridge::Mm2s => "mm2s",
            Bridge::S2mm => "s2mm",
            Bridge::Mm2sA => "mm2s_A",
            Bridge::Mm2sX => "mm2s_x",
            Bridge::Mm2sY => "mm2s_y",
            Bridge::Mm2sScalar => "mm2s_scalar",
        }
    }
}

/// True iff at least one argument of the given direction is bound to
/// the host.
pub fn needs_host_bridge(kernel: &Kernel, direction: Direction) -> bool {
    kernel_args(kernel.operation())
        .iter()
        .filter(|a| a.direction == direction)
        .any(|a| kernel.binding(a.name).is_host())
}

/// The bridge instances this kernel needs, in emission order.
pub fn bridges(kernel: &Kernel) -> Vec<Bridge> {
    match &kernel.options {
        KernelOptions::Gemv { .. } => gemv::bridges(kernel),
        _ => {
            let mut out = Vec::new();
            if needs_host_bridge(kernel, Direction::Input) {
                out.push(Bridge::Mm2s);
            }
            if needs_host_bridge(kernel, Direction::Output) {
                out.push(Bridge::S2mm);
            }
            out
        }
    }
}

/// Emit cross-invocation persistent state (latches, trip counters).
pub fn emit_globals<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    match &k.options {
        KernelOptions::Asum => asum::emit_globals(w, k),
        KernelOptions::Axpy { alpha } => axpy::emit_globals(w, k, alpha),
        KernelOptions::Dot => dot::emit_globals(w, k),
        KernelOptions::Gemv { alpha, beta } => gemv::emit_globals(w, k, alpha, beta),
        KernelOptions::Iamax => iamax::emit_globals(w, k),
        KernelOptions::Nrm2 => nrm2::emit_globals(w, k),
        KernelOptions::Rot { c, s } => rot::emit_globals(w, k, c, s),
        KernelOptions::Scal => scal::emit_globals(w, k),
    }
}

/// Emit the kernel parameter list. Arguments with an immediate value
/// set are omitted entirely.
pub fn emit_arguments<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    match &k.options {
        KernelOptions::Asum => asum::emit_arguments(w, k),
        KernelOptions::Axpy { alpha } => axpy::emit_arguments(w, k, alpha),
        KernelOptions::Dot => dot::emit_arguments(w, k),
        KernelOptions::Gemv { alpha, beta } => gemv::emit_arguments(w, k, alpha, beta),
        KernelOptions::Iamax => iamax::emit_arguments(w, k),
        KernelOptions::Nrm2 => nrm2::emit_arguments(w, k),
        KernelOptions::Rot { c, s } => rot::emit_arguments(w, k, c, s),
        KernelOptions::Scal => scal::emit_arguments(w, k),
    }
}

/// Emit the numeric algorithm.
pub fn emit_body<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    match &k.options {
        KernelOptions::Asum => asum::emit_body(w, k),
        KernelOptions::Axpy { alpha } => axpy::emit_body(w, k, alpha),
        KernelOptions::Dot => dot::emit_body(w, k),
        KernelOptions::Gemv { alpha, beta } => gemv::emit_body(w, k, alpha, beta),
        KernelOptions::Iamax => iamax::emit_body(w, k),
        KernelOptions::Nrm2 => nrm2::emit_body(w, k),
        KernelOptions::Rot { c, s } => rot::emit_body(w, k, c, s),
        KernelOptions::Scal => scal::emit_body(w, k),
    }
}

/// Emit the body of one bridge instance.
pub fn emit_bridge<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    bridge: Bridge,
) -> io::Result<()> {
    match (&k.options, bridge) {
        (KernelOptions::Gemv { .. }, Bridge::Mm2sA) => gemv::emit_mm2s_a(w, k),
        (KernelOptions::Gemv { .. }, Bridge::Mm2sX) => gemv::emit_mm2s_x(w, k),
        (KernelOptions::Gemv { .. }, Bridge::Mm2sY) => gemv::emit_mm2s_y(w, k),
        (KernelOptions::Gemv { .. }, Bridge::Mm2sScalar) => gemv::emit_mm2s_scalar(w, k),
        (KernelOptions::Gemv { .. }, Bridge::S2mm) => gemv::emit_s2mm(w, k),
        (_, Bridge::Mm2s) => bridge::emit_mm2s(w, k),
        (_, Bridge::S2mm) => bridge::emit_s2mm(w, k),
        (_, bridge) => unreachable!(
            "bridge {:?} not produced for {}",
            bridge,
            k.operation().name()
        ),
    }
}

/// Emit the link directives for this kernel. Nothing is emitted for a
/// fully peer-connected kernel.
pub fn emit_link<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    if bridges(k).is_empty() {
        return Ok(());
    }
    match &k.options {
        KernelOptions::Gemv { .. } => gemv::emit_link(w, k),
        _ => bridge::emit_link(w, k),
    }
}

/// Emit a complete kernel source file.
pub fn emit_kernel_src<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    w.line(&format!("#include \"{}.hpp\"", k.user_name))?;
    w.blank()?;

    emit_globals(w, k)?;
    w.blank()?;

    w.write_open(&format!("void {}(", k.user_name))?;
    emit_arguments(w, k)?;
    w.line(") {")?;
    emit_body(w, k)?;
    w.close("}")
}

/// Emit the matching kernel header.
pub fn emit_kernel_hdr<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    w.line("#pragma once")?;
    w.line("#include \"aie_api/aie.hpp\"")?;
    w.line("#include \"aie_api/aie_adf.hpp\"")?;
    w.blank()?;

    w.write_open(&format!("void {}(", k.user_name))?;
    emit_arguments(w, k)?;
    w.close(");")
}

/// Shared helper: zero-initializer list of `count` entries.
pub(crate) fn zero_init(count: u32) -> String {
    let mut init = String::new();
    for i in 0..count {
        if i != 0 {
            init.push_str(", ");
        }
        init.push('0');
    }
    init
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_design;
    use crate::model::Design;

    pub(crate) fn design(kernels: &str, connections: &str) -> Design {
        let json = format!(
            r#"{{"platform": "p", "kernels": {}, "connections": {}}}"#,
            kernels, connections
        );
        load_design(&json).unwrap()
    }

    pub(crate) fn render(
        f: impl FnOnce(&mut SourceWriter<Vec<u8>>) -> io::Result<()>,
    ) -> String {
        let mut w = SourceWriter::new(Vec::new());
        f(&mut w).unwrap();
        String::from_utf8(w.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_unconnected_dot_needs_both_bridge_directions() {
        let d = design(
            r#"[{"blas_op": "dot", "user_name": "d0", "type": "float",
                 "vector_size": 8, "window_size": 128}]"#,
            "[]",
        );
        let k = &d.kernels[0];
        assert!(needs_host_bridge(k, Direction::Input));
        assert!(needs_host_bridge(k, Direction::Output));
        assert_eq!(bridges(k), vec![Bridge::Mm2s, Bridge::S2mm]);
    }

    #[test]
    fn test_peer_connected_output_drops_s2mm() {
        let d = design(
            r#"[
                {"blas_op": "scal", "user_name": "s0", "type": "float"},
                {"blas_op": "dot", "user_name": "d0", "type": "float"}
            ]"#,
            r#"[{"in": {"kernel": "s0", "parameter": "out"},
                 "out": {"kernel": "d0", "parameter": "x"}}]"#,
        );
        let s0 = d.kernel("s0").unwrap();
        assert_eq!(bridges(s0), vec![Bridge::Mm2s]);
        assert!(!needs_host_bridge(s0, Direction::Output));
    }

    #[test]
    fn test_immediate_alpha_removes_bridge_necessity() {
        // Everything except alpha connected to a peer; alpha immediate.
        let d = design(
            r#"[
                {"blas_op": "scal", "user_name": "s0", "type": "float"},
                {"blas_op": "scal", "user_name": "s1", "type": "float"},
                {"blas_op": "axpy", "user_name": "a0", "type": "float",
                 "extra": {"alpha": 2}}
            ]"#,
            r#"[
                {"in": {"kernel": "s0", "parameter": "out"},
                 "out": {"kernel": "a0", "parameter": "x"}},
                {"in": {"kernel": "s1", "parameter": "out"},
                 "out": {"kernel": "a0", "parameter": "y"}}
            ]"#,
        );
        let a0 = d.kernel("a0").unwrap();
        assert!(!needs_host_bridge(a0, Direction::Input));
        assert_eq!(bridges(a0), vec![Bridge::S2mm]);
    }

    #[test]
    fn test_kernel_src_shape() {
        let d = design(
            r#"[{"blas_op": "dot", "user_name": "d0", "type": "float"}]"#,
            "[]",
        );
        let text = render(|w| emit_kernel_src(w, &d.kernels[0]));
        assert!(text.starts_with("#include \"d0.hpp\""));
        assert!(text.contains("void d0("));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_kernel_hdr_shape() {
        let d = design(
            r#"[{"blas_op": "dot", "user_name": "d0", "type": "float"}]"#,
            "[]",
        );
        let text = render(|w| emit_kernel_hdr(w, &d.kernels[0]));
        assert!(text.starts_with("#pragma once"));
        assert!(text.contains("#include \"aie_api/aie.hpp\""));
        assert!(text.trim_end().ends_with(");"));
    }

    #[test]
    fn test_zero_init() {
        assert_eq!(zero_init(1), "0");
        assert_eq!(zero_init(4), "0, 0, 0, 0");
    }
}
