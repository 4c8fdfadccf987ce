//! Top-level dataflow graph emission: boundary ports, kernel instances
//! and the connections between them.
//!
//! Emission order is fixed: kernels in design order, arguments in
//! canonical order. Input and output port counters run per kernel, the
//! net counter runs across the whole design, so emitted names are
//! reproducible run to run.

use std::io::Write;

use crate::args::kernel_args;
use crate::emitter::SourceWriter;
use crate::error::{CodegenError, CodegenResult};
use crate::model::{ArgumentSpec, Binding, Design, Dim, Direction, Kernel};

fn plio_width(k: &Kernel, arg: &ArgumentSpec) -> &'static str {
    // Index arguments always cross the boundary as 64-bit words.
    if arg.index_typed || k.dtype.bits() == 64 {
        "plio_64_bits"
    } else {
        "plio_32_bits"
    }
}

fn port_class(arg: &ArgumentSpec) -> &'static str {
    match arg.direction {
        Direction::Input => "input_plio",
        Direction::Output => "output_plio",
    }
}

/// Streaming link for scalars (or unwindowed kernels), block-windowed
/// link otherwise.
fn connection_class(k: &Kernel, arg: &ArgumentSpec) -> String {
    if arg.dim == Dim::Scalar || k.wsize == 0 {
        "stream".to_string()
    } else {
        format!("window<{}>", k.wsize)
    }
}

fn kernel_port(k: &Kernel, arg: &ArgumentSpec, index: u32) -> String {
    let port = match arg.direction {
        Direction::Input => format!("{}k.in[{}]", k.user_name, index),
        Direction::Output => format!("{}k.out[{}]", k.user_name, index),
    };
    if arg.asynchronous {
        format!("async({})", port)
    } else {
        port
    }
}

/// Port index of `param` on `peer`: count the peer's ports of the same
/// direction, in canonical order, until `param` is reached. Disabled
/// arguments do not occupy a port.
fn peer_port_index(peer: &Kernel, param: &str, direction: Direction) -> u32 {
    let mut index = 0;
    for arg in kernel_args(peer.operation()) {
        if arg.name == param {
            break;
        }
        if peer.options.is_disabled(arg.name) {
            continue;
        }
        if arg.direction == direction {
            index += 1;
        }
    }
    index
}

fn resolve_peer<'a>(
    design: &'a Design,
    name: &str,
    referrer: String,
) -> CodegenResult<&'a Kernel> {
    design
        .kernel(name)
        .ok_or_else(|| CodegenError::UnresolvedPeer {
            name: name.to_string(),
            referrer,
        })
}

fn peer_spec(peer: &Kernel, param: &str, referrer: String) -> CodegenResult<&'static ArgumentSpec> {
    kernel_args(peer.operation())
        .iter()
        .find(|a| a.name == param)
        .ok_or_else(|| CodegenError::UnresolvedPeer {
            name: format!("{}.{}", peer.user_name, param),
            referrer,
        })
}

pub fn emit_graph_hdr<W: Write>(w: &mut SourceWriter<W>, design: &Design) -> CodegenResult<()> {
    w.line("#include <adf.h>")?;
    for k in &design.kernels {
        w.line(&format!("#include \"kernels/{}.hpp\"", k.user_name))?;
    }
    w.blank()?;
    w.line("using namespace adf;")?;
    w.blank()?;

    w.open("class simpleGraph : public graph {")?;
    w.line_raw("private:")?;
    for k in &design.kernels {
        w.line(&format!("kernel {}k;", k.user_name))?;
    }
    w.blank()?;
    w.line_raw("public:")?;
    for k in &design.kernels {
        for arg in kernel_args(k.operation()) {
            if k.binding(arg.name).is_host() {
                w.line(&format!("{} {}_{};", port_class(arg), k.user_name, arg.name))?;
            }
        }
    }
    w.blank()?;

    w.open("simpleGraph() {")?;
    for k in &design.kernels {
        w.line(&format!("// initialize {}", k.user_name))?;
        for arg in kernel_args(k.operation()) {
            if k.binding(arg.name).is_host() {
                w.line(&format!(
                    "{1}_{2} = {0}::create(\"{1}_{2}\", {3}, \"data/{1}_{2}.txt\");",
                    port_class(arg),
                    k.user_name,
                    arg.name,
                    plio_width(k, arg)
                ))?;
            }
        }
        w.blank()?;
        w.line(&format!("{0}k = kernel::create({0});", k.user_name))?;
        w.blank()?;
    }

    let mut net_count = 0u32;
    for k in &design.kernels {
        let mut in_count = 0u32;
        let mut out_count = 0u32;
        w.line(&format!("// connect {}", k.user_name))?;
        for arg in kernel_args(k.operation()) {
            match k.binding(arg.name) {
                Binding::Disabled => {}
                Binding::Host => {
                    let class = connection_class(k, arg);
                    let net = if class == "stream" {
                        String::new()
                    } else {
                        let n = format!(" net{}", net_count);
                        net_count += 1;
                        n
                    };
                    match arg.direction {
                        Direction::Input => {
                            w.line(&format!(
                                "connect<{}>{}({}_{}.out[0], {});",
                                class,
                                net,
                                k.user_name,
                                arg.name,
                                kernel_port(k, arg, in_count)
                            ))?;
                            in_count += 1;
                        }
                        Direction::Output => {
                            w.line(&format!(
                                "connect<{}>{}({}, {}_{}.in[0]);",
                                class,
                                net,
                                kernel_port(k, arg, out_count),
                                k.user_name,
                                arg.name
                            ))?;
                            out_count += 1;
                        }
                    }
                }
                Binding::Peer { kernel, parameter } => match arg.direction {
                    // Every peer link is emitted once, from the consuming
                    // side; the producer validates its endpoint and
                    // advances its port counter.
                    Direction::Input => {
                        let referrer = format!("{}.{}", k.user_name, arg.name);
                        let peer = resolve_peer(design, kernel, referrer.clone())?;
                        let spec = peer_spec(peer, parameter, referrer)?;
                        let peer_index =
                            peer_port_index(peer, parameter, Direction::Output);
                        let class = connection_class(k, arg);
                        let net = if class == "stream" {
                            String::new()
                        } else {
                            let n = format!(" net{}", net_count);
                            net_count += 1;
                            n
                        };
                        w.line(&format!(
                            "connect<{}>{}({}, {});",
                            class,
                            net,
                            kernel_port(peer, spec, peer_index),
                            kernel_port(k, arg, in_count)
                        ))?;
                        in_count += 1;
                    }
                    Direction::Output => {
                        let referrer = format!("{}.{}", k.user_name, arg.name);
                        let peer = resolve_peer(design, kernel, referrer.clone())?;
                        peer_spec(peer, parameter, referrer)?;
                        out_count += 1;
                    }
                },
            }
        }
        w.blank()?;
        w.line(&format!("source({0}k) = \"kernels/{0}.cpp\";", k.user_name))?;
        w.line(&format!("runtime<ratio>({}k) = 0.9;", k.user_name))?;
        if let Some((x, y)) = k.tile {
            w.line(&format!(
                "location<kernel>({}k) = tile({}, {});",
                k.user_name, x, y
            ))?;
        }
        w.blank()?;
    }

    w.close("}")?;
    w.close("};")?;
    Ok(())
}

pub fn emit_graph_src<W: Write>(w: &mut SourceWriter<W>, _design: &Design) -> CodegenResult<()> {
    w.line("#include \"graph.hpp\"")?;
    w.blank()?;
    w.line("simpleGraph mygraph;")?;
    w.blank()?;
    w.open("int main (void) {")?;
    w.line("adf::return_code ret;")?;
    w.line("mygraph.init();")?;
    w.blank()?;
    w.line("ret = mygraph.run(1);")?;
    w.open("if (ret != adf::ok) {")?;
    w.line("printf(\"Run failed\\n\");")?;
    w.line("return ret;")?;
    w.close("}")?;
    w.blank()?;
    w.line("ret = mygraph.end();")?;
    w.open("if (ret != adf::ok) {")?;
    w.line("printf(\"End failed\\n\");")?;
    w.line("return ret;")?;
    w.close("}")?;
    w.blank()?;
    w.line("return 0;")?;
    w.close("}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_design;

    fn design(kernels: &str, connections: &str) -> Design {
        let json = format!(
            r#"{{"platform": "p", "kernels": {}, "connections": {}}}"#,
            kernels, connections
        );
        load_design(&json).unwrap()
    }

    fn render_hdr(d: &Design) -> String {
        let mut w = SourceWriter::new(Vec::new());
        emit_graph_hdr(&mut w, d).unwrap();
        String::from_utf8(w.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_host_bound_dot_declares_all_boundary_ports() {
        let d = design(
            r#"[{"blas_op": "dot", "user_name": "d0", "type": "float",
                 "vector_size": 8, "window_size": 128}]"#,
            "[]",
        );
        let text = render_hdr(&d);
        assert!(text.contains("input_plio d0_x;"));
        assert!(text.contains("input_plio d0_y;"));
        assert!(text.contains("output_plio d0_out;"));
        assert!(text.contains(
            "d0_x = input_plio::create(\"d0_x\", plio_32_bits, \"data/d0_x.txt\");"
        ));
        assert!(text.contains("connect<window<128>> net0(d0_x.out[0], d0k.in[0]);"));
        assert!(text.contains("connect<window<128>> net1(d0_y.out[0], d0k.in[1]);"));
        assert!(text.contains("connect<stream>(d0k.out[0], d0_out.in[0]);"));
        assert!(text.contains("source(d0k) = \"kernels/d0.cpp\";"));
        assert!(text.contains("runtime<ratio>(d0k) = 0.9;"));
    }

    #[test]
    fn test_peer_connection_emitted_once_from_consumer() {
        let d = design(
            r#"[
                {"blas_op": "scal", "user_name": "s0", "type": "float"},
                {"blas_op": "dot", "user_name": "d0", "type": "float"}
            ]"#,
            r#"[{"in": {"kernel": "s0", "parameter": "out"},
                 "out": {"kernel": "d0", "parameter": "x"}}]"#,
        );
        let text = render_hdr(&d);
        // one direct kernel-to-kernel net, no boundary port on either end
        assert!(text.contains("connect<window<128>> net1(s0k.out[0], d0k.in[0]);"));
        assert!(!text.contains("s0_out"));
        assert!(!text.contains("d0_x;"));
        assert_eq!(text.matches("s0k.out[0]").count(), 1);
    }

    #[test]
    fn test_unknown_peer_kernel_is_an_error() {
        let d = design(
            r#"[{"blas_op": "dot", "user_name": "d0", "type": "float"}]"#,
            r#"[{"in": {"kernel": "ghost", "parameter": "out"},
                 "out": {"kernel": "d0", "parameter": "x"}}]"#,
        );
        let mut w = SourceWriter::new(Vec::new());
        let err = emit_graph_hdr(&mut w, &d).unwrap_err();
        assert!(matches!(err, CodegenError::UnresolvedPeer { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_unknown_consumer_kernel_is_an_error() {
        // dangling endpoint on the producing side: s0.out feeds a
        // kernel that is not in the design
        let d = design(
            r#"[{"blas_op": "scal", "user_name": "s0", "type": "float"}]"#,
            r#"[{"in": {"kernel": "s0", "parameter": "out"},
                 "out": {"kernel": "ghost", "parameter": "x"}}]"#,
        );
        let mut w = SourceWriter::new(Vec::new());
        let err = emit_graph_hdr(&mut w, &d).unwrap_err();
        assert!(matches!(err, CodegenError::UnresolvedPeer { .. }));
        assert!(err.to_string().contains("ghost"));
        assert!(err.to_string().contains("s0.out"));
    }

    #[test]
    fn test_index_port_is_always_64_bit() {
        let d = design(
            r#"[{"blas_op": "iamax", "user_name": "i0", "type": "float"}]"#,
            "[]",
        );
        let text = render_hdr(&d);
        assert!(text.contains(
            "i0_in_size_n = input_plio::create(\"i0_in_size_n\", plio_64_bits, \
             \"data/i0_in_size_n.txt\");"
        ));
        assert!(text.contains(
            "i0_x = input_plio::create(\"i0_x\", plio_32_bits, \"data/i0_x.txt\");"
        ));
    }

    #[test]
    fn test_async_ports_are_wrapped() {
        let d = design(
            r#"[{"blas_op": "gemv", "user_name": "g0", "type": "float"}]"#,
            "[]",
        );
        let text = render_hdr(&d);
        assert!(text.contains("connect<window<128>> net1(g0_x.out[0], async(g0k.in[2]));"));
        assert!(text.contains("async(g0k.out[0])"));
    }

    #[test]
    fn test_disabled_argument_skips_port_numbering() {
        // immediate alpha: axpy's x moves up to in[0]
        let d = design(
            r#"[{"blas_op": "axpy", "user_name": "a0", "type": "float",
                 "extra": {"alpha": 2}}]"#,
            "[]",
        );
        let text = render_hdr(&d);
        assert!(!text.contains("a0_alpha"));
        assert!(text.contains("connect<window<128>> net0(a0_x.out[0], a0k.in[0]);"));
        assert!(text.contains("connect<window<128>> net1(a0_y.out[0], a0k.in[1]);"));
    }

    #[test]
    fn test_tile_placement_directive() {
        let d = design(
            r#"[{"blas_op": "dot", "user_name": "d0", "type": "float",
                 "tile": [3, 4]}]"#,
            "[]",
        );
        let text = render_hdr(&d);
        assert!(text.contains("location<kernel>(d0k) = tile(3, 4);"));
    }

    #[test]
    fn test_graph_src_shape() {
        let d = design(
            r#"[{"blas_op": "dot", "user_name": "d0", "type": "float"}]"#,
            "[]",
        );
        let mut w = SourceWriter::new(Vec::new());
        emit_graph_src(&mut w, &d).unwrap();
        let text = String::from_utf8(w.finish().unwrap()).unwrap();
        assert!(text.starts_with("#include \"graph.hpp\"\n"));
        assert!(text.contains("simpleGraph mygraph;"));
        assert!(text.contains("ret = mygraph.run(1);"));
        assert!(text.contains("ret = mygraph.end();"));
    }
}
