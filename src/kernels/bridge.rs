//! Generic host-memory bridges.
//!
//! Every vector operation except gemv uses the same bridge shape: one
//! mm2s feeding all host-bound inputs and one s2mm draining all
//! host-bound outputs. Both are derived from the canonical argument
//! table, so stream names stay in sync with the graph's boundary ports.

use std::io::{self, Write};

use crate::args::kernel_args;
use crate::emitter::SourceWriter;
use crate::model::{ArgumentSpec, Dim, Direction, Kernel};

fn host_args(k: &Kernel, direction: Direction) -> Vec<&'static ArgumentSpec> {
    kernel_args(k.operation())
        .iter()
        .filter(|a| a.direction == direction && k.binding(a.name).is_host())
        .collect()
}

fn pragma_m_axi<W: Write>(w: &mut SourceWriter<W>, port: &str) -> io::Result<()> {
    w.line_raw(&format!(
        "#pragma HLS interface m_axi port = {} offset = slave",
        port
    ))
}

fn pragma_axis<W: Write>(w: &mut SourceWriter<W>, port: &str) -> io::Result<()> {
    w.line_raw(&format!("#pragma HLS interface axis port = {}", port))
}

fn pragma_s_axilite<W: Write>(w: &mut SourceWriter<W>, port: &str) -> io::Result<()> {
    w.line_raw(&format!(
        "#pragma HLS interface s_axilite port = {} bundle = control",
        port
    ))
}

fn qdma_type(bits: u32) -> String {
    format!("qdma_axis<{},0,0,0>", bits)
}

fn stream_type(bits: u32) -> String {
    format!("hls::stream<qdma_axis<{}, 0, 0, 0>> &", bits)
}

/// Memory-to-stream bridge: pushes every host-bound input of the kernel
/// into its boundary stream. Scalars are sent once with TLAST, index
/// arguments carry the transfer size, vectors are streamed in a
/// pipelined loop.
pub fn emit_mm2s<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let bits = k.dtype.bits();
    let inputs = host_args(k, Direction::Input);
    let vectors: Vec<_> = inputs.iter().filter(|a| a.dim != Dim::Scalar).collect();
    let scalars: Vec<_> = inputs
        .iter()
        .filter(|a| a.dim == Dim::Scalar && !a.index_typed)
        .collect();
    let indices: Vec<_> = inputs.iter().filter(|a| a.index_typed).collect();
    let has_size = !vectors.is_empty() || !indices.is_empty();

    w.write_open(&format!("void {}_mm2s(", k.user_name))?;
    for a in &vectors {
        w.write(&format!("ap_int<{}> *mem_{}, ", bits, a.name))?;
    }
    for a in &scalars {
        w.write(&format!("ap_int<{}> scalar_{}, ", bits, a.name))?;
    }
    if has_size {
        w.write("int size, ")?;
    }
    for (i, a) in inputs.iter().enumerate() {
        if i != 0 {
            w.write(", ")?;
        }
        let stream_bits = if a.index_typed { 64 } else { bits };
        w.write(&format!("{}stream_{}", stream_type(stream_bits), a.name))?;
    }
    w.line(") {")?;

    for a in &vectors {
        pragma_m_axi(w, &format!("mem_{}", a.name))?;
        pragma_axis(w, &format!("stream_{}", a.name))?;
        pragma_s_axilite(w, &format!("mem_{}", a.name))?;
    }
    for a in &scalars {
        pragma_axis(w, &format!("stream_{}", a.name))?;
        pragma_s_axilite(w, &format!("scalar_{}", a.name))?;
    }
    for a in &indices {
        pragma_axis(w, &format!("stream_{}", a.name))?;
    }
    if has_size {
        pragma_s_axilite(w, "size")?;
    }
    pragma_s_axilite(w, "return")?;
    w.blank()?;

    for a in &indices {
        w.line(&format!("{} qdma_{};", qdma_type(64), a.name))?;
        w.line(&format!("qdma_{}.data = size;", a.name))?;
        w.line(&format!("qdma_{}.keep_all();", a.name))?;
        w.line(&format!("qdma_{}.set_last(1);", a.name))?;
        w.line(&format!("stream_{0}.write(qdma_{0});", a.name))?;
        w.blank()?;
    }

    for a in &scalars {
        w.line(&format!("// Send scalar over {} stream", a.name))?;
        w.line(&format!("{} qdma_{};", qdma_type(bits), a.name))?;
        w.line(&format!(
            "qdma_{}.data = (ap_int<{}>) scalar_{};",
            a.name, bits, a.name
        ))?;
        w.line(&format!("qdma_{}.keep_all();", a.name))?;
        w.line(&format!("qdma_{}.set_last(1);", a.name))?;
        w.line(&format!("stream_{0}.write(qdma_{0});", a.name))?;
        w.blank()?;
    }

    if !vectors.is_empty() {
        w.line("// Send data over stream")?;
        w.open("for (int i = 0; i < size; i++) {")?;
        w.line_raw("#pragma HLS pipeline II = 1")?;
        for a in &vectors {
            w.line(&format!("{} {};", qdma_type(bits), a.name))?;
            w.line(&format!("{0}.data = mem_{0}[i];", a.name))?;
            w.line(&format!("{}.keep_all();", a.name))?;
            w.line(&format!("stream_{0}.write({0});", a.name))?;
        }
        w.close("}")?;
    }
    w.close("}")
}

/// Stream-to-memory bridge: drains every host-bound output. Vector
/// outputs are drained in a pipelined loop, scalar results with a
/// single read.
pub fn emit_s2mm<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let bits = k.dtype.bits();
    let outputs = host_args(k, Direction::Output);
    let has_vector = outputs.iter().any(|a| a.dim != Dim::Scalar);

    w.write_open(&format!("void {}_s2mm(", k.user_name))?;
    for a in &outputs {
        w.write(&format!("ap_int<{}> *mem_{}, ", bits, a.name))?;
    }
    if has_vector {
        w.write("int size, ")?;
    }
    for (i, a) in outputs.iter().enumerate() {
        if i != 0 {
            w.write(", ")?;
        }
        w.write(&format!("{}stream_{}", stream_type(bits), a.name))?;
    }
    w.line(") {")?;

    for a in &outputs {
        pragma_m_axi(w, &format!("mem_{}", a.name))?;
        pragma_axis(w, &format!("stream_{}", a.name))?;
        pragma_s_axilite(w, &format!("mem_{}", a.name))?;
    }
    if has_vector {
        pragma_s_axilite(w, "size")?;
    }
    pragma_s_axilite(w, "return")?;
    w.blank()?;

    w.line("// Retrieve data from out stream")?;
    if has_vector {
        w.open("for (int i = 0; i < size; i++) {")?;
        w.line_raw("#pragma HLS pipeline II = 1")?;
        for a in &outputs {
            w.line(&format!(
                "{} {} = stream_{}.read();",
                qdma_type(bits),
                a.name,
                a.name
            ))?;
            w.line(&format!("mem_{0}[i] = {0}.data;", a.name))?;
        }
        w.close("}")?;
    } else {
        for a in &outputs {
            w.line(&format!(
                "{} {} = stream_{}.read();",
                qdma_type(bits),
                a.name,
                a.name
            ))?;
            w.line(&format!("*mem_{0} = {0}.data;", a.name))?;
        }
    }
    w.close("}")
}

/// Link directives for the generic bridge pair: instance counts, stream
/// connections, SLR placement and memory port assignment.
pub fn emit_link<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let name = &k.user_name;
    let inputs = host_args(k, Direction::Input);
    let outputs = host_args(k, Direction::Output);
    let mm2s_m_axi = inputs.iter().any(|a| a.dim != Dim::Scalar);

    if !inputs.is_empty() {
        w.line(&format!("nk={0}_mm2s:1:{0}_mm2s", name))?;
    }
    if !outputs.is_empty() {
        w.line(&format!("nk={0}_s2mm:1:{0}_s2mm", name))?;
    }
    w.blank()?;
    for a in &inputs {
        w.line(&format!(
            "sc={0}_mm2s.stream_{1}:ai_engine_0.{0}_{1}",
            name, a.name
        ))?;
    }
    for a in &outputs {
        w.line(&format!(
            "sc=ai_engine_0.{0}_{1}:{0}_s2mm.stream_{1}",
            name, a.name
        ))?;
    }
    w.blank()?;
    if !inputs.is_empty() {
        w.line(&format!("slr={}_mm2s:SLR0", name))?;
    }
    if !outputs.is_empty() {
        w.line(&format!("slr={}_s2mm:SLR0", name))?;
    }
    w.blank()?;
    if mm2s_m_axi {
        w.line(&format!("sp={}_mm2s.m_axi_gmem:MC_NOC0", name))?;
    }
    if !outputs.is_empty() {
        w.line(&format!("sp={}_s2mm.m_axi_gmem:MC_NOC0", name))?;
    }
    Ok(())
}
