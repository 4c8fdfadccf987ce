//! gemv: out = alpha * A * x + beta * y for a row-streamed matrix.
//!
//! One invocation consumes one row window of A against the full x
//! window and produces one element of out, so x, y and out are
//! acquired manually instead of per-invocation. Each host-bound
//! argument gets its own bridge because their transfer lengths differ.

use std::io::{self, Write};

use crate::emitter::SourceWriter;
use crate::kernels::{zero_init, Bridge};
use crate::model::{native_vector_name, Kernel, Scalar};

pub fn bridges(k: &Kernel) -> Vec<Bridge> {
    let mut out = Vec::new();
    if k.binding("A").is_host() {
        out.push(Bridge::Mm2sA);
    }
    if k.binding("x").is_host() {
        out.push(Bridge::Mm2sX);
    }
    if k.binding("y").is_host() {
        out.push(Bridge::Mm2sY);
    }
    if k.binding("alpha").is_host() || k.binding("beta").is_host() {
        out.push(Bridge::Mm2sScalar);
    }
    if k.binding("out").is_host() {
        out.push(Bridge::S2mm);
    }
    out
}

pub fn emit_globals<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    alpha: &Option<Scalar>,
    beta: &Option<Scalar>,
) -> io::Result<()> {
    w.line(&format!("#define NUM_SAMPLES {}", k.num_samples()))?;
    w.blank()?;
    w.line("uint64 chess_storage(%chess_alignof(v4int64)) counter[4] = {0, 0, 0, 0};")?;
    if alpha.is_none() || beta.is_none() {
        let (count, align) = native_vector_name(k.dtype, 2)
            .unwrap_or_else(|| (2, format!("v2{}", k.dtype.cname())));
        w.line(&format!(
            "{} chess_storage(%chess_alignof({})) scalar[{}] = {{{}}};",
            k.dtype.cname(),
            align,
            count,
            zero_init(count)
        ))?;
    }
    Ok(())
}

pub fn emit_arguments<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    alpha: &Option<Scalar>,
    beta: &Option<Scalar>,
) -> io::Result<()> {
    let t = k.dtype.cname();
    if alpha.is_none() {
        w.write(&format!("input_stream<{}> *__restrict alpha, ", t))?;
    }
    w.write(&format!(
        "input_window<{0}> *__restrict A, input_window<{0}> *__restrict x, ",
        t
    ))?;
    if beta.is_none() {
        w.write(&format!("input_stream<{}> *__restrict beta, ", t))?;
    }
    w.write(&format!(
        "input_window<{0}> *__restrict y, output_window<{0}> *__restrict out",
        t
    ))
}

pub fn emit_body<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    alpha: &Option<Scalar>,
    beta: &Option<Scalar>,
) -> io::Result<()> {
    let t = k.dtype.cname();
    let dtype = k.aie_dtype();

    w.line("uint64 *cycle = &counter[0];")?;
    if alpha.is_none() {
        w.line(&format!("{} *alpha_store = &scalar[0];", t))?;
    }
    if beta.is_none() {
        w.line(&format!("{} *beta_store = &scalar[1];", t))?;
    }
    if alpha.is_none() || beta.is_none() {
        w.line(&format!("{} *scalar_set = &scalar[2];", t))?;
        w.open("if (*scalar_set == 0) {")?;
        w.line("*scalar_set = 1;")?;
        if alpha.is_none() {
            w.line("*alpha_store = readincr(alpha);")?;
        }
        if beta.is_none() {
            w.line("*beta_store = readincr(beta);")?;
        }
        w.close("}")?;
        w.blank()?;
    }

    w.open("if (*cycle == 0) {")?;
    w.line("window_acquire(x);")?;
    w.close("}")?;
    w.open("if (*cycle % NUM_SAMPLES == 0) {")?;
    w.line("window_acquire(y);")?;
    w.line("window_acquire(out);")?;
    w.close("}")?;

    w.line(&format!("{} vx, vA;", dtype))?;
    let loop_cond = if k.vsize == 0 {
        w.line(&format!("{} vout = 0;", dtype))?;
        "NUM_SAMPLES"
    } else {
        w.line(&format!(
            "{} vout = aie::zeros<{}, {}>();",
            dtype, t, k.vsize
        ))?;
        w.line(&format!(
            "constexpr unsigned NUM_LOOPS = NUM_SAMPLES / {};",
            k.vsize
        ))?;
        "NUM_LOOPS"
    };
    w.blank()?;
    w.open(&format!("for (unsigned i = 0; i < {}; i++) {{", loop_cond))?;
    if k.vsize == 0 {
        w.line("vA = window_readincr(A);")?;
        w.line("vx = window_readincr(x);")?;
        w.line("vout += vA * vx;")?;
    } else {
        w.line(&format!("vA = window_readincr_v<{}>(A);", k.vsize))?;
        w.line(&format!("vx = window_readincr_v<{}>(x);", k.vsize))?;
        w.line(&format!(
            "vout = aie::add(vout, aie::mul(vA, vx).to_vector<{}>());",
            t
        ))?;
    }
    w.close("}")?;
    if k.vsize == 0 {
        w.line("window_decr(x, NUM_SAMPLES);")?;
    } else {
        w.line(&format!("window_decr_v{}(x, NUM_LOOPS);", k.vsize))?;
    }
    w.blank()?;
    w.line(&format!("{} vy = window_readincr(y);", t))?;

    let alpha_val = match alpha {
        Some(value) => value.to_string(),
        None => "*alpha_store".to_string(),
    };
    let beta_val = match beta {
        Some(value) => value.to_string(),
        None => "*beta_store".to_string(),
    };
    if k.vsize == 0 {
        w.line(&format!(
            "window_writeincr(out, {} * vout + {} * vy);",
            alpha_val, beta_val
        ))?;
    } else {
        w.line(&format!(
            "window_writeincr(out, {} * aie::reduce_add(vout) + {} * vy);",
            alpha_val, beta_val
        ))?;
    }

    w.blank()?;
    w.line("*cycle += 1;")?;
    w.blank()?;
    w.open("if (*cycle % NUM_SAMPLES == 0) {")?;
    w.line("window_release(y);")?;
    w.line("window_release(out);")?;
    w.close("}")
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

/// Streams the m x n row-major matrix. The row length is fixed at
/// build time to match the kernel's x window.
pub fn emit_mm2s_a<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let bits = k.dtype.bits();

    w.line_raw("#define n 64")?;
    w.blank()?;

    w.open(&format!(
        "void {}_mm2s_A(ap_int<{}> *mem_A, int m, \
         hls::stream<qdma_axis<{}, 0, 0, 0>> &stream_A) {{",
        k.user_name, bits, bits
    ))?;
    pragma_m_axi(w, "mem_A")?;
    pragma_axis(w, "stream_A")?;
    pragma_s_axilite(w, "mem_A")?;
    pragma_s_axilite(w, "m")?;
    pragma_s_axilite(w, "return")?;
    w.blank()?;

    w.line("// Send data over stream")?;
    w.line("int mn = m * n;")?;
    w.open("for (int i = 0; i < mn; i++) {")?;
    w.line_raw("#pragma HLS pipeline II = 1")?;
    w.line(&format!("qdma_axis<{},0,0,0> A;", bits))?;
    w.line("A.data = mem_A[i];")?;
    w.line("A.keep_all();")?;
    w.line("stream_A.write(A);")?;
    w.close("}")?;
    w.close("}")
}

pub fn emit_mm2s_x<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let bits = k.dtype.bits();

    w.line_raw("#define n 64")?;
    w.blank()?;

    w.open(&format!(
        "void {}_mm2s_x(ap_int<{}> *mem_x, \
         hls::stream<qdma_axis<{}, 0, 0, 0>> &stream_x) {{",
        k.user_name, bits, bits
    ))?;
    pragma_m_axi(w, "mem_x")?;
    pragma_axis(w, "stream_x")?;
    pragma_s_axilite(w, "mem_x")?;
    pragma_s_axilite(w, "return")?;
    w.blank()?;

    w.line("// Send data over stream")?;
    w.open("for (int i = 0; i < n; i++) {")?;
    w.line_raw("#pragma HLS unroll")?;
    w.line(&format!("qdma_axis<{},0,0,0> x;", bits))?;
    w.line("x.data = mem_x[i];")?;
    w.line("x.keep_all();")?;
    w.line("stream_x.write(x);")?;
    w.close("}")?;
    w.close("}")
}

pub fn emit_mm2s_y<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let bits = k.dtype.bits();

    w.open(&format!(
        "void {}_mm2s_y(ap_int<{}> *mem_y, int m, \
         hls::stream<qdma_axis<{}, 0, 0, 0>> &stream_y) {{",
        k.user_name, bits, bits
    ))?;
    pragma_m_axi(w, "mem_y")?;
    pragma_axis(w, "stream_y")?;
    pragma_s_axilite(w, "mem_y")?;
    pragma_s_axilite(w, "m")?;
    pragma_s_axilite(w, "return")?;
    w.blank()?;

    w.line("// Send data over stream")?;
    w.open("for (int i = 0; i < m; i++) {")?;
    w.line_raw("#pragma HLS pipeline II = 1")?;
    w.line(&format!("qdma_axis<{},0,0,0> y;", bits))?;
    w.line("y.data = mem_y[i];")?;
    w.line("y.keep_all();")?;
    w.line("stream_y.write(y);")?;
    w.close("}")?;
    w.close("}")
}

/// Sends the streamed alpha/beta pair once with TLAST.
pub fn emit_mm2s_scalar<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let bits = k.dtype.bits();
    let alpha = k.binding("alpha").is_host();
    let beta = k.binding("beta").is_host();

    w.write_open(&format!("void {}_mm2s_scalar(", k.user_name))?;
    if alpha {
        w.write(&format!("ap_int<{}> alpha, ", bits))?;
    }
    if beta {
        w.write(&format!("ap_int<{}> beta, ", bits))?;
    }
    if alpha {
        w.write(&format!(
            "hls::stream<qdma_axis<{}, 0, 0, 0>> &stream_alpha",
            bits
        ))?;
        if beta {
            w.write(", ")?;
        }
    }
    if beta {
        w.write(&format!(
            "hls::stream<qdma_axis<{}, 0, 0, 0>> &stream_beta",
            bits
        ))?;
    }
    w.line(") {")?;

    if alpha {
        pragma_axis(w, "stream_alpha")?;
        pragma_s_axilite(w, "alpha")?;
    }
    if beta {
        pragma_axis(w, "stream_beta")?;
        pragma_s_axilite(w, "beta")?;
    }
    pragma_s_axilite(w, "return")?;
    w.blank()?;

    if alpha {
        w.line(&format!("qdma_axis<{},0,0,0> scalar_alpha;", bits))?;
        w.line("scalar_alpha.data = alpha;")?;
        w.line("scalar_alpha.keep_all();")?;
        w.line("scalar_alpha.set_last(1);")?;
        w.line("stream_alpha.write(scalar_alpha);")?;
    }
    if beta {
        w.line(&format!("qdma_axis<{},0,0,0> scalar_beta;", bits))?;
        w.line("scalar_beta.data = beta;")?;
        w.line("scalar_beta.keep_all();")?;
        w.line("scalar_beta.set_last(1);")?;
        w.line("stream_beta.write(scalar_beta);")?;
    }
    w.close("}")
}

pub fn emit_s2mm<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let bits = k.dtype.bits();

    w.open(&format!(
        "void {}_s2mm(ap_int<{}> *mem, int m, \
         hls::stream<qdma_axis<{}, 0, 0, 0>> &stream_out) {{",
        k.user_name, bits, bits
    ))?;
    pragma_m_axi(w, "mem")?;
    pragma_axis(w, "stream_out")?;
    pragma_s_axilite(w, "mem")?;
    pragma_s_axilite(w, "m")?;
    pragma_s_axilite(w, "return")?;
    w.blank()?;

    w.line("// Retrieve data from out stream")?;
    w.open("for (int i = 0; i < m; i++) {")?;
    w.line_raw("#pragma HLS pipeline II = 1")?;
    w.line(&format!("qdma_axis<{},0,0,0> x = stream_out.read();", bits))?;
    w.line("mem[i] = x.data;")?;
    w.close("}")?;
    w.close("}")
}

pub fn emit_link<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let name = &k.user_name;
    let a = k.binding("A").is_host();
    let x = k.binding("x").is_host();
    let y = k.binding("y").is_host();
    let alpha = k.binding("alpha").is_host();
    let beta = k.binding("beta").is_host();
    let out = k.binding("out").is_host();

    if a {
        w.line(&format!("nk={0}_mm2s_A:1:{0}_mm2s_A", name))?;
    }
    if x {
        w.line(&format!("nk={0}_mm2s_x:1:{0}_mm2s_x", name))?;
    }
    if y {
        w.line(&format!("nk={0}_mm2s_y:1:{0}_mm2s_y", name))?;
    }
    if alpha || beta {
        w.line(&format!("nk={0}_mm2s_scalar:1:{0}_mm2s_scalar", name))?;
    }
    if out {
        w.line(&format!("nk={0}_s2mm:1:{0}_s2mm", name))?;
    }
    w.blank()?;
    if a {
        w.line(&format!("sc={0}_mm2s_A.stream_A:ai_engine_0.{0}_A", name))?;
    }
    if x {
        w.line(&format!("sc={0}_mm2s_x.stream_x:ai_engine_0.{0}_x", name))?;
    }
    if y {
        w.line(&format!("sc={0}_mm2s_y.stream_y:ai_engine_0.{0}_y", name))?;
    }
    if alpha {
        w.line(&format!(
            "sc={0}_mm2s_scalar.stream_alpha:ai_engine_0.{0}_alpha",
            name
        ))?;
    }
    if beta {
        w.line(&format!(
            "sc={0}_mm2s_scalar.stream_beta:ai_engine_0.{0}_beta",
            name
        ))?;
    }
    if out {
        w.line(&format!("sc=ai_engine_0.{0}_out:{0}_s2mm.stream_out", name))?;
    }
    w.blank()?;
    if a {
        w.line(&format!("slr={}_mm2s_A:SLR0", name))?;
    }
    if x {
        w.line(&format!("slr={}_mm2s_x:SLR0", name))?;
    }
    if y {
        w.line(&format!("slr={}_mm2s_y:SLR0", name))?;
    }
    if alpha || beta {
        w.line(&format!("slr={}_mm2s_scalar:SLR0", name))?;
    }
    if out {
        w.line(&format!("slr={}_s2mm:SLR0", name))?;
    }
    w.blank()?;
    if a {
        w.line(&format!("sp={}_mm2s_A.m_axi_gmem:MC_NOC0", name))?;
    }
    if x {
        w.line(&format!("sp={}_mm2s_x.m_axi_gmem:MC_NOC0", name))?;
    }
    if y {
        w.line(&format!("sp={}_mm2s_y.m_axi_gmem:MC_NOC0", name))?;
    }
    if out {
        w.line(&format!("sp={}_s2mm.m_axi_gmem:MC_NOC0", name))?;
    }
    Ok(())
}
