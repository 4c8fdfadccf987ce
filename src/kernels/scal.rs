//! scal: out = alpha * x. Alpha is streamed with every window, so a
//! host can rescale between transfers.

use std::io::{self, Write};

use crate::emitter::SourceWriter;
use crate::model::Kernel;

pub fn emit_globals<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    w.line(&format!("#define NUM_SAMPLES {}", k.num_samples()))
}

pub fn emit_arguments<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let t = k.dtype.cname();
    w.write(&format!(
        "input_stream<{0}> *__restrict alpha, input_window<{0}> *__restrict x, \
         output_window<{0}> *__restrict out",
        t
    ))
}

pub fn emit_body<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let t = k.dtype.cname();
    let dtype = k.aie_dtype();

    w.line(&format!("{} c_x, c_out;", dtype))?;
    let loop_cond = if k.vsize == 0 {
        w.line(&format!("{} scalar = readincr(alpha);", dtype))?;
        "NUM_SAMPLES"
    } else {
        w.line(&format!(
            "{} scalar = aie::broadcast<{}, {}>(readincr(alpha));",
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
        w.line("window_readincr(x, c_x);")?;
        w.line("c_out = c_x * scalar;")?;
    } else {
        w.line(&format!("c_x = window_readincr_v<{}>(x);", k.vsize))?;
        w.line(&format!(
            "c_out = aie::mul(c_x, scalar).to_vector<{}>();",
            t
        ))?;
    }
    w.line("window_writeincr(out, c_out);")?;
    w.close("}")
}
