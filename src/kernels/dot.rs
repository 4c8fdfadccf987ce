//! Dot product: out = sum(x[i] * y[i]) over one window, streamed out as
//! a single scalar.

use std::io::{self, Write};

use crate::emitter::SourceWriter;
use crate::model::Kernel;

pub fn emit_globals<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    w.line(&format!("#define NUM_SAMPLES {}", k.num_samples()))
}

pub fn emit_arguments<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let t = k.dtype.cname();
    w.write(&format!(
        "input_window<{0}> *__restrict x, input_window<{0}> *__restrict y, \
         output_stream<{0}> *__restrict out",
        t
    ))
}

pub fn emit_body<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let t = k.dtype.cname();
    let dtype = k.aie_dtype();

    w.line(&format!("{} c_x, c_y;", dtype))?;
    let loop_cond = if k.vsize == 0 {
        w.line(&format!("{} result = 0;", dtype))?;
        "NUM_SAMPLES"
    } else {
        w.line(&format!(
            "{} result = aie::broadcast<{}, {}>(0);",
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
        w.line("window_readincr(y, c_y);")?;
        w.line("result += c_x * c_y;")?;
    } else {
        w.line(&format!("c_x = window_readincr_v<{}>(x);", k.vsize))?;
        w.line(&format!("c_y = window_readincr_v<{}>(y);", k.vsize))?;
        w.line("result = aie::add(aie::mul(c_x, c_y), result);")?;
    }
    w.close("}")?;
    w.blank()?;
    if k.vsize == 0 {
        w.line("writeincr(out, result);")
    } else {
        w.line("writeincr(out, aie::reduce_add_v(result));")
    }
}
