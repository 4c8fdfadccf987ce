//! nrm2: Euclidean norm. Accumulates the sum of squares across windows
//! and streams sqrt of the total after the final one.

use std::io::{self, Write};

use crate::emitter::SourceWriter;
use crate::kernels::zero_init;
use crate::model::{native_vector_name, Kernel};

pub fn emit_globals<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    w.line(&format!("#define NUM_SAMPLES {}", k.num_samples()))?;
    w.blank()?;
    w.line("uint64 chess_storage(%chess_alignof(v4int64)) counter[4] = {0, 0, 0, 0};")?;
    let (count, align) = native_vector_name(k.dtype, 2)
        .unwrap_or_else(|| (2, format!("v2{}", k.dtype.cname())));
    w.line(&format!(
        "{} chess_storage(%chess_alignof({})) result_storage[{}] = {{{}}};",
        k.dtype.cname(),
        align,
        count,
        zero_init(count)
    ))
}

pub fn emit_arguments<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let t = k.dtype.cname();
    w.write(&format!(
        "input_stream<uint64> *__restrict in_size_n, \
         input_window<{0}> *__restrict x, output_stream<{0}> *__restrict out",
        t
    ))
}

pub fn emit_body<W: Write>(w: &mut SourceWriter<W>, k: &Kernel) -> io::Result<()> {
    let t = k.dtype.cname();

    w.line("uint64 *num_cycles = &counter[0];")?;
    w.line("uint64 *cycle = &counter[1];")?;
    w.open("if (*num_cycles == 0) {")?;
    w.line("*num_cycles = readincr(in_size_n) / NUM_SAMPLES;")?;
    w.close("}")?;
    w.line(&format!("{} &result = result_storage[0];", t))?;
    w.blank()?;
    if k.vsize == 0 {
        w.line(&format!("{} vx;", t))?;
        w.open("for (unsigned i = 0; i < NUM_SAMPLES; i++) {")?;
        w.line("vx = window_readincr(x);")?;
        w.line("result += vx * vx;")?;
        w.close("}")?;
    } else {
        w.line(&format!(
            "aie::vector<{}, {}> vx;",
            t, k.vsize
        ))?;
        w.line(&format!(
            "aie::accum<acc32, {}> acc = aie::zeros<acc32, {}>();",
            k.vsize, k.vsize
        ))?;
        w.line(&format!(
            "constexpr unsigned NUM_LOOPS = NUM_SAMPLES / {};",
            k.vsize
        ))?;
        w.open("for (unsigned i = 0; i < NUM_LOOPS; i++) {")?;
        w.line(&format!("vx = window_readincr_v<{}>(x);", k.vsize))?;
        w.line("acc = aie::mac(acc, vx, vx);")?;
        w.close("}")?;
        w.line(&format!(
            "result += aie::reduce_add(acc.to_vector<{}>());",
            t
        ))?;
    }
    w.blank()?;
    w.line("*cycle += 1;")?;
    w.blank()?;
    w.open("if (*cycle == *num_cycles) {")?;
    w.line("writeincr(out, aie::sqrt(result), true);")?;
    w.close("}")
}
