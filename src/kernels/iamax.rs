//! iamax: index of the element with the largest absolute value. The
//! total vector length arrives over the index stream, so the kernel
//! knows after how many windows to emit the result.

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
    w.line(&format!("{} &max = result_storage[0];", t))?;
    w.line(&format!("{} &index = result_storage[1];", t))?;
    w.blank()?;
    w.line(&format!("{} vx;", t))?;
    w.open("for (unsigned i = 0; i < NUM_SAMPLES; i++) {")?;
    w.line("vx = aie::abs(window_readincr(x));")?;
    w.open("if (vx > max) {")?;
    w.line("max = vx;")?;
    w.line("index = *cycle * NUM_SAMPLES + i;")?;
    w.close("}")?;
    w.close("}")?;
    w.blank()?;
    w.line("*cycle += 1;")?;
    w.blank()?;
    w.open("if (*cycle == *num_cycles) {")?;
    w.line("writeincr(out, index, true);")?;
    w.close("}")
}
