//! asum: sum of absolute values over the whole vector. Accumulates
//! across windows and streams the result after the final one, like the
//! other full-vector reductions.

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
        w.line("result += aie::abs(vx);")?;
        w.close("}")?;
    } else {
        w.line(&format!(
            "aie::vector<{}, {}> acc = aie::zeros<{}, {}>();",
            t, k.vsize, t, k.vsize
        ))?;
        w.line(&format!(
            "constexpr unsigned NUM_LOOPS = NUM_SAMPLES / {};",
            k.vsize
        ))?;
        w.open("for (unsigned i = 0; i < NUM_LOOPS; i++) {")?;
        w.line(&format!(
            "acc = aie::add(acc, aie::abs(window_readincr_v<{}>(x)));",
            k.vsize
        ))?;
        w.close("}")?;
        w.line("result += aie::reduce_add(acc);")?;
    }
    w.blank()?;
    w.line("*cycle += 1;")?;
    w.blank()?;
    w.open("if (*cycle == *num_cycles) {")?;
    w.line("writeincr(out, result, true);")?;
    w.close("}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::tests::{design, render};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_body_accumulates_absolute_values() {
        let d = design(
            r#"[{"blas_op": "asum", "user_name": "a0", "type": "float"}]"#,
            "[]",
        );
        let text = render(|w| emit_body(w, &d.kernels[0]));
        let expected = "\
uint64 *num_cycles = &counter[0];
uint64 *cycle = &counter[1];
if (*num_cycles == 0) {
    *num_cycles = readincr(in_size_n) / NUM_SAMPLES;
}
float &result = result_storage[0];

float vx;
for (unsigned i = 0; i < NUM_SAMPLES; i++) {
    vx = window_readincr(x);
    result += aie::abs(vx);
}

*cycle += 1;

if (*cycle == *num_cycles) {
    writeincr(out, result, true);
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_vectorized_body_reduces_per_window() {
        let d = design(
            r#"[{"blas_op": "asum", "user_name": "a0", "type": "float",
                 "vector_size": 8}]"#,
            "[]",
        );
        let text = render(|w| emit_body(w, &d.kernels[0]));
        assert!(text.contains("aie::vector<float, 8> acc = aie::zeros<float, 8>();"));
        assert!(text.contains("acc = aie::add(acc, aie::abs(window_readincr_v<8>(x)));"));
        assert!(text.contains("result += aie::reduce_add(acc);"));
    }
}
