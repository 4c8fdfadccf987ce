//! axpy: out = alpha * x + y. Alpha may be an immediate from the design
//! file; otherwise it is read once from its stream and latched in tile
//! memory across invocations.

use std::io::{self, Write};

use crate::emitter::SourceWriter;
use crate::kernels::zero_init;
use crate::model::{native_vector_name, Kernel, Scalar};

pub fn emit_globals<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    alpha: &Option<Scalar>,
) -> io::Result<()> {
    w.line(&format!("#define NUM_SAMPLES {}", k.num_samples()))?;
    if alpha.is_none() {
        w.blank()?;
        let (count, align) = native_vector_name(k.dtype, 2)
            .unwrap_or_else(|| (2, format!("v2{}", k.dtype.cname())));
        w.line(&format!(
            "{} chess_storage(%chess_alignof({})) alpha_storage[{}] = {{{}}};",
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
) -> io::Result<()> {
    let t = k.dtype.cname();
    if alpha.is_none() {
        w.write(&format!("input_stream<{}> *__restrict alpha, ", t))?;
    }
    w.write(&format!(
        "input_window<{0}> *__restrict x, input_window<{0}> *__restrict y, \
         output_window<{0}> *__restrict out",
        t
    ))
}

pub fn emit_body<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    alpha: &Option<Scalar>,
) -> io::Result<()> {
    let t = k.dtype.cname();
    let dtype = k.aie_dtype();

    if alpha.is_none() {
        w.line(&format!("{} *alpha_store = &alpha_storage[0];", t))?;
        w.line(&format!("{} *alpha_set = &alpha_storage[1];", t))?;
        w.open("if (*alpha_set == 0) {")?;
        w.line("*alpha_set = 1;")?;
        w.line("*alpha_store = readincr(alpha);")?;
        w.close("}")?;
        w.blank()?;
    }

    w.line(&format!("{} vx, vy, vout;", dtype))?;
    let loop_cond = if k.vsize == 0 {
        match alpha {
            Some(value) => w.line(&format!("{} scalar = {};", dtype, value))?,
            None => w.line(&format!("{} scalar = *alpha_store;", dtype))?,
        }
        "NUM_SAMPLES"
    } else {
        match alpha {
            Some(value) => w.line(&format!(
                "{} scalar = aie::broadcast<{}, {}>({});",
                dtype, t, k.vsize, value
            ))?,
            None => w.line(&format!(
                "{} scalar = aie::broadcast<{}, {}>(*alpha_store);",
                dtype, t, k.vsize
            ))?,
        }
        w.line(&format!(
            "constexpr unsigned NUM_LOOPS = NUM_SAMPLES / {};",
            k.vsize
        ))?;
        "NUM_LOOPS"
    };
    w.blank()?;
    w.open(&format!("for (unsigned i = 0; i < {}; i++) {{", loop_cond))?;
    if k.vsize == 0 {
        w.line("vx = window_readincr(x);")?;
        w.line("vy = window_readincr(y);")?;
        w.line("vout = scalar * vx + vy;")?;
    } else {
        w.line(&format!("vx = window_readincr_v<{}>(x);", k.vsize))?;
        w.line(&format!("vy = window_readincr_v<{}>(y);", k.vsize))?;
        w.line(&format!(
            "vout = aie::add(aie::mul(scalar, vx).to_vector<{}>(), vy);",
            t
        ))?;
    }
    w.line("window_writeincr(out, vout);")?;
    w.close("}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::tests::{design, render};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_streamed_alpha_is_latched_once() {
        let d = design(
            r#"[{"blas_op": "axpy", "user_name": "a0", "type": "float"}]"#,
            "[]",
        );
        let k = &d.kernels[0];

        let glob = render(|w| emit_globals(w, k, &None));
        assert!(glob.contains(
            "float chess_storage(%chess_alignof(v32float)) alpha_storage[32]"
        ));

        let body = render(|w| emit_body(w, k, &None));
        assert!(body.contains("if (*alpha_set == 0) {"));
        assert!(body.contains("*alpha_store = readincr(alpha);"));

        let args = render(|w| emit_arguments(w, k, &None));
        assert!(args.starts_with("input_stream<float> *__restrict alpha, "));
    }

    #[test]
    fn test_immediate_alpha_removes_stream_and_latch() {
        let d = design(
            r#"[{"blas_op": "axpy", "user_name": "a0", "type": "float",
                 "extra": {"alpha": 2}}]"#,
            "[]",
        );
        let k = &d.kernels[0];
        let alpha = Some(Scalar::Uint(2));

        let glob = render(|w| emit_globals(w, k, &alpha));
        assert_eq!(glob, "#define NUM_SAMPLES 32\n");

        let args = render(|w| emit_arguments(w, k, &alpha));
        assert!(!args.contains("alpha"));

        let body = render(|w| emit_body(w, k, &alpha));
        assert!(body.contains("float scalar = 2;"));
        assert!(!body.contains("alpha_store"));
    }

    #[test]
    fn test_vectorized_body() {
        let d = design(
            r#"[{"blas_op": "axpy", "user_name": "a0", "type": "float",
                 "vector_size": 8}]"#,
            "[]",
        );
        let body = render(|w| emit_body(w, &d.kernels[0], &None));
        assert!(body.contains(
            "aie::vector<float, 8> scalar = aie::broadcast<float, 8>(*alpha_store);"
        ));
        assert!(body.contains("vout = aie::add(aie::mul(scalar, vx).to_vector<float>(), vy);"));
        assert!(body.contains("window_writeincr(out, vout);"));
    }
}
