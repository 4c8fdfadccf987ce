//! Plane rotation: out_x = c * x + s * y, out_y = c * y - s * x.
//! Either rotation coefficient may be an immediate; streamed
//! coefficients are latched on first invocation.

use std::io::{self, Write};

use crate::emitter::SourceWriter;
use crate::kernels::zero_init;
use crate::model::{native_vector_name, Kernel, Scalar};

pub fn emit_globals<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    c: &Option<Scalar>,
    s: &Option<Scalar>,
) -> io::Result<()> {
    w.line(&format!("#define NUM_SAMPLES {}", k.num_samples()))?;
    if c.is_none() || s.is_none() {
        w.blank()?;
        let (count, align) = native_vector_name(k.dtype, 3)
            .unwrap_or_else(|| (4, format!("v4{}", k.dtype.cname())));
        w.line(&format!(
            "{} chess_storage(%chess_alignof({})) rot_storage[{}] = {{{}}};",
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
    c: &Option<Scalar>,
    s: &Option<Scalar>,
) -> io::Result<()> {
    let t = k.dtype.cname();
    w.write(&format!(
        "input_window<{0}> *__restrict x, input_window<{0}> *__restrict y, \
         output_window<{0}> *__restrict out_x, output_window<{0}> *__restrict out_y",
        t
    ))?;
    if c.is_none() {
        w.write(&format!(", input_stream<{}> *__restrict c", t))?;
    }
    if s.is_none() {
        w.write(&format!(", input_stream<{}> *__restrict s", t))?;
    }
    Ok(())
}

pub fn emit_body<W: Write>(
    w: &mut SourceWriter<W>,
    k: &Kernel,
    c: &Option<Scalar>,
    s: &Option<Scalar>,
) -> io::Result<()> {
    let t = k.dtype.cname();
    let dtype = k.aie_dtype();

    if c.is_none() {
        w.line(&format!("{} *c_store = &rot_storage[0];", t))?;
    }
    if s.is_none() {
        w.line(&format!("{} *s_store = &rot_storage[1];", t))?;
    }
    if c.is_none() || s.is_none() {
        w.line(&format!("{} *rot_set = &rot_storage[2];", t))?;
        w.open("if (*rot_set == 0) {")?;
        w.line("*rot_set = 1;")?;
        if c.is_none() {
            w.line("*c_store = readincr(c);")?;
        }
        if s.is_none() {
            w.line("*s_store = readincr(s);")?;
        }
        w.close("}")?;
        w.blank()?;
    }

    w.line(&format!("{} vx, vy, vout_x, vout_y;", dtype))?;
    let loop_cond = if k.vsize == 0 {
        match c {
            Some(value) => w.line(&format!("{} scalar_c = {};", dtype, value))?,
            None => w.line(&format!("{} scalar_c = *c_store;", dtype))?,
        }
        match s {
            Some(value) => w.line(&format!("{} scalar_s = {};", dtype, value))?,
            None => w.line(&format!("{} scalar_s = *s_store;", dtype))?,
        }
        "NUM_SAMPLES"
    } else {
        match c {
            Some(value) => w.line(&format!(
                "{} scalar_c = aie::broadcast<{}, {}>({});",
                dtype, t, k.vsize, value
            ))?,
            None => w.line(&format!(
                "{} scalar_c = aie::broadcast<{}, {}>(*c_store);",
                dtype, t, k.vsize
            ))?,
        }
        match s {
            Some(value) => w.line(&format!(
                "{} scalar_s = aie::broadcast<{}, {}>({});",
                dtype, t, k.vsize, value
            ))?,
            None => w.line(&format!(
                "{} scalar_s = aie::broadcast<{}, {}>(*s_store);",
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
        w.line("vout_x = scalar_c * vx + scalar_s * vy;")?;
        w.line("vout_y = scalar_c * vy - scalar_s * vx;")?;
    } else {
        w.line(&format!("vx = window_readincr_v<{}>(x);", k.vsize))?;
        w.line(&format!("vy = window_readincr_v<{}>(y);", k.vsize))?;
        w.line("// out_x = c * x + s * y")?;
        w.line(&format!(
            "vout_x = aie::mac(aie::mul(scalar_c, vx), scalar_s, vy).to_vector<{}>();",
            t
        ))?;
        w.line("// out_y = c * y - s * x")?;
        w.line(&format!(
            "vout_y = aie::msc(aie::mul(scalar_c, vy), scalar_s, vx).to_vector<{}>();",
            t
        ))?;
    }
    w.line("window_writeincr(out_x, vout_x);")?;
    w.line("window_writeincr(out_y, vout_y);")?;
    w.close("}")
}
