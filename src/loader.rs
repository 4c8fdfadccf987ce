//! JSON loading and validation.
//!
//! Parses the top-level design object, builds the connection index and
//! produces a fully resolved [`Design`]. Every diagnostic names the
//! offending kernel index or connection index.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CodegenError, CodegenResult};
use crate::model::{DataType, Design, Endpoint, Kernel, KernelOptions, Operation, Scalar};
use crate::resolver::{resolve_bindings, ConnectionIndex};

#[derive(Debug, Deserialize)]
struct RawConnection {
    #[serde(rename = "in")]
    input: Endpoint,
    out: Endpoint,
}

/// Load and validate a design from a JSON file.
pub fn load_design_file(path: &Path) -> CodegenResult<Design> {
    let text = fs::read_to_string(path)?;
    load_design(&text)
}

/// Load and validate a design from JSON text.
pub fn load_design(text: &str) -> CodegenResult<Design> {
    let root: Value = serde_json::from_str(text)?;

    let platform = match root.get("platform") {
        None => {
            return Err(CodegenError::top_level(
                "top-level item platform is missing from json",
            ))
        }
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(CodegenError::top_level("platform should be a string")),
    };

    let profile = match root.get("profile") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(CodegenError::top_level("profile should be a boolean")),
    };

    let connections = parse_connections(&root)?;

    let kernels_json = match root.get("kernels") {
        None => {
            return Err(CodegenError::top_level(
                "top-level item kernels is missing from json",
            ))
        }
        Some(Value::Array(items)) => items,
        Some(_) => return Err(CodegenError::top_level("kernels should be an array")),
    };

    let mut kernels = Vec::with_capacity(kernels_json.len());
    for (index, item) in kernels_json.iter().enumerate() {
        kernels.push(parse_kernel(item, index, &connections)?);
    }

    Ok(Design {
        platform,
        profile,
        kernels,
    })
}

fn parse_connections(root: &Value) -> CodegenResult<ConnectionIndex> {
    let mut index = ConnectionIndex::new();

    let items = match root.get("connections") {
        None => return Ok(index),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(CodegenError::top_level("connections should be an array")),
    };

    for (i, item) in items.iter().enumerate() {
        let conn: RawConnection = serde_json::from_value(item.clone()).map_err(|e| {
            CodegenError::top_level(format!("connection {}: {}", i, e))
        })?;

        if index.contains_key(&conn.input) {
            return Err(CodegenError::DuplicateConnection {
                kernel: conn.input.kernel,
                parameter: conn.input.parameter,
            });
        }
        index.insert(conn.input, conn.out);
    }

    Ok(index)
}

fn require_str<'a>(item: &'a Value, field: &str, index: usize) -> CodegenResult<&'a str> {
    match item.get(field) {
        None => Err(CodegenError::schema(
            index,
            format!("missing '{}'", field),
        )),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(CodegenError::schema(
            index,
            format!("'{}' should be a string", field),
        )),
    }
}

fn optional_unsigned(item: &Value, field: &str, index: usize, default: u32) -> CodegenResult<u32> {
    let err = || {
        CodegenError::schema(
            index,
            format!("'{}' should be an unsigned integer", field),
        )
    };
    match item.get(field) {
        None => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(err),
        Some(_) => Err(err()),
    }
}

fn parse_tile(item: &Value, index: usize) -> CodegenResult<Option<(u32, u32)>> {
    let tile = match item.get("tile") {
        None => return Ok(None),
        Some(t) => t,
    };

    let err = || {
        CodegenError::schema(
            index,
            "'tile' should be an array of two unsigned integers",
        )
    };

    let coords = tile.as_array().ok_or_else(err)?;
    if coords.len() < 2 {
        return Err(err());
    }
    let coord = |v: &Value| v.as_u64().and_then(|v| u32::try_from(v).ok());
    let x = coord(&coords[0]).ok_or_else(err)?;
    let y = coord(&coords[1]).ok_or_else(err)?;
    Ok(Some((x, y)))
}

fn parse_kernel(
    item: &Value,
    index: usize,
    connections: &ConnectionIndex,
) -> CodegenResult<Kernel> {
    if !item.is_object() {
        return Err(CodegenError::schema(index, "should be a dictionary"));
    }

    let op_str = require_str(item, "blas_op", index)?;
    let operation = Operation::parse(op_str)
        .ok_or_else(|| CodegenError::unknown_enum("blas_op", op_str, index))?;

    let user_name = require_str(item, "user_name", index)?.to_string();

    let type_str = require_str(item, "type", index)?;
    let dtype = DataType::parse(type_str)
        .ok_or_else(|| CodegenError::unknown_enum("type", type_str, index))?;

    let vsize = optional_unsigned(item, "vector_size", index, 0)?;
    let wsize = optional_unsigned(item, "window_size", index, 128)?;
    let tile = parse_tile(item, index)?;

    let options = match item.get("extra") {
        None => parse_options(operation, &Value::Null, index)?,
        Some(extra) => parse_options(operation, extra, index)?,
    };

    let bindings = resolve_bindings(connections, &user_name, operation, &options);

    Ok(Kernel {
        user_name,
        dtype,
        vsize,
        wsize,
        tile,
        bindings,
        options,
    })
}

/// Parse the operation-specific `extra` object into typed options.
/// Recognized fields accept only numeric JSON values.
fn parse_options(op: Operation, extra: &Value, index: usize) -> CodegenResult<KernelOptions> {
    let options = match op {
        Operation::Asum => KernelOptions::Asum,
        Operation::Axpy => KernelOptions::Axpy {
            alpha: optional_scalar(extra, "alpha", index)?,
        },
        Operation::Dot => KernelOptions::Dot,
        Operation::Gemv => KernelOptions::Gemv {
            alpha: optional_scalar(extra, "alpha", index)?,
            beta: optional_scalar(extra, "beta", index)?,
        },
        Operation::Iamax => KernelOptions::Iamax,
        Operation::Nrm2 => KernelOptions::Nrm2,
        Operation::Rot => KernelOptions::Rot {
            c: optional_scalar(extra, "c", index)?,
            s: optional_scalar(extra, "s", index)?,
        },
        Operation::Scal => KernelOptions::Scal,
    };
    Ok(options)
}

fn optional_scalar(extra: &Value, field: &str, index: usize) -> CodegenResult<Option<Scalar>> {
    let value = match extra.get(field) {
        None => return Ok(None),
        Some(v) => v,
    };

    let number = value
        .as_number()
        .ok_or_else(|| CodegenError::UnsupportedOptionType {
            field: field.to_string(),
            index,
        })?;

    let scalar = if let Some(u) = number.as_u64() {
        Scalar::Uint(u)
    } else if let Some(i) = number.as_i64() {
        Scalar::Int(i)
    } else {
        // serde_json numbers are always one of u64/i64/f64
        Scalar::Float(number.as_f64().unwrap_or_default())
    };
    Ok(Some(scalar))
}
