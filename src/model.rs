//! Data model for a dataflow design: kernels, connections, data types
//! and argument shapes.
//!
//! The model is built once by the loader and is read-only for every
//! subsequent generation phase.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Element type of a kernel's data ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl DataType {
    pub fn parse(s: &str) -> Option<DataType> {
        match s {
            "int32" => Some(DataType::Int32),
            "int64" => Some(DataType::Int64),
            "float" | "float32" => Some(DataType::Float32),
            "double" | "float64" => Some(DataType::Float64),
            _ => None,
        }
    }

    /// Type name as it appears in emitted kernel sources.
    pub fn cname(self) -> &'static str {
        match self {
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float",
            DataType::Float64 => "double",
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            DataType::Int32 | DataType::Float32 => 32,
            DataType::Int64 | DataType::Float64 => 64,
        }
    }

    /// Hardware-supported SIMD element counts for this element type.
    pub fn native_widths(self) -> &'static [u32] {
        match self {
            DataType::Int32 => &[4, 8, 16, 32],
            DataType::Int64 => &[4, 8, 16],
            DataType::Float32 => &[4, 8, 16, 32],
            DataType::Float64 => &[2, 4, 8],
        }
    }
}

/// Largest native vector width for `dtype` that is still >= `min`.
///
/// Candidate sets are ascending, so if the smallest qualifying candidate
/// exists the maximum of the set qualifies as well and wins. Returns
/// `None` when no candidate qualifies (vectorization unavailable).
pub fn native_vector_width(dtype: DataType, min: u32) -> Option<u32> {
    dtype.native_widths().iter().copied().filter(|&w| w >= min).max()
}

/// Native vector width plus the AIE vector type name used for aligned
/// storage declarations, e.g. `(8, "v8float")`.
pub fn native_vector_name(dtype: DataType, min: u32) -> Option<(u32, String)> {
    native_vector_width(dtype, min).map(|w| (w, format!("v{}{}", w, dtype.cname())))
}

/// Supported BLAS primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Asum,
    Axpy,
    Dot,
    Gemv,
    Iamax,
    Nrm2,
    Rot,
    Scal,
}

impl Operation {
    pub fn parse(s: &str) -> Option<Operation> {
        match s {
            "asum" => Some(Operation::Asum),
            "axpy" => Some(Operation::Axpy),
            "dot" => Some(Operation::Dot),
            "gemv" => Some(Operation::Gemv),
            "iamax" => Some(Operation::Iamax),
            "nrm2" => Some(Operation::Nrm2),
            "rot" => Some(Operation::Rot),
            "scal" => Some(Operation::Scal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Asum => "asum",
            Operation::Axpy => "axpy",
            Operation::Dot => "dot",
            Operation::Gemv => "gemv",
            Operation::Iamax => "iamax",
            Operation::Nrm2 => "nrm2",
            Operation::Rot => "rot",
            Operation::Scal => "scal",
        }
    }
}

/// Direction of a kernel argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Dimensionality of a kernel argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Scalar,
    Vector,
    Matrix,
}

/// Static per-operation, per-argument descriptor.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub direction: Direction,
    pub dim: Dim,
    /// Index-typed arguments always use 64-bit boundary ports.
    pub index_typed: bool,
    /// Asynchronous window ports get an `async(...)` wrapper in the graph.
    pub asynchronous: bool,
}

/// A (kernel name, parameter name) pair, the unit of connection
/// addressing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct Endpoint {
    pub kernel: String,
    pub parameter: String,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kernel, self.parameter)
    }
}

/// Where a kernel argument is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Bound to host memory through a bridge kernel.
    Host,
    /// Bound to another kernel's port; no boundary port is created.
    Peer { kernel: String, parameter: String },
    /// Suppressed entirely (an immediate value replaces the stream).
    Disabled,
}

impl Binding {
    pub fn is_host(&self) -> bool {
        matches!(self, Binding::Host)
    }
}

/// A compile-time immediate scalar from the kernel's `extra` options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Uint(v) => write!(f, "{}", v),
            Scalar::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
        }
    }
}

/// Operation-specific immediate values. A closed sum type: the variant
/// determines the operation, so options can never belong to the wrong
/// kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelOptions {
    Asum,
    Axpy { alpha: Option<Scalar> },
    Dot,
    Gemv {
        alpha: Option<Scalar>,
        beta: Option<Scalar>,
    },
    Iamax,
    Nrm2,
    Rot {
        c: Option<Scalar>,
        s: Option<Scalar>,
    },
    Scal,
}

impl KernelOptions {
    pub fn operation(&self) -> Operation {
        match self {
            KernelOptions::Asum => Operation::Asum,
            KernelOptions::Axpy { .. } => Operation::Axpy,
            KernelOptions::Dot => Operation::Dot,
            KernelOptions::Gemv { .. } => Operation::Gemv,
            KernelOptions::Iamax => Operation::Iamax,
            KernelOptions::Nrm2 => Operation::Nrm2,
            KernelOptions::Rot { .. } => Operation::Rot,
            KernelOptions::Scal => Operation::Scal,
        }
    }

    /// True when an immediate value replaces what would otherwise be a
    /// streamed argument.
    pub fn is_disabled(&self, arg: &str) -> bool {
        match self {
            KernelOptions::Axpy { alpha } => arg == "alpha" && alpha.is_some(),
            KernelOptions::Gemv { alpha, beta } => {
                (arg == "alpha" && alpha.is_some()) || (arg == "beta" && beta.is_some())
            }
            KernelOptions::Rot { c, s } => {
                (arg == "c" && c.is_some()) || (arg == "s" && s.is_some())
            }
            _ => false,
        }
    }
}

/// A single kernel instance in the design.
#[derive(Debug, Clone)]
pub struct Kernel {
    pub user_name: String,
    pub dtype: DataType,
    /// Requested vector width; 0 means scalar (non-vectorized) code.
    pub vsize: u32,
    /// Window size in bytes for block transfers.
    pub wsize: u32,
    /// Optional fixed tile placement on the fabric.
    pub tile: Option<(u32, u32)>,
    /// Maps each argument name to its resolved binding.
    pub bindings: HashMap<String, Binding>,
    pub options: KernelOptions,
}

impl Kernel {
    pub fn operation(&self) -> Operation {
        self.options.operation()
    }

    /// Binding for an argument. The loader guarantees one entry per
    /// argument spec, so a miss is a programming error.
    pub fn binding(&self, arg: &str) -> &Binding {
        &self.bindings[arg]
    }

    /// Loop trip count for one window of data.
    pub fn num_samples(&self) -> u32 {
        self.wsize * 8 / self.dtype.bits()
    }

    /// Element or vector type as spelled in the kernel body.
    pub fn aie_dtype(&self) -> String {
        if self.vsize == 0 {
            self.dtype.cname().to_string()
        } else {
            format!("aie::vector<{}, {}>", self.dtype.cname(), self.vsize)
        }
    }
}

/// A validated design: the unit of one generation run.
#[derive(Debug, Clone)]
pub struct Design {
    pub platform: String,
    pub profile: bool,
    /// Kernels in input order; order is semantically significant.
    pub kernels: Vec<Kernel>,
}

impl Design {
    pub fn kernel(&self, name: &str) -> Option<&Kernel> {
        self.kernels.iter().find(|k| k.user_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_vector_width_takes_maximum() {
        // Every int32 candidate is >= 2, so the maximum wins.
        assert_eq!(native_vector_width(DataType::Int32, 2), Some(32));
        assert_eq!(native_vector_width(DataType::Int64, 8), Some(16));
    }

    #[test]
    fn test_native_vector_width_unavailable() {
        assert_eq!(native_vector_width(DataType::Int64, 32), None);
    }

    #[test]
    fn test_native_vector_name() {
        assert_eq!(
            native_vector_name(DataType::Float32, 2),
            Some((32, "v32float".to_string()))
        );
    }

    #[test]
    fn test_datatype_parse_aliases() {
        assert_eq!(DataType::parse("float"), Some(DataType::Float32));
        assert_eq!(DataType::parse("float32"), Some(DataType::Float32));
        assert_eq!(DataType::parse("double"), Some(DataType::Float64));
        assert_eq!(DataType::parse("float64"), Some(DataType::Float64));
        assert_eq!(DataType::parse("int8"), None);
    }

    #[test]
    fn test_int64_is_not_aliased_to_int32() {
        assert_eq!(DataType::parse("int64"), Some(DataType::Int64));
        assert_eq!(DataType::parse("int64").unwrap().bits(), 64);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Int(-3).to_string(), "-3");
        assert_eq!(Scalar::Uint(7).to_string(), "7");
        assert_eq!(Scalar::Float(2.0).to_string(), "2.0");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_options_disabled_arg() {
        let opts = KernelOptions::Axpy {
            alpha: Some(Scalar::Float(2.0)),
        };
        assert!(opts.is_disabled("alpha"));
        assert!(!opts.is_disabled("x"));

        let opts = KernelOptions::Rot {
            c: Some(Scalar::Float(0.5)),
            s: None,
        };
        assert!(opts.is_disabled("c"));
        assert!(!opts.is_disabled("s"));
    }

    #[test]
    fn test_options_determine_operation() {
        let opts = KernelOptions::Gemv {
            alpha: None,
            beta: None,
        };
        assert_eq!(opts.operation(), Operation::Gemv);
    }

    #[test]
    fn test_num_samples() {
        let k = Kernel {
            user_name: "k".to_string(),
            dtype: DataType::Float32,
            vsize: 0,
            wsize: 128,
            tile: None,
            bindings: HashMap::new(),
            options: KernelOptions::Dot,
        };
        assert_eq!(k.num_samples(), 32);
    }
}
