//! Static per-operation argument tables.
//!
//! The canonical argument order defined here determines parameter lists,
//! port numbering and connection emission everywhere else; it must never
//! depend on input data.

use crate::model::{ArgumentSpec, Dim, Direction, Operation};

const fn arg(name: &'static str, direction: Direction, dim: Dim) -> ArgumentSpec {
    ArgumentSpec {
        name,
        direction,
        dim,
        index_typed: false,
        asynchronous: false,
    }
}

const fn index_arg(name: &'static str) -> ArgumentSpec {
    ArgumentSpec {
        name,
        direction: Direction::Input,
        dim: Dim::Scalar,
        index_typed: true,
        asynchronous: false,
    }
}

const fn async_arg(name: &'static str, direction: Direction, dim: Dim) -> ArgumentSpec {
    ArgumentSpec {
        name,
        direction,
        dim,
        index_typed: false,
        asynchronous: true,
    }
}

const ASUM_ARGS: &[ArgumentSpec] = &[
    index_arg("in_size_n"),
    arg("x", Direction::Input, Dim::Vector),
    arg("out", Direction::Output, Dim::Scalar),
];

const AXPY_ARGS: &[ArgumentSpec] = &[
    arg("alpha", Direction::Input, Dim::Scalar),
    arg("x", Direction::Input, Dim::Vector),
    arg("y", Direction::Input, Dim::Vector),
    arg("out", Direction::Output, Dim::Vector),
];

const DOT_ARGS: &[ArgumentSpec] = &[
    arg("x", Direction::Input, Dim::Vector),
    arg("y", Direction::Input, Dim::Vector),
    arg("out", Direction::Output, Dim::Scalar),
];

const GEMV_ARGS: &[ArgumentSpec] = &[
    arg("alpha", Direction::Input, Dim::Scalar),
    arg("A", Direction::Input, Dim::Matrix),
    async_arg("x", Direction::Input, Dim::Vector),
    arg("beta", Direction::Input, Dim::Scalar),
    async_arg("y", Direction::Input, Dim::Vector),
    async_arg("out", Direction::Output, Dim::Vector),
];

const IAMAX_ARGS: &[ArgumentSpec] = &[
    index_arg("in_size_n"),
    arg("x", Direction::Input, Dim::Vector),
    arg("out", Direction::Output, Dim::Scalar),
];

const NRM2_ARGS: &[ArgumentSpec] = &[
    index_arg("in_size_n"),
    arg("x", Direction::Input, Dim::Vector),
    arg("out", Direction::Output, Dim::Scalar),
];

const ROT_ARGS: &[ArgumentSpec] = &[
    arg("x", Direction::Input, Dim::Vector),
    arg("y", Direction::Input, Dim::Vector),
    arg("out_x", Direction::Output, Dim::Vector),
    arg("out_y", Direction::Output, Dim::Vector),
    arg("c", Direction::Input, Dim::Scalar),
    arg("s", Direction::Input, Dim::Scalar),
];

const SCAL_ARGS: &[ArgumentSpec] = &[
    arg("alpha", Direction::Input, Dim::Scalar),
    arg("x", Direction::Input, Dim::Vector),
    arg("out", Direction::Output, Dim::Vector),
];

/// Canonical ordered argument list for an operation.
pub fn kernel_args(op: Operation) -> &'static [ArgumentSpec] {
    match op {
        Operation::Asum => ASUM_ARGS,
        Operation::Axpy => AXPY_ARGS,
        Operation::Dot => DOT_ARGS,
        Operation::Gemv => GEMV_ARGS,
        Operation::Iamax => IAMAX_ARGS,
        Operation::Nrm2 => NRM2_ARGS,
        Operation::Rot => ROT_ARGS,
        Operation::Scal => SCAL_ARGS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OPS: [Operation; 8] = [
        Operation::Asum,
        Operation::Axpy,
        Operation::Dot,
        Operation::Gemv,
        Operation::Iamax,
        Operation::Nrm2,
        Operation::Rot,
        Operation::Scal,
    ];

    #[test]
    fn test_every_operation_has_args() {
        for op in ALL_OPS {
            assert!(!kernel_args(op).is_empty(), "{} has no args", op.name());
        }
    }

    #[test]
    fn test_argument_names_unique_per_operation() {
        for op in ALL_OPS {
            let args = kernel_args(op);
            for (i, a) in args.iter().enumerate() {
                for b in &args[i + 1..] {
                    assert_ne!(a.name, b.name, "duplicate arg in {}", op.name());
                }
            }
        }
    }

    #[test]
    fn test_every_operation_has_an_output() {
        for op in ALL_OPS {
            assert!(
                kernel_args(op)
                    .iter()
                    .any(|a| a.direction == Direction::Output),
                "{} has no output",
                op.name()
            );
        }
    }

    #[test]
    fn test_index_args_are_scalar_inputs() {
        for op in ALL_OPS {
            for a in kernel_args(op) {
                if a.index_typed {
                    assert_eq!(a.direction, Direction::Input);
                    assert_eq!(a.dim, Dim::Scalar);
                }
            }
        }
    }

    #[test]
    fn test_rot_order_puts_scalars_last() {
        let names: Vec<&str> = kernel_args(Operation::Rot).iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["x", "y", "out_x", "out_y", "c", "s"]);
    }
}
