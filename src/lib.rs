//! blas2aie: declarative BLAS-to-dataflow code generator.
//!
//! Takes a JSON description of linear-algebra kernels and the
//! connections between them and emits the full source bundle for an AI
//! Engine design: per-kernel sources, the top-level graph, host-memory
//! bridge kernels, link directives and a build script.

pub mod args;
pub mod cmake;
pub mod config;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod graph;
pub mod kernels;
pub mod loader;
pub mod logging;
pub mod model;
pub mod resolver;

pub use error::{CodegenError, CodegenResult};
pub use generator::{codegen, Generator};
pub use loader::{load_design, load_design_file};
pub use model::{Design, Kernel, Operation};
