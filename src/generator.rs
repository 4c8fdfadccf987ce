//! Generation driver: loads a design and runs the emission phases in a
//! fixed order, collecting the file lists the build script needs.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::emitter::SourceWriter;
use crate::error::CodegenResult;
use crate::log;
use crate::logging::LogLevel;
use crate::model::Design;
use crate::{cmake, config, graph, kernels, loader};

pub struct Generator {
    design: Design,
    out_dir: PathBuf,
    // Paths relative to the output directory, as listed in the build script.
    kernel_srcs: Vec<PathBuf>,
    kernel_hdrs: Vec<PathBuf>,
    pl_kernels: Vec<PathBuf>,
}

impl Generator {
    pub fn new(design: Design, out_dir: &Path) -> Generator {
        Generator {
            design,
            out_dir: out_dir.to_path_buf(),
            kernel_srcs: Vec::new(),
            kernel_hdrs: Vec::new(),
            pl_kernels: Vec::new(),
        }
    }

    /// Run every phase in order. Aborts on the first failure; files
    /// already written before a later failure are left in place.
    pub fn run(&mut self) -> CodegenResult<()> {
        self.generate_kernels()?;
        self.generate_graph()?;
        self.generate_bridges()?;
        self.generate_config()?;
        self.generate_cmake()
    }

    pub fn generate_kernels(&mut self) -> CodegenResult<()> {
        let aie_dir = self.out_dir.join("aie");
        if aie_dir.exists() {
            log!(LogLevel::Verbose, "Removing existing aie directory");
            fs::remove_dir_all(&aie_dir)?;
        }
        let kernel_dir = aie_dir.join("kernels");
        fs::create_dir_all(&kernel_dir)?;

        self.kernel_srcs.clear();
        self.kernel_hdrs.clear();

        for k in &self.design.kernels {
            log!(LogLevel::Status, "Generating kernel {}", k.user_name);

            let src = kernel_dir.join(format!("{}.cpp", k.user_name));
            let mut w = SourceWriter::create(&src)?;
            kernels::emit_kernel_src(&mut w, k)?;
            w.finish()?;
            self.kernel_srcs
                .push(PathBuf::from(format!("aie/kernels/{}.cpp", k.user_name)));

            let hdr = kernel_dir.join(format!("{}.hpp", k.user_name));
            let mut w = SourceWriter::create(&hdr)?;
            kernels::emit_kernel_hdr(&mut w, k)?;
            w.finish()?;
            self.kernel_hdrs
                .push(PathBuf::from(format!("aie/kernels/{}.hpp", k.user_name)));
        }
        Ok(())
    }

    pub fn generate_graph(&mut self) -> CodegenResult<()> {
        let aie_dir = self.out_dir.join("aie");

        log!(LogLevel::Status, "Generating graph");

        let mut w = SourceWriter::create(&aie_dir.join("graph.cpp"))?;
        graph::emit_graph_src(&mut w, &self.design)?;
        w.finish()?;

        let mut w = SourceWriter::create(&aie_dir.join("graph.hpp"))?;
        graph::emit_graph_hdr(&mut w, &self.design)?;
        w.finish()?;
        Ok(())
    }

    pub fn generate_bridges(&mut self) -> CodegenResult<()> {
        let pl_dir = self.out_dir.join("pl_kernels");
        if pl_dir.exists() {
            log!(LogLevel::Verbose, "Removing existing pl_kernels directory");
            fs::remove_dir_all(&pl_dir)?;
        }
        fs::create_dir_all(&pl_dir)?;

        self.pl_kernels.clear();

        for k in &self.design.kernels {
            for bridge in kernels::bridges(k) {
                let name = format!("{}_{}.cpp", k.user_name, bridge.suffix());
                log!(LogLevel::Status, "Generating bridge {}", name);

                let mut w = SourceWriter::create(&pl_dir.join(&name))?;
                emit_bridge_file(&mut w, k, bridge)?;
                w.finish()?;
                self.pl_kernels
                    .push(PathBuf::from(format!("pl_kernels/{}", name)));
            }
        }
        Ok(())
    }

    pub fn generate_config(&mut self) -> CodegenResult<()> {
        log!(LogLevel::Status, "Generating link configuration");

        let mut w = SourceWriter::create(&self.out_dir.join("link.cfg"))?;
        config::emit_config(&mut w, &self.design)?;
        w.finish()?;
        Ok(())
    }

    pub fn generate_cmake(&mut self) -> CodegenResult<()> {
        log!(LogLevel::Status, "Generating build script");

        let mut w = SourceWriter::create(&self.out_dir.join("CMakeLists.txt"))?;
        cmake::emit_cmake(
            &mut w,
            &self.design,
            &self.kernel_srcs,
            &self.kernel_hdrs,
            &self.pl_kernels,
        )?;
        w.finish()?;
        Ok(())
    }
}

fn emit_bridge_file<W: Write>(
    w: &mut SourceWriter<W>,
    k: &crate::model::Kernel,
    bridge: kernels::Bridge,
) -> CodegenResult<()> {
    w.line("#include <ap_int.h>")?;
    w.line("#include <hls_stream.h>")?;
    w.line("#include <ap_axi_sdata.h>")?;
    w.blank()?;
    w.line("extern \"C\" {")?;
    kernels::emit_bridge(w, k, bridge)?;
    w.line("}")?;
    Ok(())
}

/// Load a design file and generate all artifacts into `output`.
pub fn codegen(json_file: &Path, output: &Path) -> CodegenResult<()> {
    let design = loader::load_design_file(json_file)?;
    let mut generator = Generator::new(design, output);
    generator.run()
}
