//! Build-script emission. Purely mechanical templating over the
//! platform name and the file lists collected during generation.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::emitter::SourceWriter;
use crate::model::Design;

pub fn emit_cmake<W: Write>(
    w: &mut SourceWriter<W>,
    design: &Design,
    kernel_srcs: &[PathBuf],
    kernel_hdrs: &[PathBuf],
    pl_kernels: &[PathBuf],
) -> io::Result<()> {
    w.line("cmake_minimum_required(VERSION 3.22)")?;
    w.blank()?;
    w.line("project(blas2aie)")?;
    w.blank()?;

    w.open("if (NOT EXISTS $ENV{XILINX_VITIS})")?;
    w.line("message(FATAL_ERROR \"Xilinx Vitis not found, make sure to source setup.sh\")")?;
    w.close("endif ()")?;
    w.blank()?;

    w.line(&format!(
        "set(PLATFORM /opt/xilinx/platforms/{0}/{0}.xpfm)",
        design.platform
    ))?;
    w.line("set(PL_FREQ 500)")?;
    w.blank()?;

    w.open("set(AIE_KERNELS")?;
    for src in kernel_srcs {
        w.line(&src.display().to_string())?;
    }
    for hdr in kernel_hdrs {
        w.line(&hdr.display().to_string())?;
    }
    w.close(")")?;

    w.open("set(PL_KERNELS")?;
    for krnl in pl_kernels {
        w.line(&krnl.display().to_string())?;
    }
    w.close(")")?;
    w.blank()?;

    w.line("set(VPP \"$ENV{XILINX_VITIS}/bin/v++\")")?;
    w.line("set(AIECC \"$ENV{XILINX_VITIS}/aietools/bin/aiecompiler\")")?;
    w.line("set(AIESIM \"$ENV{XILINX_VITIS}/aietools/bin/aiesimulator\")")?;
    w.line("set(X86SIM \"$ENV{XILINX_VITIS}/aietools/bin/x86simulator\")")?;
    w.blank()?;

    w.line(
        "set(AIE_INCLUDE \"-include=\\\"$ENV{XILINX_VITIS}/aietools/include\\\"\" \
         \"-include=\\\"${CMAKE_CURRENT_SOURCE_DIR}/aie\\\"\" \
         \"-include=\\\"${CMAKE_CURRENT_SOURCE_DIR}/data\\\"\" \
         \"-include=\\\"${CMAKE_CURRENT_SOURCE_DIR}/aie/kernels\\\"\")",
    )?;
    w.line(
        "set(AIE_FLAGS ${AIE_INCLUDE} --platform ${PLATFORM} --verbose=true \
         --pl-freq=${PL_FREQ} -log-level=5 --output=graph.json)",
    )?;
    w.line(
        "set(VPP_FLAGS --platform ${PLATFORM} --save-temps --hls.jobs 8 \
         --vivado.synth.jobs 8 --vivado.impl.jobs 8 -g -t hw --log_dir log \
         --temp_dir tmp --report_dir report)",
    )?;
    w.blank()?;

    w.line("#######")?;
    w.line("# AIE #")?;
    w.line("#######")?;
    w.blank()?;
    w.open("add_custom_target(")?;
    w.line("xilinx")?;
    w.line("COMMAND mkdir -p xilinx")?;
    w.line("BYPRODUCTS xilinx")?;
    w.line("VERBATIM")?;
    w.close(")")?;
    w.blank()?;

    w.line("# HW / HW emu")?;
    w.open("add_custom_command(")?;
    w.line("OUTPUT xilinx/libadf.a")?;
    w.line(
        "COMMAND ${AIECC} ${AIE_FLAGS} --output-archive=libadf.a -workdir=./Work \
         --target=hw \"${CMAKE_CURRENT_SOURCE_DIR}/aie/graph.cpp\"",
    )?;
    w.line("MAIN_DEPENDENCY aie/graph.cpp")?;
    w.line("DEPENDS xilinx aie/graph.hpp ${AIE_KERNELS}")?;
    w.line("COMMENT \"Building ADF graph for HW/HW-emulation xilinx/libadf.a\"")?;
    w.line("WORKING_DIRECTORY xilinx")?;
    w.line("VERBATIM")?;
    w.close(")")?;
    w.blank()?;

    w.line("# SW emu")?;
    w.open("add_custom_command(")?;
    w.line("OUTPUT xilinx/libadf_x86.a")?;
    w.line(
        "COMMAND ${AIECC} ${AIE_FLAGS} --output-archive=libadf_x86.a -workdir=./Work_sw \
         --target=x86sim \"${CMAKE_CURRENT_SOURCE_DIR}/aie/graph.cpp\"",
    )?;
    w.line("MAIN_DEPENDENCY aie/graph.cpp")?;
    w.line("DEPENDS xilinx aie/graph.hpp ${AIE_KERNELS}")?;
    w.line("COMMENT \"Building ADF graph for SW-emulation xilinx/libadf_x86.a\"")?;
    w.line("WORKING_DIRECTORY xilinx")?;
    w.line("VERBATIM")?;
    w.close(")")?;
    w.blank()?;

    w.line("######")?;
    w.line("# PL #")?;
    w.line("######")?;
    w.blank()?;
    w.line("set(KERNEL_OBJECTS)")?;
    w.line("set(KERNEL_OBJECTS_PATH)")?;
    w.open("foreach(kernel ${PL_KERNELS})")?;
    w.line("get_filename_component(name ${kernel} NAME_WE)")?;
    w.blank()?;
    w.open("add_custom_command(")?;
    w.line("OUTPUT xilinx/${name}.xo")?;
    w.line(
        "COMMAND ${VPP} ${VPP_FLAGS} -c -k ${name} \
         ${CMAKE_CURRENT_SOURCE_DIR}/${kernel} -o ${name}.xo",
    )?;
    w.line("MAIN_DEPENDENCY ${kernel}")?;
    w.line("DEPENDS xilinx")?;
    w.line("COMMENT \"Building PL kernel xilinx/${name}.xo\"")?;
    w.line("WORKING_DIRECTORY xilinx")?;
    w.line("VERBATIM")?;
    w.close(")")?;
    w.line("list(APPEND KERNEL_OBJECTS ${name}.xo)")?;
    w.line("list(APPEND KERNEL_OBJECTS_PATH xilinx/${name}.xo)")?;
    w.close("endforeach()")?;
    w.blank()?;

    w.line("##########")?;
    w.line("# XCLBIN #")?;
    w.line("##########")?;
    w.blank()?;
    w.open("add_custom_command(")?;
    w.line("OUTPUT xilinx/blas2aie.xsa")?;
    w.line(
        "COMMAND ${VPP} ${VPP_FLAGS} -l ${KERNEL_OBJECTS} libadf.a \
         --config ${CMAKE_CURRENT_SOURCE_DIR}/link.cfg -o blas2aie.xsa",
    )?;
    w.line("DEPENDS xilinx xilinx/libadf.a ${KERNEL_OBJECTS_PATH} link.cfg")?;
    w.line("COMMENT \"Linking FPGA design xilinx/blas2aie.xsa\"")?;
    w.line("WORKING_DIRECTORY xilinx")?;
    w.line("VERBATIM")?;
    w.close(")")?;
    w.blank()?;

    w.open("add_custom_command(")?;
    w.line("OUTPUT xilinx/blas2aie.xclbin")?;
    w.line(
        "COMMAND ${VPP} -p ${VPP_FLAGS} --package.boot_mode=ospi blas2aie.xsa \
         libadf.a -o blas2aie.xclbin",
    )?;
    w.line("DEPENDS xilinx xilinx/blas2aie.xsa xilinx/libadf.a")?;
    w.line("COMMENT \"Packaging FPGA design xilinx/blas2aie.xclbin\"")?;
    w.line("WORKING_DIRECTORY xilinx")?;
    w.line("VERBATIM")?;
    w.close(")")?;
    w.blank()?;

    w.open("add_custom_target(aie")?;
    w.line(
        "COMMAND cp --preserve --update blas2aie.xclbin \
         ${CMAKE_BINARY_DIR}/blas2aie.xclbin",
    )?;
    w.line("DEPENDS xilinx xilinx/blas2aie.xclbin")?;
    w.line("WORKING_DIRECTORY xilinx")?;
    w.line("VERBATIM")?;
    w.close(")")
}
