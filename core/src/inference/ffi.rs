//! FFI declarations for the DLR C API (`dlr.h`).
//!
//! This module contains the raw FFI bindings. Use the safe wrappers
//! in the `native` module instead of calling these directly.

#![allow(non_snake_case)]

use std::ffi::c_void;
use std::os::raw::{c_char, c_int};

/// Opaque handle to a DLR model.
pub type DLRModelHandle = *mut c_void;

extern "C" {
    // Model lifecycle
    pub fn CreateDLRModel(
        handle: *mut DLRModelHandle,
        model_path: *const c_char,
        dev_type: c_int,
        dev_id: c_int,
    ) -> c_int;
    pub fn DeleteDLRModel(handle: *mut DLRModelHandle) -> c_int;
    pub fn DLRGetLastError() -> *const c_char;
    pub fn GetDLRVersion(out: *mut *const c_char) -> c_int;
    pub fn GetDLRBackend(handle: *mut DLRModelHandle, name: *mut *const c_char) -> c_int;

    // Execution settings
    pub fn SetDLRNumThreads(handle: *mut DLRModelHandle, threads: c_int) -> c_int;
    pub fn UseDLRCPUAffinity(handle: *mut DLRModelHandle, use_affinity: c_int) -> c_int;

    // Inputs
    pub fn GetDLRNumInputs(handle: *mut DLRModelHandle, num_inputs: *mut c_int) -> c_int;
    pub fn GetDLRInputName(
        handle: *mut DLRModelHandle,
        index: c_int,
        input_name: *mut *const c_char,
    ) -> c_int;
    pub fn SetDLRInput(
        handle: *mut DLRModelHandle,
        name: *const c_char,
        shape: *const i64,
        input: *const f32,
        dim: c_int,
    ) -> c_int;

    // Execution
    pub fn RunDLRModel(handle: *mut DLRModelHandle) -> c_int;

    // Outputs
    pub fn GetDLRNumOutputs(handle: *mut DLRModelHandle, num_outputs: *mut c_int) -> c_int;
    pub fn GetDLROutputSizeDim(
        handle: *mut DLRModelHandle,
        index: c_int,
        size: *mut i64,
        dim: *mut c_int,
    ) -> c_int;
    pub fn GetDLROutputShape(handle: *mut DLRModelHandle, index: c_int, shape: *mut i64) -> c_int;
    pub fn GetDLROutput(handle: *mut DLRModelHandle, index: c_int, out: *mut f32) -> c_int;
}
