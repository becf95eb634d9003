//! Safe wrappers over the `libdlr` C API.

use ndarray::{ArrayD, IxDyn};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;
use std::ptr;

use tracing::debug;

use super::ffi;
use super::runtime::{DlrRuntime, NativeModel};
use super::Device;
use crate::error::{DlrError, Result};

/// Get the last error message from the DLR library.
fn get_last_error() -> String {
    unsafe {
        let err_ptr = ffi::DLRGetLastError();
        if err_ptr.is_null() {
            "Unknown error".to_string()
        } else {
            CStr::from_ptr(err_ptr).to_string_lossy().into_owned()
        }
    }
}

/// Turn a DLR status code into a result, tagging failures with `what`.
fn check(status: c_int, what: &str) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(DlrError::inference(format!("{} failed: {}", what, get_last_error())))
    }
}

/// Copy a library-owned C string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn owned_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

fn to_c_int(value: usize, what: &str) -> Result<c_int> {
    c_int::try_from(value).map_err(|_| DlrError::tensor(format!("{} out of range: {}", what, value)))
}

/// `DlrRuntime` backed by the linked `libdlr` shared library.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRuntime;

impl NativeRuntime {
    /// Create a runtime handle.
    pub fn new() -> Self {
        Self
    }
}

impl DlrRuntime for NativeRuntime {
    fn create_model(&self, model_dir: &Path, device: &Device) -> Result<Box<dyn NativeModel>> {
        let dir_str = model_dir.to_string_lossy();
        let dir_cstr = CString::new(dir_str.as_ref())
            .map_err(|_| DlrError::model_load("Invalid path encoding"))?;

        let dev_id = device.dlr_id()?;
        let mut handle: ffi::DLRModelHandle = ptr::null_mut();
        let status = unsafe {
            ffi::CreateDLRModel(
                &mut handle,
                dir_cstr.as_ptr(),
                device.dlr_type(),
                dev_id,
            )
        };

        if status != 0 || handle.is_null() {
            return Err(DlrError::model_load(format!(
                "Failed to create DLR model: {}",
                get_last_error()
            )));
        }

        debug!("Created native DLR model from {}", model_dir.display());
        Ok(Box::new(NativeHandle { handle }))
    }

    fn version(&self) -> Result<String> {
        let mut out: *const c_char = ptr::null();
        check(unsafe { ffi::GetDLRVersion(&mut out) }, "GetDLRVersion")?;
        Ok(unsafe { owned_string(out) })
    }
}

/// Owned `DLRModelHandle`, deleted on drop.
struct NativeHandle {
    handle: ffi::DLRModelHandle,
}

// SAFETY: the handle is only reached through `&mut self` for mutation and is
// never shared between instances.
unsafe impl Send for NativeHandle {}

impl NativeHandle {
    /// DLR takes the handle by pointer even for read-only queries.
    fn raw(&self) -> *mut ffi::DLRModelHandle {
        ptr::addr_of!(self.handle).cast_mut()
    }

    fn num_inputs(&self) -> Result<usize> {
        let mut n: c_int = 0;
        check(unsafe { ffi::GetDLRNumInputs(self.raw(), &mut n) }, "GetDLRNumInputs")?;
        Ok(n.max(0) as usize)
    }
}

impl NativeModel for NativeHandle {
    fn backend(&self) -> Result<String> {
        let mut name: *const c_char = ptr::null();
        check(unsafe { ffi::GetDLRBackend(self.raw(), &mut name) }, "GetDLRBackend")?;
        Ok(unsafe { owned_string(name) })
    }

    fn input_names(&self) -> Result<Vec<String>> {
        (0..self.num_inputs()?)
            .map(|i| {
                let mut name: *const c_char = ptr::null();
                let index = to_c_int(i, "input index")?;
                check(
                    unsafe { ffi::GetDLRInputName(self.raw(), index, &mut name) },
                    "GetDLRInputName",
                )?;
                Ok(unsafe { owned_string(name) })
            })
            .collect()
    }

    fn num_outputs(&self) -> Result<usize> {
        let mut n: c_int = 0;
        check(unsafe { ffi::GetDLRNumOutputs(self.raw(), &mut n) }, "GetDLRNumOutputs")?;
        Ok(n.max(0) as usize)
    }

    fn set_num_threads(&mut self, threads: usize) -> Result<()> {
        let threads = to_c_int(threads, "thread count")?;
        check(
            unsafe { ffi::SetDLRNumThreads(&mut self.handle, threads) },
            "SetDLRNumThreads",
        )
    }

    fn use_cpu_affinity(&mut self, enabled: bool) -> Result<()> {
        check(
            unsafe { ffi::UseDLRCPUAffinity(&mut self.handle, c_int::from(enabled)) },
            "UseDLRCPUAffinity",
        )
    }

    fn set_input(&mut self, name: &str, data: &ArrayD<f32>) -> Result<()> {
        let name_cstr =
            CString::new(name).map_err(|_| DlrError::tensor("Invalid input name"))?;
        let shape: Vec<i64> = data.shape().iter().map(|&s| s as i64).collect();
        let dim = to_c_int(shape.len(), "input rank")?;

        // Ensure data is contiguous
        let contiguous = data.as_standard_layout();

        check(
            unsafe {
                ffi::SetDLRInput(
                    &mut self.handle,
                    name_cstr.as_ptr(),
                    shape.as_ptr(),
                    contiguous.as_ptr(),
                    dim,
                )
            },
            "SetDLRInput",
        )
    }

    fn run(&mut self) -> Result<()> {
        check(unsafe { ffi::RunDLRModel(&mut self.handle) }, "RunDLRModel")
    }

    fn output(&self, index: usize) -> Result<ArrayD<f32>> {
        let c_index = to_c_int(index, "output index")?;

        let mut size: i64 = 0;
        let mut ndim: c_int = 0;
        check(
            unsafe { ffi::GetDLROutputSizeDim(self.raw(), c_index, &mut size, &mut ndim) },
            "GetDLROutputSizeDim",
        )?;

        let mut shape = vec![0i64; ndim.max(0) as usize];
        check(
            unsafe { ffi::GetDLROutputShape(self.raw(), c_index, shape.as_mut_ptr()) },
            "GetDLROutputShape",
        )?;

        let mut data = vec![0f32; size.max(0) as usize];
        check(
            unsafe { ffi::GetDLROutput(self.raw(), c_index, data.as_mut_ptr()) },
            "GetDLROutput",
        )?;

        let shape: Vec<usize> = shape.iter().map(|&s| s.max(0) as usize).collect();
        ArrayD::from_shape_vec(IxDyn(&shape), data)
            .map_err(|e| DlrError::tensor(format!("Output {} shape error: {}", index, e)))
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                ffi::DeleteDLRModel(&mut self.handle);
            }
            self.handle = ptr::null_mut();
        }
    }
}
