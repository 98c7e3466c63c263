use std::ffi::{c_char, CStr};
use std::ptr;

use crate::actuator::NUM_ACTUATORS;
use crate::controller::Controller;
use crate::link::ConnectionConfig;

pub const STEWART_OK: i32 = 0;
pub const STEWART_ERR_NULL: i32 = -1;
pub const STEWART_ERR_RANGE: i32 = -2;

/// Opaque controller handle for a host UI.
pub struct StewartController{
    inner: Controller,
}

#[no_mangle]
pub extern "C" fn stewart_controller_new() -> *mut StewartController{
    Box::into_raw(Box::new(StewartController{ inner: Controller::with_serial() }))
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_free(handle: *mut StewartController){
    if !handle.is_null(){
        unsafe{
            let mut ctl = Box::from_raw(handle);
            ctl.inner.shutdown();
        }
    }
}

/// Open (or reopen) the link. Returns true when the port is open.
#[no_mangle]
pub unsafe extern "C" fn stewart_controller_connect(
    handle: *mut StewartController,
    port_name: *const c_char,
    baud_rate: u32,
) -> bool{
    if handle.is_null() || port_name.is_null(){
        return false;
    }

    unsafe{
        let ctl = &mut *handle;
        let name = match CStr::from_ptr(port_name).to_str(){
            Ok(s) => s,
            Err(_) => return false,
        };
        ctl.inner.apply_config(&ConnectionConfig::new(name, baud_rate))
    }
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_disconnect(handle: *mut StewartController){
    if handle.is_null(){
        return;
    }
    unsafe{ (*handle).inner.disconnect(); }
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_is_open(handle: *const StewartController) -> bool{
    if handle.is_null(){
        return false;
    }
    unsafe{ (*handle).inner.is_connected() }
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_set_axis(
    handle: *mut StewartController,
    index: usize,
    value: i32,
) -> i32{
    if handle.is_null(){
        return STEWART_ERR_NULL;
    }

    //rejected edits are logged by the controller before the error comes back
    unsafe{
        let ctl = &mut *handle;
        match ctl.inner.manual_source().update(index, value){
            Ok(()) => STEWART_OK,
            Err(_) => STEWART_ERR_RANGE,
        }
    }
}

/// Copy the current actuator values into `out` (must hold 6 entries).
#[no_mangle]
pub unsafe extern "C" fn stewart_controller_actuators(
    handle: *const StewartController,
    out: *mut i32,
    len: usize,
) -> i32{
    if handle.is_null() || out.is_null(){
        return STEWART_ERR_NULL;
    }
    if len < NUM_ACTUATORS{
        return STEWART_ERR_RANGE;
    }

    unsafe{
        let values = (*handle).inner.actuators().values();
        ptr::copy_nonoverlapping(values.as_ptr(), out, NUM_ACTUATORS);
    }
    STEWART_OK
}

/// Explicit send of the current vector. Returns true if it was written.
#[no_mangle]
pub unsafe extern "C" fn stewart_controller_send(handle: *mut StewartController) -> bool{
    if handle.is_null(){
        return false;
    }

    unsafe{
        let ctl = &mut *handle;
        let before = ctl.inner.status().lines_sent;
        ctl.inner.manual_source().request_send();
        ctl.inner.status().lines_sent > before
    }
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_frame(
    handle: *mut StewartController,
    values: *const i32,
    len: usize,
) -> i32{
    if handle.is_null() || values.is_null(){
        return STEWART_ERR_NULL;
    }

    unsafe{
        let ctl = &mut *handle;
        let slice = std::slice::from_raw_parts(values, len);
        match ctl.inner.motion_source().frame(slice){
            Ok(()) => STEWART_OK,
            Err(_) => STEWART_ERR_RANGE,
        }
    }
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_set_motion_enabled(handle: *mut StewartController, enabled: bool){
    if handle.is_null(){
        return;
    }
    unsafe{ (*handle).inner.set_motion_enabled(enabled); }
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_set_motion_connected(handle: *mut StewartController, connected: bool){
    if handle.is_null(){
        return;
    }

    unsafe{
        let ctl = &mut *handle;
        ctl.inner.motion_source().set_connected(connected);
    }
}

/// Call when the port is readable (or periodically). Returns bytes received.
#[no_mangle]
pub unsafe extern "C" fn stewart_controller_poll(handle: *mut StewartController) -> usize{
    if handle.is_null(){
        return 0;
    }
    unsafe{ (*handle).inner.on_readable() }
}

#[no_mangle]
pub unsafe extern "C" fn stewart_controller_log_len(handle: *const StewartController) -> usize{
    if handle.is_null(){
        return 0;
    }
    unsafe{ (*handle).inner.log().len() }
}

/// Copy log entry `index` as a NUL-terminated "(HH:MM:SS) message" string.
/// Returns the string length, -1 on null/missing entry, -2 if `max_len`
/// cannot hold it.
#[no_mangle]
pub unsafe extern "C" fn stewart_controller_log_entry(
    handle: *const StewartController,
    index: usize,
    out: *mut c_char,
    max_len: usize,
) -> i32{
    if handle.is_null() || out.is_null(){
        return STEWART_ERR_NULL;
    }

    unsafe{
        let ctl = &*handle;
        let Some(entry) = ctl.inner.log().entries().get(index) else{
            return STEWART_ERR_NULL;
        };
        let text = entry.to_string();
        let bytes = text.as_bytes();
        if bytes.len() + 1 > max_len{
            return STEWART_ERR_RANGE;
        }
        ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, out, bytes.len());
        *out.add(bytes.len()) = 0;
        bytes.len() as i32
    }
}
