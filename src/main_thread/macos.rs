use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::Task;

#[repr(C)]
struct DispatchQueue {
    _private: [u8; 0],
}

// libdispatch ships in libSystem; `dispatch_get_main_queue()` is a macro
// over `_dispatch_main_q`.
extern "C" {
    static _dispatch_main_q: DispatchQueue;
    fn dispatch_async_f(
        queue: *const DispatchQueue,
        context: *mut c_void,
        work: extern "C" fn(*mut c_void),
    );
}

extern "C" fn run_task(context: *mut c_void) {
    let task = *unsafe { Box::from_raw(context as *mut Task) };
    if catch_unwind(AssertUnwindSafe(task)).is_err() {
        tracing::error!("main queue task panicked");
    }
}

pub fn run_on_main_queue(task: Task) {
    let context = Box::into_raw(Box::new(task)) as *mut c_void;
    unsafe {
        dispatch_async_f(std::ptr::addr_of!(_dispatch_main_q), context, run_task);
    }
}
