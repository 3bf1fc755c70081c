#![allow(unexpected_cfgs)]

#[cfg(target_os = "macos")]
use objc::{class, msg_send, sel, sel_impl};

/// `NSEventModifierFlagOption`.
#[cfg(target_os = "macos")]
const OPTION_FLAG: u64 = 1 << 19;

#[cfg(target_os = "macos")]
pub fn alternate_held() -> bool {
    unsafe {
        let flags: u64 = msg_send![class!(NSEvent), modifierFlags];
        flags & OPTION_FLAG != 0
    }
}
