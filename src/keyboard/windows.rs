use windows::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, VK_MENU};

use super::high_bit_down;

/// Physical Alt state. The watcher thread has no message queue, so the
/// thread-local `GetKeyState` would never change there.
pub fn alternate_held() -> bool {
    let state = unsafe { GetAsyncKeyState(i32::from(VK_MENU.0)) };
    high_bit_down(state)
}
