#[cfg(target_os = "linux")]
pub fn alternate_held() -> bool {
    false
}
