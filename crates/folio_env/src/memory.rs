// memory.rs
//! Cross-platform query for installed RAM, the native stand-in for the
//! browser's `navigator.deviceMemory` hint.
//! Reports `None` when the platform does not expose it.

use std::sync::OnceLock;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy)]
pub struct HostMemory {
    pub total_ram: Option<u64>, // bytes
}

impl HostMemory {
    pub fn detect() -> Self {
        static INSTANCE: OnceLock<HostMemory> = OnceLock::new();
        *INSTANCE.get_or_init(|| Self {
            total_ram: total_ram_bytes(),
        })
    }

    /// Installed memory in GiB, if known.
    pub fn gib(&self) -> Option<f32> {
        self.total_ram.map(|bytes| (bytes as f64 / GIB) as f32)
    }
}

/* -------------------------- Windows -------------------------- */

#[cfg(target_os = "windows")]
fn total_ram_bytes() -> Option<u64> {
    use windows_sys::Win32::System::SystemInformation::{GlobalMemoryStatusEx, MEMORYSTATUSEX};
    unsafe {
        let mut st: MEMORYSTATUSEX = std::mem::zeroed();
        st.dwLength = std::mem::size_of::<MEMORYSTATUSEX>() as u32;
        if GlobalMemoryStatusEx(&mut st) != 0 { Some(st.ullTotalPhys) } else { None }
    }
}

/* --------------------- macOS / iOS (Darwin) --------------------- */

#[cfg(any(target_os = "macos", target_os = "ios"))]
fn total_ram_bytes() -> Option<u64> {
    use libc::{c_void, size_t, sysctlbyname};
    let cname = std::ffi::CString::new("hw.memsize").ok()?;
    let mut val: u64 = 0;
    let mut len: size_t = std::mem::size_of::<u64>() as _;
    let rc = unsafe { sysctlbyname(cname.as_ptr(), &mut val as *mut _ as *mut c_void, &mut len, std::ptr::null_mut(), 0) };
    if rc == 0 && val != 0 { Some(val) } else { None }
}

/* --------------------- Linux / Android --------------------- */

#[cfg(any(target_os = "linux", target_os = "android"))]
fn total_ram_bytes() -> Option<u64> {
    let text = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo(&text)
}

/// Extract `MemTotal` from `/proc/meminfo` text ("MemTotal:  16367168 kB").
#[cfg_attr(not(any(target_os = "linux", target_os = "android")), allow(dead_code))]
fn parse_meminfo(text: &str) -> Option<u64> {
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

/* --------------------- Other / WASM / Fallbacks --------------------- */

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "ios",
    target_os = "linux",
    target_os = "android"
)))]
fn total_ram_bytes() -> Option<u64> { None }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mem_total_line() {
        let text = "MemTotal:        8038844 kB\nMemFree:         1234 kB\n";
        assert_eq!(parse_meminfo(text), Some(8038844 * 1024));
    }

    #[test]
    fn missing_mem_total_is_none() {
        assert_eq!(parse_meminfo("MemFree: 12 kB\n"), None);
    }

    #[test]
    fn gib_conversion() {
        let mem = HostMemory { total_ram: Some(4 * 1024 * 1024 * 1024) };
        assert_eq!(mem.gib(), Some(4.0));
        assert_eq!(HostMemory { total_ram: None }.gib(), None);
    }
}
