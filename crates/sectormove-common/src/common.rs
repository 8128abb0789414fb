// common.rs — console printing shared by every module
//
// Output goes through the `log` facade so the host program decides where it
// lands. A redirect buffer can capture printed text instead (used for remote
// consoles and by tests). The buffer is per thread.

use std::cell::RefCell;

pub const MAXPRINTMSG: usize = 4096;

// ============================================================
// Redirect buffer for Com_Printf
// ============================================================

thread_local! {
    static RD_BUFFER: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Begin redirecting printf output into a buffer.
pub fn com_begin_redirect() {
    RD_BUFFER.with(|buf| *buf.borrow_mut() = Some(String::new()));
}

/// End redirect and return the captured output.
pub fn com_end_redirect() -> Option<String> {
    RD_BUFFER.with(|buf| buf.borrow_mut().take())
}

// ============================================================
// Com_Printf / Com_DPrintf
// ============================================================

/// General-purpose print function. Logs at info level, or appends to the
/// redirect buffer if one is active.
pub fn com_printf(msg: &str) {
    let redirected = RD_BUFFER.with(|buf| {
        if let Some(ref mut s) = *buf.borrow_mut() {
            if s.len() + msg.len() <= MAXPRINTMSG {
                s.push_str(msg);
            }
            return true;
        }
        false
    });
    if redirected {
        return;
    }
    log::info!("{}", msg.trim_end_matches('\n'));
}

/// Developer-only print. Logged at debug level, never redirected.
pub fn com_dprintf(msg: &str) {
    log::debug!("{}", msg.trim_end_matches('\n'));
}

/// Warning print for recoverable content problems.
pub fn com_wprintf(msg: &str) {
    log::warn!("{}", msg.trim_end_matches('\n'));
}
