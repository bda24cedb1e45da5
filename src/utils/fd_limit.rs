//! Open-file budget for the normalization stage.
//!
//! Every in-flight normalization is a child process with three pipes plus the input and output
//! files. The window is capped so that all of them together use at most half of RLIMIT_NOFILE;
//! the rest is left to the recognizer's sockets, the WAV reads and the renames.

/// Descriptors one normalization may hold open at once.
pub const FDS_PER_NORMALIZATION: u64 = 8;

/// Soft RLIMIT_NOFILE, or `None` when unlimited or not queryable.
#[cfg(unix)]
pub fn soft_nofile_limit() -> Option<u64> {
    let mut rlim = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: getrlimit only writes into the struct we pass.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) } != 0 {
        return None;
    }
    if rlim.rlim_cur == libc::RLIM_INFINITY {
        return None;
    }
    u64::try_from(rlim.rlim_cur).ok()
}

#[cfg(not(unix))]
pub fn soft_nofile_limit() -> Option<u64> {
    None
}

/// Largest normalization window that fits in half of `limit` descriptors (at least 1).
pub fn normalize_window_for_limit(limit: u64) -> usize {
    let budget = limit / 2;
    let window = (budget / FDS_PER_NORMALIZATION).max(1);
    usize::try_from(window).unwrap_or(usize::MAX)
}

/// Normalization window allowed by the current process limit; `None` if there is no limit.
pub fn normalize_window_cap() -> Option<usize> {
    soft_nofile_limit().map(normalize_window_for_limit)
}
