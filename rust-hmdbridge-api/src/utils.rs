use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;

static LAYER_ID_COUNTER: AtomicUsize = AtomicUsize::new(1);

// Generates a unique identifier for a compositor layer
#[allow(dead_code)]
pub fn new_id() -> u32 {
    LAYER_ID_COUNTER.fetch_add(1, SeqCst) as u32
}

// Returns the current time in milliseconds
#[allow(dead_code)]
pub fn timestamp() -> f64 {
    let timespec = time::get_time();
    timespec.sec as f64 * 1000.0 + (timespec.nsec as f64 * 1e-6)
}
