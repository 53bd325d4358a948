use rust_hmdbridge_api::{VREye, VRErrorCode, VRResult};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HmdError {
    /// Something the bridge depends on could not be brought up.
    #[error("{0} is not available")]
    DeviceUnavailable(&'static str),

    /// A single device query failed; none of its output may be trusted.
    #[error("{query} failed: {code}")]
    QueryFailed {
        query: &'static str,
        code: VRErrorCode,
    },

    /// The gaze of this eye points away from the screen and cannot be projected onto it.
    #[error("{0:?} eye gaze cannot be projected to the screen")]
    Unprojectable(VREye),
}

impl HmdError {
    /// Logs `code` and returns the failure of `query`. Meant for one-shot calls,
    /// queries repeated every frame go through a `DeviceErrorLog`.
    pub(crate) fn query_failed(query: &'static str, code: VRErrorCode) -> HmdError {
        log_device_error(query, code);
        HmdError::QueryFailed { query, code }
    }
}

pub(crate) fn log_device_error(query: &'static str, code: VRErrorCode) {
    if code.is_connection_error() {
        warn!("{} failed, device service unreachable: {}", query, code);
    } else {
        warn!("{} failed: {}", query, code);
    }
}

/// Device errors already reported, by query.
///
/// A query failing with the same code on every frame is logged the first time only.
/// A success or a different code makes the next failure logged again.
#[derive(Debug, Default)]
pub(crate) struct DeviceErrorLog {
    reported: Mutex<Vec<(&'static str, VRErrorCode)>>,
}

impl DeviceErrorLog {
    pub(crate) fn new() -> DeviceErrorLog {
        DeviceErrorLog::default()
    }

    pub(crate) fn check<T>(&self, query: &'static str, result: VRResult<T>) -> Result<T, HmdError> {
        match result {
            Ok(value) => {
                self.clear(query);
                Ok(value)
            }
            Err(code) => {
                self.report(query, code);
                Err(HmdError::QueryFailed { query, code })
            }
        }
    }

    pub(crate) fn report(&self, query: &'static str, code: VRErrorCode) {
        {
            let mut reported = self.lock();
            if reported.contains(&(query, code)) {
                trace!("{} still failing: {}", query, code);
                return;
            }
            reported.retain(|&(reported_query, _)| reported_query != query);
            reported.push((query, code));
        }
        log_device_error(query, code);
    }

    fn clear(&self, query: &'static str) {
        let mut reported = self.lock();
        if let Some(index) = reported.iter().position(|&(reported_query, _)| reported_query == query) {
            reported.swap_remove(index);
            info!("{} succeeded again", query);
        }
    }

    fn lock(&self) -> MutexGuard<Vec<(&'static str, VRErrorCode)>> {
        self.reported.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
