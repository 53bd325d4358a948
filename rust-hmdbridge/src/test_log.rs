//! Logger for unit tests. Forwards to `env_logger` and counts the warnings
//! emitted by each test thread.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::Cell;
use std::sync::Once;

thread_local!(static WARNINGS: Cell<usize> = Cell::new(0));

struct CountingLogger {
    inner: env_logger::Logger,
}

impl Log for CountingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Warn {
            WARNINGS.with(|warnings| warnings.set(warnings.get() + 1));
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let inner = env_logger::Builder::from_default_env().is_test(true).build();
        let max_level = inner.filter().max(LevelFilter::Warn);
        if log::set_logger(Box::leak(Box::new(CountingLogger { inner }))).is_ok() {
            log::set_max_level(max_level);
        }
    });
}

/// Warnings logged so far from the calling thread.
pub fn warnings() -> usize {
    WARNINGS.with(Cell::get)
}
