//! Pass-through sink writing one payload per line.

use crate::error::Result;
use crate::Sink;
use std::io::{Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Writes each payload followed by a newline to a local writer.
///
/// Used when publishing is disabled. There is nothing to deliver later, so
/// [`Sink::flush`] returns `true` straight away.
pub struct PrintSink<W: Write + Send = Stdout> {
    out: Mutex<W>,
}

impl PrintSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> PrintSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Sink for PrintSink<W> {
    fn name(&self) -> &'static str {
        "print"
    }

    fn submit(&self, payload: &[u8]) -> Result<()> {
        let mut out = self.lock();
        out.write_all(payload)?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self, _max_wait: Duration) -> bool {
        true
    }

    fn shutdown(&self, _max_wait: Duration) -> bool {
        self.lock().flush().is_ok()
    }
}
