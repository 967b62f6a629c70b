//! `OutputObserver<W>`: bridges `ExecObserver` to an `OutputWriter`.

use bt_context::TickReport;
use bt_core::ContextId;
use bt_workspace::ExecObserver;

use crate::row::TickSummaryRow;
use crate::writer::{OutputWriter, SharedWriter};
use crate::{OutputError, OutputResult};

/// An [`ExecObserver`] that writes one summary row per context tick to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `ExecObserver`
/// methods have no return value.  Check them with
/// [`take_error`][Self::take_error] after ticking.
pub struct OutputObserver<W: OutputWriter> {
    writer:     SharedWriter<W>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> OutputObserver<W> {
    pub fn new(writer: SharedWriter<W>) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// The shared writer, e.g. to inspect output after a run.
    pub fn writer(&self) -> &SharedWriter<W> {
        &self.writer
    }

    /// Flush the writer.  Returns the first stored error if there is one.
    pub fn finish(&mut self) -> OutputResult<()> {
        if let Some(e) = self.last_error.take() {
            return Err(e);
        }
        self.writer.try_borrow_mut().map_err(|_| OutputError::Busy)?.finish()
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> ExecObserver for OutputObserver<W> {
    fn on_tick_end(&mut self, context: ContextId, report: &TickReport) {
        let row = TickSummaryRow::from_report(context, report);
        let result = match self.writer.try_borrow_mut() {
            Ok(mut w) => w.write_tick_summary(&row),
            Err(_) => Err(OutputError::Busy),
        };
        self.store_err(result);
    }
}
