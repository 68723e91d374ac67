//! Console progress for the download and scan phases.
//!
//! Stages report through the [`Progress`] trait so they never depend on a
//! rendering backend. [`IndicatifProgress`] draws bars, [`NullProgress`]
//! swallows everything and is what tests use.
//!
//! All bars hang off one [`MultiProgress`]. [`init_logging`] routes tracing
//! output through it so log lines are printed above the bars instead of
//! through them.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    EnvFilter,
};

/// Shared across rayon scan workers.
pub trait Progress: Send + Sync {
    /// Total units of work, once known.
    fn set_total(&self, total: u64);
    /// Advance by `delta` units.
    fn inc(&self, delta: u64);
    fn set_message(&self, msg: String);
    /// Mark as complete and leave the last frame on screen.
    fn finish(&self, msg: String);
}

pub struct NullProgress;

impl Progress for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style to switch to once `set_total()` gives a length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Byte counter for a download. Starts as a spinner because the archive
    /// size is only known once the response headers arrive.
    pub fn download(multi: &MultiProgress, message: &str) -> Self {
        let bar = multi.add(
            ProgressBar::new_spinner()
                .with_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg} {bytes}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                )
                .with_message(message.to_string()),
        );

        let bar_style = ProgressStyle::with_template(
            "{percent:>3}% |{bar:20.cyan/dim}| {bytes}/{total_bytes} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█ ");

        Self { bar, bar_style }
    }

    /// File counter for the scan; the running match counts go in the message.
    pub fn files(multi: &MultiProgress, total: u64) -> Self {
        let bar_style = ProgressStyle::with_template(
            "{percent:>3}% |{bar:20.green/dim}| {pos}/{len}\n{msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█ ");
        let bar = multi.add(ProgressBar::new(total).with_style(bar_style.clone()));

        Self { bar, bar_style }
    }
}

impl Progress for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Install the global tracing subscriber, writing to stderr through the
/// returned [`MultiProgress`]. Every bar must be added to it.
pub fn init_logging() -> MultiProgress {
    let multi = MultiProgress::new();
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rnascan=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(SuspendingWriter::new(multi.clone(), io::stderr))
        .init();
    multi
}

/// [`MakeWriter`] that hides the bars of `multi` while a line is written.
#[derive(Clone)]
pub struct SuspendingWriter<M> {
    multi: MultiProgress,
    inner: M,
}

impl<M> SuspendingWriter<M> {
    pub fn new(multi: MultiProgress, inner: M) -> Self {
        Self { multi, inner }
    }
}

pub struct SuspendedLine<W> {
    multi: MultiProgress,
    inner: W,
}

impl<W: io::Write> io::Write for SuspendedLine<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Self { multi, inner } = self;
        multi.suspend(|| inner.write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let Self { multi, inner } = self;
        multi.suspend(|| inner.write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for SuspendingWriter<M> {
    type Writer = SuspendedLine<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedLine {
            multi: self.multi.clone(),
            inner: self.inner.make_writer(),
        }
    }
}
