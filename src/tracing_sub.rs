use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;

use crate::components::debug_log::{DebugLogWriter, global_debug_log};

static LOG_FILE: OnceLock<Arc<Mutex<File>>> = OnceLock::new();

/// Opens `path` for appending and routes log output to it from now on.
/// Only the first call takes effect.
pub fn set_log_file(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = LOG_FILE.set(Arc::new(Mutex::new(file)));
    Ok(())
}

pub struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock() {
            Ok(mut file) => file.write(buf),
            Err(_) => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

enum Sink {
    Debug(DebugLogWriter),
    File(LogFileWriter),
    Stderr(io::Stderr),
}

/// Fans each record out to the debug log panel and the log file, whichever
/// are registered, and falls back to stderr when neither is.
pub struct DelegatingWriter {
    sinks: Vec<Sink>,
}

impl DelegatingWriter {
    fn new() -> Self {
        let mut sinks = Vec::with_capacity(2);
        if let Some(handle) = global_debug_log() {
            sinks.push(Sink::Debug(handle.writer()));
        }
        if let Some(file) = LOG_FILE.get() {
            sinks.push(Sink::File(LogFileWriter {
                file: Arc::clone(file),
            }));
        }
        if sinks.is_empty() {
            sinks.push(Sink::Stderr(io::stderr()));
        }
        Self { sinks }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            match sink {
                Sink::Debug(w) => w.write_all(buf)?,
                Sink::File(w) => w.write_all(buf)?,
                Sink::Stderr(s) => s.write_all(buf)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            match sink {
                Sink::Debug(w) => w.flush()?,
                Sink::File(w) => w.flush()?,
                Sink::Stderr(s) => s.flush()?,
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SubscriberMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new()
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_default() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(SubscriberMakeWriter)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init_default();
        init_default();
        tracing::debug!("subscriber installed");
    }

    #[test]
    fn log_file_writer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .unwrap();
        let mut writer = LogFileWriter {
            file: Arc::new(Mutex::new(file)),
        };
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
