use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::warn;

/// Copies log output to stderr and, optionally, to a log file.
struct LogWriter {
    file: Option<File>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = &mut self.file {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = &mut self.file {
            file.flush()?;
        }
        Ok(())
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the logger for this run.
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` when `debug` is set). If the log
/// file can't be opened, output only goes to stderr.
pub fn init(debug: bool, log_file: Option<&Path>) {
    let (file, file_error) = match log_file.map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(err)) => (None, Some(err)),
        None => (None, None),
    };

    let default_level = if debug { "debug" } else { "info" };
    let result = Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Pipe(Box::new(LogWriter { file })))
        .try_init();
    if let Err(err) = result {
        eprintln!("Logger was already initialized: {}", err);
    }

    if let (Some(path), Some(err)) = (log_file, file_error) {
        warn!("Couldn't open log file {}: {}", path.display(), err);
    }
}
