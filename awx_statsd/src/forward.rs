use log::{debug, warn};
use std::io::{self, BufWriter, Write};
use std::net::{Ipv4Addr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use awx_prometheus::debug::RunStats;
use awx_prometheus::parser::Sample;
use awx_prometheus::statsd;

use crate::config::Transport;

/// How long a single write to the StatsD listener may block.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// The Sink trait must be implemented by each transport that is intended
/// to receive StatsD lines.
pub trait Sink {
    /// Send one StatsD line (without a line terminator).
    fn send(&mut self, line: &str) -> io::Result<()>;

    /// Push out anything buffered by the sink.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sends each line as its own datagram
pub struct UdpSink {
    socket: UdpSocket,
}

impl UdpSink {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(addr)?;
        socket.set_write_timeout(Some(WRITE_TIMEOUT))?;
        Ok(UdpSink { socket })
    }
}

impl Sink for UdpSink {
    fn send(&mut self, line: &str) -> io::Result<()> {
        self.socket.send(line.as_bytes()).map(|_| ())
    }
}

/// Writes newline delimited lines to a buffered stream
pub struct TcpSink {
    stream: BufWriter<TcpStream>,
}

impl TcpSink {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        Ok(TcpSink {
            stream: BufWriter::new(stream),
        })
    }
}

impl Sink for TcpSink {
    fn send(&mut self, line: &str) -> io::Result<()> {
        self.stream.write_all(line.as_bytes())?;
        self.stream.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Owns the connection to the StatsD listener for the duration of a run.
///
/// The sink is flushed and released once, either by `close` or when the forwarder is dropped.
pub struct Forwarder {
    sink: Option<Box<dyn Sink>>,
}

impl Forwarder {
    pub fn new(sink: Box<dyn Sink>) -> Self {
        Forwarder { sink: Some(sink) }
    }

    /// Opens the configured transport to the StatsD listener
    pub fn connect(addr: &str, transport: Transport) -> io::Result<Self> {
        let sink: Box<dyn Sink> = match transport {
            Transport::Udp => Box::new(UdpSink::connect(addr)?),
            Transport::Tcp => Box::new(TcpSink::connect(addr)?),
        };
        Ok(Forwarder::new(sink))
    }

    /// Send one gauge line per sample.
    ///
    /// Failed sends are logged and counted; they don't stop the remaining samples.
    pub fn forward<'a, I>(&mut self, prefix: &str, samples: I, stats: &mut RunStats)
    where
        I: IntoIterator<Item = Sample<'a>>,
    {
        let sink = match self.sink.as_mut() {
            Some(sink) => sink,
            None => return,
        };
        for sample in samples {
            let line = statsd::gauge_line(prefix, &sample);
            match sink.send(&line) {
                Ok(()) => {
                    debug!("Sent StatsD metric: {}", line);
                    stats.send_succeeded();
                }
                Err(err) => {
                    warn!("Failed to send StatsD metric {:?}: {}", line, err);
                    stats.send_failed();
                }
            }
        }
    }

    /// Flushes and releases the sink.
    pub fn close(mut self) -> io::Result<()> {
        match self.sink.take() {
            Some(mut sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for Forwarder {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(err) = sink.flush() {
                warn!("Failed to flush StatsD metrics: {}", err);
            }
        }
    }
}
