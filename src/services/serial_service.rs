use std::io::{self, Read};
use std::time::Duration;

use serialport::{DataBits, StopBits};
use tokio::sync::mpsc;

use crate::configs::Serial;

const LINE_QUEUE_DEPTH: usize = 64;
const READ_CHUNK: usize = 256;

/// Reader side of the serial link to the radio receiver.
///
/// The port only has blocking reads, so a dedicated thread owns it and feeds
/// trimmed lines into a bounded channel for the async ingestion task. Losing
/// the link is not recoverable: any real read error ends the process.
pub struct SerialReader;

impl SerialReader {
    pub fn spawn(settings: Serial) -> mpsc::Receiver<String> {
        let (lines, rx) = mpsc::channel(LINE_QUEUE_DEPTH);

        std::thread::spawn(move || {
            if let Err(err) = Self::read_loop(&settings, lines) {
                tracing::error!("serial link on {} failed: {err}", settings.port);
                std::process::exit(1);
            }
        });

        rx
    }

    fn read_loop(settings: &Serial, lines: mpsc::Sender<String>) -> anyhow::Result<()> {
        let mut port = serialport::new(&settings.port, settings.baud)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .timeout(Duration::from_millis(500))
            .open()?;

        tracing::info!("reading from {} at {} baud", settings.port, settings.baud);

        let mut pending: Vec<u8> = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            match port.read(&mut chunk) {
                Ok(0) => anyhow::bail!("serial port closed"),
                Ok(n) => {
                    for &byte in &chunk[..n] {
                        if byte != b'\n' {
                            pending.push(byte);
                            continue;
                        }

                        let line = String::from_utf8_lossy(&pending).trim().to_string();
                        pending.clear();

                        if !line.is_empty() && lines.blocking_send(line).is_err() {
                            // receiver gone, the process is going down anyway
                            return Ok(());
                        }
                    }
                }
                // idle link; keep waiting for the next frame
                Err(err)
                    if matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) =>
                {
                    continue
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
