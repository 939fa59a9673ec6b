//! Route `tracing` output to the browser console

use std::io;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Buffers one formatted event and hands it to `console.log` when dropped
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(line) = take_line(&mut self.buffer) {
            emit(&line);
        }
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = take_line(&mut self.buffer) {
            emit(&line);
        }
    }
}

/// Drain the buffer into a single console line, if it holds anything
fn take_line(buffer: &mut Vec<u8>) -> Option<String> {
    let text = String::from_utf8_lossy(buffer).trim_end().to_string();
    buffer.clear();
    (!text.is_empty()).then_some(text)
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    eprintln!("{}", line);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

/// Install the console subscriber; later calls are ignored
pub fn init_logging(level: Level) {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(%level, "console logging ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_take_line_trims_and_clears() {
        let mut buffer = b"INFO analysis complete\n".to_vec();
        assert_eq!(
            take_line(&mut buffer).as_deref(),
            Some("INFO analysis complete")
        );
        assert!(buffer.is_empty());
        assert_eq!(take_line(&mut buffer), None);
    }

    #[test]
    fn test_writer_buffers_partial_writes() {
        let mut writer = ConsoleWriter::default();
        writer.write_all(b"first ").unwrap();
        writer.write_all(b"second\n").unwrap();
        assert_eq!(writer.buffer, b"first second\n");
        writer.flush().unwrap();
        assert!(writer.buffer.is_empty());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Level::DEBUG);
        init_logging(Level::INFO);
        tracing::info!("still fine");
    }
}
