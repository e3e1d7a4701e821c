use std::io::{BufRead, BufReader, BufWriter, Stdin, Stdout, Write};

use crate::error::AppResult;

use super::protocol::{BridgeResponse, PROTOCOL_VERSION};

/// One JSON document per line in each direction.
pub struct NdjsonIo<R, W> {
    reader: R,
    writer: W,
}

impl NdjsonIo<BufReader<Stdin>, BufWriter<Stdout>> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), BufWriter::new(std::io::stdout()))
    }
}

impl<R: BufRead, W: Write> NdjsonIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// `None` at end of input; blank lines come back as empty strings.
    pub fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn write_json_line<T: serde::Serialize>(&mut self, v: &T) -> AppResult<()> {
        serde_json::to_writer(&mut self.writer, v)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Answer to a line that did not even parse as a request; its id is unknown.
    pub fn protocol_error(&mut self, msg: String) -> AppResult<()> {
        let resp = BridgeResponse::<()>::err(PROTOCOL_VERSION, String::new(), "INVALID_REQUEST", msg);
        self.write_json_line(&resp)
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}
