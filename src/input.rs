use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, anyhow, ensure};

/// Largest payload a UDP datagram can carry.
pub const MAX_DATAGRAM_LEN: usize = 65_507;

/// Unified input reader that handles both file and pipe input
pub struct InputReader {
    reader: Box<dyn Read>,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let reader: Box<dyn Read> = if input_path.as_ref() == Path::new("-") {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(input_path)?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader })
    }

    /// Read one whole datagram, rejecting input larger than a UDP payload
    pub fn read_datagram(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        (&mut self.reader)
            .take(MAX_DATAGRAM_LEN as u64 + 1)
            .read_to_end(&mut data)?;

        ensure!(
            data.len() <= MAX_DATAGRAM_LEN,
            "Input exceeds the maximum datagram size of {MAX_DATAGRAM_LEN} bytes"
        );

        Ok(data)
    }
}

/// Reads each input as one datagram and hands it to `callback` with its label.
///
/// Read failures are passed to the callback like any other bad datagram, so
/// whether they stop the run is the callback's decision.
pub fn for_each_datagram<P, F>(inputs: &[P], mut callback: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(&Path, Result<&[u8]>) -> Result<()>,
{
    for input in inputs {
        let path = input.as_ref();
        let label = if path == Path::new("-") {
            Path::new("<stdin>")
        } else {
            path
        };

        let datagram = InputReader::new(path)
            .and_then(|mut reader| reader.read_datagram())
            .with_context(|| format!("Failed to read {}", label.display()));

        callback(label, datagram.as_deref().map_err(|e| anyhow!("{e:#}")))?;
    }

    Ok(())
}
