//! File and stream I/O for the CLI.
//!
//! A path of `-` means stdin. An absent output path means stdout.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use tracing::debug;
use veriseal_core::Envelope;

/// Read the whole input. `None` or `-` reads stdin.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => {
            let bytes = fs::read(p).with_context(|| format!("failed to read {}", p.display()))?;
            debug!(path = %p.display(), len = bytes.len(), "read input");
            Ok(bytes)
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            debug!(len = buf.len(), "read stdin");
            Ok(buf)
        }
    }
}

/// Write bytes to the output path, or stdout.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, bytes).with_context(|| format!("failed to write {}", p.display()))?;
            debug!(path = %p.display(), len = bytes.len(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("failed to write stdout")?;
            stdout.flush().context("failed to flush stdout")?;
        }
    }
    Ok(())
}

/// Read and parse one envelope.
pub fn read_envelope(path: &Path) -> Result<Envelope> {
    let bytes = read_input(Some(path))?;
    Envelope::from_json(&bytes)
        .with_context(|| format!("failed to parse envelope from {}", path.display()))
}

/// Write an envelope as pretty JSON with a trailing newline.
pub fn write_envelope(path: Option<&Path>, env: &Envelope) -> Result<()> {
    let mut out = env.to_json_pretty()?.into_bytes();
    out.push(b'\n');
    write_output(path, &out)
}

/// Read envelopes from JSON lines. Blank lines are skipped.
pub fn read_jsonl(path: &Path) -> Result<Vec<Envelope>> {
    let reader: Box<dyn BufRead> = if path == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Box::new(BufReader::new(file))
    };
    parse_jsonl(reader)
}

/// Parse envelopes from a JSON lines reader.
pub fn parse_jsonl<R: BufRead>(reader: R) -> Result<Vec<Envelope>> {
    let mut envelopes = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let env = Envelope::from_json(line.as_bytes())
            .with_context(|| format!("line {}: invalid envelope", lineno + 1))?;
        envelopes.push(env);
    }
    debug!(count = envelopes.len(), "parsed envelopes");
    Ok(envelopes)
}
