//! PackBits run-length coding for bulk RAM regions.
//!
//! A control byte `n` is followed by either `n + 1` literal bytes
//! (`n <= 127`) or one byte repeated `257 - n` times (`n >= 129`). `128` is
//! never emitted and decodes as a no-op.

use crate::error::Error;

const MAX_RUN: usize = 128;

pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() / 2 + 2);
    let mut i = 0;
    while i < input.len() {
        let run = run_length(&input[i..]);
        if run >= 2 {
            out.push((257 - run) as u8);
            out.push(input[i]);
            i += run;
            continue;
        }

        let start = i;
        while i < input.len() && i - start < MAX_RUN && run_length(&input[i..]) < 3 {
            i += 1;
        }
        if i == start {
            // A 3-byte run begins here but the literal is still empty.
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&input[start..i]);
    }
    out
}

fn run_length(bytes: &[u8]) -> usize {
    let Some(&first) = bytes.first() else {
        return 0;
    };
    bytes
        .iter()
        .take(MAX_RUN)
        .take_while(|&&b| b == first)
        .count()
}

/// Decodes `input` into exactly `out.len()` bytes.
pub fn decode(input: &[u8], out: &mut [u8]) -> Result<(), Error> {
    let mut src = input.iter().copied();
    let mut pos = 0;
    while let Some(control) = src.next() {
        match control {
            0..=127 => {
                let n = control as usize + 1;
                let dst = out
                    .get_mut(pos..pos + n)
                    .ok_or(Error::CorruptSaveState("rle literal overruns output"))?;
                for slot in dst {
                    *slot = src
                        .next()
                        .ok_or(Error::CorruptSaveState("rle literal truncated"))?;
                }
                pos += n;
            }
            128 => {}
            _ => {
                let n = 257 - control as usize;
                let value = src
                    .next()
                    .ok_or(Error::CorruptSaveState("rle run truncated"))?;
                out.get_mut(pos..pos + n)
                    .ok_or(Error::CorruptSaveState("rle run overruns output"))?
                    .fill(value);
                pos += n;
            }
        }
    }
    if pos != out.len() {
        return Err(Error::CorruptSaveState("rle output length mismatch"));
    }
    Ok(())
}
