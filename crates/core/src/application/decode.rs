// CSV Decode - raw tool stdout into trimmed rows

use crate::domain::RawRow;

/// Failures while decoding tool output as CSV.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A quoted field was opened but never closed before end of input.
    /// `line` is where the offending quote opened.
    #[error("unterminated quoted field starting at line {line}")]
    UnterminatedQuote { line: usize },

    /// The reader rejected the input (invalid UTF-8, broken framing).
    #[error("invalid CSV at line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },
}

/// Decodes raw stdout into rows of trimmed fields.
///
/// No header handling and no width checks happen here; rows keep whatever
/// width the tool emitted and the mapper applies the schema. Blank and
/// whitespace-only lines are dropped, so the trailing newline the tool
/// prints never produces a phantom row. The whole input is decoded or the
/// first error wins; there are no partial results.
pub fn decode_rows(raw: &[u8]) -> Result<Vec<RawRow>, DecodeError> {
    // The reader quietly repairs unbalanced quotes; reject those up front.
    check_quoting(raw)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| DecodeError::Csv {
            line: source.position().map_or(0, |p| p.line() as usize),
            source,
        })?;
        let fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        // Whitespace-only line: a single field that trims to nothing.
        if fields.len() == 1 && fields[0].is_empty() {
            continue;
        }
        rows.push(RawRow::new(fields));
    }
    Ok(rows)
}

/// Scans for a quoted field that never closes, tracking `""` escapes.
/// Returns the line the unterminated quote opened on.
fn check_quoting(raw: &[u8]) -> Result<(), DecodeError> {
    let mut line = 1usize;
    let mut open_line = 0usize;
    let mut in_quotes = false;
    let mut i = 0usize;

    while i < raw.len() {
        let byte = raw[i];
        if in_quotes {
            match byte {
                b'"' if raw.get(i + 1) == Some(&b'"') => i += 1,
                b'"' => in_quotes = false,
                b'\n' => line += 1,
                _ => {}
            }
        } else {
            match byte {
                b'"' => {
                    in_quotes = true;
                    open_line = line;
                }
                b'\n' => line += 1,
                _ => {}
            }
        }
        i += 1;
    }

    if in_quotes {
        return Err(DecodeError::UnterminatedQuote { line: open_line });
    }
    Ok(())
}
