use super::domain::LeadRow;

/// The upload could not be read as CSV at all, so no row numbers exist to report against.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid CSV data: quote not closed")]
    UnclosedQuote,
}

/// Decodes an uploaded file into rows, in file order. The first line is the header;
/// blank lines are skipped and never consume a row number.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<LeadRow>, DecodeError> {
    // The csv reader folds an unterminated quoted field into one cell running to EOF.
    if has_unclosed_quote(bytes) {
        return Err(DecodeError::UnclosedQuote);
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: csv::StringRecord = csv_reader.headers()?.iter().map(clean_header).collect();
    csv_reader.set_headers(headers);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<LeadRow>() {
        rows.push(record?);
    }

    Ok(rows)
}

// Tracks RFC 4180 quoting the way the csv reader does: a quote only opens a field at
// its start, and `""` inside a quoted field is an escaped quote.
fn has_unclosed_quote(bytes: &[u8]) -> bool {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut iter = bytes.iter().peekable();

    while let Some(&byte) = iter.next() {
        if in_quotes {
            if byte == b'"' {
                if iter.peek() == Some(&&b'"') {
                    iter.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        match byte {
            b'"' if at_field_start => in_quotes = true,
            b',' | b'\n' | b'\r' => {
                at_field_start = true;
                continue;
            }
            _ => {}
        }
        at_field_start = false;
    }

    in_quotes
}

// Spreadsheet exports like to prefix the first header with a BOM.
fn clean_header(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}
