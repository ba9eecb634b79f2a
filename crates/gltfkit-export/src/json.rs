//! JSON output of glTF records

use std::io::Write;

use serde::Serialize;

use crate::ExportResult;

/// Serialize a document, optionally pretty-printed
pub fn to_json_string<T: Serialize>(document: &T, pretty: bool) -> ExportResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(json)
}

/// Serialize a document into `writer`
pub fn write_json<W: Write, T: Serialize>(mut writer: W, document: &T, pretty: bool) -> ExportResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, document)?;
    } else {
        serde_json::to_writer(&mut writer, document)?;
    }
    writer.flush()?;
    Ok(())
}
