//! Reading flat record elements out of data table XML documents.
//!
//! A data table document is a root element whose direct children are
//! homogeneous record elements (`<Class .../>` by default). Only the record
//! attributes are read; nested content and text are ignored. Attribute names
//! are lower-cased and values are XML-unescaped.

use std::{fs, path::Path};

use log::debug;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{
    error::{MigrationError, Result},
    row::Row,
};

pub fn read_records(path: &Path, record_element: &str) -> Result<Vec<Row>> {
    let text = fs::read_to_string(path).map_err(|err| MigrationError::parse(path, err.to_string()))?;
    let records =
        parse_records(&text, record_element).map_err(|message| MigrationError::parse(path, message))?;
    debug!(
        "Read {} <{}> record(s) from {:?}",
        records.len(),
        record_element,
        path
    );
    Ok(records)
}

pub fn parse_records(text: &str, record_element: &str) -> std::result::Result<Vec<Row>, String> {
    let mut reader = Reader::from_str(text);
    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                if depth == 0 {
                    saw_root = true;
                } else if depth == 1 && is_record(&element, record_element) {
                    records.push(record_from(&element)?);
                }
                depth += 1;
            }
            Ok(Event::Empty(element)) => {
                if depth == 0 {
                    saw_root = true;
                } else if depth == 1 && is_record(&element, record_element) {
                    records.push(record_from(&element)?);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(format!(
                    "malformed XML near byte {}: {err}",
                    reader.buffer_position()
                ));
            }
        }
    }

    if !saw_root {
        return Err("document has no root element".to_string());
    }
    if depth != 0 {
        return Err("document ended before its root element was closed".to_string());
    }
    Ok(records)
}

fn is_record(element: &BytesStart<'_>, record_element: &str) -> bool {
    element.name().as_ref() == record_element.as_bytes()
}

fn record_from(element: &BytesStart<'_>) -> std::result::Result<Row, String> {
    let mut row = Row::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|err| format!("invalid attribute: {err}"))?;
        let name = String::from_utf8_lossy(attribute.key.as_ref()).to_ascii_lowercase();
        let value = attribute
            .unescape_value()
            .map_err(|err| format!("invalid value for attribute '{name}': {err}"))?;
        row.set(name, value.into_owned());
    }
    Ok(row)
}
