//! Report definition sniffing
//!
//! Pure classification over report XML. The rules mirror what report
//! designers emit: a fixed-page report carries `Body/ReportItems/FixedPage`,
//! a dashboard is a sectioned report whose root-level `CustomProperties`
//! mention `Dashboard`, and everything else with `ReportSections` is a
//! multi-section report. Structures matching none of these classify as
//! unknown rather than being guessed at.

use crate::error::{Result, StoreError};
use crate::types::RdlSubtype;
use quick_xml::events::Event;
use quick_xml::Reader;

const DASHBOARD_MARKER: &[u8] = b"Dashboard";

/// Classify the RDL flavor of a report definition.
///
/// Returns `Ok(None)` for well-formed XML that matches no known report
/// shape, and [`StoreError::InvalidContent`] for malformed XML.
pub fn classify_rdl(content: &[u8]) -> Result<Option<RdlSubtype>> {
    let text = std::str::from_utf8(content)
        .map_err(|_| StoreError::InvalidContent("report XML is not valid UTF-8".into()))?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut saw_root = false;
    let mut fixed_page = false;
    let mut sectioned = false;
    let mut dashboard = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_root = true;
                path.push(e.local_name().as_ref().to_vec());
                match_element(&path, &mut fixed_page, &mut sectioned);
                if in_custom_properties(&path) {
                    for attr in e.attributes().flatten() {
                        if contains(attr.value.as_ref(), DASHBOARD_MARKER) {
                            dashboard = true;
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                path.push(e.local_name().as_ref().to_vec());
                match_element(&path, &mut fixed_page, &mut sectioned);
                path.pop();
            }
            Ok(Event::Text(t)) => {
                if in_custom_properties(&path) && contains(t.as_ref(), DASHBOARD_MARKER) {
                    dashboard = true;
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(StoreError::InvalidContent(format!(
                    "report XML content is invalid: {err}"
                )))
            }
        }
    }

    if !saw_root {
        return Err(StoreError::InvalidContent(
            "report XML content is empty".into(),
        ));
    }

    if fixed_page {
        return Ok(Some(RdlSubtype::FixedPage));
    }
    if sectioned {
        if dashboard {
            return Ok(Some(RdlSubtype::Dashboard));
        }
        return Ok(Some(RdlSubtype::MultiSection));
    }
    Ok(None)
}

/// Extract the data provider tag from a shared data source definition.
///
/// Looks for the text of `ConnectionProperties/DataProvider`; returns
/// `Ok(None)` when the document carries none.
pub fn shared_data_source_provider(content: &[u8]) -> Result<Option<String>> {
    let text = std::str::from_utf8(content)
        .map_err(|_| StoreError::InvalidContent("data source XML is not valid UTF-8".into()))?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => path.push(e.local_name().as_ref().to_vec()),
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(t)) => {
                if path.len() >= 2
                    && path[path.len() - 1] == b"DataProvider"
                    && path[path.len() - 2] == b"ConnectionProperties"
                {
                    let provider = t.unescape().map_err(|err| {
                        StoreError::InvalidContent(format!(
                            "data source XML content is invalid: {err}"
                        ))
                    })?;
                    return Ok(Some(provider.trim().to_string()));
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(err) => {
                return Err(StoreError::InvalidContent(format!(
                    "data source XML content is invalid: {err}"
                )))
            }
        }
    }
}

fn match_element(path: &[Vec<u8>], fixed_page: &mut bool, sectioned: &mut bool) {
    if path.len() == 4
        && path[1] == b"Body"
        && path[2] == b"ReportItems"
        && path[3] == b"FixedPage"
    {
        *fixed_page = true;
    }
    if path.len() == 3 && path[1] == b"ReportSections" && path[2] == b"ReportSection" {
        *sectioned = true;
    }
}

fn in_custom_properties(path: &[Vec<u8>]) -> bool {
    path.len() >= 2 && path[1] == b"CustomProperties"
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
