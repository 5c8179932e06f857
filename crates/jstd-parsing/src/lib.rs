//! # jstd-parsing
//!
//! **Tier 2 (Parsing)**
//!
//! Parses the surefire-style XML reports JsTestDriver writes into
//! [`TestReport`]s, one per report identifier.
//!
//! ```xml
//! <testsuite name="Chrome_16091263_Windows.PersonTest" tests="2">
//!   <testcase classname="Chrome_16091263_Windows.PersonTest" name="testWhoAreYou" time="0.3"/>
//!   <testcase classname="Chrome_16091263_Windows.PersonTest" name="testSetName" time="0.4">
//!     <failure message="expected 'Bob'"/>
//!   </testcase>
//! </testsuite>
//! ```
//!
//! ## What belongs here
//! * Report decoding (byte order mark, XML declaration)
//! * XML event handling (quick-xml)
//! * Test case classification and duration parsing
//!
//! ## What does NOT belong here
//! * Report discovery (use jstd-walk)
//! * Aggregation per source file (use jstd-sensor)

use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use jstd_types::{TestCaseResult, TestReport, TestStatus};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

const TESTSUITES: &[u8] = b"testsuites";
const TESTSUITE: &[u8] = b"testsuite";
const TESTCASE: &[u8] = b"testcase";

/// Errors that make a report file unusable.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Unexpected report structure: {0}")]
    Schema(String),
}

/// Parse a report file.
///
/// The file is decoded following its byte order mark or XML declaration,
/// UTF-8 otherwise. Test cases without a `classname` and outside a named
/// suite fall back to the identifier encoded in the file name.
pub fn parse_report_file(path: &Path) -> Result<Vec<TestReport>, ReportError> {
    let bytes = std::fs::read(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fallback = jstd_walk::identifier_from_file_name(path);
    parse_report(&decode_report(&bytes), fallback.as_deref())
}

/// Decode raw report bytes to text.
///
/// A BOM wins over the `encoding` pseudo-attribute of the XML declaration;
/// unknown or missing labels mean UTF-8. Malformed sequences become U+FFFD.
pub fn decode_report(bytes: &[u8]) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| declared_encoding(bytes))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// Encoding named by a leading `<?xml ... encoding="..."?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    let end = decl.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&decl[..end]).ok()?;
    let (_, rest) = decl.split_once("encoding")?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let (label, _) = rest[1..].split_once(quote)?;
    // Only ASCII-compatible labels can be read from an ASCII declaration.
    Encoding::for_label(label.as_bytes()).filter(|e| e.is_ascii_compatible())
}

/// Parse report XML.
///
/// The root element must be `<testsuite>` or `<testsuites>`. Cases are
/// grouped by identifier (`classname`, then suite `name`, then
/// `fallback_identifier`) in the order identifiers first appear.
pub fn parse_report(
    xml: &str,
    fallback_identifier: Option<&str>,
) -> Result<Vec<TestReport>, ReportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = ReportParser::new(fallback_identifier);
    loop {
        let event = reader.read_event().map_err(|source| ReportError::Xml {
            position: reader.buffer_position() as u64,
            source,
        })?;
        let position = reader.buffer_position() as u64;
        match event {
            Event::Start(e) => parser.open(&e, position)?,
            Event::Empty(e) => {
                parser.open(&e, position)?;
                parser.close(e.local_name().as_ref())?;
            }
            Event::End(e) => parser.close(e.local_name().as_ref())?,
            Event::Text(t) => {
                let text = t.unescape().map_err(|source| ReportError::Xml { position, source })?;
                parser.text(&text);
            }
            Event::CData(c) => parser.text(&String::from_utf8_lossy(&c.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }
    parser.finish()
}

/// Status element currently open inside a test case.
#[derive(Debug)]
struct StatusElement {
    status: TestStatus,
    text: String,
}

#[derive(Debug)]
struct CaseBuilder {
    name: String,
    class_name: Option<String>,
    duration_ms: u64,
    status: TestStatus,
    message: Option<String>,
}

impl CaseBuilder {
    /// Record a status child, keeping the most severe one.
    fn apply(&mut self, status: TestStatus, message: Option<String>) {
        if severity(status) > severity(self.status) {
            self.status = status;
            self.message = message;
        } else if status == self.status && self.message.is_none() {
            self.message = message;
        }
    }
}

fn severity(status: TestStatus) -> u8 {
    match status {
        TestStatus::Ok => 0,
        TestStatus::Skipped => 1,
        TestStatus::Failure => 2,
        TestStatus::Error => 3,
    }
}

struct ReportParser<'a> {
    fallback: Option<&'a str>,
    depth: usize,
    seen_root: bool,
    suites: Vec<Option<String>>,
    case: Option<CaseBuilder>,
    case_depth: usize,
    status: Option<(StatusElement, usize)>,
    reports: Vec<TestReport>,
}

impl<'a> ReportParser<'a> {
    fn new(fallback: Option<&'a str>) -> Self {
        Self {
            fallback: fallback.filter(|f| !f.is_empty()),
            depth: 0,
            seen_root: false,
            suites: Vec::new(),
            case: None,
            case_depth: 0,
            status: None,
            reports: Vec::new(),
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, position: u64) -> Result<(), ReportError> {
        self.depth += 1;
        let name = e.local_name();
        let name = name.as_ref();

        if !self.seen_root {
            self.seen_root = true;
            if name != TESTSUITE && name != TESTSUITES {
                return Err(ReportError::Schema(format!(
                    "root element <{}> is neither <testsuite> nor <testsuites>",
                    String::from_utf8_lossy(name)
                )));
            }
        }

        if let Some(case) = self.case.as_mut() {
            if self.status.is_none()
                && let Some(status) = status_for(name)
            {
                let message =
                    attribute(e, b"message", position)?.filter(|m| !m.trim().is_empty());
                case.apply(status, message);
                self.status = Some((
                    StatusElement {
                        status,
                        text: String::new(),
                    },
                    self.depth,
                ));
            }
            return Ok(());
        }

        if name == TESTSUITE {
            let suite_name = attribute(e, b"name", position)?
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
            self.suites.push(suite_name);
        } else if name == TESTCASE {
            if self.suites.is_empty() {
                return Err(ReportError::Schema(
                    "<testcase> outside of a <testsuite>".to_string(),
                ));
            }
            let case_name = attribute(e, b"name", position)?.unwrap_or_default();
            let class_name = attribute(e, b"classname", position)?
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            let duration_ms = attribute(e, b"time", position)?
                .map(|t| parse_seconds(&t))
                .map(jstd_math::seconds_to_millis)
                .unwrap_or(0);
            self.case = Some(CaseBuilder {
                name: case_name,
                class_name,
                duration_ms,
                status: TestStatus::Ok,
                message: None,
            });
            self.case_depth = self.depth;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some((element, _)) = self.status.as_mut() {
            element.text.push_str(text);
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<(), ReportError> {
        if self.depth == 0 {
            return Err(ReportError::Schema(format!(
                "unexpected closing tag </{}>",
                String::from_utf8_lossy(name)
            )));
        }

        let closes_status = matches!(&self.status, Some((_, depth)) if *depth == self.depth);
        if closes_status {
            if let Some((element, _)) = self.status.take() {
                let text = element.text.trim();
                if let Some(case) = self.case.as_mut()
                    && case.status == element.status
                    && case.message.is_none()
                    && !text.is_empty()
                {
                    case.message = Some(text.to_string());
                }
            }
        } else if self.case.is_some() && self.case_depth == self.depth {
            if let Some(case) = self.case.take() {
                self.finish_case(case)?;
            }
        } else if self.case.is_none() && name == TESTSUITE {
            self.suites.pop();
        }

        self.depth -= 1;
        Ok(())
    }

    fn finish_case(&mut self, case: CaseBuilder) -> Result<(), ReportError> {
        let suite_name = self.suites.iter().rev().find_map(|s| s.as_deref());
        let identifier = case
            .class_name
            .as_deref()
            .or(suite_name)
            .or(self.fallback)
            .ok_or_else(|| {
                ReportError::Schema(format!("test case '{}' has no report identifier", case.name))
            })?
            .to_string();

        let result = TestCaseResult {
            name: case.name,
            status: case.status,
            duration_ms: case.duration_ms,
            message: case.message,
        };

        match self.reports.iter_mut().find(|r| r.identifier == identifier) {
            Some(report) => report.cases.push(result),
            None => self.reports.push(TestReport {
                identifier,
                cases: vec![result],
            }),
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<TestReport>, ReportError> {
        if !self.seen_root {
            return Err(ReportError::Schema(
                "document has no <testsuite> element".to_string(),
            ));
        }
        if self.depth != 0 {
            return Err(ReportError::Schema(
                "document ended inside an open element".to_string(),
            ));
        }
        Ok(self.reports)
    }
}

fn status_for(name: &[u8]) -> Option<TestStatus> {
    match name {
        b"failure" => Some(TestStatus::Failure),
        b"error" => Some(TestStatus::Error),
        b"skipped" => Some(TestStatus::Skipped),
        _ => None,
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8], position: u64) -> Result<Option<String>, ReportError> {
    let Some(attr) = e
        .try_get_attribute(key)
        .map_err(|err| ReportError::Xml {
            position,
            source: err.into(),
        })?
    else {
        return Ok(None);
    };
    let value = attr
        .unescape_value()
        .map_err(|source| ReportError::Xml { position, source })?;
    Ok(Some(value.into_owned()))
}

/// Parse a `time` attribute in seconds.
///
/// Thousands separators are accepted (`"1,234.5"`); anything unparsable
/// counts as zero.
pub fn parse_seconds(value: &str) -> f64 {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}
