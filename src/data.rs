//! Loading of the root data object that templates are expanded against.
use crate::log::{error_io, Error, UNSUPPORTED_INPUT};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use serde_json::{json, Map, Value};
use std::{ffi::OsStr, fs, path::Path};
use tracing::debug;

/// Read the file at the given path into a [`Value`].
///
/// `.json` files are parsed as they are. `.xml` files become a tree of
/// elements, each one an object of this shape:
///
/// ```text
/// {"name": "tag", "attributes": {"key": "value"}, "text": "...", "children": [...]}
/// ```
///
/// # Errors
///
/// Returns an [`Error`] if the file cannot be read or parsed, or if its
/// extension is neither `.json` nor `.xml`.
pub fn open_root<P>(path: P) -> Result<Value, Error>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let shown = path.display().to_string();
    let extension = path.extension().and_then(OsStr::to_str);

    if !matches!(extension, Some("json") | Some("xml")) {
        return Err(Error::build(UNSUPPORTED_INPUT).with_help(format!(
            "`{shown}` is not supported, input must be a `.json` or `.xml` file"
        )));
    }
    let text = fs::read_to_string(path).map_err(|e| error_io(&shown, e))?;
    debug!(path = %shown, bytes = text.len(), "read input data");

    match extension {
        Some("json") => serde_json::from_str(&text).map_err(|e| {
            Error::build(UNSUPPORTED_INPUT).with_help(format!("`{shown}`: {e}"))
        }),
        _ => parse_xml(&text).map_err(|e| {
            let help = e.get_help().unwrap_or_default();
            Error::build(UNSUPPORTED_INPUT).with_help(format!("`{shown}`: {help}"))
        }),
    }
}

/// An element that has been opened but not yet closed.
struct Element {
    name: String,
    attributes: Map<String, Value>,
    text: String,
    children: Vec<Value>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, Error> {
        let mut attributes = Map::new();
        for attribute in start.attributes().flatten() {
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(error_xml)?;
            attributes.insert(key, Value::String(value.into_owned()));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: vec![],
        })
    }

    fn close(self) -> Value {
        json!({
            "name": self.name,
            "attributes": self.attributes,
            "text": self.text.trim(),
            "children": self.children,
        })
    }
}

/// Parse an xml document and return its root element.
fn parse_xml(text: &str) -> Result<Value, Error> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut open: Vec<Element> = vec![];
    let mut root: Option<Value> = None;

    // Attach a closed element to its parent, or make it the root.
    let attach = |open: &mut Vec<Element>, root: &mut Option<Value>, value: Value| {
        match open.last_mut() {
            Some(parent) => parent.children.push(value),
            None if root.is_none() => *root = Some(value),
            None => {
                return Err(Error::build(UNSUPPORTED_INPUT)
                    .with_help("xml document has more than one root element"))
            }
        }

        Ok(())
    };

    loop {
        match reader.read_event().map_err(error_xml)? {
            Event::Start(start) => open.push(Element::open(&start)?),
            Event::Empty(start) => {
                let value = Element::open(&start)?.close();
                attach(&mut open, &mut root, value)?;
            }
            Event::End(_) => {
                if let Some(element) = open.pop() {
                    attach(&mut open, &mut root, element.close())?;
                }
            }
            Event::Text(text) => {
                if let Some(element) = open.last_mut() {
                    element.text.push_str(&text.unescape().map_err(error_xml)?);
                }
            }
            Event::CData(data) => {
                if let Some(element) = open.last_mut() {
                    element
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    root.ok_or_else(|| {
        Error::build(UNSUPPORTED_INPUT).with_help("xml document has no root element")
    })
}

fn error_xml<T>(error: T) -> Error
where
    T: std::fmt::Display,
{
    Error::build(UNSUPPORTED_INPUT).with_help(format!("invalid xml: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{open_root, parse_xml};
    use crate::log::{IO_FAILURE, UNSUPPORTED_INPUT};
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_open_json() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("root.json");
        fs::write(&path, r#"{"name": "point", "fields": ["x", "y"]}"#).unwrap();

        assert_eq!(
            open_root(&path).unwrap(),
            json!({"name": "point", "fields": ["x", "y"]})
        );
    }

    #[test]
    fn test_open_xml() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("root.xml");
        fs::write(&path, "<model name=\"point\"><field>x</field><field/></model>").unwrap();

        let root = open_root(&path).unwrap();
        assert_eq!(root["name"], json!("model"));
        assert_eq!(root["attributes"]["name"], json!("point"));
        assert_eq!(root["children"][0]["text"], json!("x"));
        assert_eq!(root["children"][1]["children"], json!([]));
    }

    #[test]
    fn test_xml_text_and_cdata() {
        let root = parse_xml("<?xml version=\"1.0\"?>\n<a>\n  one &amp; <![CDATA[<two>]]>\n</a>").unwrap();

        assert_eq!(root["text"], json!("one &<two>"));
    }

    #[test]
    fn test_xml_with_two_roots() {
        let error = parse_xml("<a/><b>text</b>").unwrap_err();

        assert_eq!(error.get_reason(), UNSUPPORTED_INPUT);
        assert_eq!(
            error.get_help(),
            Some("xml document has more than one root element")
        );
    }

    #[test]
    fn test_xml_without_root() {
        let error = parse_xml("<?xml version=\"1.0\"?>").unwrap_err();

        assert_eq!(error.get_reason(), UNSUPPORTED_INPUT);
    }

    #[test]
    fn test_unsupported_extension() {
        let error = open_root("root.yaml").unwrap_err();

        assert_eq!(error.get_reason(), UNSUPPORTED_INPUT);
    }

    #[test]
    fn test_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let error = open_root(directory.path().join("missing.json")).unwrap_err();

        assert_eq!(error.get_reason(), IO_FAILURE);
    }
}
