//! XML row loading.
//!
//! The source document is parsed once into an owned element tree so rows can
//! be handed around without borrowing the file contents. Elements are matched
//! by local name only; namespaces are ignored.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::{GeneratorError, Result};

/// An element of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    value: String,
    children: Vec<Element>,
}

impl Element {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let value = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        let children = node
            .children()
            .filter(|n| n.is_element())
            .map(Element::from_node)
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            value,
            children,
        }
    }

    /// All text inside the element, descendants included, in document order.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// First direct child named `tag`.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == tag)
    }

    fn collect_descendants<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == tag {
                out.push(child);
            }
            child.collect_descendants(tag, out);
        }
    }
}

/// A loaded source document, remembering where it came from for error
/// messages.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    root: Element,
}

impl Document {
    /// Read and parse the XML file at `path`. UTF-8 and UTF-16 (either byte
    /// order, detected from the BOM or the leading `<?`) are accepted.
    pub fn load(path: &Path) -> Result<Self> {
        let load_error = |source: DecodeError| GeneratorError::DocumentLoad {
            path: path.to_path_buf(),
            source,
        };
        let bytes = std::fs::read(path).map_err(|e| load_error(Box::new(e)))?;
        let text = decode_text(&bytes).map_err(load_error)?;
        let doc = Self::parse(path, &text)?;
        log::info!("Loaded XML document {}", path.display());
        Ok(doc)
    }

    /// Parse already-read XML. `path` is only used for error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let parsed = roxmltree::Document::parse_with_options(text, options).map_err(|e| {
            GeneratorError::DocumentLoad {
                path: path.to_path_buf(),
                source: Box::new(e),
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            root: Element::from_node(parsed.root_element()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every element below the root named `tag`, at any depth, in document
    /// order. Empty when nothing matches.
    pub fn rows(&self, tag: &str) -> Vec<&Element> {
        let mut rows = Vec::new();
        self.root.collect_descendants(tag, &mut rows);
        rows
    }

    /// Text of the `tag` child of `element`.
    pub fn value<'a>(&self, element: &'a Element, tag: &str) -> Result<&'a str> {
        element
            .child(tag)
            .map(Element::value)
            .ok_or_else(|| GeneratorError::MissingField {
                tag: tag.to_string(),
                path: self.path.clone(),
            })
    }
}

type DecodeError = Box<dyn std::error::Error + Send + Sync>;

fn decode_text(bytes: &[u8]) -> std::result::Result<Cow<'_, str>, DecodeError> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [b'<', 0, b'?', 0, ..] => decode_utf16(bytes, u16::from_le_bytes),
        [0, b'<', 0, b'?', ..] => decode_utf16(bytes, u16::from_be_bytes),
        _ => Ok(Cow::Borrowed(std::str::from_utf8(bytes)?)),
    }
}

fn decode_utf16(
    bytes: &[u8],
    unit: fn([u8; 2]) -> u16,
) -> std::result::Result<Cow<'static, str>, DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err("UTF-16 text has an odd number of bytes".into());
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    Ok(Cow::Owned(String::from_utf16(&units)?))
}
