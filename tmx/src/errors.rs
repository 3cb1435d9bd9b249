use std::path::PathBuf;

use tmx_tile_utils::CodecError;

use crate::reference::ReferenceKind;

/// Errors that can occur while parsing a TMX document.
///
/// Parsing is fail-fast: the first error encountered during the
/// depth-first walk aborts the whole parse, and no partial document is
/// produced.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum TmxError {
    /// The document (or a referenced sub-document) is not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The outer XML is not well formed.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// An element carries a syntactically invalid attribute.
    #[error(transparent)]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document's root element is not the one its grammar requires.
    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    /// The document ended in the middle of an element.
    #[error("document ended unexpectedly inside <{0}>")]
    UnexpectedEof(&'static str),

    /// An attribute value failed to parse as its expected type.
    #[error("invalid value {value:?} for attribute {attribute:?} on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: String,
        value: String,
    },

    /// A tile-grid payload failed to decode.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A file could not be read.
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external reference is absent from both the preload cache and
    /// storage.
    #[error("external {kind} {} could not be read: {source}", path.display())]
    ReferenceNotFound {
        kind: ReferenceKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external reference was fetched but does not parse as its
    /// expected grammar.
    #[error("external {kind} {} is malformed: {source}", path.display())]
    ReferenceMalformed {
        kind: ReferenceKind,
        path: PathBuf,
        #[source]
        source: Box<TmxError>,
    },

    /// A resolved template defines no object to inherit from.
    #[error("template {} does not define an object", .0.display())]
    EmptyTemplate(PathBuf),
}

/// A convenience [`Result`] for TMX parsing.
pub type TmxResult<T> = Result<T, TmxError>;
