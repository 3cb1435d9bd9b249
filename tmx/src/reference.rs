//! External-reference resolution: the preload cache and the fetch/parse
//! pipeline for external tilesets and object templates.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::{TmxError, TmxResult};
use crate::template::Template;
use crate::tileset::Tileset;
use crate::xml;

/// What kind of sub-document an external reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A `<tileset source="…">` reference to a TSX file.
    Tileset,
    /// An `<object template="…">` reference to a template file.
    Template,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Tileset => "tileset",
            Self::Template => "object template",
        })
    }
}

/// Caller-owned map from a reference path to the raw bytes of the
/// sub-document it names, letting the embedding application satisfy
/// external references without touching storage.
///
/// Keys are the top-level document's base directory joined with the
/// reference path exactly as written in the referencing node — no
/// normalization is applied, so callers must insert matching strings.
/// The parser only ever reads the cache; every reference is re-parsed
/// from the (possibly cached) raw bytes, only the bytes are shared.
#[derive(Clone, Debug, Default)]
pub struct PreloadCache {
    entries: HashMap<String, Vec<u8>>,
}

impl PreloadCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), bytes.into());
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a nested parse needs to resolve references: the directory of
/// the top-level document (references resolve against it at every nesting
/// depth) and the caller's preload cache.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ParseContext<'a> {
    pub base_dir: &'a Path,
    pub cache: &'a PreloadCache,
}

/// Fetches the raw bytes of a reference: preload cache first (exact string
/// match on the joined path), then storage.
fn fetch(
    kind: ReferenceKind,
    source: &str,
    ctx: &ParseContext<'_>,
) -> TmxResult<(PathBuf, Vec<u8>)> {
    let path = ctx.base_dir.join(source);
    let key = path.to_string_lossy();
    if let Some(bytes) = ctx.cache.get(key.as_ref()) {
        trace!(key = %key, "preload cache HIT");
        return Ok((path, bytes.to_vec()));
    }
    trace!(key = %key, "preload cache MISS");
    debug!(%kind, path = %path.display(), "reading external reference from storage");
    match std::fs::read(&path) {
        Ok(bytes) => Ok((path, bytes)),
        Err(source) => Err(TmxError::ReferenceNotFound { kind, path, source }),
    }
}

/// Resolves a `<tileset source="…">` reference into the external tileset
/// it names.
pub(crate) fn resolve_tileset(source: &str, ctx: &ParseContext<'_>) -> TmxResult<Tileset> {
    let (path, bytes) = fetch(ReferenceKind::Tileset, source, ctx)?;
    parse_tileset_document(&bytes, ctx).map_err(|e| TmxError::ReferenceMalformed {
        kind: ReferenceKind::Tileset,
        path,
        source: Box::new(e),
    })
}

/// Resolves an `<object template="…">` reference. The resolved template
/// must define at least one object.
pub(crate) fn resolve_template(source: &str, ctx: &ParseContext<'_>) -> TmxResult<Template> {
    let (path, bytes) = fetch(ReferenceKind::Template, source, ctx)?;
    let template =
        parse_template_document(&bytes, ctx).map_err(|e| TmxError::ReferenceMalformed {
            kind: ReferenceKind::Template,
            path: path.clone(),
            source: Box::new(e),
        })?;
    if template.objects.is_empty() {
        return Err(TmxError::EmptyTemplate(path));
    }
    Ok(template)
}

fn parse_tileset_document(bytes: &[u8], ctx: &ParseContext<'_>) -> TmxResult<Tileset> {
    let text = std::str::from_utf8(bytes)?;
    let mut reader = xml::reader_from(text);
    let start = xml::root_start(&mut reader, "tileset")?;
    Tileset::parse(&mut reader, &start, ctx)
}

fn parse_template_document(bytes: &[u8], ctx: &ParseContext<'_>) -> TmxResult<Template> {
    let text = std::str::from_utf8(bytes)?;
    let mut reader = xml::reader_from(text);
    let start = xml::root_start(&mut reader, "template")?;
    Template::parse(&mut reader, &start, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_lookup_is_exact_string_match() {
        let mut cache = PreloadCache::new();
        cache.insert("maps/a.tsx", b"<tileset/>".to_vec());

        assert!(cache.contains("maps/a.tsx"));
        // No normalization: an equivalent but differently-written path misses.
        assert!(!cache.contains("maps/./a.tsx"));
        assert_eq!(cache.get("maps/a.tsx"), Some(&b"<tileset/>"[..]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_reference_reports_the_joined_path() {
        let cache = PreloadCache::new();
        let ctx = ParseContext {
            base_dir: Path::new("does-not-exist"),
            cache: &cache,
        };
        let err = resolve_tileset("nope.tsx", &ctx).unwrap_err();
        match err {
            TmxError::ReferenceNotFound { kind, path, .. } => {
                assert_eq!(kind, ReferenceKind::Tileset);
                assert_eq!(path, Path::new("does-not-exist").join("nope.tsx"));
            }
            other => panic!("expected ReferenceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn preloaded_bytes_win_over_storage() {
        let mut cache = PreloadCache::new();
        let key = Path::new("anywhere").join("virtual.tsx");
        cache.insert(
            key.to_string_lossy().into_owned(),
            br#"<tileset name="virtual" tilewidth="8" tileheight="8"/>"#.to_vec(),
        );
        let ctx = ParseContext {
            base_dir: Path::new("anywhere"),
            cache: &cache,
        };
        let tileset = resolve_tileset("virtual.tsx", &ctx).unwrap();
        assert_eq!(tileset.name, "virtual");
        assert_eq!(tileset.tile_width, 8);
    }
}
