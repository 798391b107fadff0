use crate::{Error, IndexSnapshot, InvertedIndex, PositionalIndex, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub const DEFAULT_INDEX_FILE: &str = "indexes.json";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub created_at: String,
    pub num_docs: usize,
    pub num_terms: usize,
}

#[derive(Serialize)]
struct IndexFileRef<'a> {
    meta: MetaFile,
    inverted_index: &'a InvertedIndex,
    positional_index: &'a PositionalIndex,
}

#[derive(Deserialize)]
struct IndexFile {
    meta: MetaFile,
    inverted_index: InvertedIndex,
    positional_index: PositionalIndex,
}

/// Write both indexes to a single JSON file. The file is written next to its destination and
/// renamed into place, so a failed save leaves any previous index untouched.
pub fn save_indexes<P: AsRef<Path>>(snapshot: &IndexSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let stats = snapshot.stats();
    let file = IndexFileRef {
        meta: MetaFile {
            version: FORMAT_VERSION,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "".into()),
            num_docs: stats.num_docs,
            num_terms: stats.num_terms,
        },
        inverted_index: &snapshot.inverted,
        positional_index: &snapshot.positional,
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut w, &file)?;
        w.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    tracing::info!(path = %path.display(), num_docs = stats.num_docs, num_terms = stats.num_terms, "saved indexes");
    Ok(())
}

/// Load both indexes. `Ok(None)` means no index exists at `path` and one must be built;
/// an index that exists but holds no terms loads as `Some` of an empty snapshot.
pub fn load_indexes<P: AsRef<Path>>(path: P) -> Result<Option<IndexSnapshot>> {
    let path = path.as_ref();
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no index present");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let file: IndexFile = serde_json::from_reader(BufReader::new(f))?;
    if file.meta.version != FORMAT_VERSION {
        return Err(Error::InconsistentIndex(format!(
            "unsupported index version {} (expected {FORMAT_VERSION})",
            file.meta.version
        )));
    }
    let snapshot = IndexSnapshot { inverted: file.inverted_index, positional: file.positional_index };
    snapshot.check_consistency()?;
    tracing::info!(
        path = %path.display(),
        created_at = %file.meta.created_at,
        num_docs = file.meta.num_docs,
        num_terms = file.meta.num_terms,
        "loaded indexes"
    );
    Ok(Some(snapshot))
}

/// Read the `meta` header of a stored index. The index bodies are parsed past but not kept.
pub fn load_meta<P: AsRef<Path>>(path: P) -> Result<MetaFile> {
    #[derive(Deserialize)]
    struct Header {
        meta: MetaFile,
    }
    let f = File::open(path.as_ref())?;
    let header: Header = serde_json::from_reader(BufReader::new(f))?;
    Ok(header.meta)
}
