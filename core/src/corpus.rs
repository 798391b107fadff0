use crate::{DocId, Error, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Decode raw file bytes on a best-effort basis: byte-order mark first, then strict UTF-8, then
/// whatever legacy encoding the detector guesses. Malformed sequences are replaced, never rejected.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(encoding, &bytes[bom_len..]);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            let encoding = detector.guess(None, false);
            tracing::debug!(encoding = encoding.name(), "input is not utf-8, using detected encoding");
            decode_with(encoding, bytes)
        }
    }
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "replaced malformed sequences while decoding");
    }
    text.into_owned()
}

/// Read every `*.{extension}` file directly inside `dir`, sorted by file name.
/// The doc id is the file name with its extension stripped.
pub fn load_corpus<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<(DocId, String)>> {
    let dir = dir.as_ref();
    let mut docs = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            Error::CorpusRead { path, source: err.into() }
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|s| s.to_str()) != Some(extension) {
            continue;
        }
        let stem = path.file_stem().unwrap_or_default();
        let Some(doc_id) = stem.to_str() else {
            return Err(Error::InvalidDocId(stem.to_string_lossy().into_owned()));
        };
        let bytes = fs::read(path).map_err(|source| Error::CorpusRead { path: path.to_path_buf(), source })?;
        tracing::debug!(doc_id, bytes = bytes.len(), "read corpus file");
        docs.push((doc_id.to_string(), decode_text(&bytes)));
    }
    tracing::info!(dir = %dir.display(), num_docs = docs.len(), "loaded corpus");
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_and_detects_legacy_encodings() {
        assert_eq!(decode_text("café".as_bytes()), "café");

        let french = "Le café était très chaud, mais la crème brûlée était déjà froide.";
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(french);
        assert_eq!(decode_text(&bytes), french);

        let russian = "Кот спит на диване, а собака лежит у двери и смотрит на кота.";
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(russian);
        assert_eq!(decode_text(&bytes), russian);
    }

    #[test]
    fn honours_byte_order_marks() {
        assert_eq!(decode_text(b"\xef\xbb\xbfcat"), "cat");
        assert_eq!(decode_text(b"\xff\xfec\x00a\x00t\x00"), "cat");
    }

    #[test]
    fn reads_only_matching_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2.txt"), "dog").unwrap();
        fs::write(dir.path().join("1.txt"), "cat").unwrap();
        fs::write(dir.path().join("3.md"), "bird").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("4.txt"), "fish").unwrap();

        let docs = load_corpus(dir.path(), "txt").unwrap();
        assert_eq!(docs, vec![("1".to_string(), "cat".to_string()), ("2".to_string(), "dog".to_string())]);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        fs::write(target.path().join("source.txt"), "cat").unwrap();
        std::os::unix::fs::symlink(target.path().join("source.txt"), dir.path().join("5.txt")).unwrap();

        let docs = load_corpus(dir.path(), "txt").unwrap();
        assert_eq!(docs, vec![("5".to_string(), "cat".to_string())]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_name_is_an_invalid_doc_id() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"1\xff.txt");
        if fs::write(dir.path().join(name), "cat").is_err() {
            // filesystem rejects non-utf-8 names
            return;
        }
        let err = load_corpus(dir.path(), "txt").unwrap_err();
        assert!(matches!(err, Error::InvalidDocId(id) if id == "1\u{FFFD}"));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(dir.path().join("absent"), "txt").unwrap_err();
        assert!(matches!(err, Error::CorpusRead { .. }));
    }
}
