// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output path policy.

use std::path::{Path, PathBuf};

use lipikar_core::error::{LipikarError, Result};
use lipikar_core::types::OutputFormat;
use uuid::Uuid;

/// File stem of the input, used for the default output name and the
/// document title.
pub fn document_title(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Where the converted document should be written.
///
/// An explicit path is used as given, provided its extension names a format
/// we can write (none at all means DOCX). Otherwise `<stem>.docx` in `cwd`,
/// or `<stem>-<8 hex>.docx` if that name is already taken.
pub fn resolve_output_path(input: &Path, explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if let Some(ext) = path.extension()
            && OutputFormat::from_extension(&ext.to_string_lossy()).is_none()
        {
            return Err(LipikarError::InvalidInput(format!(
                "cannot write {}: use a .docx or .txt output",
                path.display()
            )));
        }
        return Ok(path.to_path_buf());
    }

    let stem = document_title(input);
    let ext = OutputFormat::Docx.extension();
    let plain = cwd.join(format!("{stem}.{ext}"));
    if !plain.exists() {
        return Ok(plain);
    }

    loop {
        let candidate = cwd.join(format!("{stem}-{}.{ext}", short_id()));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
}

fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_output_is_used_verbatim() {
        let out = resolve_output_path(
            Path::new("scan.pdf"),
            Some(Path::new("/srv/out/notes.txt")),
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/srv/out/notes.txt"));

        let bare = resolve_output_path(Path::new("scan.pdf"), Some(Path::new("notes")), Path::new("/work"));
        assert_eq!(bare.unwrap(), PathBuf::from("notes"));
    }

    #[test]
    fn explicit_output_with_unwritable_format_is_rejected() {
        let err = resolve_output_path(
            Path::new("scan.pdf"),
            Some(Path::new("/srv/out/scan.pdf")),
            Path::new("/work"),
        )
        .unwrap_err();
        assert!(matches!(err, LipikarError::InvalidInput(_)));
        assert!(err.to_string().contains("scan.pdf"));
    }

    #[test]
    fn default_output_is_stem_docx_in_cwd() {
        let cwd = tempfile::tempdir().unwrap();
        let out = resolve_output_path(Path::new("/data/রিপোর্ট.pdf"), None, cwd.path()).unwrap();
        assert_eq!(out, cwd.path().join("রিপোর্ট.docx"));
    }

    #[test]
    fn existing_output_gets_a_unique_suffix() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join("scan.docx"), b"taken").unwrap();

        let out = resolve_output_path(Path::new("scan.pdf"), None, cwd.path()).unwrap();
        let name = out.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!out.exists());
        assert!(name.starts_with("scan-") && name.ends_with(".docx"));
        let suffix = &name["scan-".len()..name.len() - ".docx".len()];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn title_falls_back_when_there_is_no_stem() {
        assert_eq!(document_title(Path::new("/")), "document");
        assert_eq!(document_title(Path::new("a/b/letter.pdf")), "letter");
    }
}
