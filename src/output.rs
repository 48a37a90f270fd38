//! Persist the label under its content-derived name.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{LabelError, Result};
use crate::label::geometry;
use crate::model::label::{LabelDocument, OutputArtifact, PageBox, ParsedLabel, WriteStatus};

/// Store `document` in `dir` as `Briefmarke_{recipient}_{tracking}[_resized].pdf`.
///
/// Without `resize` the network bytes are written verbatim. With `resize`
/// a new one-page document is written whose media box is trimmed by
/// [`PageBox::TOP_TRIM`] and [`PageBox::BOTTOM_TRIM`].
///
/// An existing file with the same name means an earlier run already handled
/// this label: nothing is written and the artifact reports
/// [`WriteStatus::AlreadyDownloaded`]. The file is staged in `dir` and moved
/// into place without overwriting, so a failed run never leaves a partial PDF.
pub fn write_output(
    dir: &Path,
    document: &LabelDocument,
    parsed: &ParsedLabel,
    resize: bool,
) -> Result<OutputArtifact> {
    let path = dir.join(parsed.file_name(resize));
    if path.exists() {
        info!(path = %path.display(), "Label already downloaded");
        return Ok(OutputArtifact {
            path,
            status: WriteStatus::AlreadyDownloaded,
        });
    }

    let trimmed;
    let bytes = if resize {
        trimmed = geometry::trim_first_page(
            document.bytes(),
            PageBox::TOP_TRIM,
            PageBox::BOTTOM_TRIM,
        )?;
        &trimmed.bytes[..]
    } else {
        document.bytes()
    };

    std::fs::create_dir_all(dir).map_err(|e| LabelError::io(dir, e))?;
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| LabelError::io(dir, e))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|e| LabelError::io(staged.path(), e))?;

    match staged.persist_noclobber(&path) {
        Ok(_) => {
            info!(path = %path.display(), size = bytes.len(), "Label saved");
            Ok(OutputArtifact {
                path,
                status: WriteStatus::Written,
            })
        }
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            warn!(path = %path.display(), "Label appeared while writing, keeping existing file");
            Ok(OutputArtifact {
                path,
                status: WriteStatus::AlreadyDownloaded,
            })
        }
        Err(e) => Err(LabelError::io(&path, e.error)),
    }
}
