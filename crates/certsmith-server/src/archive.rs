//! Packs a produced bundle into a tar or zip archive

use std::io::{Cursor, Write};

use certsmith_core::ProducedBundle;
use zip::{write::SimpleFileOptions, ZipWriter};

use crate::error::{AppError, Result};

const ENTRY_MODE: u32 = 0o600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Pick the archive format from an `Accept` header value.
    ///
    /// Wildcards and `application/x-tar` win over `application/zip`; an absent
    /// header accepts anything.
    pub fn negotiate(accept: Option<&str>) -> Option<Self> {
        let accept = match accept {
            Some(value) => value.to_ascii_lowercase(),
            None => return Some(ArchiveFormat::Tar),
        };
        if accept.contains("*/*") || accept.contains("application/x-tar") || accept.contains("application/*") {
            Some(ArchiveFormat::Tar)
        } else if accept.contains("application/zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ArchiveFormat::Tar => "application/x-tar",
            ArchiveFormat::Zip => "application/zip",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::Zip => "zip",
        }
    }
}

pub fn pack(bundle: &ProducedBundle, format: ArchiveFormat) -> Result<Vec<u8>> {
    match format {
        ArchiveFormat::Tar => pack_tar(bundle),
        ArchiveFormat::Zip => pack_zip(bundle),
    }
}

fn pack_tar(bundle: &ProducedBundle) -> Result<Vec<u8>> {
    let mtime = chrono::Utc::now().timestamp().max(0) as u64;
    let mut tar_builder = tar::Builder::new(Vec::new());
    for (name, body) in bundle.entries() {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(mtime);
        tar_builder.append_data(&mut header, name, body)?;
    }
    Ok(tar_builder.into_inner()?)
}

fn pack_zip(bundle: &ProducedBundle) -> Result<Vec<u8>> {
    let zip_err = |e: zip::result::ZipError| AppError::Internal(format!("failed to build zip: {}", e));
    let options = SimpleFileOptions::default().unix_permissions(ENTRY_MODE);

    let mut zipper = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in bundle.entries() {
        zipper.start_file(name, options).map_err(zip_err)?;
        zipper.write_all(body)?;
    }
    Ok(zipper.finish().map_err(zip_err)?.into_inner())
}
