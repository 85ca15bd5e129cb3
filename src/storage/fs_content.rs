use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use crate::storage::{api::ContentStore, error::StorageError};

/// Blobs as plain files named by their identifier, all in one directory.
#[derive(Debug)]
pub struct FileContentStore {
    root: PathBuf,
    buffer_size: usize,
}

impl FileContentStore {
    /// Opens (creating if needed) the root directory.
    pub fn new(root: impl AsRef<Path>, buffer_size: usize) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        if fs::metadata(&root)?.permissions().readonly() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                format!("blob root `{}` is not writable", root.display()),
            )));
        }
        Ok(FileContentStore { root, buffer_size: buffer_size.max(1) })
    }

    /// Identifiers must be a single plain path component; anything else cannot name a blob.
    fn blob_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        let valid = !id.is_empty()
            && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid { Ok(self.root.join(id)) } else { Err(StorageError::NotFound(id.to_string())) }
    }
}

fn not_found_or_io(id: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::NotFound(id.to_string())
    } else {
        StorageError::Io(e)
    }
}

impl ContentStore for FileContentStore {
    type Reader = File;

    fn write<R: Read + ?Sized>(&self, id: &str, src: &mut R) -> Result<u64, StorageError> {
        let path = self.blob_path(id)?;
        // create_new: a key is written exactly once
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;

        let mut buf = vec![0u8; self.buffer_size];
        let mut written: u64 = 0;
        loop {
            let n = match src.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(&buf[..n])?;
            written += n as u64;
        }
        file.flush()?;

        Ok(written)
    }

    fn read(&self, id: &str) -> Result<File, StorageError> {
        let path = self.blob_path(id)?;
        File::open(&path).map_err(|e| not_found_or_io(id, e))
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let path = self.blob_path(id)?;
        fs::remove_file(&path).map_err(|e| not_found_or_io(id, e))
    }

    fn ids(&self) -> Result<Vec<String>, StorageError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.blob_path(name).is_ok() {
                    ids.push(name.to_string());
                }
            }
        }
        Ok(ids)
    }
}
