use boundpix_common::Result;
use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

const TEN_MB_IN_BYTES: u64 = 10 * 1024 * 1024;

/// Compressed bytes of an image file, memory-mapped when large
pub enum SourceBytes {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl SourceBytes {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();

        if len > TEN_MB_IN_BYTES {
            tracing::debug!("Memory-mapping {:?} ({} bytes)", path, len);
            /*
             * The kernel maps the file into our address space without reading it.
             * Pages load on first touch, so the header read only pulls in the
             * first few pages of a large photo.
             */
            let mmap = unsafe { Mmap::map(&file)? };
            Ok(Self::Mapped(mmap))
        } else {
            Ok(Self::Buffered(std::fs::read(path)?))
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl Deref for SourceBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => &mmap[..],
            Self::Buffered(bytes) => bytes.as_slice(),
        }
    }
}
