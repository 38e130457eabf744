use std::{
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::{
    storage::config::TableConfig,
    types::{
        PAGE_SIZE, PageId, TABLE_MAX_PAGES,
        error::{DatabaseError, Result},
        page::PageBuf,
    },
};

/// Page cache over a single database file.
///
/// Pages are loaded lazily on first access and stay resident until `close`. Nothing is
/// written back unless the owner calls `flush` for that page.
pub struct Pager {
    path: PathBuf,
    file: Option<File>,
    file_length: u64,
    num_pages: u32,
    max_pages: u32,
    sync_on_close: bool,
    pages: Vec<Option<Box<PageBuf>>>,
}

fn closed_error() -> DatabaseError {
    DatabaseError::Io(io::Error::new(ErrorKind::NotConnected, "pager already closed"))
}

impl Pager {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_config(path, &TableConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(path: P, config: &TableConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let file_length = file.metadata()?.len();
        let max_pages = config.max_pages.clamp(1, TABLE_MAX_PAGES);
        let num_pages = file_length.div_ceil(PAGE_SIZE as u64) as u32;

        debug!(
            path = %path.display(),
            file_length,
            num_pages,
            max_pages,
            "opened pager"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            file_length,
            num_pages,
            max_pages,
            sync_on_close: config.sync_on_close,
            pages: (0..max_pages).map(|_| None).collect(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Length of the backing file, as of open or the last flush that grew it.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    /// Pages covered by the file plus any materialized past its end.
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_materialized(&self, page_num: PageId) -> bool {
        self.pages
            .get(page_num as usize)
            .is_some_and(|page| page.is_some())
    }

    pub fn materialized_pages(&self) -> impl Iterator<Item = PageId> + '_ {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_some())
            .map(|(page_num, _)| page_num as PageId)
    }

    /// Returns the cached buffer for `page_num`, reading it from disk on a miss. Fails with
    /// an I/O error once the pager is closed, including for pages past the end of the file.
    ///
    /// # Panics
    ///
    /// Panics if `page_num` is not below the configured page limit.
    pub fn get_page(&mut self, page_num: PageId) -> Result<&mut PageBuf> {
        assert!(
            page_num < self.max_pages,
            "Tried to fetch page number out of bounds. {} >= {}",
            page_num,
            self.max_pages
        );
        if self.file.is_none() {
            return Err(closed_error());
        }

        let index = page_num as usize;
        let page = match self.pages[index].take() {
            Some(page) => page,
            None => self.load_page(page_num)?,
        };
        if page_num >= self.num_pages {
            self.num_pages = page_num + 1;
        }

        let page: &mut PageBuf = self.pages[index].insert(page);
        Ok(page)
    }

    fn load_page(&mut self, page_num: PageId) -> Result<Box<PageBuf>> {
        let mut page = Box::new([0u8; PAGE_SIZE]);
        let pages_in_file = self.file_length.div_ceil(PAGE_SIZE as u64);

        if u64::from(page_num) < pages_in_file {
            let file = self.file.as_mut().ok_or_else(closed_error)?;
            file.seek(SeekFrom::Start(page_offset(page_num)))?;

            // The final page may be partial; whatever is missing stays zeroed.
            let mut filled = 0;
            while filled < PAGE_SIZE {
                match file.read(&mut page[filled..]) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            trace!(page = page_num, bytes = filled, "page cache miss, read from disk");
        } else {
            trace!(page = page_num, "page cache miss, new page");
        }

        Ok(page)
    }

    /// Writes the first `byte_count` bytes of a cached page to its slot in the file.
    ///
    /// # Panics
    ///
    /// Panics if the page was never materialized or `byte_count` exceeds the page size.
    pub fn flush(&mut self, page_num: PageId, byte_count: usize) -> Result<()> {
        assert!(
            byte_count <= PAGE_SIZE,
            "flush of {} bytes exceeds page size",
            byte_count
        );
        let Some(page) = self.pages.get(page_num as usize).and_then(|p| p.as_deref()) else {
            panic!("Tried to flush page {} which was never loaded", page_num);
        };
        let file = self.file.as_mut().ok_or_else(closed_error)?;

        let offset = page_offset(page_num);
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&page[..byte_count])?;
        self.file_length = self.file_length.max(offset + byte_count as u64);

        trace!(page = page_num, bytes = byte_count, "flushed page");
        Ok(())
    }

    /// Releases the file handle and drops every cached page. Flush first.
    pub fn close(&mut self) -> Result<()> {
        let file = self.file.take().ok_or_else(closed_error)?;
        self.pages.iter_mut().for_each(|page| *page = None);
        if self.sync_on_close {
            file.sync_all()?;
        }
        debug!(path = %self.path.display(), "closed pager");
        Ok(())
    }
}

fn page_offset(page_num: PageId) -> u64 {
    u64::from(page_num) * PAGE_SIZE as u64
}
