//! Rom loading, from raw bytes, readers, files or zip archives of roms.
use std::{
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use zip::read::ZipArchive;

use crate::{definitions::rom, RomError};

/// Represents an archive of roms
/// it contains all kind of information about the information of the archives
pub struct RomArchives<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> RomArchives<R> {
    /// Will open the zip archive found in the reader.
    pub fn new(reader: R) -> Result<Self, RomError> {
        Ok(RomArchives {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Will return all the rom names available to be chosen
    pub fn file_names(&self) -> Vec<&'_ str> {
        let mut names: Vec<_> = self.archive.file_names().collect();
        names.sort_unstable();
        names
    }

    /// Will decompress the rom with the given name from the archive
    pub fn get_file_data(&mut self, name: &str) -> Result<Rom, RomError> {
        let file = self.archive.by_name(name)?;
        Rom::from_reader(name, file)
    }
}

impl RomArchives<File> {
    /// Will open a zip archive from the file system.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        Self::new(File::open(path)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The program bytes, guaranteed to fit into memory after `0x200`
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data, rejecting
    /// data that will not fit into the chip memory.
    ///
    /// ```rust
    /// # use chip::resources::Rom;
    /// let rom = Rom::new("JUMP", vec![0x12u8, 0x00]).expect("two bytes always fit");
    /// assert_eq!(rom.get_data(), &[0x12, 0x00]);
    /// assert!(Rom::new("HUGE", vec![0u8; 0x1000]).is_err());
    /// ```
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Result<Self, RomError> {
        let data = data.into();
        if data.len() > rom::MAX_SIZE {
            return Err(RomError::TooLarge {
                name: name.to_string(),
                size: data.len(),
                max: rom::MAX_SIZE,
            });
        }

        log::debug!("loaded rom '{}' with {} bytes", name, data.len());

        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will read the full content of the reader as rom data.
    pub fn from_reader<T: Read>(name: &str, reader: T) -> Result<Self, RomError> {
        let mut data = Vec::with_capacity(rom::MAX_SIZE);
        // read one byte more than allowed, so that oversized roms are detected
        reader.take(rom::MAX_SIZE as u64 + 1).read_to_end(&mut data)?;
        Self::new(name, data)
    }

    /// Will read the rom from the given path, the file name is used as rom name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_reader(&name, File::open(path)?)
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
