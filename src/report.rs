//! CSV output.
//!
//! A report is a serde-serializable row type registered with [`define_report!`]. Each report type
//! gets its own CSV file in the directory configured by [`ReportOptions`]; rows are written and
//! flushed one at a time with [`ReportWriter::send_report`].
use std::any::TypeId;
use std::fs::{create_dir_all, File};
use std::path::PathBuf;

use csv::Writer;
use log::trace;

use crate::error::SeirvError;
use crate::hashing::HashMap;

pub trait Report: 'static {
    // Serializes the data with the correct writer
    fn serialize(&self, writer: &mut Writer<File>) -> Result<(), csv::Error>;
}

/// Use this macro to define a unique report type
#[macro_export]
macro_rules! define_report {
    ($name:ident) => {
        impl $crate::report::Report for $name {
            fn serialize(
                &self,
                writer: &mut $crate::csv::Writer<std::fs::File>,
            ) -> Result<(), $crate::csv::Error> {
                writer.serialize(self)
            }
        }
    };
}
pub use define_report;

/// Where report files go and what they are called.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub file_prefix: String,
    pub directory: PathBuf,
    pub overwrite: bool,
}

impl ReportOptions {
    /// Creates a new `ReportOptions` with default values: no prefix, the current working
    /// directory, and no overwriting of existing files.
    #[must_use]
    pub fn new() -> ReportOptions {
        ReportOptions {
            file_prefix: String::new(),
            directory: PathBuf::from("."),
            overwrite: false,
        }
    }

    /// Sets the file prefix option (e.g., "baseline_")
    pub fn file_prefix(&mut self, file_prefix: String) -> &mut ReportOptions {
        self.file_prefix = file_prefix;
        self
    }

    /// Sets the directory where reports will be output
    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.directory = directory;
        self
    }

    /// Sets whether to overwrite existing reports of the same name if they exist
    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds one CSV writer per report type.
pub struct ReportWriter {
    options: ReportOptions,
    file_writers: HashMap<TypeId, Writer<File>>,
}

impl ReportWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ReportOptions::new())
    }

    #[must_use]
    pub fn with_options(options: ReportOptions) -> Self {
        ReportWriter {
            options,
            file_writers: HashMap::default(),
        }
    }

    /// Returns the options so they can be changed before reports are added.
    pub fn report_options(&mut self) -> &mut ReportOptions {
        &mut self.options
    }

    /// The file a report with the given short name is written to.
    #[must_use]
    pub fn report_path(&self, short_name: &str) -> PathBuf {
        self.options
            .directory
            .join(format!("{}{short_name}.csv", self.options.file_prefix))
    }

    /// Registers report type `T`, creating `<directory>/<prefix><short_name>.csv` and any missing
    /// parent directories.
    ///
    /// # Errors
    ///
    /// Returns a [`SeirvError::ReportError`] if `T` was already added or the file exists and
    /// overwriting is off, and a [`SeirvError::IoError`] if the file cannot be created.
    pub fn add_report<T: Report>(&mut self, short_name: &str) -> Result<(), SeirvError> {
        if self.file_writers.contains_key(&TypeId::of::<T>()) {
            return Err(SeirvError::ReportError(format!(
                "A report for {short_name} has already been added"
            )));
        }
        let path = self.report_path(short_name);
        if path.exists() && !self.options.overwrite {
            return Err(SeirvError::ReportError(format!(
                "File already exists: {}. Please set `overwrite` to true in the file configuration and rerun.",
                path.display()
            )));
        }
        create_dir_all(&self.options.directory)?;
        trace!("Adding report {}", path.display());
        let file = File::create(&path)?;
        self.file_writers
            .insert(TypeId::of::<T>(), Writer::from_writer(file));
        Ok(())
    }

    /// Write a new row with columns following items in the report struct
    /// to the report file associated with the report type struct.
    ///
    /// # Errors
    ///
    /// Returns a [`SeirvError::ReportError`] if `T` was never added, and a CSV or I/O error if
    /// the row cannot be written.
    pub fn send_report<T: Report>(&mut self, report: T) -> Result<(), SeirvError> {
        let writer = self
            .file_writers
            .get_mut(&TypeId::of::<T>())
            .ok_or_else(|| {
                SeirvError::ReportError("No writer found for the report type".to_string())
            })?;
        report.serialize(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
