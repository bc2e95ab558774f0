//! One-shot bulk import of book metadata from a CSV file.
//!
//! Columns are matched by header name, so the file may carry any number of extra columns in
//! any order. Every data row is persisted on its own: a row that cannot be decoded or stored is
//! logged and skipped, and the import carries on with the next one. Nothing in here returns an
//! error to the caller; a missing or empty source file just means an empty catalog.

use crate::domain::NewBook;
use crate::infra::config;
use crate::storage::{BookRepository, RepositoryError};
use csv::{ByteRecord, StringRecord};
use std::io;
use std::path::PathBuf;

pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub skip: bool,
    pub file_path: PathBuf,
    /// Hard ceiling on successfully imported rows per run.
    pub max_rows: usize,
    /// Log progress every this many imported rows; 0 disables progress lines.
    pub progress_interval: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            skip: false,
            file_path: PathBuf::from(config::DEFAULT_CSV_IMPORT_FILE_PATH),
            max_rows: config::DEFAULT_IMPORT_MAX_ROWS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ImportSettings {
    /// Reads `APP_SKIP_DATA_IMPORT`, `APP_CSV_IMPORT_FILE_PATH` and `APP_CSV_IMPORT_MAX_ROWS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            skip: config::skip_data_import()?,
            file_path: config::csv_import_file_path(),
            max_rows: config::csv_import_max_rows()?,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    /// True if rows were left unread because `max_rows` was reached.
    pub capped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Skipped,
    SourceUnavailable { reason: String },
    Completed(ImportSummary),
}

impl ImportOutcome {
    pub fn imported(&self) -> usize {
        match self {
            ImportOutcome::Completed(summary) => summary.imported,
            _ => 0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RowError {
    #[error("row has {found} fields, mapped columns need {needed}")]
    TooFewFields { needed: usize, found: usize },

    #[error("field {field} is not valid UTF-8")]
    InvalidUtf8 { field: usize },

    #[error("failed to store book: {0}")]
    Persist(#[from] RepositoryError),
}

/// The record fields a source column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Authors,
    Isbn,
    PublicationYear,
    AverageRating,
    RatingsCount,
    ImageUrl,
    LanguageCode,
}

impl BookField {
    pub const ALL: [BookField; 8] = [
        BookField::Title,
        BookField::Authors,
        BookField::Isbn,
        BookField::PublicationYear,
        BookField::AverageRating,
        BookField::RatingsCount,
        BookField::ImageUrl,
        BookField::LanguageCode,
    ];

    pub fn header_name(self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Authors => "authors",
            BookField::Isbn => "isbn",
            BookField::PublicationYear => "original_publication_year",
            BookField::AverageRating => "average_rating",
            BookField::RatingsCount => "ratings_count",
            BookField::ImageUrl => "image_url",
            BookField::LanguageCode => "language_code",
        }
    }

    /// Writes `cell` into the matching field. Unparsable numbers leave the field unset.
    fn assign(self, book: &mut NewBook, cell: &str) {
        match self {
            BookField::Title => book.title = text(cell),
            BookField::Authors => book.author = text(cell),
            BookField::Isbn => book.isbn = text(cell),
            BookField::PublicationYear => book.publication_year = parse_int(cell),
            BookField::AverageRating => book.average_rating = parse_float(cell),
            BookField::RatingsCount => book.ratings_count = parse_int(cell),
            BookField::ImageUrl => book.image_url = text(cell),
            BookField::LanguageCode => book.language = text(cell),
        }
    }
}

/// Column positions resolved once from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    assignments: Vec<(usize, BookField)>,
    missing: Vec<BookField>,
    /// One past the rightmost mapped column; shorter rows cannot be built.
    needed: usize,
}

impl ColumnMap {
    pub fn resolve(header: &StringRecord) -> Self {
        let mut assignments = Vec::new();
        let mut missing = Vec::new();
        for field in BookField::ALL {
            match find_column(header, field.header_name()) {
                Some(idx) => assignments.push((idx, field)),
                None => missing.push(field),
            }
        }
        let needed = assignments.iter().map(|(idx, _)| idx + 1).max().unwrap_or(0);
        Self {
            assignments,
            missing,
            needed,
        }
    }

    pub fn index_of(&self, field: BookField) -> Option<usize> {
        self.assignments
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(idx, _)| *idx)
    }

    pub fn missing(&self) -> &[BookField] {
        &self.missing
    }

    /// Builds a record from one raw data row.
    ///
    /// Extra or missing trailing cells are fine as long as every mapped column is present.
    pub fn build(&self, raw: &ByteRecord) -> Result<NewBook, RowError> {
        if raw.len() < self.needed {
            return Err(RowError::TooFewFields {
                needed: self.needed,
                found: raw.len(),
            });
        }
        let record = StringRecord::from_byte_record(raw.clone()).map_err(|e| RowError::InvalidUtf8 {
            field: e.utf8_error().field(),
        })?;

        let mut book = NewBook::default();
        for &(idx, field) in &self.assignments {
            field.assign(&mut book, &record[idx]);
        }
        Ok(book)
    }
}

fn find_column(header: &StringRecord, name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
}

fn text(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty()).then(|| cell.to_string())
}

/// Accepts plain integers as well as integral floats such as `"1997.0"`.
fn parse_int(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<i32>() {
        return Some(n);
    }
    let f = cell.parse::<f64>().ok()?;
    let in_range = f >= i32::MIN as f64 && f <= i32::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i32)
}

fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

fn describe_row(raw: &ByteRecord) -> String {
    raw.iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs the import described by `settings` against `repo`.
pub async fn run_import(settings: &ImportSettings, repo: &dyn BookRepository) -> ImportOutcome {
    if settings.skip {
        log::info!("Data import skipped based on configuration");
        return ImportOutcome::Skipped;
    }

    let path = &settings.file_path;
    log::info!("Starting book data import from CSV at path: {}", path.display());

    let reader = match csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("Error reading CSV file {}: {}", path.display(), e);
            return ImportOutcome::SourceUnavailable {
                reason: e.to_string(),
            };
        }
    };

    import_from_reader(reader, settings, repo).await
}

/// Same as [`run_import`] minus the skip flag and file handling.
pub async fn import_from_reader<R: io::Read>(
    mut reader: csv::Reader<R>,
    settings: &ImportSettings,
    repo: &dyn BookRepository,
) -> ImportOutcome {
    let header = match reader.headers() {
        Ok(h) if !h.is_empty() => h.clone(),
        Ok(_) => {
            log::error!("CSV file is empty or could not be read");
            return ImportOutcome::SourceUnavailable {
                reason: "empty file".to_string(),
            };
        }
        Err(e) => {
            log::error!("CSV header could not be read: {}", e);
            return ImportOutcome::SourceUnavailable {
                reason: e.to_string(),
            };
        }
    };

    log::info!("CSV header: {}", header.iter().collect::<Vec<_>>().join(", "));
    let columns = ColumnMap::resolve(&header);
    for field in columns.missing() {
        log::warn!(
            "CSV column '{}' not found, field will be left empty",
            field.header_name()
        );
    }

    let mut summary = ImportSummary::default();
    let mut raw = ByteRecord::new();

    loop {
        match reader.read_byte_record(&mut raw) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                log::error!("Error reading CSV file, stopping import: {}", e);
                break;
            }
        }

        if summary.imported >= settings.max_rows {
            summary.capped = true;
            log::info!("Import row limit of {} reached", settings.max_rows);
            break;
        }

        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        let stored = match columns.build(&raw) {
            Ok(book) => repo.insert(&book).await.map_err(RowError::from),
            Err(e) => Err(e),
        };

        match stored {
            Ok(_) => {
                summary.imported += 1;
                if settings.progress_interval > 0
                    && summary.imported % settings.progress_interval == 0
                {
                    log::info!("Imported {} books", summary.imported);
                }
            }
            Err(e) => {
                summary.failed += 1;
                log::warn!(
                    "Error processing row at line {}: {} ({})",
                    line,
                    describe_row(&raw),
                    e
                );
            }
        }
    }

    log::info!(
        "Import completed. Total books imported: {}, rows skipped: {}",
        summary.imported,
        summary.failed
    );
    ImportOutcome::Completed(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> StringRecord {
        StringRecord::from(cells.to_vec())
    }

    #[test]
    fn resolves_columns_case_insensitively() {
        let map = ColumnMap::resolve(&header(&["book_id", "ISBN", " Title ", "Authors"]));
        assert_eq!(map.index_of(BookField::Isbn), Some(1));
        assert_eq!(map.index_of(BookField::Title), Some(2));
        assert_eq!(map.index_of(BookField::Authors), Some(3));
        assert_eq!(map.index_of(BookField::ImageUrl), None);
        assert!(map.missing().contains(&BookField::LanguageCode));
    }

    #[test]
    fn header_byte_order_mark_is_ignored() {
        let map = ColumnMap::resolve(&header(&["\u{feff}title", "authors"]));
        assert_eq!(map.index_of(BookField::Title), Some(0));
    }

    #[test]
    fn numeric_cells_parse_tolerantly() {
        assert_eq!(parse_int("1997"), Some(1997));
        assert_eq!(parse_int(" 1997.0 "), Some(1997));
        assert_eq!(parse_int("-300.0"), Some(-300));
        assert_eq!(parse_int("1997.5"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("n/a"), None);
        assert_eq!(parse_int("1e12"), None);
        assert_eq!(parse_float("4.27"), Some(4.27));
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("inf"), None);
    }

    #[test]
    fn builds_book_from_present_columns() {
        let map = ColumnMap::resolve(&header(&[
            "title",
            "authors",
            "original_publication_year",
            "average_rating",
            "ratings_count",
        ]));
        let raw = ByteRecord::from(vec!["Dune", "Frank Herbert", "1965.0", "4.25", "oops"]);
        let book = map.build(&raw).unwrap();
        assert_eq!(book.title.as_deref(), Some("Dune"));
        assert_eq!(book.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(book.publication_year, Some(1965));
        assert_eq!(book.average_rating, Some(4.25));
        assert_eq!(book.ratings_count, None);
        assert_eq!(book.isbn, None);
    }

    #[test]
    fn rejects_rows_missing_a_mapped_column() {
        let map = ColumnMap::resolve(&header(&["title", "authors"]));
        let raw = ByteRecord::from(vec!["only one"]);
        assert!(matches!(
            map.build(&raw),
            Err(RowError::TooFewFields { needed: 2, found: 1 })
        ));
    }

    #[test]
    fn accepts_rows_whose_mapped_columns_are_present() {
        let map = ColumnMap::resolve(&header(&["title", "authors", "notes"]));

        let short = ByteRecord::from(vec!["Dune", "Frank Herbert"]);
        let book = map.build(&short).unwrap();
        assert_eq!(book.author.as_deref(), Some("Frank Herbert"));

        let long = ByteRecord::from(vec!["Emma", "Jane Austen", "n/a", "extra"]);
        let book = map.build(&long).unwrap();
        assert_eq!(book.title.as_deref(), Some("Emma"));
    }

    #[test]
    fn header_without_known_columns_builds_empty_books() {
        let map = ColumnMap::resolve(&header(&["pages", "shelf"]));
        let book = map.build(&ByteRecord::from(vec!["412"])).unwrap();
        assert_eq!(book, NewBook::default());
    }

    #[test]
    fn rejects_invalid_utf8() {
        let map = ColumnMap::resolve(&header(&["title", "authors"]));
        let raw = ByteRecord::from(vec![&b"ok"[..], &b"\xff\xfe"[..]]);
        assert!(matches!(map.build(&raw), Err(RowError::InvalidUtf8 { field: 1 })));
    }
}
