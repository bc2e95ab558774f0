//! Checks what the bulk import reports through the `log` facade.
//!
//! Lives in its own test binary because a logger can only be installed once per process.

use std::sync::Mutex;

use bytebooks_catalog::{run_import, ImportSettings, InMemoryBookRepository};
use log::{Level, LevelFilter, Log, Metadata, Record};
use tempfile::TempDir;

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

struct Collector;

impl Log for Collector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("bytebooks_catalog")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            RECORDS
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static COLLECTOR: Collector = Collector;

#[tokio::test]
async fn test_import_logs_progress_failures_and_total() {
    log::set_logger(&COLLECTOR).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("books.csv");
    let mut csv = String::from("title,authors\nBook 0,Author 0\nlonely\n");
    for i in 1..9 {
        csv.push_str(&format!("Book {i},Author {i}\n"));
    }
    std::fs::write(&path, csv).unwrap();

    let repo = InMemoryBookRepository::new();
    let settings = ImportSettings {
        file_path: path,
        progress_interval: 4,
        ..Default::default()
    };
    let outcome = run_import(&settings, &repo).await;
    assert_eq!(outcome.imported(), 9);

    let records = RECORDS.lock().unwrap().clone();
    let infos: Vec<&str> = records
        .iter()
        .filter(|(level, _)| *level == Level::Info)
        .map(|(_, msg)| msg.as_str())
        .collect();
    let progress: Vec<&str> = infos
        .iter()
        .copied()
        .filter(|msg| msg.starts_with("Imported "))
        .collect();
    assert_eq!(progress, vec!["Imported 4 books", "Imported 8 books"]);
    assert_eq!(
        infos.last().copied(),
        Some("Import completed. Total books imported: 9, rows skipped: 1")
    );

    let warnings: Vec<&str> = records
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, msg)| msg.as_str())
        .filter(|msg| msg.starts_with("Error processing row"))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("line 3"), "{}", warnings[0]);
    assert!(warnings[0].contains("lonely"), "{}", warnings[0]);
}
