use chrono::{DateTime, Local};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::{Path, PathBuf};
use time_humanize::HumanTime;

/// How many past runs the results-screen comparison looks at.
const AVERAGE_WINDOW: usize = 10;

/// One completed reading run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub finished_at: DateTime<Local>,
    pub total_words: usize,
    pub elapsed_secs: f64,
    pub wpm: f64,
}

/// Append-only database of past runs. Opening can fail (read-only home,
/// missing dirs); callers hold an `Option<HistoryDb>` and treat absence as
/// "history disabled".
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the database at its default location, creating it if needed.
    pub fn new() -> Result<Self> {
        let db_path = Self::default_path().unwrap_or_else(|| PathBuf::from("readrate_history.db"));
        Self::open_at(db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                finished_at TEXT NOT NULL,
                total_words INTEGER NOT NULL,
                elapsed_secs REAL NOT NULL,
                wpm REAL NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_runs_finished_at ON runs(finished_at)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    /// The database file path under $HOME/.local/state/readrate
    fn default_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("readrate");
            Some(state_dir.join("history.db"))
        } else {
            ProjectDirs::from("", "", "readrate")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("history.db"))
        }
    }

    pub fn record_run(&self, run: &RunRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO runs (finished_at, total_words, elapsed_secs, wpm)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                run.finished_at.to_rfc3339(),
                run.total_words as i64,
                run.elapsed_secs,
                run.wpm,
            ],
        )?;

        Ok(())
    }

    /// The most recent runs, newest first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT finished_at, total_words, elapsed_secs, wpm
            FROM runs
            ORDER BY finished_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], Self::row_to_record)?;

        let mut runs = Vec::new();
        for run in rows {
            runs.push(run?);
        }
        Ok(runs)
    }

    /// Every run, oldest first; used for export.
    pub fn all_runs(&self) -> Result<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT finished_at, total_words, elapsed_secs, wpm
            FROM runs
            ORDER BY finished_at ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map([], Self::row_to_record)?;

        let mut runs = Vec::new();
        for run in rows {
            runs.push(run?);
        }
        Ok(runs)
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
        let finished_at_str: String = row.get(0)?;
        let finished_at = DateTime::parse_from_rfc3339(&finished_at_str)
            .map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    0,
                    "finished_at".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?
            .with_timezone(&Local);

        Ok(RunRecord {
            finished_at,
            total_words: row.get::<_, i64>(1)? as usize,
            elapsed_secs: row.get(2)?,
            wpm: row.get(3)?,
        })
    }

    pub fn run_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))
    }

    /// Average wpm over the `last_n` most recent runs, `None` when empty.
    pub fn average_wpm(&self, last_n: usize) -> Result<Option<f64>> {
        self.conn.query_row(
            r#"
            SELECT AVG(wpm)
            FROM (SELECT wpm FROM runs ORDER BY finished_at DESC, id DESC LIMIT ?1)
            "#,
            [last_n as i64],
            |row| row.get(0),
        )
    }

    pub fn last_finished_at(&self) -> Result<Option<DateTime<Local>>> {
        let latest: Option<String> = self
            .conn
            .query_row(
                "SELECT finished_at FROM runs ORDER BY finished_at DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(latest.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Local))
                .ok()
        }))
    }

    /// One-line comparison of a freshly finished run against recorded
    /// history; call before recording the run itself.
    pub fn delta_summary(&self, wpm: f64) -> Result<String> {
        let count = self.run_count()?;
        if count == 0 {
            return Ok(String::from("first recorded run"));
        }

        let window = (count as usize).min(AVERAGE_WINDOW);
        let average = self.average_wpm(window)?.unwrap_or(wpm);
        let delta = wpm - average;
        let sign = if delta >= 0.0 { "+" } else { "" };
        let mut line = format!("{sign}{delta:.1} wpm vs your last {window} runs");

        if let Some(last) = self.last_finished_at()? {
            let since_secs = (Local::now() - last).num_seconds().max(0);
            line.push_str(&format!(
                " | last read {}",
                HumanTime::from(-since_secs)
            ));
        }

        Ok(line)
    }

    /// Write the full history as CSV, oldest run first.
    pub fn export_csv<W: std::io::Write>(&self, out: W) -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["finished_at", "total_words", "elapsed_secs", "wpm"])?;
        for run in self.all_runs()? {
            writer.write_record([
                run.finished_at.to_rfc3339(),
                run.total_words.to_string(),
                format!("{:.1}", run.elapsed_secs),
                format!("{:.1}", run.wpm),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
