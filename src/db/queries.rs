use crate::db::Database;
use crate::error::Result;
use crate::logic::history::HistoryStore;
use crate::models::{HistoryLocation, HistoryRecord, PredictionInput, PredictionResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use tracing::warn;

// Prediction History Queries

impl Database {
    /// Records newest first, at most `limit` of them.
    pub fn get_history(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM prediction_history ORDER BY timestamp DESC LIMIT ?1",
            )?;
            let records = stmt
                .query_map([limit], row_to_history_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(records)
        })
    }

    pub fn count_history(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM prediction_history", [], |row| {
                    row.get(0)
                })?;
            Ok(count as usize)
        })
    }

    /// Replace the whole history in one transaction.
    pub fn replace_history(&self, records: &[HistoryRecord]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM prediction_history", [])?;
            for record in records {
                insert_record(&tx, record)?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}

impl HistoryStore for Database {
    fn load_history(&self) -> Result<Vec<HistoryRecord>> {
        self.get_history(usize::MAX)
    }

    fn save_history(&self, records: &[HistoryRecord]) -> Result<()> {
        self.replace_history(records)
    }
}

fn insert_record(conn: &Connection, record: &HistoryRecord) -> Result<()> {
    let input = &record.input;
    conn.execute(
        r#"
        INSERT INTO prediction_history
            (id, timestamp, year, rainfall, pesticides, avg_temp, country, item,
             yield_value, confidence, location_name, location_country)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            record.id,
            record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            input.year,
            input.rainfall,
            input.pesticides,
            input.avg_temp,
            input.country,
            input.item,
            record.prediction.yield_value,
            record.prediction.confidence,
            record.location.as_ref().map(|l| l.name.as_str()),
            record.location.as_ref().map(|l| l.country.as_str()),
        ],
    )?;
    Ok(())
}

fn row_to_history_record(row: &Row) -> rusqlite::Result<HistoryRecord> {
    let id: String = row.get("id")?;
    let timestamp_str: String = row.get("timestamp")?;
    let location_name: Option<String> = row.get("location_name")?;
    let location_country: Option<String> = row.get("location_country")?;

    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(id = %id, timestamp = %timestamp_str, "Unparseable history timestamp");
            DateTime::<Utc>::UNIX_EPOCH
        });

    let input = PredictionInput::new(
        row.get("year")?,
        row.get("rainfall")?,
        row.get("pesticides")?,
        row.get("avg_temp")?,
        row.get::<_, String>("country")?,
        row.get::<_, String>("item")?,
    );
    let confidence: u8 = row.get("confidence")?;
    // factor labels are derived, never stored
    let prediction = PredictionResult::new(&input, row.get("yield_value")?, Some(confidence));

    let location = location_name.map(|name| HistoryLocation {
        name,
        country: location_country.unwrap_or_default(),
    });

    Ok(HistoryRecord {
        id,
        timestamp,
        input,
        prediction,
        location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::history::HistoryLog;
    use crate::models::FactorLevel;

    fn record(year: i32, location: Option<HistoryLocation>) -> HistoryRecord {
        let input = PredictionInput::new(year, 1250.0, 2.5, 26.5, "Brazil", "Soybeans");
        let prediction = PredictionResult::new(&input, 2875.5, Some(77));
        HistoryRecord::new(input, prediction, location)
    }

    #[test]
    fn saved_record_reads_back_with_derived_factors() {
        let db = Database::open_in_memory().unwrap();
        let original = record(
            2022,
            Some(HistoryLocation {
                name: "Campinas".into(),
                country: "BR".into(),
            }),
        );
        db.replace_history(std::slice::from_ref(&original)).unwrap();

        let loaded = db.get_history(10).unwrap().remove(0);
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.input, original.input);
        assert_eq!(loaded.prediction, original.prediction);
        assert_eq!(loaded.location, original.location);
        assert_eq!(loaded.timestamp, original.timestamp);
        assert_eq!(loaded.prediction.factors.rainfall, FactorLevel::High);
    }

    #[test]
    fn history_is_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let mut older = record(2020, None);
        older.timestamp = older.timestamp - chrono::Duration::hours(1);
        let newer = record(2021, None);
        db.replace_history(&[older.clone(), newer.clone()]).unwrap();

        let history = db.get_history(10).unwrap();
        assert_eq!(history[0].id, newer.id);
        assert_eq!(history[1].id, older.id);
        assert_eq!(db.get_history(1).unwrap().len(), 1);
    }

    #[test]
    fn replace_and_clear() {
        let db = Database::open_in_memory().unwrap();
        db.replace_history(&[record(2019, None)]).unwrap();
        db.replace_history(&[record(2020, None), record(2021, None)])
            .unwrap();
        assert_eq!(db.count_history().unwrap(), 2);

        db.replace_history(&[]).unwrap();
        assert_eq!(db.count_history().unwrap(), 0);
    }

    #[test]
    fn database_backs_history_log() {
        let db = Database::open_in_memory().unwrap();
        let mut log = HistoryLog::open(db.clone(), 2).unwrap();
        for year in 2020..2023 {
            let r = record(year, None);
            log.record(r.input, r.prediction, None).unwrap();
        }

        assert_eq!(db.count_history().unwrap(), 2);
        let reopened = HistoryLog::open(db, 2).unwrap();
        assert_eq!(reopened.records()[0].input.year, 2022);
    }
}
