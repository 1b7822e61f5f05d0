use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, position_from_columns},
    models::FishCatch,
};

fn row_to_catch(row: &Row) -> Result<FishCatch> {
    let caught_at: String = row.get("caught_at")?;
    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    let accuracy: Option<f64> = row.get("accuracy")?;

    Ok(FishCatch {
        id: row.get("id")?,
        species: row.get("species")?,
        weight_kg: row.get("weight_kg")?,
        length_cm: row.get("length_cm")?,
        note: row.get("note")?,
        position: position_from_columns(latitude, longitude, accuracy)?,
        caught_at: parse_datetime(&caught_at, "caught_at")?,
    })
}

impl Database {
    pub async fn insert_fish_catch(&self, catch: &FishCatch) -> Result<()> {
        let record = catch.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO fish_catches (id, species, weight_kg, length_cm, note,
                     latitude, longitude, accuracy, caught_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id,
                    record.species,
                    record.weight_kg,
                    record.length_cm,
                    record.note,
                    record.position.map(|p| p.latitude),
                    record.position.map(|p| p.longitude),
                    record.position.map(|p| p.accuracy_m),
                    record.caught_at.to_rfc3339(),
                ],
            )
            .context("failed to insert fish catch")?;
            Ok(())
        })
        .await
    }

    pub async fn list_fish_catches(&self) -> Result<Vec<FishCatch>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, species, weight_kg, length_cm, note,
                        latitude, longitude, accuracy, caught_at
                 FROM fish_catches ORDER BY caught_at DESC",
            )?;
            let mut rows = stmt.query([])?;
            let mut catches = Vec::new();
            while let Some(row) = rows.next()? {
                catches.push(row_to_catch(row)?);
            }
            Ok(catches)
        })
        .await
    }

    pub async fn delete_fish_catch(&self, id: String) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM fish_catches WHERE id = ?1", params![id])
                .context("failed to delete fish catch")?;
            Ok(())
        })
        .await
    }
}
