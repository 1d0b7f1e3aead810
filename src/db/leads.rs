// src/db/leads.rs
use rusqlite::{params, Connection, Row};

use crate::domain::lead::LeadRecord;
use crate::errors::ServerError;

const LEAD_COLUMNS: &str = "id, nom, email, telephone, type_travaux, surface, localisation, \
     timestamp, status, ouvert, clique, devis_estimatif, lead_chaud, assigned_to";

fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<LeadRecord> {
    Ok(LeadRecord {
        id: row.get(0)?,
        nom: row.get(1)?,
        email: row.get(2)?,
        telephone: row.get(3)?,
        type_travaux: row.get(4)?,
        surface: row.get(5)?,
        localisation: row.get(6)?,
        timestamp: row.get(7)?,
        status: row.get(8)?,
        ouvert: row.get(9)?,
        clique: row.get(10)?,
        devis_estimatif: row.get(11)?,
        lead_chaud: row.get(12)?,
        assigned_to: row.get(13)?,
    })
}

/// All leads, newest timestamp first.
pub fn list_leads(conn: &Connection) -> Result<Vec<LeadRecord>, ServerError> {
    let mut stmt = conn
        .prepare(&format!(
            "select {LEAD_COLUMNS} from leads order by timestamp desc"
        ))
        .map_err(|e| ServerError::DbError(format!("Prepare failed: {e}")))?;

    let rows = stmt
        .query_map([], lead_from_row)
        .map_err(|e| ServerError::DbError(format!("Query failed: {e}")))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(format!("Row read failed: {e}")))?);
    }
    Ok(out)
}

/// Insert or replace a lead by id.
pub fn upsert_lead(conn: &Connection, lead: &LeadRecord) -> Result<(), ServerError> {
    conn.execute(
        &format!(
            "insert or replace into leads ({LEAD_COLUMNS}) \
             values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ),
        params![
            lead.id,
            lead.nom,
            lead.email,
            lead.telephone,
            lead.type_travaux,
            lead.surface,
            lead.localisation,
            lead.timestamp,
            lead.status,
            lead.ouvert,
            lead.clique,
            lead.devis_estimatif,
            lead.lead_chaud,
            lead.assigned_to,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("upsert lead failed: {e}")))?;
    Ok(())
}

/// Returns the number of rows removed (0 or 1).
pub fn delete_lead(conn: &Connection, id: &str) -> Result<usize, ServerError> {
    conn.execute("delete from leads where id = ?", params![id])
        .map_err(|e| ServerError::DbError(format!("delete lead failed: {e}")))
}
