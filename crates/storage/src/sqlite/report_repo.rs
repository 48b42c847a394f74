use quiz_core::model::{Report, ReportId, ReportMetadata};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    labels_to_string, map_item_row, parse_difficulty, report_id_from_i64, report_id_to_i64, ser,
    session_id_from_str, u32_from_i64, usize_to_i64,
};
use crate::repository::{ReportListItem, ReportRepository, StorageError, StoredReport};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn map_insert_error(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => conn(e),
    }
}

fn map_list_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReportListItem, StorageError> {
    Ok(ReportListItem {
        id: report_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        session_id: session_id_from_str(&row.try_get::<String, _>("session_id").map_err(ser)?)?,
        learner_name: row.try_get("learner_name").map_err(ser)?,
        topic: row.try_get("topic").map_err(ser)?,
        difficulty: parse_difficulty(&row.try_get::<String, _>("difficulty").map_err(ser)?)?,
        score: u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        total: u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

#[async_trait::async_trait]
impl ReportRepository for SqliteRepository {
    async fn append_report(
        &self,
        metadata: &ReportMetadata,
        report: &Report,
    ) -> Result<ReportId, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO reports (
                    session_id, learner_name, learner_email, topic, difficulty,
                    started_at, completed_at, score, total
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(report.session_id().to_string())
        .bind(metadata.learner_name())
        .bind(metadata.learner_email())
        .bind(metadata.topic())
        .bind(metadata.difficulty().as_str())
        .bind(report.started_at())
        .bind(report.completed_at())
        .bind(i64::from(report.score()))
        .bind(i64::from(report.total()))
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        let report_id = res.last_insert_rowid();

        for (position, item) in report.items().iter().enumerate() {
            let [o1, o2, o3, o4] = &item.options;
            sqlx::query(
                r"
                    INSERT INTO report_items (
                        report_id, position, question_index, question, option_labels,
                        option_1, option_2, option_3, option_4,
                        chosen, chosen_text, correct, correct_text, explanation, is_correct
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                ",
            )
            .bind(report_id)
            .bind(usize_to_i64("position", position)?)
            .bind(usize_to_i64("question_index", item.question_index)?)
            .bind(&item.question)
            .bind(labels_to_string(&item.options))
            .bind(o1.text())
            .bind(o2.text())
            .bind(o3.text())
            .bind(o4.text())
            .bind(item.chosen.to_string())
            .bind(&item.chosen_text)
            .bind(item.correct.to_string())
            .bind(&item.correct_text)
            .bind(&item.explanation)
            .bind(item.is_correct)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;

        report_id_from_i64(report_id)
    }

    async fn get_report(&self, id: ReportId) -> Result<StoredReport, StorageError> {
        let raw_id = report_id_to_i64(id)?;
        let row = sqlx::query(
            r"
                SELECT
                    session_id, learner_name, learner_email, topic, difficulty,
                    started_at, completed_at, score, total
                FROM reports
                WHERE id = ?1
            ",
        )
        .bind(raw_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        let item_rows = sqlx::query(
            r"
                SELECT
                    question_index, question, option_labels,
                    option_1, option_2, option_3, option_4,
                    chosen, chosen_text, correct, correct_text, explanation, is_correct
                FROM report_items
                WHERE report_id = ?1
                ORDER BY position ASC
            ",
        )
        .bind(raw_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut items = Vec::with_capacity(item_rows.len());
        for item_row in &item_rows {
            items.push(map_item_row(item_row)?);
        }

        let completed_at = row.try_get("completed_at").map_err(ser)?;
        let metadata = ReportMetadata::new(
            row.try_get::<String, _>("learner_name").map_err(ser)?,
            row.try_get::<Option<String>, _>("learner_email")
                .map_err(ser)?,
            row.try_get::<String, _>("topic").map_err(ser)?,
            parse_difficulty(&row.try_get::<String, _>("difficulty").map_err(ser)?)?,
            completed_at,
        )
        .map_err(ser)?;

        let report = Report::from_persisted(
            session_id_from_str(&row.try_get::<String, _>("session_id").map_err(ser)?)?,
            row.try_get("started_at").map_err(ser)?,
            completed_at,
            u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
            u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?,
            items,
        )
        .map_err(ser)?;

        Ok(StoredReport {
            id,
            metadata,
            report,
        })
    }

    async fn list_reports(&self, limit: u32) -> Result<Vec<ReportListItem>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, session_id, learner_name, topic, difficulty,
                    score, total, completed_at
                FROM reports
                ORDER BY completed_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(map_list_row(row)?);
        }
        Ok(out)
    }
}
