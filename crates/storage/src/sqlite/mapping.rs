use quiz_core::model::{AnswerOption, Difficulty, Label, ReportId, ReportItem, SessionId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn report_id_from_i64(v: i64) -> Result<ReportId, StorageError> {
    Ok(ReportId::new(i64_to_u64("report_id", v)?))
}

pub(crate) fn report_id_to_i64(id: ReportId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("report_id overflow".into()))
}

pub(crate) fn usize_to_i64(field: &'static str, v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn session_id_from_str(s: &str) -> Result<SessionId, StorageError> {
    s.parse::<SessionId>().map_err(ser)
}

pub(crate) fn parse_label(s: &str) -> Result<Label, StorageError> {
    s.parse::<Label>().map_err(ser)
}

pub(crate) fn parse_difficulty(s: &str) -> Result<Difficulty, StorageError> {
    s.parse::<Difficulty>().map_err(ser)
}

pub(crate) fn labels_to_string(options: &[AnswerOption; 4]) -> String {
    options.iter().map(|o| o.label().as_char()).collect()
}

pub(crate) fn map_item_row(row: &sqlx::sqlite::SqliteRow) -> Result<ReportItem, StorageError> {
    let labels: String = row.try_get("option_labels").map_err(ser)?;
    let labels: Vec<Label> = labels
        .chars()
        .map(|c| {
            Label::from_char(c)
                .ok_or_else(|| StorageError::Serialization(format!("invalid option label: {c}")))
        })
        .collect::<Result<_, _>>()?;
    let [l1, l2, l3, l4]: [Label; 4] = labels
        .try_into()
        .map_err(|_| StorageError::Serialization("expected 4 option labels".into()))?;

    let options = [
        AnswerOption::new(l1, row.try_get::<String, _>("option_1").map_err(ser)?),
        AnswerOption::new(l2, row.try_get::<String, _>("option_2").map_err(ser)?),
        AnswerOption::new(l3, row.try_get::<String, _>("option_3").map_err(ser)?),
        AnswerOption::new(l4, row.try_get::<String, _>("option_4").map_err(ser)?),
    ];

    let question_index: i64 = row.try_get("question_index").map_err(ser)?;
    let question_index = usize::try_from(question_index).map_err(|_| {
        StorageError::Serialization(format!("invalid question_index: {question_index}"))
    })?;

    Ok(ReportItem {
        question_index,
        question: row.try_get("question").map_err(ser)?,
        options,
        chosen: parse_label(&row.try_get::<String, _>("chosen").map_err(ser)?)?,
        chosen_text: row.try_get("chosen_text").map_err(ser)?,
        correct: parse_label(&row.try_get::<String, _>("correct").map_err(ser)?)?,
        correct_text: row.try_get("correct_text").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
        is_correct: row.try_get::<bool, _>("is_correct").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_in_option_order() {
        let options = [
            AnswerOption::new(Label::C, "x"),
            AnswerOption::new(Label::A, "y"),
            AnswerOption::new(Label::D, "z"),
            AnswerOption::new(Label::B, "w"),
        ];
        assert_eq!(labels_to_string(&options), "CADB");
    }

    #[test]
    fn rejects_negative_ids() {
        assert!(report_id_from_i64(-1).is_err());
        assert_eq!(report_id_from_i64(7).unwrap(), ReportId::new(7));
    }
}
