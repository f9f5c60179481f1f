// src/models/exam_result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Subject label stored with every self-generated exam.
pub const SELF_EXAM_SUBJECT: &str = "Autoexamen";

/// Represents the 'resultados' table in the database.
/// One row per generated exam; `aciertos` is always written as 0.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: i64,
    pub tema: String,
    pub aciertos: i64,
    pub total: i64,
    pub nivel: String,
}

impl ExamResult {
    /// Accuracy as a percentage, 0 when no questions were recorded.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.aciertos as f64 / self.total as f64 * 100.0
        }
    }
}

/// History row with the derived percentage column.
#[derive(Debug, Serialize)]
pub struct ExamResultView {
    pub id: i64,
    pub tema: String,
    pub aciertos: i64,
    pub total: i64,
    pub nivel: String,
    pub porcentaje: f64,
}

impl From<ExamResult> for ExamResultView {
    fn from(r: ExamResult) -> Self {
        let porcentaje = r.percentage();
        Self {
            id: r.id,
            tema: r.tema,
            aciertos: r.aciertos,
            total: r.total,
            nivel: r.nivel,
            porcentaje,
        }
    }
}

/// Exam flavour selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "basico")]
    Basic,
    #[serde(alias = "clinico")]
    Clinical,
}

impl Difficulty {
    /// Label persisted in `resultados.nivel`.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Basic => "Básico",
            Difficulty::Clinical => "Clínico",
        }
    }

    pub fn prompt_description(self) -> &'static str {
        match self {
            Difficulty::Basic => "básico (anatomía, bioquímica, fisiología)",
            Difficulty::Clinical => "clínico (semiología, pediatría, cirugía, neurología)",
        }
    }
}

fn default_question_count() -> u32 {
    5
}

/// DTO for requesting a generated exam.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateExamRequest {
    pub difficulty: Difficulty,
    #[serde(default = "default_question_count")]
    #[validate(range(min = 3, max = 10, message = "Question count must be between 3 and 10."))]
    pub count: u32,
}

/// DTO returned after generating an exam.
#[derive(Debug, Serialize)]
pub struct GenerateExamResponse {
    /// Model output in its line-oriented text format, or a warning string.
    pub questions: String,
    pub record: ExamResultView,
}
