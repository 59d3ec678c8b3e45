//! Published column layout for extracted SAT questions.
//!
//! This is reference material only: the simulated pipeline does not emit rows
//! in this shape yet, but a real `DocumentProcessor` is expected to.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub required: bool,
    pub description: &'static str,
}

const fn column(
    name: &'static str,
    sql_type: &'static str,
    required: bool,
    description: &'static str,
) -> SchemaColumn {
    SchemaColumn {
        name,
        sql_type,
        required,
        description,
    }
}

pub const SCHEMA: [SchemaColumn; 15] = [
    column(
        "question_id",
        "VARCHAR(50)",
        true,
        "Unique identifier for the question (e.g., QUESTION98)",
    ),
    column(
        "question_type",
        "VARCHAR(30)",
        true,
        "Type of question (e.g., multiple_choice, Multi_choice)",
    ),
    column("question_text", "TEXT", true, "The main question text content"),
    column(
        "instructions",
        "TEXT",
        false,
        "Additional instructions, diagrams, or context for the question",
    ),
    column("answer_choices", "JSON", true, "Array of answer choices in JSON format"),
    column(
        "correct_answer",
        "VARCHAR(10)",
        true,
        "Index or identifier of the correct answer (e.g., '1', '2', 'A', 'B')",
    ),
    column(
        "explanation",
        "TEXT",
        false,
        "Detailed solution and explanation for the question",
    ),
    column(
        "difficulty",
        "VARCHAR(20)",
        false,
        "Difficulty level (Easy, Medium, Hard, intense)",
    ),
    column(
        "tag",
        "VARCHAR(50)",
        false,
        "Subject tag or category (e.g., Vocab, Angle, Algebra)",
    ),
    column(
        "reference_id",
        "VARCHAR(30)",
        false,
        "Reference identifier (e.g., JunD24.1.3, DecA23.4.22)",
    ),
    column("marks", "INTEGER", false, "Points awarded for correct answer"),
    column(
        "negative_marks",
        "INTEGER",
        false,
        "Points deducted for incorrect answer",
    ),
    column(
        "answer_time",
        "INTEGER",
        false,
        "Recommended time to answer in minutes",
    ),
    column("created_at", "TIMESTAMP", false, "When the question was imported"),
    column("source_file", "VARCHAR(255)", false, "Original document filename"),
];

/// One extracted question. Field order matches [`SCHEMA`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_id: String,
    pub question_type: String,
    pub question_text: String,
    pub instructions: String,
    /// JSON array of strings.
    pub answer_choices: String,
    pub correct_answer: String,
    pub explanation: String,
    pub difficulty: String,
    pub tag: String,
    pub reference_id: String,
    pub marks: String,
    pub negative_marks: String,
    pub answer_time: String,
    pub created_at: String,
    pub source_file: String,
}

impl QuestionRecord {
    pub fn answer_choice_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.answer_choices)
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.question_id.clone(),
            self.question_type.clone(),
            self.question_text.clone(),
            self.instructions.clone(),
            self.answer_choices.clone(),
            self.correct_answer.clone(),
            self.explanation.clone(),
            self.difficulty.clone(),
            self.tag.clone(),
            self.reference_id.clone(),
            self.marks.clone(),
            self.negative_marks.clone(),
            self.answer_time.clone(),
            self.created_at.clone(),
            self.source_file.clone(),
        ]
    }
}

pub fn schema_header() -> Vec<String> {
    SCHEMA.iter().map(|col| col.name.to_string()).collect()
}

pub fn sample_records() -> Vec<QuestionRecord> {
    vec![
        QuestionRecord {
            question_id: "QUESTION98".into(),
            question_type: "multiple_choice".into(),
            question_text: "Which choice completes the text with the most logical and precise word or phrase?".into(),
            instructions: "The Ghana Stock Exchange helps to _____ concerns for potential investors by handling regulatory details.".into(),
            answer_choices: r#"["assuage", "convey", "amplify", "designate"]"#.into(),
            correct_answer: "1".into(),
            explanation: "The sentence is about the Ghana Stock Exchange helping to alleviate concerns for potential investors by handling regulatory details. 'Assuage' means to make an unpleasant feeling less intense, which fits the context of easing investors' worries.".into(),
            difficulty: "Easy".into(),
            tag: "Vocab".into(),
            reference_id: "JunD24.1.3".into(),
            marks: "1".into(),
            negative_marks: "0".into(),
            answer_time: "3".into(),
            created_at: "2024-01-15 10:30:00".into(),
            source_file: "SAT_Practice_Test_June_2024.docx".into(),
        },
        QuestionRecord {
            question_id: "QUESTION99".into(),
            question_type: "multiple_choice".into(),
            question_text: "In the figure, parallel lines a and b are intersected by lines c, d and e. If z = 67, y = 118, and v < z, which statement about x and w must be true?".into(),
            instructions: "![A diagram of lines and dots](https://example.com/diagram.gif)".into(),
            answer_choices: r#"["x > w", "x < w", "x = w", "Cannot be determined"]"#.into(),
            correct_answer: "1".into(),
            explanation: "Using properties of parallel lines and transversals, when parallel lines are cut by a transversal, corresponding angles are equal and alternate interior angles are equal.".into(),
            difficulty: "Medium".into(),
            tag: "Geometry".into(),
            reference_id: "DecA23.4.22".into(),
            marks: "1".into(),
            negative_marks: "0".into(),
            answer_time: "4".into(),
            created_at: "2024-01-15 10:31:00".into(),
            source_file: "SAT_Practice_Test_December_2023.docx".into(),
        },
    ]
}

/// Header row plus the sample records.
pub fn sample_table() -> Vec<Vec<String>> {
    let mut rows = vec![schema_header()];
    rows.extend(sample_records().iter().map(QuestionRecord::to_row));
    rows
}
