//! Read-only question bank
//!
//! Questions are loaded once at startup from `round1.json` and
//! `round2.json` in the questions directory. When the files are missing the
//! server runs with placeholder questions so the game flow can still be
//! rehearsed.

use crate::answer::OPTION_LETTERS;
use crate::types::{Question, Round};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Round 1 question {id} has invalid correct answer {correct:?}")]
    InvalidCorrect { id: u32, correct: Option<usize> },
}

#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    round1: Vec<Question>,
    round2: Vec<Question>,
}

impl QuestionBank {
    pub fn new(round1: Vec<Question>, round2: Vec<Question>) -> Self {
        Self { round1, round2 }
    }

    /// Load both rounds from a directory
    pub fn load(dir: &Path) -> Result<Self, QuestionBankError> {
        let round1 = read_round(&dir.join("round1.json"))?;
        let round2 = read_round(&dir.join("round2.json"))?;

        for question in &round1 {
            match question.correct {
                Some(c) if c < OPTION_LETTERS.len() => {}
                correct => {
                    return Err(QuestionBankError::InvalidCorrect {
                        id: question.id,
                        correct,
                    })
                }
            }
        }

        tracing::info!(
            "Loaded {} round 1 and {} round 2 questions from {}",
            round1.len(),
            round2.len(),
            dir.display()
        );
        Ok(Self::new(round1, round2))
    }

    /// Load from a directory, falling back to placeholders on any error
    pub fn load_or_placeholder(dir: &Path) -> Self {
        match Self::load(dir) {
            Ok(bank) => bank,
            Err(e) => {
                tracing::warn!("{}. Using placeholder questions.", e);
                Self::placeholder()
            }
        }
    }

    /// Placeholder questions: 12 multiple choice and 12 image questions
    pub fn placeholder() -> Self {
        let round1 = (0..12u32)
            .map(|i| Question {
                id: i + 1,
                text: format!("Warm-up question {}", i + 1),
                answers: OPTION_LETTERS
                    .iter()
                    .map(|l| format!("Option {}", l))
                    .collect(),
                correct: Some(i as usize % OPTION_LETTERS.len()),
                image_url: None,
                video_url: None,
                meme_name: None,
            })
            .collect();
        let round2 = (0..12u32)
            .map(|i| Question {
                id: i + 1,
                text: format!("Meme {}: what is this meme called?", i + 1),
                answers: Vec::new(),
                correct: None,
                image_url: None,
                video_url: None,
                meme_name: Some(format!("Meme {}", i + 1)),
            })
            .collect();
        Self { round1, round2 }
    }

    pub fn get(&self, round: Round, index: usize) -> Option<&Question> {
        match round {
            Round::One => self.round1.get(index),
            Round::Two => self.round2.get(index),
        }
    }

    pub fn len(&self, round: Round) -> usize {
        match round {
            Round::One => self.round1.len(),
            Round::Two => self.round2.len(),
        }
    }
}

fn read_round(path: &Path) -> Result<Vec<Question>, QuestionBankError> {
    let raw = std::fs::read_to_string(path).map_err(|source| QuestionBankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| QuestionBankError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUND1: &str = r#"[
        {"id": 1, "text": "2 + 2?", "answers": ["3", "4", "5", "22"], "correct": 1},
        {"id": 2, "text": "Capital of France?", "answers": ["Rome", "Berlin", "Paris", "Oslo"], "correct": 2, "videoUrl": "/uploads/paris.mp4"}
    ]"#;

    const ROUND2: &str = r#"[
        {"id": 1, "text": "Name this meme", "memeName": "Distracted boyfriend", "imageUrl": "/uploads/meme1.jpg"}
    ]"#;

    fn write_bank(round1: &str, round2: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("round1.json"), round1).unwrap();
        std::fs::write(dir.path().join("round2.json"), round2).unwrap();
        dir
    }

    #[test]
    fn test_load_from_directory() {
        let dir = write_bank(ROUND1, ROUND2);
        let bank = QuestionBank::load(dir.path()).unwrap();

        assert_eq!(bank.len(Round::One), 2);
        assert_eq!(bank.len(Round::Two), 1);
        assert_eq!(bank.get(Round::One, 1).unwrap().correct, Some(2));
        assert_eq!(
            bank.get(Round::One, 1).unwrap().media_url(),
            Some("/uploads/paris.mp4")
        );
        let meme = bank.get(Round::Two, 0).unwrap();
        assert_eq!(meme.meme_name.as_deref(), Some("Distracted boyfriend"));
        assert_eq!(meme.image_url.as_deref(), Some("/uploads/meme1.jpg"));
        assert!(bank.get(Round::Two, 1).is_none());
    }

    #[test]
    fn test_missing_files_fall_back_to_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            QuestionBank::load(dir.path()),
            Err(QuestionBankError::Io { .. })
        ));

        let bank = QuestionBank::load_or_placeholder(dir.path());
        assert_eq!(bank.len(Round::One), 12);
        assert_eq!(bank.len(Round::Two), 12);
        assert_eq!(bank.get(Round::One, 5).unwrap().correct, Some(1));
    }

    #[test]
    fn test_rejects_out_of_range_correct_answer() {
        let dir = write_bank(
            r#"[{"id": 9, "text": "?", "answers": ["a", "b"], "correct": 4}]"#,
            "[]",
        );
        assert!(matches!(
            QuestionBank::load(dir.path()),
            Err(QuestionBankError::InvalidCorrect { id: 9, .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let dir = write_bank("{not json", "[]");
        assert!(matches!(
            QuestionBank::load(dir.path()),
            Err(QuestionBankError::Parse { .. })
        ));
    }
}
