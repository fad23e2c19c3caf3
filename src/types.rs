use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque ID types for type safety
pub type ParticipantId = String;
pub type ChatId = i64;

/// Quiz round. Round 1 is auto-scored multiple choice, round 2 is free text
/// scored by the moderator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Round {
    One,
    Two,
}

impl Round {
    pub fn number(self) -> u8 {
        match self {
            Round::One => 1,
            Round::Two => 2,
        }
    }

    /// Whether answers in this round are scored automatically on ingestion
    pub fn is_auto_scored(self) -> bool {
        self == Round::One
    }
}

impl TryFrom<u8> for Round {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Round::One),
            2 => Ok(Round::Two),
            other => Err(format!("Unknown round: {}", other)),
        }
    }
}

impl From<Round> for u8 {
    fn from(round: Round) -> Self {
        round.number()
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Round lengths. Each round has a fixed number of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub round1_questions: usize,
    pub round2_questions: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round1_questions: 12,
            round2_questions: 10,
        }
    }
}

impl GameConfig {
    pub fn round_length(&self, round: Round) -> usize {
        match round {
            Round::One => self.round1_questions,
            Round::Two => self.round2_questions,
        }
    }

    /// Index of the last question of a round
    pub fn last_index(&self, round: Round) -> usize {
        self.round_length(round).saturating_sub(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    /// Chat the participant talks to the bot from (None for participants
    /// created without a messaging channel)
    pub chat_id: Option<ChatId>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub registered: bool,
}

/// A question from the question bank.
///
/// Round 1 questions carry `answers` and `correct`; round 2 questions
/// carry an image and the reference answer for the moderator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub correct: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meme_name: Option<String>,
}

impl Question {
    /// Media shown alongside the question, preferring video over image
    pub fn media_url(&self) -> Option<&str> {
        self.video_url.as_deref().or(self.image_url.as_deref())
    }
}

/// Position of a question in the game: (round, question index).
///
/// Serialized as `"<round>_<index>"`, which is also the answer id sent to
/// presenters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionKey {
    pub round: Round,
    pub question: usize,
}

impl QuestionKey {
    pub fn new(round: Round, question: usize) -> Self {
        Self { round, question }
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.round, self.question)
    }
}

impl FromStr for QuestionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (round, question) = s
            .split_once('_')
            .ok_or_else(|| format!("Invalid question key: {}", s))?;
        let round: u8 = round
            .parse()
            .map_err(|_| format!("Invalid round in question key: {}", s))?;
        let question = question
            .parse()
            .map_err(|_| format!("Invalid question index in question key: {}", s))?;
        Ok(Self {
            round: Round::try_from(round)?,
            question,
        })
    }
}

impl Serialize for QuestionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuestionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Submitted answer: an option index in round 1, raw text in round 2
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(usize),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerRecord {
    pub answer: AnswerValue,
    pub is_correct: bool,
    /// Display name at submission time
    pub user_name: String,
    pub timestamp: String,
    pub round: Round,
}

/// Per-participant score ledger.
///
/// `total` is only ever changed together with one of the round buckets, so
/// it always equals `round1 + round2`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    total: i64,
    round1: i64,
    round2: i64,
}

impl Score {
    pub fn add(&mut self, round: Round, points: i64) {
        match round {
            Round::One => self.round1 += points,
            Round::Two => self.round2 += points,
        }
        self.total += points;
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn round1(&self) -> i64 {
        self.round1
    }

    pub fn round2(&self) -> i64 {
        self.round2
    }
}

/// Per-participant summary for the active round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantStats {
    pub name: String,
    pub score: i64,
    pub round1_score: i64,
    pub round2_score: i64,
    pub correct_answers: u32,
    pub total_answers: u32,
}

pub type RoundStatistics = BTreeMap<ParticipantId, ParticipantStats>;

/// The single authoritative game state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub current_round: Round,
    pub current_question: usize,
    pub participants: BTreeMap<ParticipantId, Participant>,
    pub answers: BTreeMap<QuestionKey, BTreeMap<ParticipantId, AnswerRecord>>,
    pub scores: BTreeMap<ParticipantId, Score>,
    pub stats_visible: bool,
    pub answers_visible: bool,
    pub round_statistics: Option<RoundStatistics>,
    pub round2_notification_sent: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_round: Round::One,
            current_question: 0,
            participants: BTreeMap::new(),
            answers: BTreeMap::new(),
            scores: BTreeMap::new(),
            stats_visible: false,
            answers_visible: false,
            round_statistics: None,
            round2_notification_sent: false,
        }
    }
}

impl GameState {
    /// Cursor of the active question
    pub fn cursor(&self) -> QuestionKey {
        QuestionKey::new(self.current_round, self.current_question)
    }

    pub fn is_registered(&self, participant_id: &str) -> bool {
        self.participants
            .get(participant_id)
            .is_some_and(|p| p.registered)
    }

    pub fn registered_count(&self) -> usize {
        self.participants.values().filter(|p| p.registered).count()
    }

    /// Answers recorded for the active question
    pub fn current_answers(&self) -> Option<&BTreeMap<ParticipantId, AnswerRecord>> {
        self.answers.get(&self.cursor())
    }

    pub fn clear_visibility(&mut self) {
        self.stats_visible = false;
        self.answers_visible = false;
    }
}
