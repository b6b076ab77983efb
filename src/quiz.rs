//! Quiz question records as produced by the quiz-generation application,
//! plus the prompt the tutor sends to request them.

use std::fmt;
use std::str::FromStr;

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// One multiple-choice question.
///
/// Field names on the wire are fixed by the quiz application's output contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Quiz Question", description = "A four-option English vocabulary question")]
pub struct QuizQuestion {
    #[serde(rename = "题目")]
    pub question: String,
    #[serde(rename = "选项A")]
    pub option_a: String,
    #[serde(rename = "选项B")]
    pub option_b: String,
    #[serde(rename = "选项C")]
    pub option_c: String,
    #[serde(rename = "选项D")]
    pub option_d: String,
    /// Label of the correct option, expected to be one of A, B, C, D
    #[serde(rename = "正确答案")]
    pub correct_answer: String,
    #[serde(rename = "解析")]
    pub explanation: String,
}

impl QuizQuestion {
    /// Options in label order A to D.
    pub fn options(&self) -> [&str; 4] {
        [
            self.option_a.as_str(),
            self.option_b.as_str(),
            self.option_c.as_str(),
            self.option_d.as_str(),
        ]
    }

    pub fn option(&self, label: AnswerLabel) -> &str {
        self.options()[label.index()]
    }

    /// Zero-based index of the correct option. Unrecognised labels map to 0.
    pub fn correct_index(&self) -> usize {
        self.answer_label().map_or(0, AnswerLabel::index)
    }

    /// Strict view of the correct label; `None` when the model sent something else.
    pub fn answer_label(&self) -> Option<AnswerLabel> {
        self.correct_answer.parse().ok()
    }

    pub fn is_correct(&self, chosen: AnswerLabel) -> bool {
        chosen.as_str() == self.correct_answer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerLabel {
    A,
    B,
    C,
    D,
}

impl AnswerLabel {
    pub const ALL: [AnswerLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown answer label '{}', expected A, B, C or D", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl FromStr for AnswerLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

/// JSON schema of a single question, with wire field names.
pub fn quiz_schema_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(QuizQuestion))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// The wording used inside the generation prompt
    pub const fn prompt_label(self) -> &'static str {
        match self {
            Self::Easy => "简单",
            Self::Medium => "中等",
            Self::Hard => "困难",
        }
    }
}

/// Canned requirements offered as one-tap starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPreset {
    Random,
    HighFrequency,
    Synonyms,
}

impl QuizPreset {
    pub const fn requirement(self) -> Option<&'static str> {
        match self {
            Self::Random => None,
            Self::HighFrequency => Some("请出关于高频词汇的题目"),
            Self::Synonyms => Some("请出近义词辨析的题目"),
        }
    }
}

/// Parameters for one quiz generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    count: u8,
    pub difficulty: Difficulty,
    pub requirement: Option<String>,
}

impl Default for QuizRequest {
    fn default() -> Self {
        Self {
            count: 1,
            difficulty: Difficulty::default(),
            requirement: None,
        }
    }
}

impl QuizRequest {
    pub const MIN_COUNT: u8 = 1;
    pub const MAX_COUNT: u8 = 5;

    #[must_use]
    pub fn new(count: u8, difficulty: Difficulty) -> Self {
        Self {
            count: count.clamp(Self::MIN_COUNT, Self::MAX_COUNT),
            difficulty,
            requirement: None,
        }
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }

    #[must_use]
    pub fn with_preset(mut self, preset: QuizPreset) -> Self {
        self.requirement = preset.requirement().map(str::to_string);
        self
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Prompt text sent to the quiz application.
    pub fn render_prompt(&self) -> String {
        let mut prompt = format!(
            "请生成{}道{}难度的英语词汇选择题",
            self.count,
            self.difficulty.prompt_label()
        );
        if let Some(requirement) = self.requirement.as_deref().filter(|r| !r.trim().is_empty()) {
            prompt.push_str("，要求：");
            prompt.push_str(requirement);
        }
        prompt
    }
}
