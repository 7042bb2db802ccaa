use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static OPTION_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-D])\)").expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub prompt_text: String,
    pub options: Vec<String>,
    // empty when no usable answer line was found
    pub correct_answer_letter: String,
}

impl Question {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuestionState {
    pub selected_option: Option<String>,
    pub locked: bool,
}

impl QuestionState {
    pub fn phase(&self) -> QuestionPhase {
        match (&self.selected_option, self.locked) {
            (_, true) => QuestionPhase::Checked,
            (Some(_), false) => QuestionPhase::Selected,
            (None, false) => QuestionPhase::Unanswered,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionPhase {
    Unanswered,
    Selected,
    Checked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub locked: bool,
    pub selected_option: String,
    pub correct_answer_letter: String,
    pub is_correct: bool,
}

impl Verdict {
    pub fn feedback(&self) -> String {
        if self.is_correct {
            "Correct!".to_string()
        } else {
            format!("Wrong! Correct answer is {}", self.correct_answer_letter)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptionMark {
    Neutral,
    Selected,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizScore {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
}

impl QuizScore {
    pub fn correct_pct(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            (self.correct as f64) * 100.0 / (self.answered as f64)
        }
    }
}

pub fn option_letter(option: &str) -> Option<char> {
    OPTION_LETTER
        .captures(option)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
}

pub fn grade(question: &Question, selected_option: &str) -> bool {
    option_letter(selected_option)
        .map(|letter| is_correct_letter(question, letter))
        .unwrap_or(false)
}

fn is_correct_letter(question: &Question, letter: char) -> bool {
    question.correct_answer_letter == letter.to_string()
}

pub fn mark_option(question: &Question, state: &QuestionState, option: &str) -> OptionMark {
    let is_selected = state.selected_option.as_deref() == Some(option);
    if !state.locked {
        return if is_selected {
            OptionMark::Selected
        } else {
            OptionMark::Neutral
        };
    }

    let is_correct_option = option_letter(option)
        .map(|letter| is_correct_letter(question, letter))
        .unwrap_or(false);
    if is_correct_option {
        OptionMark::Correct
    } else if is_selected {
        OptionMark::Incorrect
    } else {
        OptionMark::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capital_question() -> Question {
        Question {
            prompt_text: "Question 1: What is the capital of France?".into(),
            options: vec![
                "A) Berlin".into(),
                "B) Paris".into(),
                "C) Madrid".into(),
                "D) Rome".into(),
            ],
            correct_answer_letter: "B".into(),
        }
    }

    fn locked_on(option: &str) -> QuestionState {
        QuestionState {
            selected_option: Some(option.into()),
            locked: true,
        }
    }

    #[test]
    fn option_letter_reads_leading_marker() {
        assert_eq!(option_letter("B) Paris"), Some('B'));
        assert_eq!(option_letter("D)"), Some('D'));
        assert_eq!(option_letter("E) Lisbon"), None);
        assert_eq!(option_letter(" A) Berlin"), None);
        assert_eq!(option_letter("Paris"), None);
    }

    #[test]
    fn grading_compares_letters() {
        let q = capital_question();
        assert!(grade(&q, "B) Paris"));
        assert!(!grade(&q, "A) Berlin"));
    }

    #[test]
    fn grading_without_correct_letter_is_always_wrong() {
        let mut q = capital_question();
        q.correct_answer_letter.clear();
        for option in q.options.clone() {
            assert!(!grade(&q, &option));
        }
    }

    #[test]
    fn phases_follow_state() {
        let mut s = QuestionState::default();
        assert_eq!(s.phase(), QuestionPhase::Unanswered);
        s.selected_option = Some("A) Berlin".into());
        assert_eq!(s.phase(), QuestionPhase::Selected);
        s.locked = true;
        assert_eq!(s.phase(), QuestionPhase::Checked);
    }

    #[test]
    fn marks_before_lock_only_show_selection() {
        let q = capital_question();
        let s = QuestionState {
            selected_option: Some("A) Berlin".into()),
            locked: false,
        };
        assert_eq!(mark_option(&q, &s, "A) Berlin"), OptionMark::Selected);
        assert_eq!(mark_option(&q, &s, "B) Paris"), OptionMark::Neutral);
    }

    #[test]
    fn marks_after_wrong_answer() {
        let q = capital_question();
        let s = locked_on("A) Berlin");
        assert_eq!(mark_option(&q, &s, "A) Berlin"), OptionMark::Incorrect);
        assert_eq!(mark_option(&q, &s, "B) Paris"), OptionMark::Correct);
        assert_eq!(mark_option(&q, &s, "C) Madrid"), OptionMark::Neutral);
    }

    #[test]
    fn marks_after_right_answer() {
        let q = capital_question();
        let s = locked_on("B) Paris");
        assert_eq!(mark_option(&q, &s, "B) Paris"), OptionMark::Correct);
        assert_eq!(mark_option(&q, &s, "A) Berlin"), OptionMark::Neutral);
    }

    #[test]
    fn feedback_text() {
        let mut v = Verdict {
            locked: true,
            selected_option: "B) Paris".into(),
            correct_answer_letter: "B".into(),
            is_correct: true,
        };
        assert_eq!(v.feedback(), "Correct!");
        v.is_correct = false;
        v.correct_answer_letter = "C".into();
        assert_eq!(v.feedback(), "Wrong! Correct answer is C");
    }

    #[test]
    fn score_pct() {
        let s = QuizScore {
            total: 5,
            answered: 4,
            correct: 3,
            wrong: 1,
        };
        assert_eq!(s.correct_pct(), 75.0);
        assert_eq!(QuizScore::default().correct_pct(), 0.0);
    }
}
