use crate::models::{option_letter, Question};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const ANSWER_MARKER: &str = "Correct Answer:";

static QUESTION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Question \d+:").expect("valid regex"));
static ANSWER_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Correct Answer:\s*([A-D])").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    QuestionHeader,
    OptionLine(char),
    AnswerLine(Option<char>),
    Other,
}

fn answer_letter(line: &str) -> Option<char> {
    ANSWER_LETTER
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().chars().next())
}

// `line` is expected to be trimmed already.
pub fn classify_line(line: &str) -> LineKind {
    if QUESTION_HEADER.is_match(line) {
        LineKind::QuestionHeader
    } else if let Some(letter) = option_letter(line) {
        LineKind::OptionLine(letter)
    } else if line.contains(ANSWER_MARKER) {
        LineKind::AnswerLine(answer_letter(line))
    } else {
        LineKind::Other
    }
}

pub fn parse_quiz(raw: &str) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut current: Option<Question> = None;

    for line in raw.lines().map(str::trim) {
        match classify_line(line) {
            LineKind::QuestionHeader => {
                if let Some(done) = current.take() {
                    questions.push(done);
                }
                current = Some(Question {
                    prompt_text: line.to_string(),
                    ..Question::default()
                });
            }
            LineKind::OptionLine(_) => {
                if let Some(q) = current.as_mut() {
                    q.options.push(line.to_string());
                }
            }
            LineKind::AnswerLine(Some(letter)) => {
                if let Some(q) = current.as_mut() {
                    q.correct_answer_letter = letter.to_string();
                }
            }
            LineKind::AnswerLine(None) | LineKind::Other => {}
        }
    }

    if let Some(done) = current {
        questions.push(done);
    }

    debug!("parsed {} quiz questions", questions.len());
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPITAL: &str = "Question 1: What is the capital of France?\n\
                           A) Berlin\n\
                           B) Paris\n\
                           C) Madrid\n\
                           D) Rome\n\
                           Correct Answer: B";

    #[test]
    fn classifies_lines() {
        assert_eq!(classify_line("Question 12: Why?"), LineKind::QuestionHeader);
        assert_eq!(classify_line("C) Madrid"), LineKind::OptionLine('C'));
        assert_eq!(classify_line("E) Lisbon"), LineKind::Other);
        assert_eq!(classify_line("Correct Answer: D"), LineKind::AnswerLine(Some('D')));
        assert_eq!(classify_line("Correct Answer:C"), LineKind::AnswerLine(Some('C')));
        assert_eq!(classify_line("Correct Answer: unknown"), LineKind::AnswerLine(None));
        assert_eq!(classify_line("**Correct Answer: A**"), LineKind::AnswerLine(Some('A')));
        assert_eq!(classify_line("Question: no number"), LineKind::Other);
        assert_eq!(classify_line(""), LineKind::Other);
    }

    #[test]
    fn header_wins_over_other_patterns() {
        assert_eq!(
            classify_line("Question 3: Correct Answer: A?"),
            LineKind::QuestionHeader
        );
        assert_eq!(classify_line("A) Correct Answer: B"), LineKind::OptionLine('A'));
    }

    #[test]
    fn option_lines_follow_option_letter() {
        for line in ["A) x", "D)", "E) x", "a) x", "(B) x", "B)x"] {
            let expected = option_letter(line).map(LineKind::OptionLine).unwrap_or(LineKind::Other);
            assert_eq!(classify_line(line), expected, "line {line:?}");
        }
    }

    #[test]
    fn parses_single_block() {
        let questions = parse_quiz(CAPITAL);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt_text, "Question 1: What is the capital of France?");
        assert_eq!(
            questions[0].options,
            vec!["A) Berlin", "B) Paris", "C) Madrid", "D) Rome"]
        );
        assert_eq!(questions[0].correct_answer_letter, "B");
    }

    #[test]
    fn parses_several_blocks_with_noise() {
        let raw = "Here is your quiz:\n\n\
                   Question 1: First?\n  A) one\nB) two\nCorrect Answer: A\n\n\
                   Some commentary the model added.\n\
                   Question 2: Second?\r\nA) x\r\nB) y\r\nC) z\r\nCorrect Answer: C\r\n";
        let questions = parse_quiz(raw);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options, vec!["A) one", "B) two"]);
        assert_eq!(questions[0].correct_answer_letter, "A");
        assert_eq!(questions[1].prompt_text, "Question 2: Second?");
        assert_eq!(questions[1].options, vec!["A) x", "B) y", "C) z"]);
        assert_eq!(questions[1].correct_answer_letter, "C");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_quiz("").is_empty());
        assert!(parse_quiz("\n\n   \n").is_empty());
    }

    #[test]
    fn options_before_any_header_are_dropped() {
        let raw = "A) orphan\nB) orphan\nCorrect Answer: A\nQuestion 1: Real?\nA) kept";
        let questions = parse_quiz(raw);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options, vec!["A) kept"]);
        assert_eq!(questions[0].correct_answer_letter, "");
    }

    #[test]
    fn header_without_options_is_still_emitted() {
        let questions = parse_quiz("Question 1: Lonely?\nQuestion 2: Also?\nCorrect Answer: D");
        assert_eq!(questions.len(), 2);
        assert!(questions[0].options.is_empty());
        assert_eq!(questions[0].correct_answer_letter, "");
        assert_eq!(questions[1].correct_answer_letter, "D");
    }

    #[test]
    fn options_beyond_d_are_ignored() {
        let raw = "Question 1: Pick\nA) a\nB) b\nC) c\nD) d\nE) e\nF) f\nCorrect Answer: E";
        let questions = parse_quiz(raw);
        assert_eq!(questions[0].options.len(), 4);
        assert_eq!(questions[0].correct_answer_letter, "");
    }

    #[test]
    fn last_answer_line_wins_and_malformed_keeps_prior() {
        let raw = "Question 1: Pick\nA) a\nB) b\nCorrect Answer: A\nCorrect Answer: B\nCorrect Answer: maybe";
        let questions = parse_quiz(raw);
        assert_eq!(questions[0].correct_answer_letter, "B");
    }

    #[test]
    fn missing_answer_line_leaves_letter_empty() {
        let questions = parse_quiz("Question 1: Pick\nA) a\nB) b");
        assert_eq!(questions[0].correct_answer_letter, "");
    }

    #[test]
    fn parsing_is_repeatable() {
        assert_eq!(parse_quiz(CAPITAL), parse_quiz(CAPITAL));
    }

    #[test]
    fn emitted_options_always_carry_a_to_d_markers() {
        let raw = "Question 1: x\nA) 1\nZ) 2\nB) 3\n(C) 4\nD) 5\nQuestion 2: y\nd) lower\nC) ok";
        for q in parse_quiz(raw) {
            assert!(q.options.len() <= 4);
            for option in &q.options {
                assert!(option_letter(option).is_some(), "unexpected option {option}");
            }
        }
    }
}
