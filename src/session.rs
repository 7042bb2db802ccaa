use crate::error::SessionError;
use crate::models::{grade, mark_option, OptionMark, Question, QuestionPhase, QuestionState, QuizScore, Verdict};
use tracing::{debug, info};

// states[i] and verdicts[i] belong to questions[i]. A verdict exists iff the question is locked.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    states: Vec<QuestionState>,
    verdicts: Vec<Option<Verdict>>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let len = questions.len();
        Self {
            questions,
            states: vec![QuestionState::default(); len],
            verdicts: vec![None; len],
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn states(&self) -> &[QuestionState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn ensure_index(&self, index: usize) -> Result<(), SessionError> {
        if index < self.questions.len() {
            Ok(())
        } else {
            Err(SessionError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            })
        }
    }

    pub fn select(&mut self, index: usize, option: &str) -> Result<(), SessionError> {
        self.ensure_index(index)?;
        if !self.questions[index].has_option(option) {
            return Err(SessionError::UnknownOption {
                index,
                option: option.to_string(),
            });
        }

        let state = &mut self.states[index];
        if state.locked {
            debug!("ignoring selection on locked question {}", index);
            return Ok(());
        }
        state.selected_option = Some(option.to_string());
        Ok(())
    }

    pub fn check(&mut self, index: usize) -> Result<Verdict, SessionError> {
        self.ensure_index(index)?;
        if let Some(verdict) = &self.verdicts[index] {
            return Ok(verdict.clone());
        }

        let question = &self.questions[index];
        let state = &mut self.states[index];
        let selected = state
            .selected_option
            .clone()
            .ok_or(SessionError::NoSelection { index })?;

        state.locked = true;
        let verdict = Verdict {
            locked: true,
            is_correct: grade(question, &selected),
            selected_option: selected,
            correct_answer_letter: question.correct_answer_letter.clone(),
        };
        info!(
            "question {} locked: selected={:?} correct={:?} is_correct={}",
            index, verdict.selected_option, verdict.correct_answer_letter, verdict.is_correct
        );
        self.verdicts[index] = Some(verdict.clone());
        Ok(verdict)
    }

    pub fn state_of(&self, index: usize) -> Result<&QuestionState, SessionError> {
        self.ensure_index(index)?;
        Ok(&self.states[index])
    }

    pub fn phase_of(&self, index: usize) -> Result<QuestionPhase, SessionError> {
        self.state_of(index).map(QuestionState::phase)
    }

    pub fn verdict_of(&self, index: usize) -> Result<Option<&Verdict>, SessionError> {
        self.ensure_index(index)?;
        Ok(self.verdicts[index].as_ref())
    }

    pub fn option_marks(&self, index: usize) -> Result<Vec<(String, OptionMark)>, SessionError> {
        self.ensure_index(index)?;
        let question = &self.questions[index];
        let state = &self.states[index];
        Ok(question
            .options
            .iter()
            .map(|o| (o.clone(), mark_option(question, state, o)))
            .collect())
    }

    pub fn score(&self) -> QuizScore {
        let mut score = QuizScore {
            total: self.questions.len(),
            ..QuizScore::default()
        };
        for verdict in self.verdicts.iter().flatten() {
            score.answered += 1;
            if verdict.is_correct {
                score.correct += 1;
            } else {
                score.wrong += 1;
            }
        }
        score
    }
}
