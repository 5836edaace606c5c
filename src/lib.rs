use std::collections::HashSet;

use chumsky::Parser;
use thiserror::Error;

pub mod conversion;
pub mod grammar;
pub mod grammar_parser;
mod nullable;
pub mod recognizer;

pub use crate::grammar::{Grammar, GrammarError, Production, Rule, Symbol};
pub use crate::recognizer::{Chart, Item, ItemDisplay, StateSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Recognizer has no grammar, call `fit` before `predict`")]
pub struct NotFittedError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error(s) while parsing the grammar file : {0}")]
    InvalidGrammarFile(String),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    NotFitted(#[from] NotFittedError),
}

#[derive(Debug)]
struct Fitted {
    grammar: Grammar,
    nullable: HashSet<char>,
}

/// Membership test for the language of a context-free grammar.
///
/// A recognizer starts unfitted; `fit` binds it to a grammar, after which
/// `predict` may be called any number of times, from any number of threads.
#[derive(Debug, Default)]
pub struct Recognizer {
    fitted: Option<Fitted>,
}

impl Recognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, grammar: Grammar) -> Result<&mut Self, GrammarError> {
        grammar.validate()?;
        let nullable = grammar.nullable_nonterminals();
        log::debug!(
            "fitted grammar with {} rules, nullable nonterminals: {:?}",
            grammar.productions().len(),
            nullable
        );
        self.fitted = Some(Fitted { grammar, nullable });
        Ok(self)
    }

    /// Parse a grammar document and fit a new recognizer to it. A query
    /// section in the document, if any, is ignored.
    pub fn from_grammar_text(text: &str) -> Result<Self, Error> {
        let file = grammar_parser::grammar_file().parse(text);
        if file.has_errors() {
            let messages: Vec<String> = file.errors().map(|e| e.to_string()).collect();
            return Err(Error::InvalidGrammarFile(messages.join("\n")));
        }
        let file = file
            .output()
            .ok_or_else(|| Error::InvalidGrammarFile("no grammar produced".to_string()))?;
        let mut recognizer = Self::new();
        recognizer.fit(Grammar::try_from(file)?)?;
        Ok(recognizer)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn grammar(&self) -> Option<&Grammar> {
        self.fitted.as_ref().map(|f| &f.grammar)
    }

    /// Build the full chart for `word`.
    pub fn chart(&self, word: &str) -> Result<Chart<'_>, NotFittedError> {
        let fitted = self.fitted.as_ref().ok_or(NotFittedError)?;
        let mut chart = Chart::new(&fitted.grammar, &fitted.nullable, word);
        chart.recognize();
        Ok(chart)
    }

    /// Whether `word` belongs to the language of the fitted grammar.
    /// Characters outside the terminal alphabet simply lead to rejection.
    pub fn predict(&self, word: &str) -> Result<bool, NotFittedError> {
        let accepted = self.chart(word)?.accepted();
        log::debug!("{:?} -> {}", word, if accepted { "accepted" } else { "rejected" });
        Ok(accepted)
    }
}
