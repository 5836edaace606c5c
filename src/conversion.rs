use crate::{
    grammar::{Grammar, GrammarError, Rule},
    grammar_parser::{GrammarFile, RuleLine},
};

impl From<&RuleLine> for Rule {
    fn from(line: &RuleLine) -> Self {
        Rule {
            from: line.from.ch,
            to: line.to.iter().map(|s| s.ch).collect(),
        }
    }
}

impl TryFrom<&GrammarFile<'_>> for Grammar {
    type Error = GrammarError;

    fn try_from(file: &GrammarFile<'_>) -> Result<Self, Self::Error> {
        Grammar::new(
            file.nonterminals.iter().map(|s| s.ch),
            file.terminals.iter().map(|s| s.ch),
            file.rules.iter().map(Rule::from),
            file.start.ch,
        )
    }
}
