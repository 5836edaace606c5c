//! Parser for grammar documents.
//!
//! ```text
//! 1 2 2          counts of nonterminals, terminals and rules
//! S              nonterminals
//! ( )            terminals
//! S -> ( S ) S   one rule per line, whitespace in the body is ignored
//! S ->           an empty body is an epsilon rule
//! S              start symbol
//! 3              optional: number of words to test,
//! ()  (()  )(    followed by the words themselves
//! ```
#[cfg(test)]
mod tests_rejections;

use chumsky::{
    prelude::*,
    text::{inline_whitespace, newline, whitespace},
};

type Extra<'src> = extra::Err<Rich<'src, char>>;

/// A single grammar symbol together with where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sym {
    pub ch: char,
    pub span: SimpleSpan,
}

impl PartialEq<char> for Sym {
    fn eq(&self, other: &char) -> bool {
        self.ch == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub nonterminals: usize,
    pub terminals: usize,
    pub rules: usize,
    pub span: SimpleSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLine {
    pub from: Sym,
    pub to: Vec<Sym>,
    pub span: SimpleSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queries<'src> {
    pub count: usize,
    pub words: Vec<&'src str>,
    pub span: SimpleSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarFile<'src> {
    pub header: Header,
    pub nonterminals: Vec<Sym>,
    pub terminals: Vec<Sym>,
    pub rules: Vec<RuleLine>,
    pub start: Sym,
    pub queries: Option<Queries<'src>>,
}

impl<'src> GrammarFile<'src> {
    /// Words of the query section, empty when the document has none.
    pub fn words(&self) -> &[&'src str] {
        self.queries
            .as_ref()
            .map(|q| q.words.as_slice())
            .unwrap_or_default()
    }
}

pub fn grammar_file<'src>() -> impl Parser<'src, &'src str, GrammarFile<'src>, Extra<'src>> {
    whitespace()
        .ignore_then(header())
        .then_ignore(line_end())
        .then(symbols().then_ignore(line_end()))
        .then(symbols().then_ignore(line_end()))
        .then(rule_line().then_ignore(line_end()).repeated().collect::<Vec<_>>())
        .then(symbol().padded_by(inline_whitespace()))
        .then(line_end().ignore_then(queries()).or_not())
        .then_ignore(whitespace())
        .then_ignore(end())
        .map(
            |(((((header, nonterminals), terminals), rules), start), queries)| GrammarFile {
                header,
                nonterminals,
                terminals,
                rules,
                start,
                queries,
            },
        )
        .validate(|file, _, emitter| {
            for error in count_mismatches(&file) {
                emitter.emit(error);
            }
            file
        })
}

fn count_mismatches<'src>(file: &GrammarFile<'src>) -> Vec<Rich<'src, char>> {
    let header = &file.header;
    let mut errors = Vec::new();
    for (section, declared, found) in [
        ("nonterminals", header.nonterminals, file.nonterminals.len()),
        ("terminals", header.terminals, file.terminals.len()),
        ("rules", header.rules, file.rules.len()),
    ] {
        if declared != found {
            errors.push(Rich::custom(
                header.span,
                format!("Header declares {} {}, found {}", declared, section, found),
            ));
        }
    }
    if let Some(queries) = &file.queries {
        if queries.count != queries.words.len() {
            errors.push(Rich::custom(
                queries.span,
                format!(
                    "Query section declares {} words, found {}",
                    queries.count,
                    queries.words.len()
                ),
            ));
        }
    }
    errors
}

fn line_end<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    inline_whitespace().then(newline()).ignored()
}

fn symbol<'src>() -> impl Parser<'src, &'src str, Sym, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| !c.is_whitespace())
        .map_with(|ch, extra| Sym {
            ch,
            span: extra.span(),
        })
        .labelled("symbol")
}

fn count<'src>() -> impl Parser<'src, &'src str, usize, Extra<'src>> + Clone {
    text::digits(10)
        .to_slice()
        .try_map(|digits: &str, span| {
            digits
                .parse::<usize>()
                .map_err(|e| Rich::custom(span, format!("Invalid count: {}", e)))
        })
        .labelled("count")
}

fn header<'src>() -> impl Parser<'src, &'src str, Header, Extra<'src>> + Clone {
    count()
        .then_ignore(inline_whitespace())
        .then(count())
        .then_ignore(inline_whitespace())
        .then(count())
        .padded_by(inline_whitespace())
        .map_with(|((nonterminals, terminals), rules), extra| Header {
            nonterminals,
            terminals,
            rules,
            span: extra.span(),
        })
}

fn symbols<'src>() -> impl Parser<'src, &'src str, Vec<Sym>, Extra<'src>> + Clone {
    symbol().padded_by(inline_whitespace()).repeated().collect()
}

fn rule_line<'src>() -> impl Parser<'src, &'src str, RuleLine, Extra<'src>> + Clone {
    inline_whitespace()
        .ignore_then(symbol())
        .then_ignore(just("->").padded_by(inline_whitespace()))
        .then(symbol().then_ignore(inline_whitespace()).repeated().collect::<Vec<_>>())
        .map_with(|(from, to), extra| RuleLine {
            from,
            to,
            span: extra.span(),
        })
}

fn queries<'src>() -> impl Parser<'src, &'src str, Queries<'src>, Extra<'src>> + Clone {
    let word = any()
        .filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .to_slice();
    count()
        .padded_by(inline_whitespace())
        .then(whitespace().ignore_then(word).repeated().collect::<Vec<_>>())
        .map_with(|(count, words), extra| Queries {
            count,
            words,
            span: extra.span(),
        })
}
