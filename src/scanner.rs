//! Token stream over `saphyr_parser::Parser`.
//!
//! Responsibilities
//! - Translate borrowed parser events into owned tokens with 1-indexed locations.
//! - Hide stream markers; keep document boundaries.
//! - Spell and normalize explicit tags.
//! - Enforce the optional [`Budget`] on every raw event.
//! - Offer one token of lookahead.

use saphyr_parser::{Event, Parser, StrInput};

use crate::budget::{Budget, BudgetEnforcer, BudgetReport};
use crate::error::Error;
use crate::location::{Location, location_from_span};
use crate::node::ScalarStyle;
use crate::tags::tag_from_parser;

/// Anchor ids are assigned by the parser; `0` means "no anchor".
pub(crate) type AnchorId = usize;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    DocumentStart,
    DocumentEnd,
    Scalar {
        value: String,
        style: ScalarStyle,
        anchor: AnchorId,
        tag: Option<String>,
    },
    SequenceStart {
        anchor: AnchorId,
        tag: Option<String>,
    },
    SequenceEnd,
    MappingStart {
        anchor: AnchorId,
        tag: Option<String>,
    },
    MappingEnd,
    Alias {
        anchor: AnchorId,
    },
}

pub(crate) struct Scanner<'a> {
    parser: Parser<'a, StrInput<'a>>,
    look: Option<(Token, Location)>,
    budget: Option<BudgetEnforcer>,
    /// Depth limit reported when the budget trips on nesting.
    budget_depth: usize,
    /// Report captured when the budget tripped.
    breach_report: Option<BudgetReport>,
    last_location: Location,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str, budget: Option<Budget>) -> Self {
        let budget_depth = budget.as_ref().map_or(usize::MAX, |b| b.max_depth);
        Self {
            parser: Parser::new_from_str(input),
            look: None,
            budget: budget.map(BudgetEnforcer::new),
            budget_depth,
            breach_report: None,
            last_location: Location::UNKNOWN,
            finished: false,
        }
    }

    /// Location of the last token handed out.
    pub(crate) fn last_location(&self) -> Location {
        self.last_location
    }

    pub(crate) fn peek(&mut self) -> Result<Option<&Token>, Error> {
        if self.look.is_none() {
            self.look = self.pull()?;
        }
        Ok(self.look.as_ref().map(|(tok, _)| tok))
    }

    pub(crate) fn next(&mut self) -> Result<Option<(Token, Location)>, Error> {
        let item = match self.look.take() {
            Some(item) => Some(item),
            None => self.pull()?,
        };
        if let Some((_, location)) = &item {
            self.last_location = *location;
        }
        Ok(item)
    }

    /// Close the scan and return the budget report, if a budget was configured.
    pub(crate) fn finish(mut self) -> Option<BudgetReport> {
        if let Some(report) = self.breach_report.take() {
            return Some(report);
        }
        self.budget.take().map(BudgetEnforcer::finalize)
    }

    fn pull(&mut self) -> Result<Option<(Token, Location)>, Error> {
        while !self.finished {
            let Some(item) = self.parser.next() else {
                self.finished = true;
                break;
            };
            let (event, span) = item.map_err(Error::from_scan_error)?;
            let location = location_from_span(&span);

            let breach = match self.budget.as_mut() {
                Some(enforcer) => enforcer.observe(&event).err(),
                None => None,
            };
            if let Some(breach) = breach {
                self.breach_report = self
                    .budget
                    .take()
                    .map(|enforcer| enforcer.into_report(breach.clone()));
                self.finished = true;
                return Err(Error::budget(breach, self.budget_depth).with_location(location));
            }

            let token = match event {
                Event::StreamStart | Event::Nothing => continue,
                Event::StreamEnd => {
                    self.finished = true;
                    break;
                }
                Event::DocumentStart(_) => Token::DocumentStart,
                Event::DocumentEnd => Token::DocumentEnd,
                Event::Alias(anchor) => Token::Alias { anchor },
                Event::Scalar(value, style, anchor, tag) => Token::Scalar {
                    value: value.into_owned(),
                    style: style.into(),
                    anchor,
                    tag: tag.as_ref().map(|t| tag_from_parser(t)),
                },
                Event::SequenceStart(anchor, tag) => Token::SequenceStart {
                    anchor,
                    tag: tag.as_ref().map(|t| tag_from_parser(t)),
                },
                Event::SequenceEnd => Token::SequenceEnd,
                Event::MappingStart(anchor, tag) => Token::MappingStart {
                    anchor,
                    tag: tag.as_ref().map(|t| tag_from_parser(t)),
                },
                Event::MappingEnd => Token::MappingEnd,
            };
            return Ok(Some((token, location)));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(input, None);
        let mut out = Vec::new();
        while let Some((tok, _)) = scanner.next().unwrap() {
            out.push(tok);
        }
        out
    }

    #[test]
    fn stream_markers_are_hidden() {
        let toks = tokens("a: !foo 1\n");
        assert_eq!(toks.first(), Some(&Token::DocumentStart));
        assert_eq!(toks.last(), Some(&Token::DocumentEnd));
        assert!(toks.contains(&Token::Scalar {
            value: "1".into(),
            style: ScalarStyle::Plain,
            anchor: 0,
            tag: Some("!foo".into()),
        }));
    }

    #[test]
    fn core_shorthand_is_expanded() {
        let toks = tokens("!!str 5");
        assert!(matches!(
            &toks[1],
            Token::Scalar { tag: Some(tag), .. } if tag == "tag:yaml.org,2002:str"
        ));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut scanner = Scanner::new("[1]", None);
        assert_eq!(scanner.peek().unwrap(), Some(&Token::DocumentStart));
        assert_eq!(scanner.next().unwrap().map(|t| t.0), Some(Token::DocumentStart));
        assert!(matches!(scanner.peek().unwrap(), Some(Token::SequenceStart { .. })));
    }

    #[test]
    fn scan_errors_carry_location() {
        let mut scanner = Scanner::new("a: [1, 2\nb: 3\n", None);
        let err = loop {
            match scanner.next() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a scan error"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, Error::Scan { .. }), "{err:?}");
        assert!(err.location().is_some());
    }

    #[test]
    fn budget_breach_is_reported() {
        let budget = crate::budget! { max_nodes: 2 };
        let mut scanner = Scanner::new("[1, 2, 3]", Some(budget));
        let err = loop {
            match scanner.next() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected a budget error"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, Error::Budget { .. }));
        let report = scanner.finish().unwrap();
        assert!(report.breached.is_some());
    }
}
