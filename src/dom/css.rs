//! CSS reading: inline declarations and flat stylesheets.
//!
//! Tokenizing is done by `cssparser`; values are kept as their source text
//! so they can be written back unchanged.

use cssparser::{
    parse_important, AtRuleParser, CowRcStr, DeclarationParser, Delimiter, ParseError, Parser,
    ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser,
};

/// A `selector { declarations }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

/// Parses `name: value [!important]` into a lower-cased name and the value text.
struct DeclParser;

impl<'i> DeclarationParser<'i> for DeclParser {
    type Declaration = (String, String);
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        input.parse_until_before(Delimiter::Bang, consume_all)?;
        let value = input.slice_from(start).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        let value = value.to_string();

        // The priority is accepted but not kept
        let _ = input.try_parse(parse_important);

        Ok((name.to_ascii_lowercase(), value))
    }
}

impl<'i> AtRuleParser<'i> for DeclParser {
    type Prelude = ();
    type AtRule = (String, String);
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclParser {
    type Prelude = ();
    type QualifiedRule = (String, String);
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, (String, String), ()> for DeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Collects qualified rules; every at-rule is rejected and skipped with its block.
struct RuleParser;

impl<'i> QualifiedRuleParser<'i> for RuleParser {
    type Prelude = String;
    type QualifiedRule = RawRule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        consume_all(input)?;
        let selector = input.slice_from(start).trim();
        if selector.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(selector.to_string())
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Ok(RawRule {
            selector,
            declarations: declarations_from(input),
        })
    }
}

impl<'i> AtRuleParser<'i> for RuleParser {
    type Prelude = ();
    type AtRule = RawRule;
    type Error = ();
}

fn consume_all<'i>(input: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    while input.next().is_ok() {}
    Ok(())
}

fn declarations_from(input: &mut Parser<'_, '_>) -> Vec<(String, String)> {
    RuleBodyParser::new(input, &mut DeclParser)
        .filter_map(|r| match r {
            Ok(decl) => Some(decl),
            Err((e, slice)) => {
                tracing::trace!(?e, slice, "Invalid declaration; ignoring");
                None
            }
        })
        .collect()
}

/// Parse `name: value; name: value` into ordered pairs.
///
/// Property names are lower-cased, `!important` is dropped and
/// declarations without a colon or value are ignored.
pub fn parse_declarations(input: &str) -> Vec<(String, String)> {
    let mut input = ParserInput::new(input);
    let mut parser = Parser::new(&mut input);
    declarations_from(&mut parser)
}

/// Split a stylesheet into rules, in source order.
///
/// At-rules (`@media`, `@font-face`, `@import`, ...) are skipped together
/// with their blocks.
pub fn parse_stylesheet(input: &str) -> Vec<RawRule> {
    let mut input = ParserInput::new(input);
    let mut parser = Parser::new(&mut input);

    StyleSheetParser::new(&mut parser, &mut RuleParser)
        .filter_map(|r| match r {
            Ok(rule) => Some(rule),
            Err((e, slice)) => {
                tracing::trace!(?e, slice, "Skipping rule");
                None
            }
        })
        .collect()
}
