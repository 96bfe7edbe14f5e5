use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::SurfaceError;

#[derive(Parser)]
#[grammar = "surface/ctl.pest"]
struct CtlParser;

/// A verb written to the `ctl` channel.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CtlCommand {
    Name(String),
    Clean,
    Show,
    DotEqAddr,
    /// Close, refusing if there are unsaved changes.
    Del,
    /// Close unconditionally.
    Delete,
}

fn protocol_error(channel: &'static str, message: &str, reason: impl ToString) -> SurfaceError {
    SurfaceError::Protocol {
        channel,
        message: message.to_string(),
        reason: reason.to_string(),
    }
}

fn first_inner<'i>(
    pair: Pair<'i, Rule>,
    channel: &'static str,
    message: &str,
) -> Result<Pair<'i, Rule>, SurfaceError> {
    pair.into_inner()
        .next()
        .ok_or_else(|| protocol_error(channel, message, "empty message"))
}

fn parse_number(pair: &Pair<Rule>, input: &str) -> Result<usize, SurfaceError> {
    pair.as_str()
        .trim_start_matches('#')
        .parse()
        .map_err(|e| protocol_error("addr", input, e))
}

/// Parses `#n`, the empty range before char `n`.
pub(crate) fn parse_address<S: AsRef<str>>(input: S) -> Result<usize, SurfaceError> {
    let input = input.as_ref();
    let mut pairs = CtlParser::parse(Rule::address, input)
        .map_err(|e| protocol_error("addr", input, e))?;
    let address = pairs
        .next()
        .ok_or_else(|| protocol_error("addr", input, "empty message"))?;
    let pair = first_inner(address, "addr", input)?;

    match pair.as_rule() {
        Rule::char_offset => parse_number(&pair, input),
        other => Err(protocol_error(
            "addr",
            input,
            format!("unexpected {:?}", other),
        )),
    }
}

pub(crate) fn parse_ctl<S: AsRef<str>>(input: S) -> Result<CtlCommand, SurfaceError> {
    let input = input.as_ref();
    let mut pairs =
        CtlParser::parse(Rule::ctl, input).map_err(|e| protocol_error("ctl", input, e))?;
    let ctl = pairs
        .next()
        .ok_or_else(|| protocol_error("ctl", input, "empty message"))?;
    let pair = first_inner(ctl, "ctl", input)?;

    match pair.as_rule() {
        Rule::name => {
            let name = first_inner(pair, "ctl", input)?;
            Ok(CtlCommand::Name(name.as_str().to_string()))
        }
        Rule::clean => Ok(CtlCommand::Clean),
        Rule::show => Ok(CtlCommand::Show),
        Rule::dot_addr => Ok(CtlCommand::DotEqAddr),
        Rule::delete => Ok(CtlCommand::Delete),
        Rule::del => Ok(CtlCommand::Del),
        other => Err(protocol_error("ctl", input, format!("unexpected {:?}", other))),
    }
}
