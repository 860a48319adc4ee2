//! Parser table contract.

/// Status returned by a parser's execute procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserResult {
    /// Command decoded and executed.
    Ok,
    /// Command decoded but its execution failed.
    Error,
    /// Command claimed but its arguments did not decode.
    Invalid,
    /// Command executed and requests termination of the dispatch loop.
    Quit,
}

/// One entry of the parser table.
///
/// The table is an ordered list of these; the engine tries entries in
/// table order and the first claiming entry wins. There is no ambiguity
/// resolution beyond order.
pub trait CommandParser {
    /// Does this entry claim a command whose first token is `first_token`?
    ///
    /// Matching is case-sensitive and exact; a typical implementation
    /// compares against a fixed keyword.
    fn matches(&self, first_token: &[u8]) -> bool;

    /// Decode and execute. `args` holds the bytes after the keyword
    /// token with leading spaces stripped; it may be empty.
    fn execute(&mut self, args: &[u8]) -> ParserResult;
}

/// First space-delimited token of a command line.
pub(crate) fn first_token(line: &[u8]) -> &[u8] {
    let end = line.iter().position(|&b| b == b' ').unwrap_or(line.len());
    &line[..end]
}

/// Argument bytes after the first token, leading spaces stripped.
pub(crate) fn args_of(line: &[u8]) -> &[u8] {
    let end = line.iter().position(|&b| b == b' ').unwrap_or(line.len());
    let rest = &line[end..];
    let skip = rest.iter().position(|&b| b != b' ').unwrap_or(rest.len());
    &rest[skip..]
}
