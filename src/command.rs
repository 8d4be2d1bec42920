//! # Script Parser
//! Tokenizes a command-script byte string into an ordered list of
//! [`CommandRecord`]s. The grammar has two shapes — a bracket selection
//! (`[R,C]`, `[R1,C1,R2,C2]`, `[_]`) and a named command optionally framed
//! in brackets — and both funnel through the same per-byte scan so that a
//! bracketed argument list can appear either at the head of a command (where
//! it also sets the command's name and type) or mid-command, as the
//! argument to `swap`, `sum`, `avg`, `count`, or `len`.
use crate::error::SpsError;

/// Whether a parsed command runs once (`Selection`) or once per cell of the
/// current selection (`Mutation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Selection,
    Mutation,
}

/// What a parameter's raw string resolved to, replacing the original's
/// parallel `intParams`/`strParams` arrays with one tagged value per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    /// The raw text was `_` or `-`: the LAST sentinel.
    Last,
    /// The raw text parsed as a nonzero base-10 integer.
    Int(i64),
    /// The raw text was empty, parsed to zero, or did not parse at all.
    Unset,
}

/// One parameter slot: the raw bytes as written in the script, and the
/// value they resolved to once the whole script had been tokenized.
#[derive(Debug, Clone)]
pub struct Param {
    pub raw: Vec<u8>,
    pub value: ParamValue,
}

impl Param {
    fn new(raw: Vec<u8>) -> Self {
        let value = if raw == b"_" || raw == b"-" {
            ParamValue::Last
        } else {
            match std::str::from_utf8(&raw).ok().and_then(|s| s.parse::<i64>().ok()) {
                Some(n) if n != 0 => ParamValue::Int(n),
                _ => ParamValue::Unset,
            }
        };
        Self { raw, value }
    }

    /// The resolved integer, if this slot held the LAST sentinel or a real
    /// nonzero number — `Last` is reported as `-1` (the `LAST` sentinel
    /// convention), for callers that want one numeric type.
    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            ParamValue::Int(n) => Some(n),
            ParamValue::Last => Some(-1),
            ParamValue::Unset => None,
        }
    }

    pub fn is_last(&self) -> bool {
        matches!(self.value, ParamValue::Last)
    }
}

/// One parsed command: its dispatch type, its name, and its parameters in
/// the order they appeared in the script.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub kind: CommandKind,
    pub name: String,
    pub params: Vec<Param>,
}

/// Parses a full command script into an ordered list of commands.
///
/// `;` ends a command; an unescaped space ends a parameter. A `[` that is
/// the first byte of a token and is immediately followed by a digit or `_`
/// opens a comma-separated bracket list that fills consecutive parameter
/// slots starting at the current one — this is how `[R,C]`-style selections
/// are parsed both as a whole command (`select`) and as a later argument to
/// commands like `swap`. A lone `[` at the very start of a command instead
/// just marks the command as selection-typed and is otherwise discarded;
/// the matching `]` before a space, `;`, or end of string is always
/// discarded silently.
pub fn parse_script(script: &[u8]) -> Result<Vec<CommandRecord>, SpsError> {
    let mut commands = Vec::new();

    if script.is_empty() {
        return Ok(commands);
    }

    let mut kind = CommandKind::Mutation;
    let mut name: Vec<u8> = Vec::new();
    let mut params: Vec<Vec<u8>> = Vec::new();
    let mut param_i: usize = 0;
    let mut cmd_i: usize = 0;

    let len = script.len();
    let mut i = 0usize;

    while i < len {
        let c = script[i];

        if c == b';' {
            push_command(&mut commands, kind, &name, &params);
            kind = CommandKind::Mutation;
            name = Vec::new();
            params = Vec::new();
            param_i = 0;
            cmd_i = 0;
            i += 1;
            continue;
        }

        if c == b' ' && !(i > 0 && script[i - 1] == b'\\') {
            param_i += 1;
            cmd_i = 0;
            i += 1;
            continue;
        }

        if cmd_i == 0 && c == b'[' && i + 1 < len && (script[i + 1].is_ascii_digit() || script[i + 1] == b'_') {
            i += 1;
            if param_i == 0 {
                kind = CommandKind::Selection;
                name = b"select".to_vec();
                param_i = 1;
            }
            loop {
                if i >= len {
                    return Err(SpsError::MalformedScript);
                }
                let b = script[i];
                if b == b']' || b == b';' {
                    break;
                }
                if b == b',' {
                    param_i += 1;
                    cmd_i = 0;
                } else {
                    while params.len() < param_i {
                        params.push(Vec::new());
                    }
                    params[param_i - 1].push(b);
                    cmd_i += 1;
                }
                i += 1;
            }
            if script[i] == b';' {
                return Err(SpsError::MalformedScript);
            }
            i += 1;
            continue;
        }

        if c == b']' && (i + 1 >= len || script[i + 1] == b' ' || script[i + 1] == b';') {
            i += 1;
            continue;
        }

        if param_i == 0 {
            if cmd_i == 0 && c == b'[' {
                kind = CommandKind::Selection;
                i += 1;
                continue;
            }
            name.push(c);
            cmd_i += 1;
            i += 1;
            continue;
        }

        if c == b'\\' && !(i > 0 && script[i - 1] == b'\\') {
            i += 1;
            continue;
        }
        while params.len() < param_i {
            params.push(Vec::new());
        }
        params[param_i - 1].push(c);
        cmd_i += 1;
        i += 1;
    }

    push_command(&mut commands, kind, &name, &params);
    Ok(commands)
}

fn push_command(commands: &mut Vec<CommandRecord>, kind: CommandKind, name: &[u8], params: &[Vec<u8>]) {
    let mut name_str = String::from_utf8_lossy(name).into_owned();
    if name_str == "set" && kind == CommandKind::Selection {
        name_str = "set-v".to_string();
    }
    let params = params.iter().cloned().map(Param::new).collect();
    commands.push(CommandRecord { kind, name: name_str, params });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_pair_is_a_select_command() {
        let cmds = parse_script(b"[2,2]").unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, CommandKind::Selection);
        assert_eq!(cmds[0].name, "select");
        assert_eq!(cmds[0].params[0].as_int(), Some(2));
        assert_eq!(cmds[0].params[1].as_int(), Some(2));
    }

    #[test]
    fn row_ops_script_has_three_commands() {
        let cmds = parse_script(b"[2,2];irow;set Z").unwrap();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[1].name, "irow");
        assert_eq!(cmds[1].kind, CommandKind::Mutation);
        assert_eq!(cmds[2].name, "set");
        assert_eq!(cmds[2].params[0].raw, b"Z");
    }

    #[test]
    fn named_bracket_form_is_selection_typed() {
        let cmds = parse_script(b"[1,1,2,3];[min];set M").unwrap();
        assert_eq!(cmds[1].kind, CommandKind::Selection);
        assert_eq!(cmds[1].name, "min");
        assert!(cmds[1].params.is_empty());
    }

    #[test]
    fn set_inside_brackets_is_rewritten_to_set_v() {
        let cmds = parse_script(b"[set]").unwrap();
        assert_eq!(cmds[0].name, "set-v");
        assert_eq!(cmds[0].kind, CommandKind::Selection);
    }

    #[test]
    fn bare_set_outside_brackets_keeps_its_name() {
        let cmds = parse_script(b"set hello").unwrap();
        assert_eq!(cmds[0].name, "set");
        assert_eq!(cmds[0].kind, CommandKind::Mutation);
    }

    #[test]
    fn inline_bracket_argument_to_a_named_command() {
        let cmds = parse_script(b"sum [1,1]").unwrap();
        assert_eq!(cmds[0].name, "sum");
        assert_eq!(cmds[0].kind, CommandKind::Mutation);
        assert_eq!(cmds[0].params[0].as_int(), Some(1));
        assert_eq!(cmds[0].params[1].as_int(), Some(1));
    }

    #[test]
    fn empty_script_parses_to_no_commands() {
        assert_eq!(parse_script(b"").unwrap().len(), 0);
    }

    #[test]
    fn variable_roundtrip_script_parses_five_commands() {
        let cmds = parse_script(b"[1,1];def _3;inc _3;[1,2];use _3").unwrap();
        assert_eq!(cmds.len(), 5);
        assert_eq!(cmds[1].name, "def");
        assert_eq!(cmds[1].params[0].raw, b"_3");
    }

    #[test]
    fn unterminated_bracket_is_malformed() {
        let err = parse_script(b"[1,2;foo").unwrap_err();
        assert!(matches!(err, SpsError::MalformedScript));
    }

    #[test]
    fn escaped_space_is_a_literal_space_in_a_parameter() {
        let cmds = parse_script(b"set a\\ b").unwrap();
        assert_eq!(cmds[0].params[0].raw, b"a b");
    }

    #[test]
    fn doubled_backslash_in_a_parameter_is_one_literal_backslash() {
        let cmds = parse_script(b"set a\\\\b").unwrap();
        assert_eq!(cmds[0].params[0].raw, b"a\\b");
    }

    #[test]
    fn underscore_and_dash_resolve_to_the_last_sentinel() {
        assert!(matches!(Param::new(b"_".to_vec()).value, ParamValue::Last));
        assert!(matches!(Param::new(b"-".to_vec()).value, ParamValue::Last));
        assert_eq!(Param::new(b"_".to_vec()).as_int(), Some(-1));
    }

    #[test]
    fn zero_and_unparsable_text_stay_unset() {
        assert!(matches!(Param::new(b"0".to_vec()).value, ParamValue::Unset));
        assert!(matches!(Param::new(b"".to_vec()).value, ParamValue::Unset));
        assert!(matches!(Param::new(b"abc".to_vec()).value, ParamValue::Unset));
    }

    #[test]
    fn negative_number_other_than_bare_dash_is_a_real_integer() {
        assert_eq!(Param::new(b"-3".to_vec()).as_int(), Some(-3));
    }
}
