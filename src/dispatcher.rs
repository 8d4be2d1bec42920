//! # Command Dispatcher
//! Walks a parsed command list once, resolving each command's handler by
//! name from a fixed catalog. A selection command runs exactly once; a
//! mutation command runs once per `(r, c)` of the current selection, in
//! row-major order, with the context cursor set before each invocation. The
//! first handler to return an error stops the walk immediately.
use crate::command::{CommandKind, CommandRecord, ParamValue};
use crate::context::{parse_var_name, ExecutionContext, Selection};
use crate::error::SpsError;
use crate::numeric::{format_g, is_valid_number, parse_numeric};
use crate::table::Table;

const LAST: i64 = -1;

/// Runs every command in `commands` against `table`, threading one
/// [`ExecutionContext`] through the whole script.
pub fn run(commands: &[CommandRecord], table: &mut Table) -> Result<(), SpsError> {
    let mut ctx = ExecutionContext::new();

    for cmd in commands {
        log::trace!("dispatch {} ({:?})", cmd.name, cmd.kind);
        match cmd.kind {
            CommandKind::Selection => run_selection(cmd, table, &mut ctx)?,
            CommandKind::Mutation => {
                let sel = ctx.live;
                for r in sel.row_from..=sel.row_to {
                    for c in sel.col_from..=sel.col_to {
                        ctx.cur_row = r;
                        ctx.cur_col = c;
                        run_mutation(cmd, table, &mut ctx)?;
                    }
                }
            }
        }
    }

    Ok(())
}

fn run_selection(cmd: &CommandRecord, table: &mut Table, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    match cmd.name.as_str() {
        "select" => select(cmd, table, ctx),
        "min" | "max" => min_max(cmd, table, ctx),
        "find" => find(cmd, table, ctx),
        "set-v" => {
            ctx.save_selection();
            Ok(())
        }
        _ => Err(SpsError::UnknownCommand),
    }
}

fn run_mutation(cmd: &CommandRecord, table: &mut Table, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    match cmd.name.as_str() {
        "irow" => {
            table.insert_row(ctx.cur_row)?;
            Ok(())
        }
        "arow" => {
            table.insert_row(ctx.cur_row + 1)?;
            Ok(())
        }
        "drow" => {
            table.delete_row(ctx.cur_row);
            Ok(())
        }
        "icol" => table.insert_column(ctx.cur_col),
        "acol" => table.insert_column(ctx.cur_col + 1),
        "dcol" => {
            table.delete_column(ctx.cur_col);
            Ok(())
        }
        "set" => {
            let value = cmd.params.first().map_or(&b""[..], |p| p.raw.as_slice());
            table.set_cell(ctx.cur_row, ctx.cur_col, value);
            Ok(())
        }
        "clear" => {
            table.set_cell(ctx.cur_row, ctx.cur_col, b"");
            Ok(())
        }
        "swap" => swap(cmd, table, ctx),
        "sum" | "avg" => sum_avg(cmd, table, ctx),
        "count" => count(cmd, table, ctx),
        "len" => len(cmd, table, ctx),
        "def" => def_var(cmd, table, ctx),
        "use" => use_var(cmd, table, ctx),
        "inc" => inc_var(cmd, ctx),
        _ => Err(SpsError::UnknownCommand),
    }
}

/// Resolves one `[R,C]`/`[R1,C1,R2,C2]`/`[_]` bracket argument pair to a
/// concrete 1-based row/column, where `LAST` means "the table's current
/// last row/column" — used both by `select`'s own parameters and by the
/// inline `[R,C]` argument several mutation commands take.
fn resolve_axis(param: Option<&crate::command::Param>, last: usize) -> Option<i64> {
    match param.map(|p| p.value) {
        Some(ParamValue::Int(n)) => Some(n),
        Some(ParamValue::Last) => Some(last as i64),
        Some(ParamValue::Unset) | None => None,
    }
}

fn select(cmd: &CommandRecord, table: &mut Table, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    let p = &cmd.params;

    // `[_]`: a single LAST parameter restores the saved selection.
    if p.len() == 1 && p[0].is_last() {
        return ctx.load_selection();
    }

    if p.len() >= 4 {
        let row_from = p[0].as_int().filter(|&n| n != LAST).ok_or(SpsError::BadSelection)?;
        let col_from = p[1].as_int().filter(|&n| n != LAST).ok_or(SpsError::BadSelection)?;
        let row_to = resolve_axis(p.get(2), table.rows()).ok_or(SpsError::BadSelection)?;
        let col_to = resolve_axis(p.get(3), table.cols()).ok_or(SpsError::BadSelection)?;
        if row_from > row_to || col_from > col_to || row_from < 1 || col_from < 1 {
            return Err(SpsError::BadSelection);
        }
        ctx.live = Selection {
            row_from: row_from as usize,
            row_to: row_to as usize,
            col_from: col_from as usize,
            col_to: col_to as usize,
        };
    } else {
        let row = match p.first().map(|p| p.value) {
            Some(ParamValue::Last) => (1, table.rows()),
            Some(ParamValue::Int(n)) if n >= 1 => (n as usize, n as usize),
            _ => return Err(SpsError::BadSelection),
        };
        let col = p.get(1).map(|p| p.value);
        let col = match col {
            Some(ParamValue::Last) => (1, table.cols()),
            Some(ParamValue::Int(n)) if n >= 1 => (n as usize, n as usize),
            _ => return Err(SpsError::BadSelection),
        };
        ctx.live = Selection { row_from: row.0, row_to: row.1, col_from: col.0, col_to: col.1 };
    }

    // Auto-grow, never shrink; re-align follows inside `Table::resize`.
    let new_rows = ctx.live.row_to.max(table.rows());
    let new_cols = ctx.live.col_to.max(table.cols());
    if new_rows > table.rows() || new_cols > table.cols() {
        table.resize(new_rows, new_cols)?;
    }

    Ok(())
}

fn min_max(cmd: &CommandRecord, table: &Table, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    let sel = ctx.live;
    let want_min = cmd.name == "min";
    let mut best: Option<(usize, usize, f64)> = None;

    for r in sel.row_from..=sel.row_to {
        for c in sel.col_from..=sel.col_to {
            let Some(cell) = table.get_cell(r, c) else { continue };
            if !is_valid_number(cell) {
                continue;
            }
            let n = parse_numeric(cell);
            let better = match best {
                None => true,
                Some((_, _, cur)) => {
                    if want_min {
                        n < cur
                    } else {
                        n > cur
                    }
                }
            };
            if better {
                best = Some((r, c, n));
            }
        }
    }

    let (r, c, _) = best.ok_or(SpsError::BadSelection)?;
    ctx.live = Selection { row_from: r, row_to: r, col_from: c, col_to: c };
    Ok(())
}

fn find(cmd: &CommandRecord, table: &Table, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    let needle = cmd.params.first().map_or(&b""[..], |p| p.raw.as_slice());
    if needle.is_empty() {
        return Err(SpsError::BadSelection);
    }

    let sel = ctx.live;
    for r in sel.row_from..=sel.row_to {
        for c in sel.col_from..=sel.col_to {
            if let Some(cell) = table.get_cell(r, c) {
                if contains(cell, needle) {
                    ctx.live = Selection { row_from: r, row_to: r, col_from: c, col_to: c };
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Resolves a mutation command's `[R,C]` argument slots (the first two
/// parameters) to an in-bounds cell: both must be positive integers and
/// address a cell that exists right now.
fn arg_cell(cmd: &CommandRecord, table: &Table) -> Result<(usize, usize), SpsError> {
    let r = cmd.params.first().and_then(|p| p.as_int()).filter(|&n| n >= 1);
    let c = cmd.params.get(1).and_then(|p| p.as_int()).filter(|&n| n >= 1);
    match (r, c) {
        (Some(r), Some(c)) if table.get_cell(r as usize, c as usize).is_some() => Ok((r as usize, c as usize)),
        _ => Err(SpsError::BadArgumentCell),
    }
}

fn swap(cmd: &CommandRecord, table: &mut Table, ctx: &ExecutionContext) -> Result<(), SpsError> {
    let (r, c) = arg_cell(cmd, table)?;
    let cur = table.get_cell(ctx.cur_row, ctx.cur_col).unwrap_or(&[]).to_vec();
    let other = table.get_cell(r, c).unwrap_or(&[]).to_vec();
    table.set_cell(ctx.cur_row, ctx.cur_col, &other);
    table.set_cell(r, c, &cur);
    Ok(())
}

fn sum_avg(cmd: &CommandRecord, table: &mut Table, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    let (r, c) = arg_cell(cmd, table)?;
    let sel = ctx.live;

    if ctx.cur_row == sel.row_from && ctx.cur_col == sel.col_from {
        ctx.accum = 0.0;
    }

    let cell = table.get_cell(ctx.cur_row, ctx.cur_col).unwrap_or(&[]);
    if is_valid_number(cell) {
        ctx.accum += parse_numeric(cell);
    }

    if ctx.cur_row == sel.row_to && ctx.cur_col == sel.col_to {
        let result = if cmd.name == "avg" {
            let count = (sel.row_to - sel.row_from + 1) * (sel.col_to - sel.col_from + 1);
            ctx.accum / count as f64
        } else {
            ctx.accum
        };
        table.set_cell(r, c, format_g(result).as_bytes());
    }

    Ok(())
}

fn count(cmd: &CommandRecord, table: &mut Table, ctx: &ExecutionContext) -> Result<(), SpsError> {
    let (r, c) = arg_cell(cmd, table)?;
    let sel = ctx.live;

    if ctx.cur_row == sel.row_from && ctx.cur_col == sel.col_from {
        table.set_cell(r, c, b"0");
    }

    let source = table.get_cell(ctx.cur_row, ctx.cur_col).unwrap_or(&[]);
    if !source.is_empty() {
        let current = table.get_cell(r, c).unwrap_or(b"0");
        let n: i64 = std::str::from_utf8(current).ok().and_then(|s| s.parse().ok()).unwrap_or(0);
        table.set_cell(r, c, (n + 1).to_string().as_bytes());
    }

    Ok(())
}

fn len(cmd: &CommandRecord, table: &mut Table, ctx: &ExecutionContext) -> Result<(), SpsError> {
    let (r, c) = arg_cell(cmd, table)?;
    let length = table.get_cell(ctx.cur_row, ctx.cur_col).unwrap_or(&[]).len();
    table.set_cell(r, c, length.to_string().as_bytes());
    Ok(())
}

fn var_index(cmd: &CommandRecord) -> Result<usize, SpsError> {
    let raw = cmd.params.first().map(|p| p.raw.as_slice()).unwrap_or(&[]);
    parse_var_name(raw).ok_or(SpsError::BadArgumentCell)
}

fn def_var(cmd: &CommandRecord, table: &Table, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    let idx = var_index(cmd)?;
    let value = table.get_cell(ctx.cur_row, ctx.cur_col).unwrap_or(&[]).to_vec();
    ctx.put_var(idx, &value);
    Ok(())
}

fn use_var(cmd: &CommandRecord, table: &mut Table, ctx: &ExecutionContext) -> Result<(), SpsError> {
    let idx = var_index(cmd)?;
    let value = ctx.get_var(idx).to_vec();
    table.set_cell(ctx.cur_row, ctx.cur_col, &value);
    Ok(())
}

fn inc_var(cmd: &CommandRecord, ctx: &mut ExecutionContext) -> Result<(), SpsError> {
    let idx = var_index(cmd)?;
    let value = parse_numeric(ctx.get_var(idx)) + 1.0;
    ctx.put_var(idx, format_g(value).as_bytes());
    Ok(())
}
