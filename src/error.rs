//! # Error Module
//! The single error type shared by every subsystem (table model, codec,
//! script parser, dispatcher). Every fallible operation in the crate
//! returns `Result<T, SpsError>`; `main` turns the outermost error into the
//! one-line diagnostic required by the CLI contract.
use thiserror::Error;

/// Every way a run of `sps` can fail, one variant per diagnosed error kind.
#[derive(Error, Debug)]
pub enum SpsError {
    /// Fewer than 2 positional arguments were given on argv.
    #[error("too few arguments")]
    TooFewArguments,

    /// More than 4 total argv items (after the program name) were given.
    #[error("too many arguments")]
    TooManyArguments,

    /// The input file could not be opened for read, or the output file
    /// could not be opened for write.
    #[error("cannot open file for reading or writing")]
    FileOpenFailed,

    /// A growing structure (row vector, cell vector, or cell buffer) failed
    /// to acquire additional capacity. Unreachable under Rust's default
    /// allocator (which aborts on OOM); retained so the public signatures
    /// can still report it. See DESIGN.md.
    #[error("memory allocation failed")]
    AllocationFailed,

    /// A quoted cell was opened but never closed, or a `"` appeared where
    /// it is not a valid quote border.
    #[error("malformed quoting in input cell")]
    MalformedQuoting,

    /// The command script could not be tokenized: an unclosed `[`, or a
    /// parameter shape the tokenizer does not recognize.
    #[error("malformed command script")]
    MalformedScript,

    /// A command name has no handler in the dispatch catalog.
    #[error("unrecognized command")]
    UnknownCommand,

    /// A selection command's preconditions were violated: an empty `find`
    /// pattern, `min`/`max` over no numeric cells, `R1 > R2` or `C1 > C2`,
    /// or restoring a saved selection that was never set.
    #[error("invalid selection")]
    BadSelection,

    /// A mutation command's `[R,C]` argument did not resolve to a positive,
    /// in-bounds cell coordinate.
    #[error("invalid argument cell")]
    BadArgumentCell,

    /// Any filesystem-level failure not otherwise classified above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpsError {
    /// The exit code this error maps to. Every failure exits 1; there is
    /// no other failure code.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
