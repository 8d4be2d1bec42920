//! # sps — batch spreadsheet editor
//! Reads a delimited text table from a file, runs an ordered script of
//! selection and mutation commands against it, and writes the result back
//! to the same file. One run, one script, no interactive loop.
use std::process::ExitCode;

mod cli;
mod codec;
mod command;
mod context;
mod dispatcher;
mod error;
mod numeric;
mod table;

use error::SpsError;

fn run() -> Result<(), SpsError> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    log::debug!("argv = {:?}", argv);
    let cli = cli::parse_args(&argv)?;

    let input = std::fs::read(&cli.file).map_err(|_| SpsError::FileOpenFailed)?;
    log::debug!("read {} bytes from {}", input.len(), cli.file);

    let mut table = codec::decode_table(&input, &cli.delimiters)?;
    log::debug!("decoded table: {} rows x {} cols", table.rows(), table.cols());

    let commands = command::parse_script(cli.script.as_bytes())?;
    log::debug!("parsed {} commands", commands.len());

    dispatcher::run(&commands, &mut table)?;
    log::debug!("dispatch finished: {} rows x {} cols", table.rows(), table.cols());

    let output = codec::encode_table(&mut table, &cli.delimiters);
    std::fs::write(&cli.file, output).map_err(|_| SpsError::FileOpenFailed)?;

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("prog: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
