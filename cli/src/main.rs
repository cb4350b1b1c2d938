//! The Vesper CLI: evaluate files, or read expressions from a prompt.

use clap::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use vesper_engine::Context;

/// Vesper is a JavaScript runtime core written in Rust.
#[derive(Debug, Parser)]
#[command(author, version, about, name = "vesper")]
struct Opt {
    /// The JavaScript file(s) to be evaluated.
    #[arg(name = "FILE")]
    files: Vec<PathBuf>,

    /// Print collector statistics after each evaluation.
    #[arg(long)]
    debug_gc: bool,
}

fn main() -> ExitCode {
    let args = Opt::parse();
    let mut context = Context::new();

    if args.files.is_empty() {
        repl(&mut context, args.debug_gc);
        return ExitCode::SUCCESS;
    }

    for file in &args.files {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("vesper: could not read {}: {error}", file.display());
                return ExitCode::FAILURE;
            }
        };
        let filename = file.display().to_string();
        match context.eval_with_filename(&source, &filename) {
            Ok(_) => {}
            Err(error) => {
                eprintln!("{}", context.report_uncaught(&error));
                return ExitCode::FAILURE;
            }
        }
        if args.debug_gc {
            print_gc_stats(&context);
        }
    }
    ExitCode::SUCCESS
}

fn repl(context: &mut Context, debug_gc: bool) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ".exit" {
            break;
        }
        if line == ".gc" {
            context.force_gc();
            print_gc_stats(context);
            continue;
        }

        match context.eval(line) {
            Ok(value) => println!("{}", value.display()),
            Err(error) => eprintln!("{}", context.report_uncaught(&error)),
        }
        if debug_gc {
            print_gc_stats(context);
        }
    }
}

fn print_gc_stats(context: &Context) {
    let stats = context.gc_stats();
    println!(
        "gc: {} live objects ({} bytes), {} allocations, {} collections",
        stats.live_objects(),
        stats.live_bytes(),
        stats.allocations,
        stats.collections,
    );
}
