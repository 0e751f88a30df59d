// vline - CLI driver and REPL for the VLine programming language
// Copyright (c) 2025 The VLine Authors. MIT licensed.

use std::env;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process;
use std::rc::Rc;

use vline_core::{Error, HostIo};
use vline_parser::{Lexer, Parser, Token};
use vline_vm::{Context, VM, generate};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Default)]
struct Options {
    file: Option<String>,
    stdin_path: Option<String>,
    stdout_path: Option<String>,
    max_depth: Option<usize>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--in" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or("Can't open file (empty filename)")?;
                options.stdin_path = Some(path.clone());
            }
            "--out" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or("Can't open file (empty filename)")?;
                options.stdout_path = Some(path.clone());
            }
            "--depth" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or("Can't set max depth (empty value)")?;
                let depth = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid depth: {}", value))?;
                options.max_depth = Some(depth);
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option: {}", flag));
            }
            file => {
                if options.file.is_none() {
                    options.file = Some(file.to_string());
                }
            }
        }
        i += 1;
    }
    Ok(options)
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };

    let stdin: Box<dyn BufRead> = match &options.stdin_path {
        Some(path) => match fs::File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Can't open file \"{}\": {}", path, e);
                process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };
    let stdout: Box<dyn Write> = match &options.stdout_path {
        Some(path) => match fs::File::create(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Can't open file \"{}\": {}", path, e);
                process::exit(1);
            }
        },
        None => Box::new(io::stdout()),
    };

    let mut vm = VM::with_io(HostIo::with(stdin, stdout));
    if let Some(depth) = options.max_depth {
        vm.set_max_depth(depth);
    }
    let mut ctx = Context::default();

    match &options.file {
        Some(file) => run_file(file, &mut ctx, &mut vm),
        None => run_repl(&mut ctx, &mut vm),
    }
}

/// Lex, parse, compile, and execute one source unit against the
/// session's context and VM.
fn run_source(source: &str, ctx: &mut Context, vm: &mut VM) -> Result<(), Error> {
    let tokens = Lexer::new(source).tokenize()?;
    let statements = Parser::new(tokens).parse()?;
    let program = generate(&statements, ctx)?;
    vm.run(Rc::new(program), ctx.functions.clone())?;
    Ok(())
}

fn run_file(path: &str, ctx: &mut Context, vm: &mut VM) {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("vl") => {}
        _ => {
            eprintln!("Error: expected a .vl file, got '{}'", path);
            process::exit(1);
        }
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(_) => {
            eprintln!("Can't open file \"{}\" to run.", path);
            process::exit(1);
        }
    };

    if let Err(e) = run_source(&source, ctx, vm) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Net count of opened blocks: block-opening keywords minus `end`s.
/// Zero or below means the buffered input is complete.
fn block_depth(source: &str) -> i64 {
    match Lexer::new(source).tokenize() {
        Ok(tokens) => tokens
            .iter()
            .map(|token| {
                if token.opens_block() {
                    1
                } else if *token == Token::End {
                    -1
                } else {
                    0
                }
            })
            .sum(),
        Err(_) => 0,
    }
}

fn run_repl(ctx: &mut Context, vm: &mut VM) {
    println!("VLine {}", VERSION);
    println!("Type `quit` to exit or type `__version__` to get the interpreter version.");

    loop {
        print!(">>> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }

        match line.trim() {
            "" => continue,
            "quit" => break,
            "__version__" => {
                println!("{}", VERSION);
                continue;
            }
            _ => {}
        }

        // Keep reading while opened blocks remain unclosed.
        let mut source = line;
        while block_depth(&source) > 0 {
            print!("... ");
            let _ = io::stdout().flush();
            let mut continuation = String::new();
            match io::stdin().read_line(&mut continuation) {
                Ok(0) => break,
                Ok(_) => source.push_str(&continuation),
                Err(e) => {
                    eprintln!("Read error: {}", e);
                    break;
                }
            }
        }

        if let Err(e) = run_source(&source, ctx, vm) {
            eprintln!("{}", e);
        }
    }
}
