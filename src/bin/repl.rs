use clap::Parser;
use dotlisp::builtinops::primitives;
use dotlisp::desugar::{desugar, paren_depth};
use dotlisp::{Environment, Expr, LispError, evaluator, parser};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use std::process::ExitCode;

/// Read-eval-print loop for the dotted-pair Lisp
#[derive(Parser, Debug)]
#[command(name = "dotlisp-repl", version, about)]
struct Args {
    /// Evaluate every expression in FILE instead of starting an interactive session
    file: Option<PathBuf>,

    /// Accept canonical dotted-pair syntax only (no whitespace desugaring)
    #[arg(long)]
    strict: bool,

    /// Print results with spaces instead of dots, e.g. (a (b nil))
    #[arg(long)]
    loose: bool,

    /// Evaluate without the t/nil truth bindings
    #[arg(long)]
    empty_env: bool,

    #[arg(long, default_value = "λ> ")]
    prompt: String,
}

/// Settings shared by interactive and script mode
struct Session {
    strict: bool,
    loose: bool,
    empty_env: bool,
}

impl Session {
    fn initial_env(&self) -> Environment {
        if self.empty_env {
            Environment::empty()
        } else {
            Environment::new()
        }
    }

    /// Desugar, read and evaluate one complete input with a fresh environment
    fn evaluate(&self, text: &str) -> Result<Expr, LispError> {
        let source = if self.strict {
            text.trim().to_string()
        } else {
            desugar(text)
        };
        let expr = parser::parse(&source)?;
        evaluator::eval(&expr, &self.initial_env())
    }

    fn render(&self, expr: &Expr) -> String {
        if self.loose {
            format!("{:#}", expr)
        } else {
            expr.to_string()
        }
    }

    /// Evaluate and print; returns false if the input failed
    fn run(&self, text: &str) -> bool {
        match self.evaluate(text) {
            Ok(result) => {
                println!("{}", self.render(&result));
                true
            }
            Err(e) if e.is_read_error() => {
                println!("parse error: {}", e);
                false
            }
            Err(e) => {
                println!("error: {}", e);
                false
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let session = Session {
        strict: args.strict,
        loose: args.loose,
        empty_env: args.empty_env,
    };

    match &args.file {
        Some(path) => run_file(&session, path),
        None => run_interactive(&session, &args.prompt),
    }
}

/// Split script text into complete inputs, one per balanced group of lines
fn split_inputs(text: &str) -> Vec<String> {
    let mut inputs = Vec::new();
    let mut pending = String::new();
    let mut depth = 0;

    for line in text.lines() {
        if line.trim().is_empty() && pending.is_empty() {
            continue;
        }
        depth += paren_depth(line);
        pending.push_str(line);
        pending.push('\n');
        if depth <= 0 {
            inputs.push(std::mem::take(&mut pending));
            depth = 0;
        }
    }
    if !pending.trim().is_empty() {
        inputs.push(pending);
    }
    inputs
}

fn run_file(session: &Session, path: &PathBuf) -> ExitCode {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("cannot read {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut ok = true;
    for input in split_inputs(&text) {
        ok &= session.run(&input);
    }
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_interactive(session: &Session, prompt: &str) -> ExitCode {
    println!("dotlisp REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for commands, Ctrl+D to quit.");
    println!();

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("cannot start line editor: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut pending = String::new();
    let mut depth = 0;

    loop {
        let current_prompt = if pending.is_empty() { prompt } else { ".. " };
        match rl.readline(current_prompt) {
            Ok(line) => {
                if pending.is_empty() {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    // Handle special commands
                    match trimmed {
                        ":help" => {
                            print_help();
                            continue;
                        }
                        ":env" => {
                            print_environment(&session.initial_env());
                            continue;
                        }
                        ":quit" | ":exit" => {
                            println!("Goodbye!");
                            break;
                        }
                        _ => {}
                    }
                }

                depth += paren_depth(&line);
                pending.push_str(&line);
                pending.push('\n');

                // Keep reading until the parentheses balance
                if depth > 0 {
                    continue;
                }

                let _ = rl.add_history_entry(pending.trim());
                session.run(&pending);
                pending.clear();
                depth = 0;
            }
            Err(ReadlineError::Interrupted) => {
                if !pending.is_empty() {
                    println!("Input discarded.");
                    pending.clear();
                    depth = 0;
                } else {
                    println!("Interrupted. Use Ctrl+D or :quit to exit.");
                }
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn print_help() {
    println!("Commands:");
    println!("  :help    - Show this help message");
    println!("  :env     - Show the bindings each evaluation starts with");
    println!("  :quit    - Exit the interpreter");
    println!("  :exit    - Exit the interpreter");
    println!();
    let names: Vec<&str> = primitives().iter().map(|primitive| primitive.name).collect();
    println!("Primitives: {}", names.join(", "));
    println!("Procedures: ((lambda (params body)) args), ((label (name procedure)) args)");
    println!("Lists are nil-terminated: (a (b nil)) is the list of a and b.");
    println!();
    println!("Examples:");
    println!("  (quote foo)");
    println!("  (atom (quote bar))");
    println!("  (car (cons ((quote foo) (quote (bar nil)))))");
    println!("  (cond ((nil (quote no)) ((t (quote yes)) nil)))");
    println!("  ((lambda ((x nil) (cons (x x)))) ((quote a) nil))");
    println!("  ((label (f (lambda (nil (quote x))))) nil)");
    println!("  (lambda ((x nil) x))   ; a procedure value");
}

fn print_environment(env: &Environment) {
    let mut empty = true;
    for entry in env.entries().flatten() {
        println!("  {}", entry);
        empty = false;
    }
    if empty {
        println!("  (no bindings)");
    }
}
