use conslisp::ast::Value;
use conslisp::evaluator::{Environment, Evaluator};
use conslisp::reader::parse_all;
use conslisp::{Error, ParseErrorKind};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

fn run_repl() {
    println!("ConsLisp - a small dynamically scoped Lisp");
    println!("Enter S-expressions like: (+ 1 2)");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("Could not initialize REPL");
    let mut evaluator = Evaluator::new();

    // Lines of an expression that is still missing closing parens
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { "conslisp> " } else { "      ... " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if pending.is_empty() {
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    match trimmed {
                        ":help" => {
                            print_help();
                            continue;
                        }
                        ":env" => {
                            print_environment(evaluator.environment());
                            continue;
                        }
                        ":reset" => {
                            evaluator.reset();
                            println!("Environment reset.");
                            continue;
                        }
                        ":quit" | ":exit" => {
                            println!("Goodbye!");
                            break;
                        }
                        _ => {}
                    }
                } else {
                    let _ = rl.add_history_entry(trimmed);
                }

                pending.push_str(&line);
                pending.push('\n');

                let exprs = match parse_all(&pending) {
                    Ok(exprs) => exprs,
                    Err(Error::ParseError(err)) if err.kind == ParseErrorKind::Incomplete => {
                        continue;
                    }
                    Err(e) => {
                        println!("Error: {e}");
                        pending.clear();
                        continue;
                    }
                };
                pending.clear();

                for expr in &exprs {
                    match evaluator.eval(expr) {
                        Ok(result) => println!("{result}"),
                        Err(e) => {
                            println!("Error: {e}");
                            break;
                        }
                    }
                }
            }

            Err(ReadlineError::Interrupted) if !pending.is_empty() => {
                pending.clear();
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("ConsLisp REPL commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show user-defined bindings");
    println!("  :reset     - Discard all user definitions");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Cancel a pending multi-line expression, or exit");
    println!();
    println!("Values:");
    println!("  Integers: 42, -5");
    println!("  Floats: 2.5, 1e3");
    println!("  Lists: '(1 2 3), '(1 . 2), ()");
    println!();
    println!("Forms and builtins:");
    println!("  Arithmetic: + - * / ceiling floor");
    println!("  Lists: cons car cdr quote");
    println!("  Predicates: nullp symbolp intp doublep listp procedurep < not");
    println!("  Control: if define lambda let apply eval print");
    println!();
    println!("Examples:");
    println!("  (+ 1 2.0)");
    println!("  (define sq (lambda (x) (* x x)))");
    println!("  (sq 5)");
    println!("  (let ((a 1) (b 2)) (+ a b))");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.bindings();

    if bindings.is_empty() {
        println!("No user-defined bindings.");
        return;
    }

    let (procedures, values): (Vec<_>, Vec<_>) = bindings
        .into_iter()
        .partition(|(_, value)| matches!(value, Value::Procedure(_)));

    if !procedures.is_empty() {
        println!("Procedures ({}):", procedures.len());
        for (name, _) in procedures {
            println!("  {name}");
        }
        println!();
    }

    if !values.is_empty() {
        println!("Values ({}):", values.len());
        for (name, value) in values {
            println!("  {name} = {value}");
        }
    }
}
