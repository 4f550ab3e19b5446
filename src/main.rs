//! Read a Lisp file and render its top-level forms:
//! - Lisp on stdout, i.e. a mirror of the input
//! - Debug on stderr - the internal representation from the `lispingo` crate.
//!
//! ```ignore
//! lispingo input.lisp
//! RUST_LOG=trace lispingo input.lisp
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        let program = args.first().map(String::as_str).unwrap_or("lispingo");
        println!("Usage: {} filename", program);
        return ExitCode::FAILURE;
    }
    let filename = &args[1];

    let code = match std::fs::read_to_string(filename) {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!("could not read {}: {}", filename, err);
            println!("Error reading file: {}", filename);
            return ExitCode::FAILURE;
        }
    };

    match lispingo::read(&code) {
        Ok(forms) => {
            for form in forms {
                println!("{}", form);
                eprintln!("{:?}", form);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err.annotate(filename));
            ExitCode::FAILURE
        }
    }
}
