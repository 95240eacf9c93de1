use std::io::{self, BufRead};

use retrace_compiler::{compile_with_flags, Flags};

const USAGE: &str = "re [--debug] [--flags=idmsuxc] PATTERN";

fn main() -> Result<(), String> {
    env_logger::init();

    let mut debug = false;
    let mut flags = Flags::empty();
    let mut args = vec![];
    for arg in std::env::args().skip(1) {
        if arg == "--debug" || arg == "-d" {
            debug = true;
        } else if let Some(letters) = arg.strip_prefix("--flags=") {
            flags = Flags::from_letters(letters).map_err(|e| e.to_string())?;
        } else {
            args.push(arg);
        }
    }

    let pattern = match args.as_slice() {
        [pattern] => pattern,
        _ => return Err(USAGE.to_string()),
    };

    let pattern = compile_with_flags(pattern, flags).map_err(|e| e.to_string())?;

    if debug {
        println!(
            "DEBUG
--------
{}--------
",
            pattern.program()
        )
    }

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        let mut matcher = pattern.matcher(&line);

        if matcher.find() {
            println!("{}", line);
        }
    }

    Ok(())
}
