use std::{env, io, process};

use flint_lang::flint;

fn main() {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let ast = args.iter().any(|arg| arg == "--ast");
    args.retain(|arg| arg != "--ast");

    let mut stdout = io::stdout();
    let mut flint = flint::new(&mut stdout);

    match (args.len(), ast) {
        (0, false) => flint.run_prompt(),
        (1, false) => flint.run_file(args.remove(0)),
        (1, true) => flint.print_ast(args.remove(0)),
        _ => {
            println!("Usage: flint [--ast] [script]");
            process::exit(64);
        },
    };
}
