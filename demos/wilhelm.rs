//! Interactive file encryption utility.
//!
//! A small menu-driven driver around [`wilhelm::Engine`]: prompts for an
//! input path, a passphrase (read without echo), and an output path, then
//! reports the processing rate of the pass.

use std::io::{self, Write};
use std::time::Instant;

use wilhelm::Engine;

fn main() {
    loop {
        println!("Please make a selection:");
        println!("1. Encryption");
        println!("2. Decryption");
        println!("3. Exit");

        match prompt("Selection #: ").as_deref() {
            Some("1") => {
                if let Err(e) = run(true) {
                    eprintln!("\n******\n{e}\n******\n");
                }
            }
            Some("2") => {
                if let Err(e) = run(false) {
                    eprintln!("\n******\n{e}\n******\n");
                }
            }
            Some("3") | None => return,
            Some(_) => println!("Please choose from the choices below:"),
        }
    }
}

fn run(encrypting: bool) -> wilhelm::Result<()> {
    let verb = if encrypting { "encrypted" } else { "decrypted" };
    let input = prompt(&format!("Path to the file to be {verb}: ")).ok_or_else(eof)?;
    let passphrase = rpassword::prompt_password("Passphrase: ").map_err(wilhelm::Error::Io)?;
    let output = prompt("Path for the output file: ").ok_or_else(eof)?;

    let mut engine = Engine::new();
    let start = Instant::now();
    engine.set_input(&input)?;
    engine.set_key(passphrase.as_bytes());
    engine.set_output(&output)?;

    if encrypting {
        engine.encrypt()?;
    } else if engine.decrypt()? {
        println!("\nSuccessfully decrypted - integrity check matched");
    } else {
        println!("\nUnsuccessful decryption - integrity check failed");
    }

    print_rate(start.elapsed().as_secs_f64(), engine.size());
    Ok(())
}

/// Print `message` and read one trimmed line; `None` on closed stdin.
fn prompt(message: &str) -> Option<String> {
    print!("{message}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_owned()),
    }
}

fn eof() -> wilhelm::Error {
    wilhelm::Error::Io(io::ErrorKind::UnexpectedEof.into())
}

fn print_rate(seconds: f64, bytes: u64) {
    let mut rate = bytes as f64 / seconds.max(1e-9);
    let mut unit = "B/s";
    for next in ["KB/s", "MB/s", "GB/s"] {
        if rate > 1024.0 {
            rate /= 1024.0;
            unit = next;
        }
    }
    println!("\nProcessed at an average rate of {rate:.2} {unit}\n");
}
