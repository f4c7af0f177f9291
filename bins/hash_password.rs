//! Print an Argon2 PHC string for `admin.password_hash` / `ADMIN_PASSWORD_HASH`.
//!
//! ```text
//! blog-hash-password 'correct horse'
//! echo 'correct horse' | blog-hash-password
//! ```

use std::io::{self, BufRead};
use std::process::ExitCode;

use service::auth::service::hash_password;

/// Password from the first argument, otherwise the first line of `input`.
fn read_password<I, R>(mut args: I, input: R) -> io::Result<Option<String>>
where
    I: Iterator<Item = String>,
    R: BufRead,
{
    let password = match args.next() {
        Some(arg) => arg,
        None => {
            let mut line = String::new();
            input.take(64 * 1024).read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    Ok(Some(password).filter(|p| !p.is_empty()))
}

fn main() -> ExitCode {
    let stdin = io::stdin();
    let password = match read_password(std::env::args().skip(1), stdin.lock()) {
        Ok(Some(p)) => p,
        Ok(None) => {
            eprintln!("usage: blog-hash-password <password>  (or pipe it on stdin)");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("failed to read password: {e}");
            return ExitCode::FAILURE;
        }
    };

    match hash_password(&password) {
        Ok(hash) => {
            println!("{hash}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
