//! Interactive account entry for the initialize flows.

use crate::domain::account::normalize_account;
use crate::domain::error::{AppError, Result};
use std::io::{BufRead, Write};

/// Prompt on stdin/stdout for the broker accounts to schedule.
pub fn get_accounts() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    read_accounts(stdin.lock(), &mut stdout.lock())
}

/// Read accounts from any reader, re-prompting on malformed entries.
/// Accepts `IB:U1234567`, `U1234567`, or bare digits.
pub fn read_accounts<R: BufRead, W: Write>(mut input: R, out: &mut W) -> Result<Vec<String>> {
    let mut accounts = Vec::new();

    loop {
        let account = loop {
            write!(out, "Enter account (e.g. IB:U1234567): ")
                .map_err(|e| AppError::IoError(e.to_string()))?;
            out.flush().map_err(|e| AppError::IoError(e.to_string()))?;

            let Some(line) = read_line(&mut input)? else {
                // EOF: keep whatever was collected so far.
                return finish(accounts);
            };
            match normalize_account(&line) {
                Ok(account) => break account,
                Err(err) => {
                    writeln!(out, "{}", err).map_err(|e| AppError::IoError(e.to_string()))?;
                }
            }
        };
        accounts.push(account);

        write!(out, "Add another account? (y/n): ")
            .map_err(|e| AppError::IoError(e.to_string()))?;
        out.flush().map_err(|e| AppError::IoError(e.to_string()))?;
        match read_line(&mut input)? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => continue,
            _ => return finish(accounts),
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| AppError::IoError(e.to_string()))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn finish(accounts: Vec<String>) -> Result<Vec<String>> {
    if accounts.is_empty() {
        return Err(AppError::ValidationError(
            "No valid accounts entered".to_string(),
        ));
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        read_accounts(Cursor::new(input), &mut out)
    }

    #[test]
    fn single_valid_account() {
        let accounts = run("IB:U1234567\nn\n").unwrap();
        assert_eq!(accounts, vec!["IB:U1234567"]);
    }

    #[test]
    fn multiple_accounts_in_different_formats() {
        let accounts = run("U12345678\ny\n1234567\nn\n").unwrap();
        assert_eq!(accounts, vec!["IB:U12345678", "IB:U1234567"]);
    }

    #[test]
    fn invalid_entry_is_reprompted() {
        let accounts = run("invalid-account\nIB:U87654321\nn\n").unwrap();
        assert_eq!(accounts, vec!["IB:U87654321"]);
    }

    #[test]
    fn empty_entry_is_reprompted() {
        let accounts = run("\nIB:U87654321\nn\n").unwrap();
        assert_eq!(accounts, vec!["IB:U87654321"]);
    }

    #[test]
    fn eof_with_no_accounts_is_an_error() {
        assert!(run("").is_err());
    }

    #[test]
    fn eof_after_one_account_keeps_it() {
        let accounts = run("IB:U1234567\n").unwrap();
        assert_eq!(accounts, vec!["IB:U1234567"]);
    }
}
