//! A simple CLI tool for verifying a published election ledger.
//! This uses the server's own verification implementation, and is by definition
//! compatible with the output of `GET /ledger`.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::serde::json::serde_json;

use chainvote_backend::model::api::{
    candidate::CandidateDesc,
    ledger::{LedgerDump, VerificationError},
};

const PROGRAM_NAME: &str = "verify-ledger";

const ABOUT_TEXT: &str = "Verify the integrity of a hash-chained election ledger.

EXIT CODES:
     0: Verification succeeded.
   255: Ran successfully, but verification failed.
 Other: Error.";

const LEDGER_PATH: &str = "LEDGER_PATH";

const LEDGER_PATH_HELP: &str = "The path to a JSON dump of the ledger,\n\
as returned by `GET /ledger`";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME).about(ABOUT_TEXT).arg(
        Arg::new(LEDGER_PATH)
            .help(LEDGER_PATH_HELP)
            .action(ArgAction::Set)
            .required(true),
    )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON dump.
    Format(String),
    /// Verification failed due to the contained reason.
    Verification(VerificationError),
}

/// One line of the final standings.
#[derive(Debug, Eq, PartialEq)]
struct FriendlyResults {
    pub candidate_name: String,
    pub votes: u64,
}

impl From<CandidateDesc> for FriendlyResults {
    fn from(candidate: CandidateDesc) -> Self {
        Self {
            candidate_name: candidate.name,
            votes: candidate.vote_count,
        }
    }
}

impl Display for FriendlyResults {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} vote{}",
            self.candidate_name,
            self.votes,
            if self.votes == 1 { "" } else { "s" }
        )
    }
}

/// Run verification, returning the number of ledger entries and the standings.
fn verify(path: &str) -> Result<(usize, Vec<FriendlyResults>), Error> {
    // Load the file.
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: LedgerDump =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    // Run verification.
    dump.verify().map_err(Error::Verification)?;

    let standings = dump.standings().into_iter().map(Into::into).collect();
    Ok((dump.entries.len(), standings))
}

/// Run verification, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(LEDGER_PATH).unwrap(); // Required argument is guaranteed to be present.
    match verify(path) {
        Ok((entries, standings)) => {
            println!("Verification succeeded: {entries} ledger entries chain correctly.");
            for result in standings {
                println!("{result}");
            }
            0
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {msg}");
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid JSON: {msg}");
            1
        }
        Err(Error::Verification(err)) => {
            println!("Verification failed: {err}.");
            255
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(standings: &[(&str, u64)]) -> Vec<FriendlyResults> {
        standings
            .iter()
            .map(|(name, votes)| FriendlyResults {
                candidate_name: name.to_string(),
                votes: *votes,
            })
            .collect()
    }

    #[test]
    fn verification() {
        // This test actually enters backend code, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(
            ["chainvote_backend"],
            None,
            None,
        );

        assert_eq!(
            verify("ledger_dumps/ledger.json"),
            Ok((
                5,
                results(&[
                    ("Charles Babbage", 3),
                    ("Ada Lovelace", 1),
                    ("Grace Hopper", 1),
                ])
            ))
        );
        assert_eq!(
            verify("ledger_dumps/ledger_empty.json"),
            Ok((
                0,
                results(&[
                    ("Ada Lovelace", 0),
                    ("Charles Babbage", 0),
                    ("Grace Hopper", 0),
                ])
            ))
        );
        assert_eq!(
            verify("ledger_dumps/ledger_tampered_entry.json"),
            Err(Error::Verification(VerificationError::Chain {
                sequence_no: 3
            }))
        );
        assert_eq!(
            verify("ledger_dumps/ledger_deleted_entry.json"),
            Err(Error::Verification(VerificationError::Chain {
                sequence_no: 2
            }))
        );
        assert_eq!(
            verify("ledger_dumps/ledger_inflated_tally.json"),
            Err(Error::Verification(VerificationError::Tally {
                candidate_id: 3
            }))
        );
    }

    #[test]
    fn friendly_output() {
        let lines: Vec<String> = results(&[("Ada Lovelace", 1), ("Grace Hopper", 2)])
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(lines, vec!["Ada Lovelace: 1 vote", "Grace Hopper: 2 votes"]);
    }

    #[test]
    fn correct_cli_usage() {
        let command_line = [PROGRAM_NAME, "ledger_dumps/ledger.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 0);

        let command_line = [PROGRAM_NAME, "ledger_dumps/ledger_tampered_entry.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 255);

        let command_line = [PROGRAM_NAME, "ledger_dumps/ledger_malformed.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);

        let command_line = [PROGRAM_NAME, "not a real file"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // Something very wrong.
        let command_line = [PROGRAM_NAME, "this", "invocation", "is", "incorrect"];
        cli().try_get_matches_from(command_line).unwrap_err();

        // No options at all.
        let command_line = [PROGRAM_NAME];
        cli().try_get_matches_from(command_line).unwrap_err();
    }
}
