use std::io::BufRead;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use directory_resolver_sdk::{AuthResult, IdentityDirectory, Password};

use crate::common::{CommonArgs, EXIT_NEGATIVE};

#[derive(Args)]
pub struct AuthArgs {
    /// Login name; the password is read from the first line of stdin
    pub user: String,
}

impl AuthArgs {
    pub fn run(&self, common: &CommonArgs) -> anyhow::Result<ExitCode> {
        let password = read_password(std::io::stdin().lock())?;
        let (_, bridge) = common.bridge()?;
        let result = bridge.authenticate(&self.user, &password)?;

        if common.json {
            println!("{}", serde_json::json!({ "user": self.user, "result": result }));
        } else {
            println!("{}: {}", self.user, describe(result));
        }

        Ok(exit_code(result))
    }
}

/// Only a denial is a negative answer; a failed service is an error.
fn exit_code(result: AuthResult) -> ExitCode {
    match result {
        AuthResult::Authenticated => ExitCode::SUCCESS,
        AuthResult::Denied => ExitCode::from(EXIT_NEGATIVE),
        AuthResult::ServiceError => ExitCode::FAILURE,
    }
}

fn describe(result: AuthResult) -> &'static str {
    match result {
        AuthResult::Authenticated => "authenticated",
        AuthResult::Denied => "denied",
        AuthResult::ServiceError => "service error",
    }
}

/// First line of `input` without its line terminator.
fn read_password(mut input: impl BufRead) -> anyhow::Result<Password> {
    let mut line = String::new();
    input.read_line(&mut line).context("reading password from stdin")?;
    let len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(len);
    Ok(Password::from(line))
}
