//! Subcommand implementations behind the `intf` binary.

pub mod fetch;
pub mod find;
pub mod preview;
pub mod sign;

use crate::client::ApiClient;
use crate::config::Settings;
use crate::endpoint::Endpoint;
use crate::Error;
use std::process::ExitCode;

/// Exit status of an interrupted run.
pub const EXIT_INTERRUPTED: u8 = 130;

/// How a command ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Completed => ExitCode::SUCCESS,
            Outcome::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
        }
    }
}

/// Signed client for `endpoint`, with `API_BASE_URL` applied.
pub(crate) fn client_for(settings: &Settings, endpoint: Endpoint) -> Result<ApiClient, Error> {
    ApiClient::new(
        settings.signer()?,
        settings.route(endpoint),
        settings.database_id(),
        settings.request_timeout(),
    )
}
