//! `intf sign <PATH>`: print signed headers and a matching `curl` command,
//! or check an `Authorization` header against the local key.

use super::{client_for, Outcome};
use crate::config::Settings;
use crate::endpoint::{Endpoint, System};
use crate::Error;
use intf_auth::verify_signature;

#[derive(Debug, Clone)]
pub struct SignArgs {
    pub path: String,
    pub system: System,
    /// `(authorization, timestamp)` to verify instead of signing.
    pub verify: Option<(String, String)>,
}

/// Shell-quoted `curl` invocation for a signed request.
pub fn curl_command(url: &str, headers: &[(&str, String)]) -> String {
    let mut cmd = format!("curl -X GET {}", shell_quote(url));
    for (name, value) in headers {
        cmd.push_str(" \\\n  -H ");
        cmd.push_str(&shell_quote(&format!("{name}: {value}")));
    }
    cmd
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

pub fn run(settings: &Settings, args: SignArgs) -> Result<Outcome, Error> {
    if let Some((authorization, timestamp)) = &args.verify {
        verify_signature(
            settings.api_private_key.as_bytes(),
            &settings.api_public_key,
            "GET",
            timestamp,
            &args.path,
            authorization,
        )?;
        println!("signature OK");
        return Ok(Outcome::Completed);
    }

    let endpoint = Endpoint::users(args.system, settings.tenant_id())?;
    let client = client_for(settings, endpoint)?;
    let headers = client.signed_headers(&args.path)?;
    for (name, value) in &headers {
        println!("{name}: {value}");
    }
    println!();
    println!("{}", curl_command(&client.endpoint().url(&args.path), &headers));
    Ok(Outcome::Completed)
}
