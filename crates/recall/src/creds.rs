// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall creds` -- credential freshness at a glance.

use recall_config::RecallConfig;
use recall_core::RecallError;
use recall_creds::CredentialGate;

pub fn run(config: &RecallConfig) -> Result<(), RecallError> {
    let gate = CredentialGate::from_config(&config.credentials)?;

    match gate.age_hours()? {
        None => println!("no credentials stored ({})", gate.store().path().display()),
        Some(age_hours) => {
            let state = if gate.is_fresh()? { "fresh" } else { "stale" };
            println!(
                "credentials are {state}: {age_hours}h old (threshold {}h)",
                config.credentials.max_age_hours
            );
        }
    }
    Ok(())
}
