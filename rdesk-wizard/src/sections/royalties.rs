//! Distributor, performing rights and mechanical collection contacts

use rdesk_common::model::{ContactBlock, ReleaseData};
use rdesk_common::validators::is_valid_email;

pub const PRO_OPTIONS: &[&str] = &[
    "ASCAP",
    "BMI",
    "SESAC",
    "GMR",
    "SOCAN",
    "PRS for Music",
    "GEMA",
    "SACEM",
    "SIAE",
    "SGAE",
    "APRA AMCOS",
    "JASRAC",
    "Other",
];

pub const MCS_OPTIONS: &[&str] = &[
    "The MLC",
    "Harry Fox Agency",
    "MCPS",
    "CMRRA",
    "GEMA",
    "SACEM",
    "APRA AMCOS",
    "Other",
];

/// PRO and MCS blocks apply only to songwriters
pub fn pro_required(data: &ReleaseData) -> bool {
    data.wrote_composition == Some(true)
}

fn block_errors(label: &str, block: &ContactBlock) -> Vec<String> {
    let mut errors = Vec::new();
    if block.name.trim().is_empty() {
        errors.push(format!("{}: choose or enter a name", label));
    } else if !block.confirmed {
        errors.push(format!("{}: confirm the details", label));
    }
    if !block.contact_email.trim().is_empty() && !is_valid_email(&block.contact_email) {
        errors.push(format!("{}: contact email is not valid", label));
    }
    errors
}

/// Inline messages for the royalties step
pub fn royalty_errors(data: &ReleaseData) -> Vec<String> {
    let mut errors = block_errors("Distributor", &data.distributor);
    match data.wrote_composition {
        None => errors.push("Tell us whether you wrote the composition".into()),
        Some(true) => {
            errors.extend(block_errors("Performing rights organisation", &data.pro));
            errors.extend(block_errors("Mechanical rights society", &data.mcs));
        }
        Some(false) => {}
    }
    errors
}
