use thiserror::Error;
use tisc::core::pairing::{OrbitalChannel, PairingChannel, SpinChannel};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid pairing channel '{0}'. Expected 'orbital/spin' (e.g., 'a-site/singlet').")]
    InvalidChannelFormat(String),

    #[error("Unknown orbital channel '{component}' in '{name}'. Expected 'a-site', 'b-site' or 'mixed'.")]
    UnknownOrbitalChannel { component: String, name: String },

    #[error(
        "Unknown spin channel '{component}' in '{name}'. Expected 'singlet', 'triplet-x', 'triplet-y' or 'triplet-z'."
    )]
    UnknownSpinChannel { component: String, name: String },

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),
}

/// Parses a channel written as `orbital/spin`, e.g. `mixed/triplet-z`.
pub fn parse_pairing_channel(name: &str) -> Result<PairingChannel, ParseError> {
    let (orbital, spin) = name
        .trim()
        .split_once('/')
        .ok_or_else(|| ParseError::InvalidChannelFormat(name.to_string()))?;
    let orbital = orbital.trim().to_ascii_lowercase();
    let spin = spin.trim().to_ascii_lowercase();

    let orbital = OrbitalChannel::ALL
        .into_iter()
        .find(|channel| channel.tag() == orbital)
        .ok_or_else(|| ParseError::UnknownOrbitalChannel {
            component: orbital.clone(),
            name: name.to_string(),
        })?;
    let spin = SpinChannel::ALL
        .into_iter()
        .find(|channel| channel.tag() == spin)
        .ok_or_else(|| ParseError::UnknownSpinChannel {
            component: spin.clone(),
            name: name.to_string(),
        })?;

    Ok(PairingChannel::new(orbital, spin))
}

/// Splits a `KEY=VALUE` override at the first `=`.
pub fn parse_assignment(pair: &str) -> Result<(&str, &str), ParseError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidAssignment(pair.to_string())),
    }
}
