use std::{fs, path::PathBuf};

use super::types::SeedFile;

/// # Errors
///
/// Will return `Err` if any of the semicolon-separated files is not readable
pub fn check_readable_file(file: &str) -> Result<String, String> {
    for file in file.split(';').map(str::trim).filter(|f| !f.is_empty()) {
        let path = PathBuf::from(file);
        if !path.is_file() || fs::metadata(&path).is_err() {
            return Err(format!("The sql startup script '{file}' is not readable."));
        }
    }
    Ok(file.to_string())
}

/// The sqlite file may not exist yet, but its directory must.
///
/// # Errors
///
/// Will return `Err` if the name is empty or the parent directory is missing
pub fn check_db_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("The database name cannot be empty.".to_string());
    }
    if name == ":memory:" {
        return Ok(name.to_string());
    }
    let path = PathBuf::from(name);
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(format!(
            "The directory '{}' for the database does not exist.",
            parent.display()
        )),
        _ => Ok(name.to_string()),
    }
}

/// Parse and validate the seed file.
///
/// Expected format:
/// [{ "email": "...", "password": "...", "name": "...",
///    "wedges": [{ "club": "...", "loft": <int>, "fullSwing": <int>, ... }] }]
///
/// # Errors
///
/// Will return `Err` if the file is unreadable, is not json, or does not match the format
pub fn check_readable_file_and_json(file: &str) -> Result<SeedFile, String> {
    let path = PathBuf::from(file);
    if !path.is_file() {
        return Err(format!("The json file '{file}' is not readable."));
    }
    let contents =
        fs::read_to_string(&path).map_err(|e| format!("The json file '{file}' is not readable: {e}"))?;
    parse_seed_json(&contents)
}

/// # Errors
///
/// Will return `Err` if the json does not match the seed format
pub fn parse_seed_json(contents: &str) -> Result<SeedFile, String> {
    let seed: SeedFile = serde_json::from_str(contents)
        .map_err(|e| format!("The json file is not in the correct format: {e}"))?;
    for account in &seed.0 {
        for wedge in &account.wedges {
            wedge
                .clone()
                .validate()
                .map_err(|e| format!("Seed wedge for {} is invalid: {e}", account.email))?;
        }
    }
    Ok(seed)
}

/// # Errors
///
/// Will return `Err` unless the value is a whole number of milliseconds up to 5000
pub fn check_auto_advance_ms(value: &str) -> Result<u64, String> {
    let ms: u64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number of milliseconds."))?;
    if ms > 5000 {
        return Err("The auto-advance delay must be at most 5000 ms.".to_string());
    }
    Ok(ms)
}

/// # Errors
///
/// Will return `Err` unless the value is between 1 and 120 seconds
pub fn check_write_timeout_secs(value: &str) -> Result<u64, String> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds."))?;
    if !(1..=120).contains(&secs) {
        return Err("The write timeout must be between 1 and 120 seconds.".to_string());
    }
    Ok(secs)
}
