//! Loading of configuration structs from JSON.
//!
//! Every config in this crate (`NegativePeopleConfig`, `VideoConfig`,
//! `ClassifierConfig`, `DetectorConfig`, ...) implements `Default` with the
//! stock dataset and model locations and can be overridden from a file.
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Error;

pub fn from_json_str<T: DeserializeOwned>(json: &str) -> Result<T, Error> {
    Ok(serde_json::from_str(json)?)
}

pub fn from_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, Error> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    from_json_str(&data)
}
