use clap::ValueEnum;
use serde::Deserialize;

#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human readable report, one diagnostic per line.
    #[default]
    Text,
    /// One JSON document describing every checked file.
    Json,
}
