use std::fmt::Display;
use std::str::FromStr;
use std::path::PathBuf;
use std::io::{self, Write};
use anyhow::{Context, Result};
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
pub struct OutputOptions {
  /// `json` includes every route row, `json-summ` only the per-batch figures
  #[structopt(long="format", short="f", default_value="json-summ", possible_values=&REPORT_FORMAT_STRINGS)]
  pub fmt: ReportFormat,
  /// Write the run report here instead of stdout
  #[structopt(long="output", short="o", parse(from_os_str))]
  pub file: Option<PathBuf>,
  /// JSON log file
  #[structopt(long, parse(from_os_str))]
  pub log: Option<PathBuf>,
}

impl OutputOptions {
  pub fn report_writer(&self) -> Result<Box<dyn Write>> {
    Ok(match &self.file {
      Some(path) => {
        let f = std::fs::File::create(path).context(format!("failed to create {:?}", path))?;
        Box::new(io::BufWriter::new(f))
      },
      None => Box::new(io::stdout()),
    })
  }
}

/// Validator for numeric flags with optional inclusive bounds.
pub fn clap_range_validator<T>(minval: Option<T>, maxval: Option<T>) -> impl Fn(String) -> Result<(), String>
    where
        T: FromStr + PartialOrd + Display + Copy,
        T::Err: Display
{
    return move |val| {
        let x: T = val.parse().map_err(|e: T::Err| e.to_string())?;
        match (minval, maxval) {
            (Some(lo), _) if x < lo => Err(format!("must be at least {}", lo)),
            (_, Some(hi)) if x > hi => Err(format!("must be at most {}", hi)),
            _ => Ok(()),
        }
    };
}

pub const REPORT_FORMAT_STRINGS: [&str; 2] = ["json", "json-summ"];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReportFormat {
    Full,
    Summary,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "json" => Ok(Self::Full),
            "json-summ" => Ok(Self::Summary),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}
