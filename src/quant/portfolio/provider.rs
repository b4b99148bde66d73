//! # CSV Price Provider
//!
//! $$
//! \text{rows}(\mathrm{secid}, \mathrm{name}, t, c_t) \mapsto \{t \mapsto c_t : t \in [t_0, t_1]\}
//! $$
//!
//! File-backed [`SecuritiesProvider`] over a local export of daily closes.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use csv::Trim;
use serde::Deserialize;

use super::types::CalculationWindow;
use super::types::PriceObservation;
use super::types::Security;
use crate::traits::SecuritiesProvider;

/// One `secid,name,date,close` record. An empty close marks a missing price.
#[derive(Debug, Deserialize)]
struct PriceRow {
  secid: String,
  name: String,
  date: NaiveDate,
  close: Option<f64>,
}

/// Price histories read once from CSV, filtered per window on load.
#[derive(Debug, Default)]
pub struct CsvPriceProvider {
  securities: HashMap<String, (String, Vec<PriceObservation>)>,
}

impl CsvPriceProvider {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let file = File::open(&path)
      .with_context(|| format!("failed to open price file {:?}", path.as_ref()))?;
    Self::from_reader(file)
  }

  /// Parse a headed CSV stream. Quoted fields may contain commas.
  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut securities: HashMap<String, (String, Vec<PriceObservation>)> = HashMap::new();

    for result in reader.deserialize() {
      let row: PriceRow = result.context("failed to parse price row")?;
      securities
        .entry(row.secid)
        .or_insert_with(|| (row.name, Vec::new()))
        .1
        .push(PriceObservation::new(row.date, row.close));
    }

    Ok(Self { securities })
  }

  pub fn len(&self) -> usize {
    self.securities.len()
  }

  pub fn is_empty(&self) -> bool {
    self.securities.is_empty()
  }
}

impl SecuritiesProvider for CsvPriceProvider {
  fn load_security(&self, id: &str, window: &CalculationWindow) -> Result<Security> {
    let Some((name, history)) = self.securities.get(id) else {
      bail!("no prices for `{id}` in the input file");
    };
    let history = history
      .iter()
      .filter(|obs| window.contains(obs.date))
      .copied()
      .collect();
    Ok(Security::new(id, name.as_str(), history))
  }
}
