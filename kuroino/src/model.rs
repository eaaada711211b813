use crate::error::{Result, SheetError};
use crate::mapper::{CellAddress, Grid};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub(crate) const SHEET_VERSION: u32 = 1;
pub const DEFAULT_CELL_SIZE: i32 = 6;

/// One member of the sheet and their mark for every date column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub attends: Vec<Option<String>>,
}

impl Entry {
    pub fn blank(name: impl Into<String>, days: usize) -> Self {
        Self {
            name: name.into(),
            attends: vec![None; days],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(default = "sheet_version")]
    pub version: u32,
    pub title: String,
    pub cell_size: i32,
    pub dates: Vec<NaiveDate>,
    pub entries: Vec<Entry>,
}

fn sheet_version() -> u32 {
    SHEET_VERSION
}

impl SheetData {
    /// Empty sheet with one column per day starting at `start`.
    pub fn blank(
        title: &str,
        start: NaiveDate,
        days: u32,
        names: &[String],
        cell_size: i32,
    ) -> Result<Self> {
        let dates = (0..days)
            .map(|d| start.checked_add_days(Days::new(u64::from(d))))
            .collect::<Option<Vec<NaiveDate>>>()
            .ok_or(SheetError::DateRange { start, days })?;
        let entries = names
            .iter()
            .map(|n| Entry::blank(n.clone(), dates.len()))
            .collect();
        Ok(Self {
            version: SHEET_VERSION,
            title: title.to_string(),
            cell_size,
            dates,
            entries,
        })
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.cell_size, self.entries.len(), self.dates.len())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_size <= 0 {
            return Err(SheetError::CellSize(self.cell_size));
        }
        let expected = self.dates.len();
        for (row, e) in self.entries.iter().enumerate() {
            if e.attends.len() != expected {
                return Err(SheetError::Ragged {
                    row,
                    name: e.name.clone(),
                    len: e.attends.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    pub fn mark(&self, addr: CellAddress) -> Option<&str> {
        self.entries
            .get(addr.row)
            .and_then(|e| e.attends.get(addr.col))
            .and_then(|m| m.as_deref())
    }

    /// Advance a cell through `empty → symbols[0] → … → symbols[n-1] → empty`.
    /// A mark that is not one of `symbols` restarts the cycle. Returns the new mark.
    pub fn cycle_mark(&mut self, addr: CellAddress, symbols: &[String]) -> Option<String> {
        let slot = self
            .entries
            .get_mut(addr.row)
            .and_then(|e| e.attends.get_mut(addr.col))?;

        let next = match slot.as_deref() {
            None => symbols.first().cloned(),
            Some(cur) => match symbols.iter().position(|s| s == cur) {
                Some(i) => symbols.get(i + 1).cloned(),
                None => symbols.first().cloned(),
            },
        };
        *slot = next.clone();
        next
    }

    pub fn describe(&self, addr: CellAddress) -> Option<String> {
        let name = &self.entries.get(addr.row)?.name;
        let date = self.dates.get(addr.col)?;
        Some(format!("{name} @ {}", date.format("%Y-%m-%d (%a)")))
    }

    pub fn longest_name(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.name.chars().count())
            .max()
            .unwrap_or(0)
    }
}

/// `MM/DD` with a one-letter weekday underneath; used by the date header.
pub fn date_label(d: NaiveDate) -> (String, char) {
    let wd = match d.weekday() {
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'T',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
        Weekday::Sun => 'S',
    };
    (d.format("%m/%d").to_string(), wd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SheetData {
        let names = vec!["Aoi".to_string(), "Ren".to_string()];
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        SheetData::blank("club", start, 5, &names, 6).unwrap()
    }

    fn syms() -> Vec<String> {
        vec!["○".to_string(), "×".to_string()]
    }

    #[test]
    fn blank_sheet_has_one_slot_per_date() {
        let s = sheet();
        assert_eq!(s.dates.len(), 5);
        assert_eq!(s.dates[4], NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());
        assert!(s.entries.iter().all(|e| e.attends.len() == 5));
        assert_eq!(s.grid(), Grid::new(6, 2, 5));
        s.validate().unwrap();
    }

    #[test]
    fn cycle_mark_wraps_back_to_empty() {
        let mut s = sheet();
        let a = CellAddress::new(1, 3);
        assert_eq!(s.cycle_mark(a, &syms()).as_deref(), Some("○"));
        assert_eq!(s.cycle_mark(a, &syms()).as_deref(), Some("×"));
        assert_eq!(s.cycle_mark(a, &syms()), None);
        assert_eq!(s.mark(a), None);
    }

    #[test]
    fn foreign_mark_restarts_cycle() {
        let mut s = sheet();
        let a = CellAddress::new(0, 0);
        s.entries[0].attends[0] = Some("late".to_string());
        assert_eq!(s.cycle_mark(a, &syms()).as_deref(), Some("○"));
    }

    #[test]
    fn cycle_mark_out_of_range_is_ignored() {
        let mut s = sheet();
        assert_eq!(s.cycle_mark(CellAddress::new(9, 0), &syms()), None);
    }

    #[test]
    fn ragged_entry_is_rejected() {
        let mut s = sheet();
        s.entries[1].attends.pop();
        match s.validate() {
            Err(SheetError::Ragged { row, len, expected, .. }) => {
                assert_eq!((row, len, expected), (1, 4, 5));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn describe_names_member_and_date() {
        let s = sheet();
        assert_eq!(
            s.describe(CellAddress::new(0, 1)).as_deref(),
            Some("Aoi @ 2024-04-02 (Tue)")
        );
        assert_eq!(date_label(s.dates[0]), ("04/01".to_string(), 'M'));
    }
}
