//! Account age for the profile card, as "X years, Y months, Z days".
//!
//! Whole months are counted first and the leftover days measured from the
//! resulting anchor date, so short months and leap days fall out of chrono's
//! own month arithmetic (which clamps to the last day of the month).

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountAge {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl AccountAge {
    /// Time elapsed from `created` to `today`. A creation date in the future gives zero.
    pub fn between(created: NaiveDate, today: NaiveDate) -> Self {
        if today <= created {
            return Self::default();
        }

        let mut total_months = (today.year() - created.year()) * 12
            + (today.month() as i32 - created.month() as i32);
        if today.day() < created.day() {
            total_months -= 1;
        }
        let total_months = total_months.max(0) as u32;

        let anchor = created
            .checked_add_months(Months::new(total_months))
            .unwrap_or(today);
        let days = (today - anchor).num_days().max(0) as u32;

        Self {
            years: total_months / 12,
            months: total_months % 12,
            days,
        }
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

impl fmt::Display for AccountAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}
