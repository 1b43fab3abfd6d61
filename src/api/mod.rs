pub mod employee;
pub mod leave_request;
pub mod summary;

use chrono::{Datelike, Local, NaiveDate};

/// Calendar date used when a caller does not pin `asOf`.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn this_year() -> i32 {
    today().year()
}
