//! Go-live date

use chrono::NaiveDate;

use rdesk_common::model::{GoLiveOption, ReleaseData};
use rdesk_common::steps::earliest_future_date;

/// Bounds for the date picker: `(min, max)`
pub fn date_bounds(
    option: GoLiveOption,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match option {
        GoLiveOption::Past => (None, Some(today)),
        GoLiveOption::Asap => (None, None),
        GoLiveOption::Future => (Some(earliest_future_date(today)), None),
    }
}

/// Inline message for the date step, if any
pub fn date_error(data: &ReleaseData, today: NaiveDate) -> Option<String> {
    let option = data.go_live_option?;
    match (option, data.go_live_date) {
        (GoLiveOption::Asap, _) => None,
        (_, None) => Some("Pick a date".into()),
        (GoLiveOption::Past, Some(date)) if date > today => {
            Some("An original release date cannot be in the future".into())
        }
        (GoLiveOption::Future, Some(date)) if date < earliest_future_date(today) => Some(format!(
            "Scheduled releases need at least two weeks' notice; the earliest date is {}",
            earliest_future_date(today)
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 1).unwrap()
    }

    #[test]
    fn test_future_bounds() {
        let (min, max) = date_bounds(GoLiveOption::Future, today());
        assert_eq!(min, NaiveDate::from_ymd_opt(2030, 3, 15));
        assert_eq!(max, None);
        assert_eq!(date_bounds(GoLiveOption::Past, today()).1, Some(today()));
    }

    #[test]
    fn test_date_errors() {
        let mut data = ReleaseData::new();
        assert_eq!(date_error(&data, today()), None);

        data.go_live_option = Some(GoLiveOption::Future);
        assert!(date_error(&data, today()).is_some());

        data.go_live_date = Some(today() + Duration::days(5));
        assert!(date_error(&data, today()).unwrap().contains("2030-03-15"));

        data.go_live_date = Some(today() + Duration::days(14));
        assert_eq!(date_error(&data, today()), None);

        data.go_live_option = Some(GoLiveOption::Past);
        assert!(date_error(&data, today()).is_some());
    }
}
