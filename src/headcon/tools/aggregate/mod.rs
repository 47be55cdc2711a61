use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::headcon::tools::model::{
    CanonicalRecord, PlotDataset, ReportingPeriod, SeriesBucket, format_date,
};

/// Folds manual and database records onto the day axis of `period`.
///
/// Records whose date is not a day of the period contribute nothing. A record
/// with an unknown shift counts toward its source total only.
pub fn aggregate(
    manual: &[CanonicalRecord],
    database: &[CanonicalRecord],
    period: &ReportingPeriod,
) -> PlotDataset {
    let dates: Vec<String> = period.days().into_iter().map(format_date).collect();
    let positions: HashMap<&str, usize> = dates
        .iter()
        .enumerate()
        .map(|(index, date)| (date.as_str(), index))
        .collect();

    let mut series = BTreeMap::new();
    let mut dropped = 0usize;
    for record in manual.iter().chain(database) {
        let Some(&index) = positions.get(record.date.as_str()) else {
            trace!(date = %record.date, "record outside reporting period");
            dropped += 1;
            continue;
        };
        series
            .entry(record.series_key())
            .or_insert_with(|| SeriesBucket::zeroed(dates.len()))
            .add(index, record.source, record.shift, u64::from(record.quantity));
    }

    debug!(
        %period,
        series = series.len(),
        dropped,
        "aggregated records"
    );
    PlotDataset { dates, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headcon::tools::model::{Shift, Source};

    fn record(date: &str, shift: Shift, head_type: &str, quantity: u32, source: Source) -> CanonicalRecord {
        CanonicalRecord {
            date: date.to_string(),
            shift,
            head_type: head_type.to_string(),
            head_surface: String::new(),
            quantity,
            source,
        }
    }

    fn period(month: u32, year: i32) -> ReportingPeriod {
        ReportingPeriod::new(month, year).unwrap()
    }

    #[test]
    fn manual_and_database_land_in_one_series() {
        let manual = [record("15-04-2024", Shift::Day, "FEMTO", 5, Source::Manual)];
        let database = [record("15-04-2024", Shift::Night, "FEMTO", 3, Source::Database)];

        let plot = aggregate(&manual, &database, &period(4, 2024));
        assert_eq!(plot.series.len(), 1);

        let bucket = plot.get("FEMTO", "").unwrap();
        assert_eq!(bucket.manual_day[14], 5);
        assert_eq!(bucket.database_night[14], 3);
        assert_eq!(bucket.manual_total[14], 5);
        assert_eq!(bucket.database_total[14], 3);
        assert_eq!(bucket.manual_night[14], 0);
        assert_eq!(plot.series.keys().next().unwrap().label(), "FEMTO ()");
    }

    #[test]
    fn axis_covers_every_day_of_the_month() {
        let cases = [(2, 2024, 29), (2, 2023, 28), (4, 2024, 30), (12, 2024, 31)];
        for (month, year, days) in cases {
            let plot = aggregate(&[], &[], &period(month, year));
            assert_eq!(plot.dates.len(), days, "{month}/{year}");
            assert!(plot.dates.iter().all(|date| date.len() == 10));
        }
        let plot = aggregate(&[], &[], &period(2, 2024));
        assert_eq!(plot.dates.first().unwrap(), "01-02-2024");
        assert_eq!(plot.dates.last().unwrap(), "29-02-2024");
    }

    #[test]
    fn quantities_accumulate() {
        let manual = [
            record("01-04-2024", Shift::Day, "DFH", 2, Source::Manual),
            record("01-04-2024", Shift::Day, "DFH", 3, Source::Manual),
            record("01-04-2024", Shift::Night, "DFH", 4, Source::Manual),
        ];
        let plot = aggregate(&manual, &[], &period(4, 2024));
        let bucket = plot.get("DFH", "").unwrap();
        assert_eq!(bucket.manual_day[0], 5);
        assert_eq!(bucket.manual_night[0], 4);
        assert_eq!(bucket.manual_total[0], 9);
    }

    #[test]
    fn unknown_shift_counts_toward_total_only() {
        let database = [
            record("10-04-2024", Shift::Unknown, "DFH", 7, Source::Database),
            record("10-04-2024", Shift::Day, "DFH", 1, Source::Database),
        ];
        let plot = aggregate(&[], &database, &period(4, 2024));
        let bucket = plot.get("DFH", "").unwrap();
        assert_eq!(bucket.database_total[9], 8);
        assert_eq!(bucket.database_day[9], 1);
        assert_eq!(bucket.database_night[9], 0);
    }

    #[test]
    fn records_outside_the_month_are_dropped() {
        let manual = [
            record("01-05-2024", Shift::Day, "FEMTO", 1, Source::Manual),
            record("Sheet1-04-2024", Shift::Day, "FEMTO", 1, Source::Manual),
        ];
        let plot = aggregate(&manual, &[], &period(4, 2024));
        assert!(plot.series.is_empty());
    }

    #[test]
    fn known_shift_totals_equal_day_plus_night() {
        let manual = [
            record("03-04-2024", Shift::Day, "FEMTO", 2, Source::Manual),
            record("03-04-2024", Shift::Night, "FEMTO", 6, Source::Manual),
            record("20-04-2024", Shift::Night, "PMR6 PIH", 1, Source::Manual),
        ];
        let database = [
            record("03-04-2024", Shift::Night, "FEMTO", 4, Source::Database),
            record("30-04-2024", Shift::Day, "PMR6 PIH", 9, Source::Database),
        ];
        let plot = aggregate(&manual, &database, &period(4, 2024));
        for bucket in plot.series.values() {
            for i in 0..plot.dates.len() {
                assert_eq!(bucket.manual_total[i], bucket.manual_day[i] + bucket.manual_night[i]);
                assert_eq!(
                    bucket.database_total[i],
                    bucket.database_day[i] + bucket.database_night[i]
                );
            }
        }
    }

    #[test]
    fn aggregation_is_repeatable() {
        let manual = [record("03-04-2024", Shift::Day, "FEMTO", 2, Source::Manual)];
        let database = [record("04-04-2024", Shift::Night, "DFH", 4, Source::Database)];
        let first = aggregate(&manual, &database, &period(4, 2024));
        let second = aggregate(&manual, &database, &period(4, 2024));
        assert_eq!(first, second);
    }

    #[test]
    fn overview_sums_each_series() {
        let manual = [
            record("03-04-2024", Shift::Day, "FEMTO", 2, Source::Manual),
            record("05-04-2024", Shift::Night, "FEMTO", 6, Source::Manual),
        ];
        let database = [record("05-04-2024", Shift::Night, "FEMTO", 4, Source::Database)];
        let overview = aggregate(&manual, &database, &period(4, 2024)).overview();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].label, "FEMTO ()");
        assert_eq!(overview[0].manual, 8);
        assert_eq!(overview[0].database, 4);
    }
}
