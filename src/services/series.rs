//! Date-indexed column frames shared by the connectors, the integrator
//! and the feature builder.
//!
//! Every pipeline stage passes one of these around: rows are calendar
//! days in strictly ascending order, columns are named numeric series,
//! and a `None` cell is a gap that has not been filled yet. The fill
//! operations mirror the semantics the store invariants are written
//! against: linear interpolation is index-spaced (interior gaps only),
//! forward/backward fill closes the edges.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

#[derive(Debug, Clone, Default)]
pub struct DailyFrame {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// Column-major cells; `cells[c].len() == dates.len()` for every column
    cells: Vec<Vec<Option<f64>>>,
}

impl DailyFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outer-join named series on date. Dates missing from a series
    /// become `None` cells in its column.
    pub fn from_series(series: Vec<(String, Vec<(NaiveDate, f64)>)>) -> Self {
        let mut all_dates: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for (_, points) in &series {
            for (date, _) in points {
                all_dates.entry(*date).or_insert(0);
            }
        }
        let dates: Vec<NaiveDate> = all_dates.keys().copied().collect();
        for (i, date) in dates.iter().enumerate() {
            *all_dates.get_mut(date).unwrap() = i;
        }

        let mut columns = Vec::with_capacity(series.len());
        let mut cells = Vec::with_capacity(series.len());
        for (name, points) in series {
            let mut column = vec![None; dates.len()];
            for (date, value) in points {
                column[all_dates[&date]] = Some(value);
            }
            columns.push(name);
            cells.push(column);
        }

        Self {
            dates,
            columns,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(&self.cells[idx])
    }

    pub fn get(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name)
            .and_then(|col| col.get(row).copied().flatten())
    }

    /// Append a derived column. The values must line up with the
    /// existing rows.
    pub fn push_column(&mut self, name: &str, values: Vec<Option<f64>>) {
        assert_eq!(values.len(), self.dates.len(), "column length mismatch");
        self.columns.push(name.to_string());
        self.cells.push(values);
    }

    /// Re-index onto every calendar day in `[start, end]`. Days the
    /// frame did not cover become all-`None` rows.
    pub fn reindex_daily(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let mut dates = Vec::new();
        let mut day = start;
        while day <= end {
            dates.push(day);
            day = day + Duration::days(1);
        }

        let old_index: BTreeMap<NaiveDate, usize> = self
            .dates
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, i))
            .collect();

        let cells = self
            .cells
            .iter()
            .map(|col| {
                dates
                    .iter()
                    .map(|d| old_index.get(d).and_then(|&i| col[i]))
                    .collect()
            })
            .collect();

        Self {
            dates,
            columns: self.columns.clone(),
            cells,
        }
    }

    /// Fill interior gaps per column by linear interpolation between
    /// the nearest defined neighbours, equally spaced by row. Leading
    /// and trailing gaps are left alone.
    pub fn interpolate_linear(&mut self) {
        for col in &mut self.cells {
            let mut prev: Option<usize> = None;
            for i in 0..col.len() {
                if col[i].is_none() {
                    continue;
                }
                if let Some(p) = prev {
                    if i > p + 1 {
                        let left = col[p].unwrap();
                        let right = col[i].unwrap();
                        let span = (i - p) as f64;
                        for (step, cell) in col[p + 1..i].iter_mut().enumerate() {
                            let t = (step + 1) as f64 / span;
                            *cell = Some(left + (right - left) * t);
                        }
                    }
                }
                prev = Some(i);
            }
        }
    }

    /// Carry the last defined value forward over trailing gaps.
    pub fn forward_fill(&mut self) {
        for col in &mut self.cells {
            let mut last = None;
            for cell in col.iter_mut() {
                match *cell {
                    Some(v) => last = Some(v),
                    None => *cell = last,
                }
            }
        }
    }

    /// Carry the first defined value backward over leading gaps.
    pub fn backward_fill(&mut self) {
        for col in &mut self.cells {
            let mut next = None;
            for cell in col.iter_mut().rev() {
                match *cell {
                    Some(v) => next = Some(v),
                    None => *cell = next,
                }
            }
        }
    }

    /// Drop rows where every cell is `None`.
    pub fn drop_rows_all_null(&mut self) {
        let keep: Vec<bool> = (0..self.dates.len())
            .map(|r| self.cells.iter().any(|col| col[r].is_some()))
            .collect();
        self.retain_rows(&keep);
    }

    /// Drop rows where any cell is `None`.
    pub fn drop_rows_any_null(&mut self) {
        let keep: Vec<bool> = (0..self.dates.len())
            .map(|r| self.cells.iter().all(|col| col[r].is_some()))
            .collect();
        self.retain_rows(&keep);
    }

    fn retain_rows(&mut self, keep: &[bool]) {
        let mut idx = 0;
        self.dates.retain(|_| {
            let k = keep[idx];
            idx += 1;
            k
        });
        for col in &mut self.cells {
            let mut idx = 0;
            col.retain(|_| {
                let k = keep[idx];
                idx += 1;
                k
            });
        }
    }

    /// Inner-join two frames on date: only days present in both
    /// survive, columns are concatenated.
    pub fn inner_join(&self, other: &DailyFrame) -> Self {
        let other_index: BTreeMap<NaiveDate, usize> = other
            .dates
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, i))
            .collect();

        let mut dates = Vec::new();
        let mut self_rows = Vec::new();
        let mut other_rows = Vec::new();
        for (i, date) in self.dates.iter().enumerate() {
            if let Some(&j) = other_index.get(date) {
                dates.push(*date);
                self_rows.push(i);
                other_rows.push(j);
            }
        }

        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        let mut cells: Vec<Vec<Option<f64>>> = self
            .cells
            .iter()
            .map(|col| self_rows.iter().map(|&i| col[i]).collect())
            .collect();
        cells.extend(
            other
                .cells
                .iter()
                .map(|col| other_rows.iter().map(|&j| col[j]).collect::<Vec<_>>()),
        );

        Self {
            dates,
            columns,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn outer_join_aligns_on_date() {
        let frame = DailyFrame::from_series(vec![
            ("a".to_string(), vec![(d(1), 1.0), (d(3), 3.0)]),
            ("b".to_string(), vec![(d(2), 20.0), (d(3), 30.0)]),
        ]);

        assert_eq!(frame.dates(), &[d(1), d(2), d(3)]);
        assert_eq!(frame.column("a").unwrap(), &[Some(1.0), None, Some(3.0)]);
        assert_eq!(frame.column("b").unwrap(), &[None, Some(20.0), Some(30.0)]);
    }

    #[test]
    fn interpolation_fills_interior_gaps_only() {
        let mut frame = DailyFrame::from_series(vec![(
            "a".to_string(),
            vec![(d(2), 10.0), (d(5), 40.0)],
        )]);
        frame = frame.reindex_daily(d(1), d(6));
        frame.interpolate_linear();

        let col = frame.column("a").unwrap();
        assert_eq!(col[0], None); // leading gap untouched
        assert_eq!(col[1], Some(10.0));
        assert_eq!(col[2], Some(20.0));
        assert_eq!(col[3], Some(30.0));
        assert_eq!(col[4], Some(40.0));
        assert_eq!(col[5], None); // trailing gap untouched
    }

    #[test]
    fn fills_close_edge_gaps() {
        let mut frame = DailyFrame::from_series(vec![(
            "a".to_string(),
            vec![(d(2), 5.0), (d(3), 6.0)],
        )]);
        frame = frame.reindex_daily(d(1), d(4));
        frame.forward_fill();
        frame.backward_fill();

        assert_eq!(
            frame.column("a").unwrap(),
            &[Some(5.0), Some(5.0), Some(6.0), Some(6.0)]
        );
    }

    #[test]
    fn inner_join_keeps_shared_dates() {
        let left = DailyFrame::from_series(vec![(
            "a".to_string(),
            vec![(d(1), 1.0), (d(2), 2.0), (d(3), 3.0)],
        )]);
        let right = DailyFrame::from_series(vec![(
            "b".to_string(),
            vec![(d(2), 20.0), (d(3), 30.0), (d(4), 40.0)],
        )]);

        let joined = left.inner_join(&right);
        assert_eq!(joined.dates(), &[d(2), d(3)]);
        assert_eq!(joined.column_names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(joined.get("a", 0), Some(2.0));
        assert_eq!(joined.get("b", 1), Some(30.0));
    }

    #[test]
    fn null_row_drops() {
        let mut frame = DailyFrame::from_series(vec![
            ("a".to_string(), vec![(d(1), 1.0), (d(3), 3.0)]),
            ("b".to_string(), vec![(d(1), 10.0), (d(2), 20.0)]),
        ]);
        let mut all = frame.clone();
        all = all.reindex_daily(d(1), d(4));
        all.drop_rows_all_null();
        assert_eq!(all.dates(), &[d(1), d(2), d(3)]);

        frame.drop_rows_any_null();
        assert_eq!(frame.dates(), &[d(1)]);
    }
}
