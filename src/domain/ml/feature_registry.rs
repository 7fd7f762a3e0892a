use crate::domain::market::FeatureRow;
use std::fmt;

/// Numeric columns a model can be fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Ret1d,
    Ret5d,
    Vol5d,
    Vol21d,
    VolumeZ,
    DayOfWeek,
}

/// Candidate columns in their fixed order.
/// A trained model stores the subset it was fitted on in this same relative
/// order, and prediction rows are projected through that stored list.
pub const FEATURE_COLUMNS: [FeatureColumn; 6] = [
    FeatureColumn::Ret1d,
    FeatureColumn::Ret5d,
    FeatureColumn::Vol5d,
    FeatureColumn::Vol21d,
    FeatureColumn::VolumeZ,
    FeatureColumn::DayOfWeek,
];

impl FeatureColumn {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::Ret1d => "ret_1d",
            FeatureColumn::Ret5d => "ret_5d",
            FeatureColumn::Vol5d => "vol_5d",
            FeatureColumn::Vol21d => "vol_21d",
            FeatureColumn::VolumeZ => "volume_z",
            FeatureColumn::DayOfWeek => "day_of_week",
        }
    }

    /// Value of this column on `row`, `None` while not computable.
    pub fn value(&self, row: &FeatureRow) -> Option<f64> {
        match self {
            FeatureColumn::Ret1d => row.ret_1d,
            FeatureColumn::Ret5d => row.ret_5d,
            FeatureColumn::Vol5d => row.vol_5d,
            FeatureColumn::Vol21d => row.vol_21d,
            FeatureColumn::VolumeZ => row.volume_z,
            FeatureColumn::DayOfWeek => Some(row.day_of_week as f64),
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Project `row` onto `columns`, in order.
/// Returns `None` as soon as one of the columns is missing on the row.
pub fn project(row: &FeatureRow, columns: &[FeatureColumn]) -> Option<Vec<f64>> {
    columns.iter().map(|c| c.value(row)).collect()
}

/// Project `row` onto `columns`, taking `fill[i]` for each column the row
/// lacks. Also returns how many columns were filled.
pub fn project_filled(
    row: &FeatureRow,
    columns: &[FeatureColumn],
    fill: &[f64],
) -> (Vec<f64>, usize) {
    let mut filled = 0;
    let values = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.value(row).unwrap_or_else(|| {
                filled += 1;
                fill.get(i).copied().unwrap_or(0.0)
            })
        })
        .collect();
    (values, filled)
}

pub fn column_names(columns: &[FeatureColumn]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::PriceBar;
    use chrono::NaiveDate;

    fn row() -> FeatureRow {
        let date = NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(); // Wednesday
        FeatureRow::from_bar(&PriceBar::new("AAPL", date, 100.0, 10))
    }

    #[test]
    fn test_names_are_unique() {
        let names = column_names(&FEATURE_COLUMNS);
        let unique: std::collections::HashSet<&String> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
        assert_eq!(names[0], "ret_1d");
        assert_eq!(names[5], "day_of_week");
    }

    #[test]
    fn test_project_follows_column_order() {
        let mut r = row();
        r.ret_1d = Some(0.01);
        r.volume_z = Some(-1.5);

        let v = project(
            &r,
            &[FeatureColumn::DayOfWeek, FeatureColumn::VolumeZ, FeatureColumn::Ret1d],
        )
        .unwrap();
        assert_eq!(v, vec![2.0, -1.5, 0.01]);
    }

    #[test]
    fn test_project_missing_value() {
        let r = row();
        assert!(project(&r, &[FeatureColumn::Ret1d]).is_none());
        assert_eq!(project(&r, &[FeatureColumn::DayOfWeek]), Some(vec![2.0]));
    }

    #[test]
    fn test_project_filled_substitutes_missing_columns() {
        let mut r = row();
        r.ret_1d = Some(0.02);

        let columns = [FeatureColumn::Ret1d, FeatureColumn::Vol21d, FeatureColumn::DayOfWeek];
        let (values, filled) = project_filled(&r, &columns, &[0.0, 0.015, 3.0]);
        assert_eq!(values, vec![0.02, 0.015, 2.0]);
        assert_eq!(filled, 1);
    }
}
