//! Column selection for covariate tables.

/// Which value columns of a covariate table are kept, and in what order.
///
/// Key columns (`Municipality`, `Year`) are never passed to a filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnFilter {
    /// Every column, in file order.
    All,
    /// Exactly the named columns, in the listed order.  Names absent from
    /// the file are skipped.
    Keep(Vec<String>),
    /// Columns whose name contains one of the patterns.  Columns are grouped
    /// by the first pattern they match, groups in pattern order, file order
    /// within a group.
    ContainsAny(Vec<String>),
    /// Every column except the named ones, in file order.
    Drop(Vec<String>),
}

impl ColumnFilter {
    /// Census covariates used by the adoption models.
    pub fn census_default() -> Self {
        ColumnFilter::Keep(owned(&[
            "pastures_area_var",
            "pastures_area_mean",
            "educ_second_super",
            "farmers_over65",
            "inc_mainly_ext",
            "educ_none",
            "work_unit_100ha",
            "agric_area_owned",
            "lu_cattle",
            "lu_per_agric_area",
        ]))
    }

    /// Long-run temperature and drought averages.
    pub fn climate_default() -> Self {
        ColumnFilter::ContainsAny(owned(&[
            "av_d_mean_t_average",
            "av_d_max_t_average",
            "cons_days_no_prec_average",
        ]))
    }

    pub fn soil_default() -> Self {
        ColumnFilter::Drop(owned(&["pH_mean_munic"]))
    }

    /// Indices into `columns` of the selected columns, in output order.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Vec<usize> {
        let position = |name: &str| columns.iter().position(|c| c.as_ref() == name);
        match self {
            ColumnFilter::All => (0..columns.len()).collect(),
            ColumnFilter::Keep(names) => names.iter().filter_map(|n| position(n)).collect(),
            ColumnFilter::ContainsAny(patterns) => {
                let mut selected = Vec::new();
                for pattern in patterns {
                    for (i, c) in columns.iter().enumerate() {
                        if c.as_ref().contains(pattern.as_str()) && !selected.contains(&i) {
                            selected.push(i);
                        }
                    }
                }
                selected
            }
            ColumnFilter::Drop(names) => (0..columns.len())
                .filter(|&i| !names.iter().any(|n| n == columns[i].as_ref()))
                .collect(),
        }
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
