//! Unit tests for sbp-data.

use std::io::Cursor;

fn cursor(text: &str) -> Cursor<Vec<u8>> {
    Cursor::new(text.as_bytes().to_vec())
}

// ── ColumnFilter ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod filter_tests {
    use crate::ColumnFilter;

    #[test]
    fn keep_follows_listed_order_and_skips_absent() {
        let f = ColumnFilter::Keep(vec!["b".into(), "zz".into(), "a".into()]);
        assert_eq!(f.select(&["a", "b", "c"]), vec![1, 0]);
    }

    #[test]
    fn contains_any_groups_by_pattern() {
        let cols = [
            "cons_days_no_prec_average_summer",
            "av_d_max_t_average_summer",
            "av_d_mean_t_average_winter",
            "av_d_mean_t_average_summer",
            "elevation",
        ];
        assert_eq!(ColumnFilter::climate_default().select(&cols), vec![2, 3, 1, 0]);
    }

    #[test]
    fn drop_removes_named() {
        let cols = ["clay_mean_munic", "pH_mean_munic", "sand_mean_munic"];
        assert_eq!(ColumnFilter::soil_default().select(&cols), vec![0, 2]);
        assert_eq!(ColumnFilter::All.select(&cols), vec![0, 1, 2]);
    }

    #[test]
    fn census_default_keeps_ten_columns() {
        match ColumnFilter::census_default() {
            ColumnFilter::Keep(names) => {
                assert_eq!(names.len(), 10);
                assert!(names.iter().any(|n| n == "lu_cattle"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

// ── Table readers ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use sbp_core::Year;

    use super::cursor;
    use crate::{
        ColumnFilter, DataError, read_adoption, read_attributes, read_census, read_eligible,
        read_feature_names, read_municipalities, read_pastures, read_payments,
    };

    #[test]
    fn municipalities_in_file_order() {
        let rows = read_municipalities(cursor(
            "Municipality,District\nMértola,Beja\nAlcoutim,Faro\n",
        ))
        .unwrap();
        assert_eq!(
            rows,
            [("Mértola".to_owned(), "Beja".to_owned()), ("Alcoutim".to_owned(), "Faro".to_owned())]
        );
    }

    #[test]
    fn pastures_long_format() {
        let series = read_pastures(cursor(
            "Municipality,Year,pastures_area_munic_ha\n\
             Mértola,2008,10.5\n\
             Mértola,2009,NA\n\
             Alcoutim,2009,3\n",
        ))
        .unwrap();
        assert_eq!(series["Mértola"][&Year(2008)], 10.5);
        assert!(series["Mértola"][&Year(2009)].is_nan());
        assert_eq!(series["Alcoutim"].len(), 1);
    }

    #[test]
    fn pastures_duplicate_rejected() {
        let err = read_pastures(cursor(
            "Municipality,Year,pastures_area_munic_ha\nMértola,2009,1\nMértola,2009,2\n",
        ))
        .unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }), "{err}");
    }

    #[test]
    fn census_filters_columns_and_keeps_missing_as_nan() {
        let table = read_census(
            cursor(
                "Municipality,Year,lu_cattle,junk,educ_none\n\
                 Mértola,2008,0.5,9,\n\
                 Mértola,2009,0.6,9,0.1\n",
            ),
            &ColumnFilter::census_default(),
        )
        .unwrap();
        let row = &table["Mértola"][&Year(2008)];
        assert_eq!(row.len(), 2);
        assert!(!row.contains_key("junk"));
        assert_eq!(row["lu_cattle"], 0.5);
        assert!(row["educ_none"].is_nan());
    }

    #[test]
    fn census_without_year_column_fails() {
        let err = read_census(cursor("Municipality,lu_cattle\nMértola,1\n"), &ColumnFilter::All)
            .unwrap_err();
        assert!(err.to_string().contains("\"Year\""), "{err}");
    }

    #[test]
    fn non_numeric_cell_is_parse_error() {
        let err = read_attributes(
            cursor("Municipality,clay_mean_munic\nMértola,lots\n"),
            &ColumnFilter::All,
            "soil.csv",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("soil.csv:"), "{err}");
    }

    #[test]
    fn adoption_drops_years_from_start() {
        let series = read_adoption(
            cursor("Municipality,1995,1996,1997,1998\nMértola,0.0,0.01,0.02,0.03\n"),
            Year(1997),
        )
        .unwrap();
        let row = &series["Mértola"];
        assert_eq!(row.keys().copied().collect::<Vec<_>>(), [Year(1995), Year(1996)]);
        assert_eq!(row[&Year(1996)], 0.01);
    }

    #[test]
    fn adoption_duplicate_rejected() {
        let err = read_adoption(
            cursor("Municipality,1995\nMértola,0.01\nMértola,0.02\n"),
            Year(1996),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }), "{err}");
        assert!(err.to_string().contains("duplicate row for Mértola"), "{err}");
    }

    #[test]
    fn adoption_bad_year_header() {
        let err = read_adoption(cursor("Municipality,total\nMértola,1\n"), Year(2000)).unwrap_err();
        assert!(err.to_string().contains("invalid year"), "{err}");
    }

    #[test]
    fn payments_schedule() {
        let schedule = read_payments(cursor("Year,sbp_payment\n2009,200\n2010,150.5\n")).unwrap();
        assert_eq!(schedule.range(), Some((Year(2009), Year(2010))));
        assert_eq!(schedule.get(Year(2010), "Mértola").unwrap(), 150.5);
    }

    #[test]
    fn payments_missing_value_rejected() {
        let err = read_payments(cursor("Year,sbp_payment\n2009,\n")).unwrap_err();
        assert!(err.to_string().contains("missing payment for 2009"), "{err}");
    }

    #[test]
    fn eligible_list() {
        let names = read_eligible(cursor("Municipality\nMértola\nAlcoutim\n")).unwrap();
        assert_eq!(names, ["Mértola", "Alcoutim"]);
    }

    #[test]
    fn feature_names_first_row() {
        let names = read_feature_names(
            cursor("tot_cumul_adoption_pr_y_port, lu_cattle ,clay_mean_munic\n1,2,3\n"),
            "features.csv",
        )
        .unwrap();
        assert_eq!(names, ["tot_cumul_adoption_pr_y_port", "lu_cattle", "clay_mean_munic"]);

        assert!(read_feature_names(cursor(""), "features.csv").is_err());
    }
}

// ── Whole dataset ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod dataset_tests {
    use std::fs;
    use std::path::Path;

    use sbp_agent::AgentError;
    use sbp_core::Year;
    use tempfile::TempDir;

    use crate::{DataError, DatasetLayout, load_dataset};

    fn write(dir: &Path, file: &str, text: &str) {
        fs::write(dir.join(file), text).unwrap();
    }

    /// Two municipalities with complete data; `skip` leaves the named
    /// municipality out of the climate table.
    fn dataset_dir(skip_climate: Option<&str>) -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        let p = dir.path();
        write(p, "municipalities.csv", "Municipality,District\nMértola,Beja\nAlcoutim,Faro\n");

        let mut pastures = String::from("Municipality,Year,pastures_area_munic_ha\n");
        let mut census = String::from("Municipality,Year,lu_cattle\n");
        for name in ["Mértola", "Alcoutim"] {
            for year in 1995..=2012 {
                pastures.push_str(&format!("{name},{year},100\n"));
                census.push_str(&format!("{name},{year},0.5\n"));
            }
        }
        write(p, "yearly_permanent_pastures_area.csv", &pastures);
        write(p, "census_data_for_abm.csv", &census);
        write(p, "yearly_adoption.csv", "Municipality,1995,1996\nMértola,0.01,0.02\n");

        let mut climate = String::from("Municipality,av_d_max_t_average_summer\n");
        for name in ["Mértola", "Alcoutim", "Lisboa"] {
            if Some(name) != skip_climate {
                climate.push_str(&format!("{name},31\n"));
            }
        }
        write(p, "municipalities_average_climate.csv", &climate);
        write(
            p,
            "municipalities_soil.csv",
            "Municipality,clay_mean_munic,pH_mean_munic\nMértola,0.2,6\nAlcoutim,0.3,6\n",
        );
        write(p, "sbp_payments.csv", "Year,sbp_payment\n2009,200\n2010,200\n");
        write(p, "municipalities_eligible.csv", "Municipality\nMértola\n");
        dir
    }

    #[test]
    fn loads_records_in_list_order() {
        let dir = dataset_dir(None);
        let ds = load_dataset(dir.path(), &DatasetLayout::default(), Year(1996)).unwrap();

        let names: Vec<_> = ds.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Mértola", "Alcoutim"]);
        assert_eq!(ds.records[0].district, "Beja");
        assert_eq!(ds.records[0].adoption.len(), 1, "1996 column dropped");
        assert!(ds.records[1].adoption.is_empty(), "no history row");
        assert_eq!(ds.environments.len(), 2, "Lisboa ignored");

        let soil = &ds.environments.get("Mértola").unwrap().soil;
        assert!(!soil.contains_key("pH_mean_munic"));
        assert_eq!(ds.payments.get(Year(2009), "Alcoutim").unwrap(), 200.0);
    }

    #[test]
    fn eligibility_applied_when_configured() {
        let dir = dataset_dir(None);
        let layout = DatasetLayout::default().with_eligibility();
        let ds = load_dataset(dir.path(), &layout, Year(1996)).unwrap();
        assert_eq!(ds.payments.get(Year(2009), "Mértola").unwrap(), 200.0);
        assert_eq!(ds.payments.get(Year(2009), "Alcoutim").unwrap(), 0.0);
    }

    #[test]
    fn missing_rows_reported_together() {
        let dir = dataset_dir(Some("Alcoutim"));
        fs::write(
            dir.path().join("municipalities_soil.csv"),
            "Municipality,clay_mean_munic\nAlcoutim,0.3\n",
        )
        .unwrap();
        let err = load_dataset(dir.path(), &DatasetLayout::default(), Year(1996)).unwrap_err();
        match err {
            DataError::Agent(AgentError::DataIntegrity { municipalities, detail }) => {
                assert_eq!(municipalities, ["Mértola", "Alcoutim"]);
                assert!(detail.contains("municipalities_soil.csv"), "{detail}");
                assert!(detail.contains("municipalities_average_climate.csv"), "{detail}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = dataset_dir(None);
        fs::remove_file(dir.path().join("sbp_payments.csv")).unwrap();
        let err = load_dataset(dir.path(), &DatasetLayout::default(), Year(1996)).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }
}
