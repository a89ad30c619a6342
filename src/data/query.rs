use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, StringArray};
use arrow::compute::kernels::cmp::eq;
use arrow::compute::{and, cast, filter_record_batch};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};

use crate::error::{Result, SearchError};

use super::filter::Selection;
use super::model::{CellValue, ResultTable};

pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// The mandatory point a search is pinned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Parse the two text fields. Empty, non-numeric and non-finite input is
    /// rejected.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        Ok(Self {
            latitude: parse_coordinate(LATITUDE, latitude)?,
            longitude: parse_coordinate(LONGITUDE, longitude)?,
        })
    }
}

fn parse_coordinate(field: &'static str, input: &str) -> Result<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SearchError::InvalidCoordinate {
            field,
            input: input.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A column equality test. The value is bound as a scalar array and
/// compared by the `eq` kernel, so its contents never affect query shape.
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// Column cast to Float64, compared numerically.
    Number { column: String, value: f64 },
    /// Column cast to Utf8, compared as text.
    Text { column: String, value: String },
}

impl Predicate {
    fn column(&self) -> &str {
        match self {
            Predicate::Number { column, .. } | Predicate::Text { column, .. } => column,
        }
    }

    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let column = batch
            .column_by_name(self.column())
            .ok_or_else(|| SearchError::query(format!("column '{}' not found", self.column())))?;

        let mask = match self {
            Predicate::Number { value, .. } => {
                let values = cast(column, &DataType::Float64)?;
                eq(&values, &Float64Array::new_scalar(*value))?
            }
            Predicate::Text { value, .. } => match numeric_literal(column.data_type(), value) {
                Some(number) => {
                    let values = cast(column, &DataType::Float64)?;
                    eq(&values, &Float64Array::new_scalar(number))?
                }
                None => {
                    let values = cast(column, &DataType::Utf8)?;
                    eq(&values, &StringArray::new_scalar(value.as_str()))?
                }
            },
        };
        Ok(mask)
    }
}

/// The selected value as a number when the column holds numbers, so `"1"`
/// and `"0.50"` match `1.0` and `0.5` whatever type the column was inferred as.
fn numeric_literal(column_type: &DataType, value: &str) -> Option<f64> {
    if !column_type.is_numeric() {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn predicates(selection: &Selection, coords: Coordinates) -> Vec<Predicate> {
    let mut predicates = vec![
        Predicate::Number {
            column: LATITUDE.to_string(),
            value: coords.latitude,
        },
        Predicate::Number {
            column: LONGITUDE.to_string(),
            value: coords.longitude,
        },
    ];
    predicates.extend(selection.concrete().map(|(attr, value)| Predicate::Text {
        column: attr.to_string(),
        value: value.to_string(),
    }));
    predicates
}

// ---------------------------------------------------------------------------
// QueryContext – owned query engine settings
// ---------------------------------------------------------------------------

/// Settings for reading candidate CSVs and filtering their rows.
///
/// Created once by the application and passed to every search.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub delimiter: u8,
    /// Rows sampled per file for type inference (`None` reads everything).
    /// A sample can miss a late value of a wider type, which then fails to
    /// parse.
    pub infer_records: Option<usize>,
    pub batch_size: usize,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_records: None,
            batch_size: 8192,
        }
    }
}

impl QueryContext {
    /// Read every candidate as one table and keep the rows equal to the
    /// coordinates and to every concrete attribute value in `selection`.
    pub fn execute(
        &self,
        candidates: &[PathBuf],
        selection: &Selection,
        coords: Coordinates,
    ) -> Result<ResultTable> {
        if candidates.is_empty() {
            return Ok(ResultTable::default());
        }

        let schema = self.union_schema(candidates)?;
        let predicates = predicates(selection, coords);
        for p in &predicates {
            if schema.field_with_name(p.column()).is_err() {
                return Err(SearchError::query(format!("column '{}' not found", p.column())));
            }
        }

        let mut matched = Vec::new();
        for path in candidates {
            let reader = ReaderBuilder::new(schema.clone())
                .with_header(true)
                .with_delimiter(self.delimiter)
                .with_batch_size(self.batch_size)
                .build(BufReader::new(open(path)?))?;

            for batch in reader {
                let batch = batch.map_err(|e| {
                    SearchError::query(format!("{}: {e}", path.display()))
                })?;
                let mask = combined_mask(&batch, &predicates)?;
                let kept = filter_record_batch(&batch, &mask)?;
                if kept.num_rows() > 0 {
                    matched.push(kept);
                }
            }
        }

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(table) = arrow::util::pretty::pretty_format_batches(&matched) {
                log::trace!("Matched rows:\n{table}");
            }
        }

        to_result_table(&schema, &matched)
    }

    /// Infer each file's schema and widen them into one.
    ///
    /// All files must expose the same column names in the same order.
    fn union_schema(&self, candidates: &[PathBuf]) -> Result<SchemaRef> {
        let format = Format::default()
            .with_header(true)
            .with_delimiter(self.delimiter);

        let mut merged: Option<(PathBuf, Vec<Field>)> = None;
        for path in candidates {
            let (schema, _) = format
                .infer_schema(BufReader::new(open(path)?), self.infer_records)
                .map_err(|e| SearchError::query(format!("{}: {e}", path.display())))?;

            let (first, fields) = match merged.as_mut() {
                Some(entry) => entry,
                None => {
                    let fields = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
                    merged = Some((path.clone(), fields));
                    continue;
                }
            };

            let same_columns = schema.fields().len() == fields.len()
                && schema.fields().iter().zip(fields.iter()).all(|(a, b)| a.name() == b.name());
            if !same_columns {
                return Err(SearchError::query(format!(
                    "{} has different columns than {}",
                    path.display(),
                    first.display()
                )));
            }

            for (field, other) in fields.iter_mut().zip(schema.fields()) {
                let widened = widen(field.data_type(), other.data_type());
                *field = Field::new(field.name(), widened, true);
            }
        }

        let fields = merged.map(|(_, fields)| fields).unwrap_or_default();
        let fields: Vec<Field> = fields
            .into_iter()
            .map(|f| {
                if f.data_type() == &DataType::Null {
                    Field::new(f.name(), DataType::Utf8, true)
                } else {
                    f.with_nullable(true)
                }
            })
            .collect();
        Ok(Arc::new(Schema::new(fields)))
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| SearchError::io(e, path))
}

/// Smallest type both inferred types fit into.
fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        _ => DataType::Utf8,
    }
}

fn combined_mask(batch: &RecordBatch, predicates: &[Predicate]) -> Result<BooleanArray> {
    let mut mask = BooleanArray::from(vec![true; batch.num_rows()]);
    for p in predicates {
        mask = and(&mask, &p.evaluate(batch)?)?;
    }
    Ok(mask)
}

// ---------------------------------------------------------------------------
// Arrow → ResultTable
// ---------------------------------------------------------------------------

fn to_result_table(schema: &Schema, batches: &[RecordBatch]) -> Result<ResultTable> {
    let columns = schema.fields().iter().map(|f| f.name().clone()).collect();
    let options = FormatOptions::default();
    let mut rows = Vec::new();

    for batch in batches {
        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .zip(&formatters)
                    .map(|(col, fmt)| cell_value(col, fmt, row))
                    .collect(),
            );
        }
    }

    Ok(ResultTable { columns, rows })
}

fn cell_value(col: &ArrayRef, formatter: &ArrayFormatter<'_>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::Text(formatter.value(row).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{resolve, AttributeFilter};
    use crate::data::schema::COASTAL;
    use proptest::prelude::*;

    const HEADER: &str = "Latitude,Longitude,ClimateScenario,Subsidence,Year,ReturnPeriod,SeaLevelRiseScenario,Depth";

    fn write(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut text = format!("{HEADER}\n");
        for r in rows {
            text.push_str(r);
            text.push('\n');
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    /// Two Coastal files sharing the 2050 / nosub / 1in100 / 0.5 attributes.
    fn corpus() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let rcp85 = write(
            tmp.path(),
            "inuncoast_rcp8p5_nosub_2050_1in100_0.5.csv",
            &[
                "10.0,20.0,rcp8p5,nosub,2050,1in100,0.5,1.25",
                "10.0,20.5,rcp8p5,nosub,2050,1in100,0.5,0.75",
                "10.5,20.0,rcp8p5,nosub,2050,1in100,0.5,0.10",
            ],
        );
        let rcp45 = write(
            tmp.path(),
            "inuncoast_rcp4p5_nosub_2050_1in100_0.5.csv",
            &[
                "10.0,20.0,rcp4p5,nosub,2050,1in100,0.5,0.50",
                "11.0,21.0,rcp4p5,nosub,2050,1in100,0.5,0.20",
            ],
        );
        (tmp, rcp85, rcp45)
    }

    fn coords(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates { latitude, longitude }
    }

    fn depths(table: &ResultTable) -> Vec<f64> {
        table.column("Depth").unwrap().filter_map(CellValue::as_f64).collect()
    }

    #[test]
    fn coordinate_parsing() {
        assert_eq!(Coordinates::parse(" 10.5", "-20").unwrap(), coords(10.5, -20.0));
        assert!(matches!(
            Coordinates::parse("", "20"),
            Err(SearchError::InvalidCoordinate { field: "Latitude", .. })
        ));
        assert!(matches!(
            Coordinates::parse("10", "east"),
            Err(SearchError::InvalidCoordinate { field: "Longitude", .. })
        ));
        assert!(Coordinates::parse("NaN", "1").is_err());
    }

    #[test]
    fn empty_candidates_give_empty_table() {
        let table = QueryContext::default()
            .execute(&[], &Selection::default(), coords(1.0, 2.0))
            .unwrap();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn filters_on_coordinates_across_files() {
        let (_tmp, rcp85, rcp45) = corpus();
        let table = QueryContext::default()
            .execute(&[rcp85, rcp45], &Selection::all(&COASTAL), coords(10.0, 20.0))
            .unwrap();
        assert_eq!(table.columns.first().map(String::as_str), Some("Latitude"));
        assert_eq!(table.columns.len(), 8);
        assert_eq!(depths(&table), [1.25, 0.5]);
    }

    #[test]
    fn attribute_predicate_matches_numeric_column_by_value() {
        let (_tmp, rcp85, rcp45) = corpus();
        let selection = Selection::all(&COASTAL)
            .with("ClimateScenario", "rcp4p5")
            .with("Year", "2050");
        let table = QueryContext::default()
            .execute(&[rcp85, rcp45], &selection, coords(10.0, 20.0))
            .unwrap();
        assert_eq!(depths(&table), [0.5]);
        assert_eq!(
            table.column("Year").unwrap().next(),
            Some(&CellValue::Integer(2050))
        );
    }

    #[test]
    fn filter_values_are_data_not_syntax() {
        let (_tmp, rcp85, _) = corpus();
        let mut selection = Selection::all(&COASTAL);
        selection.set(
            "ClimateScenario",
            AttributeFilter::Value("rcp8p5' OR '1'='1".to_string()),
        );
        let table = QueryContext::default()
            .execute(&[rcp85], &selection, coords(10.0, 20.0))
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn missing_column_is_a_query_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("inuncoast_a_b_c_d_e.csv");
        std::fs::write(&path, "Lat,Lon\n1.0,2.0\n").unwrap();
        let err = QueryContext::default()
            .execute(&[path], &Selection::default(), coords(1.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, SearchError::QueryExecution(_)));
    }

    #[test]
    fn mismatched_headers_are_rejected() {
        let (tmp, rcp85, _) = corpus();
        let other = tmp.path().join("inuncoast_x_y_z_w_v.csv");
        std::fs::write(&other, "Longitude,Latitude\n1.0,2.0\n").unwrap();
        let err = QueryContext::default()
            .execute(&[rcp85, other], &Selection::default(), coords(1.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, SearchError::QueryExecution(_)));
    }

    #[test]
    fn integer_and_float_columns_widen() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a.csv");
        let b = tmp.path().join("b.csv");
        std::fs::write(&a, "Latitude,Longitude,Depth\n10,20,1\n").unwrap();
        std::fs::write(&b, "Latitude,Longitude,Depth\n10.0,20.0,2.5\n").unwrap();
        let table = QueryContext::default()
            .execute(&[a, b], &Selection::default(), coords(10.0, 20.0))
            .unwrap();
        assert_eq!(depths(&table), [1.0, 2.5]);
    }

    #[test]
    fn numeric_attribute_matches_by_value_on_exact_and_fallback_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let one = write(
            tmp.path(),
            "inuncoast_rcp8p5_nosub_2050_1in100_1.csv",
            &["10.0,20.0,rcp8p5,nosub,2050,1in100,1,0.25"],
        );
        let wider = write(
            tmp.path(),
            "inuncoast_rcp8p5_nosub_2050_1in100_1.5.csv",
            &["10.0,20.0,rcp8p5,nosub,2050,1in100,1.5,0.75"],
        );
        let selection = Selection::all(&COASTAL)
            .with("ClimateScenario", "rcp8p5")
            .with("Subsidence", "nosub")
            .with("Year", "2050")
            .with("ReturnPeriod", "1in100")
            .with("SeaLevelRiseScenario", "1");

        let res = resolve(tmp.path(), &COASTAL, &selection).unwrap();
        assert_eq!(res.exact_file.as_ref(), Some(&one));

        let ctx = QueryContext::default();
        let exact = ctx.execute(&res.candidates, &selection, coords(10.0, 20.0)).unwrap();
        let fallback = ctx
            .execute(&[wider, one], &selection, coords(10.0, 20.0))
            .unwrap();

        let slr_and_depth = |t: &ResultTable| -> Vec<(Option<f64>, Option<f64>)> {
            t.column("SeaLevelRiseScenario")
                .unwrap()
                .zip(t.column("Depth").unwrap())
                .map(|(slr, depth)| (slr.as_f64(), depth.as_f64()))
                .collect()
        };
        assert_eq!(slr_and_depth(&exact), [(Some(1.0), Some(0.25))]);
        assert_eq!(slr_and_depth(&exact), slr_and_depth(&fallback));
    }

    #[test]
    fn numeric_attribute_ignores_textual_form() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(
            tmp.path(),
            "inuncoast_rcp8p5_nosub_2050_1in100_0.50.csv",
            &["10.0,20.0,rcp8p5,nosub,2050,1in100,0.50,0.25"],
        );
        let selection = Selection::all(&COASTAL).with("SeaLevelRiseScenario", "0.50");
        let table = QueryContext::default()
            .execute(&[path], &selection, coords(10.0, 20.0))
            .unwrap();
        assert_eq!(depths(&table), [0.25]);
    }

    #[test]
    fn late_wider_values_do_not_break_type_inference() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.csv");
        let mut text = String::from("Latitude,Longitude,Depth\n");
        for _ in 0..1000 {
            text.push_str("10.0,20.0,0\n");
        }
        text.push_str("10.0,20.0,0.5\n");
        std::fs::write(&path, text).unwrap();

        let table = QueryContext::default()
            .execute(&[path], &Selection::default(), coords(10.0, 20.0))
            .unwrap();
        assert_eq!(table.len(), 1001);
        assert_eq!(depths(&table).last(), Some(&0.5));
    }

    #[test]
    fn malformed_rows_are_a_query_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.csv");
        std::fs::write(&path, "Latitude,Longitude\n1.0,2.0\n1.0,2.0,3.0\n").unwrap();
        assert!(QueryContext::default()
            .execute(&[path], &Selection::default(), coords(1.0, 2.0))
            .is_err());
    }

    #[test]
    fn example_exact_scenario() {
        let (tmp, rcp85, _) = corpus();
        let selection = Selection::all(&COASTAL)
            .with("ClimateScenario", "rcp8p5")
            .with("Subsidence", "nosub")
            .with("Year", "2050")
            .with("ReturnPeriod", "1in100")
            .with("SeaLevelRiseScenario", "0.5");

        let res = resolve(tmp.path(), &COASTAL, &selection).unwrap();
        assert_eq!(res.exact_file.as_ref(), Some(&rcp85));

        let table = QueryContext::default()
            .execute(&res.candidates, &selection, coords(10.0, 20.0))
            .unwrap();
        assert_eq!(depths(&table), [1.25]);
        for row in table.column(LATITUDE).unwrap() {
            assert_eq!(row, &CellValue::Float(10.0));
        }
    }

    const CLIMATE: &[&str] = &["All", "rcp8p5", "rcp4p5", "ssp"];
    const YEAR: &[&str] = &["All", "2050", "205"];
    const LATS: &[f64] = &[10.0, 10.5, 11.0];
    const LONS: &[f64] = &[20.0, 20.5, 21.0];

    fn selection_from(climate: &str, year: &str, full: bool) -> Selection {
        let mut s = Selection::all(&COASTAL);
        s.set("ClimateScenario", AttributeFilter::from_choice(climate));
        s.set("Year", AttributeFilter::from_choice(year));
        if full {
            s = s.with("Subsidence", "nosub")
                .with("ReturnPeriod", "1in100")
                .with("SeaLevelRiseScenario", "0.5");
        }
        s
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Rows depend only on the equality predicates, not on which
        /// candidate files were chosen.
        #[test]
        fn resolved_candidates_match_full_scan(
            climate in prop::sample::select(CLIMATE),
            year in prop::sample::select(YEAR),
            full in any::<bool>(),
            lat in prop::sample::select(LATS),
            lon in prop::sample::select(LONS),
        ) {
            let (tmp, rcp85, rcp45) = corpus();
            let selection = selection_from(climate, year, full);
            let ctx = QueryContext::default();

            let res = resolve(tmp.path(), &COASTAL, &selection).unwrap();
            let resolved = ctx.execute(&res.candidates, &selection, coords(lat, lon)).unwrap();
            let full_scan = ctx.execute(&[rcp45, rcp85], &selection, coords(lat, lon)).unwrap();

            prop_assert_eq!(resolved.columns, full_scan.columns);
            let mut a = resolved.rows.iter().map(|r| format!("{r:?}")).collect::<Vec<_>>();
            let mut b = full_scan.rows.iter().map(|r| format!("{r:?}")).collect::<Vec<_>>();
            a.sort();
            b.sort();
            prop_assert_eq!(a, b);
        }
    }
}
