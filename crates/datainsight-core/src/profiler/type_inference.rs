//! Type inference logic for column classification.

use crate::types::{Column, ColumnType, Dataset};

/// Classify one column from the leading `sample_rows` records.
///
/// The column is numeric only when the non-missing sample is non-empty and
/// every value in it parses to a finite number. An empty sample or any text
/// value makes the column categorical, so text never ends up on a numeric
/// axis.
pub(crate) fn infer_column_type(dataset: &Dataset, column: &str, sample_rows: usize) -> ColumnType {
    let mut sampled = 0usize;

    for record in dataset.records().iter().take(sample_rows) {
        let value = record.get(column);
        if value.is_missing() {
            continue;
        }
        sampled += 1;
        if value.as_number().is_none() {
            return ColumnType::Categorical;
        }
    }

    if sampled == 0 {
        ColumnType::Categorical
    } else {
        ColumnType::Numeric
    }
}

/// Classify every column of the dataset, preserving column order.
pub(crate) fn infer_column_types(dataset: &Dataset, sample_rows: usize) -> Vec<Column> {
    dataset
        .columns()
        .iter()
        .map(|name| Column {
            name: name.clone(),
            column_type: infer_column_type(dataset, name, sample_rows),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Record, Value};

    fn single_column(values: Vec<Value>) -> Dataset {
        let records = values
            .into_iter()
            .map(|v| Record::new().with("col", v))
            .collect();
        Dataset::new(vec!["col".to_string()], records).unwrap()
    }

    #[test]
    fn test_all_numbers_is_numeric() {
        let ds = single_column(vec![1.0.into(), 2.5.into(), Value::from(-3)]);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Numeric);
    }

    #[test]
    fn test_numeric_strings_are_numeric() {
        let ds = single_column(vec!["10".into(), " 20.5 ".into(), "3e2".into()]);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Numeric);
    }

    #[test]
    fn test_single_text_value_makes_categorical() {
        let ds = single_column(vec![1.0.into(), "abc".into(), 3.0.into()]);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Categorical);
    }

    #[test]
    fn test_missing_values_are_ignored() {
        let ds = single_column(vec![Value::Missing, "".into(), 5.0.into()]);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Numeric);
    }

    #[test]
    fn test_empty_sample_defaults_to_categorical() {
        let ds = single_column(vec![Value::Missing, Value::Missing]);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Categorical);
    }

    #[test]
    fn test_non_finite_number_is_categorical() {
        let ds = single_column(vec![1.0.into(), Value::Number(f64::NAN)]);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Categorical);
    }

    #[test]
    fn test_only_leading_rows_are_sampled() {
        let mut values: Vec<Value> = (0..10).map(|i| Value::from(i)).collect();
        values.push("not a number".into());
        let ds = single_column(values);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Numeric);
        assert_eq!(infer_column_type(&ds, "col", 11), ColumnType::Categorical);
    }

    #[test]
    fn test_missing_prefix_with_late_values_is_categorical() {
        let mut values = vec![Value::Missing; 10];
        values.push(42.0.into());
        let ds = single_column(values);
        assert_eq!(infer_column_type(&ds, "col", 10), ColumnType::Categorical);
    }

    #[test]
    fn test_infer_column_types_preserves_order() {
        let records = vec![
            Record::new().with("region", "North").with("sales", 10.0),
            Record::new().with("region", "South").with("sales", 20.0),
        ];
        let ds = Dataset::new(vec!["sales".into(), "region".into()], records).unwrap();
        let columns = infer_column_types(&ds, 10);

        assert_eq!(columns[0].name, "sales");
        assert_eq!(columns[0].column_type, ColumnType::Numeric);
        assert_eq!(columns[1].name, "region");
        assert_eq!(columns[1].column_type, ColumnType::Categorical);
    }
}
