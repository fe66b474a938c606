//! Synthetic sales dataset for demos and tests.

use rand::prelude::*;

use crate::error::Result;
use crate::types::{Dataset, Record};

/// Number of generated records.
pub const SAMPLE_ROWS: usize = 100;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 42;

pub const SAMPLE_COLUMNS: [&str; 8] = [
    "id",
    "vendas",
    "regiao",
    "produto",
    "mes",
    "satisfacao",
    "custo",
    "lucro",
];

const REGIONS: [&str; 4] = ["Norte", "Sul", "Leste", "Oeste"];
const PRODUCTS: [&str; 3] = ["Produto A", "Produto B", "Produto C"];
const MONTHS: [&str; 6] = ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun"];

/// Generate the sample sales dataset; identical seeds give identical data.
///
/// `lucro` is always `vendas - custo`.
pub fn sample_dataset(seed: u64) -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);

    let records = (1..=SAMPLE_ROWS as i64)
        .map(|id| {
            let vendas: i64 = rng.gen_range(1000..11000);
            let regiao = REGIONS.choose(&mut rng).copied().unwrap_or(REGIONS[0]);
            let produto = PRODUCTS.choose(&mut rng).copied().unwrap_or(PRODUCTS[0]);
            let mes = MONTHS.choose(&mut rng).copied().unwrap_or(MONTHS[0]);
            let satisfacao: i64 = rng.gen_range(1..=5);
            let custo: i64 = rng.gen_range(500..5500);

            Record::new()
                .with("id", id)
                .with("vendas", vendas)
                .with("regiao", regiao)
                .with("produto", produto)
                .with("mes", mes)
                .with("satisfacao", satisfacao)
                .with("custo", custo)
                .with("lucro", vendas - custo)
        })
        .collect();

    Dataset::new(SAMPLE_COLUMNS.iter().map(|c| c.to_string()).collect(), records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(record: &Record, column: &str) -> f64 {
        record.get(column).as_number().unwrap()
    }

    #[test]
    fn test_sample_shape() {
        let ds = sample_dataset(DEFAULT_SEED).unwrap();
        assert_eq!(ds.len(), SAMPLE_ROWS);
        assert_eq!(ds.columns(), &SAMPLE_COLUMNS);
    }

    #[test]
    fn test_sample_value_ranges() {
        let ds = sample_dataset(7).unwrap();
        for (i, record) in ds.records().iter().enumerate() {
            assert_eq!(number(record, "id"), (i + 1) as f64);

            let vendas = number(record, "vendas");
            let custo = number(record, "custo");
            assert!((1000.0..11000.0).contains(&vendas));
            assert!((500.0..5500.0).contains(&custo));
            assert!((1.0..=5.0).contains(&number(record, "satisfacao")));
            assert_eq!(number(record, "lucro"), vendas - custo);

            let regiao = record.get("regiao").as_key().unwrap();
            assert!(REGIONS.contains(&regiao.as_str()));
        }
    }

    #[test]
    fn test_sample_is_deterministic_per_seed() {
        let a = sample_dataset(1).unwrap();
        let b = sample_dataset(1).unwrap();
        let c = sample_dataset(2).unwrap();

        assert_eq!(a.records(), b.records());
        assert_ne!(a.records(), c.records());
        assert_ne!(a.version(), b.version());
    }
}
