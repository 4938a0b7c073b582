use bson::Document as BsonDocument;
use std::io::Read;

use super::pipeline::BatchWriter;
use crate::errors::AppError;
use crate::vehicle::coerce_text;

/// Header row required. Headers and cells are trimmed; numeric schema columns are coerced and
/// everything else stays text. Columns with a blank header are dropped.
pub(super) fn read_csv<R: Read>(
    reader: R,
    delimiter: u8,
    out: &mut BatchWriter<'_>,
) -> Result<(), AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    for (i, rec) in rdr.records().enumerate() {
        // header is row 1
        let row = i as u64 + 2;
        match rec {
            Ok(rec) => {
                let mut data = BsonDocument::new();
                for (name, cell) in headers.iter().zip(rec.iter()) {
                    if !name.is_empty() {
                        data.insert(name.clone(), coerce_text(name, cell));
                    }
                }
                out.push(data)?;
            }
            Err(e) => out.reject(row, AppError::Csv(e), None)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::collection::Collection;
    use crate::import::{SeedFormat, SeedOptions, seed_from_reader};
    use bson::Bson;

    const CARS: &str = "Brand , Model,AccelSec,PriceEuro,RapidCharge\n\
                        Tesla , Model 3 Long Range Dual Motor,4.6,55480,Yes\n\
                        Renault,Kangoo Maxi ZE 33,22.4,n/a,No\n";

    #[test]
    fn trims_and_coerces() {
        let col = Collection::in_memory("datas");
        let report =
            seed_from_reader(&col, CARS.as_bytes(), SeedFormat::Csv, &SeedOptions::default())
                .unwrap();
        assert_eq!(report.inserted, 2);
        let docs = col.snapshot();
        assert_eq!(docs[0].get("Brand"), Some(&Bson::String("Tesla".into())));
        assert_eq!(docs[0].get("PriceEuro"), Some(&Bson::Int32(55480)));
        assert_eq!(docs[0].get("RapidCharge"), Some(&Bson::String("Yes".into())));
        assert_eq!(docs[1].get("PriceEuro"), Some(&Bson::Null));
        assert_eq!(docs[1].get("AccelSec"), Some(&Bson::Double(22.4)));
    }

    #[test]
    fn ragged_rows_are_skipped() {
        let col = Collection::in_memory("datas");
        let data = "Brand,Model\nTesla,Model 3\nBMW\nKia,EV6\n";
        let report =
            seed_from_reader(&col, data.as_bytes(), SeedFormat::Csv, &SeedOptions::default())
                .unwrap();
        assert_eq!((report.inserted, report.skipped), (2, 1));
    }

    #[test]
    fn other_delimiters() {
        let col = Collection::in_memory("datas");
        let opts = SeedOptions { delimiter: b';', ..Default::default() };
        seed_from_reader(&col, "Brand;Seats\nKia;5\n".as_bytes(), SeedFormat::Csv, &opts).unwrap();
        assert_eq!(col.snapshot()[0].get("Seats"), Some(&Bson::Int32(5)));
    }
}
