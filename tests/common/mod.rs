#![allow(dead_code)]

use evgrid::collection::Collection;
use evgrid::document::Document;
use evgrid::errors::AppError;
use evgrid::observe::{ErrorEntry, ErrorSink};
use evgrid::query::{FindOptions, Predicate};
use evgrid::store::RecordStore;
use evgrid::types::RecordId;
use evgrid::vehicle::record_from_json;
use parking_lot::Mutex;
use serde_json::json;

/// A store whose every operation fails, as if the backing database were unreachable.
pub struct DownStore;

fn down<T>() -> Result<T, AppError> {
    Err(AppError::Storage("connection refused".into()))
}

impl RecordStore for DownStore {
    fn count(&self, _: &Predicate) -> Result<u64, AppError> {
        down()
    }
    fn find(&self, _: &Predicate, _: &FindOptions) -> Result<Vec<Document>, AppError> {
        down()
    }
    fn find_by_id(&self, _: &RecordId) -> Result<Option<Document>, AppError> {
        down()
    }
    fn delete_by_id(&self, _: &RecordId) -> Result<bool, AppError> {
        down()
    }
    fn delete_many(&self, _: &Predicate) -> Result<u64, AppError> {
        down()
    }
    fn insert_many(&self, _: Vec<Document>) -> Result<usize, AppError> {
        down()
    }
    fn clear(&self) -> Result<u64, AppError> {
        down()
    }
}

/// Keeps every reported entry for inspection.
#[derive(Default)]
pub struct MemorySink(pub Mutex<Vec<ErrorEntry>>);

impl ErrorSink for MemorySink {
    fn record(&self, entry: &ErrorEntry) {
        self.0.lock().push(entry.clone());
    }
}

/// A small, varied vehicle fixture.
pub fn vehicles() -> Collection {
    let rows = [
        json!({"Brand": "Tesla ", "Model": "Model 3 Long Range Dual Motor", "BodyStyle": "Sedan",
               "PowerTrain": "AWD", "PlugType": "Type 2 CCS", "Segment": "D", "PriceEuro": 55480,
               "AccelSec": 4.6, "Seats": 5, "Date": "8/24/16"}),
        json!({"Brand": "BMW ", "Model": "i4 ", "BodyStyle": "Sedan", "PowerTrain": "RWD",
               "PlugType": "Type 2 CCS", "Segment": "D", "PriceEuro": 65000, "AccelSec": 4.0,
               "Seats": 5, "Date": "1/1/21"}),
        json!({"Brand": "BMW", "Model": "i4", "BodyStyle": "Sedan", "PowerTrain": "RWD",
               "PlugType": "Type 2 CCS", "Segment": "D", "PriceEuro": 68040, "AccelSec": 5.7,
               "Seats": 5, "Date": "2/2/21"}),
        json!({"Brand": "BMW", "Model": "iX3", "BodyStyle": "SUV", "PowerTrain": "RWD",
               "PlugType": "Type 2 CCS", "Segment": "D", "PriceEuro": 68040, "AccelSec": 6.8,
               "Seats": 5, "Date": "3/3/21"}),
        json!({"Brand": "Renault", "Model": "Zoe ZE50 R110", "BodyStyle": "Hatchback",
               "PowerTrain": "FWD", "PlugType": "Type 2 CCS", "Segment": "", "PriceEuro": 31184,
               "AccelSec": 11.4, "Seats": 5, "Date": "4/4/20"}),
        json!({"Brand": "Nissan", "Model": "Leaf", "BodyStyle": "Hatchback", "PowerTrain": "FWD",
               "PlugType": "Type 2 CHAdeMO", "PriceEuro": 29234, "AccelSec": 7.9, "Seats": 5,
               "Date": "5/5/18"}),
        json!({"Brand": "Tesla", "Model": "Cybertruck Tri Motor", "BodyStyle": "Pickup",
               "PowerTrain": "AWD", "PlugType": "Type 2 CCS", "Segment": null, "PriceEuro": 75000,
               "AccelSec": 3.0, "Seats": 6, "Date": "6/6/22"}),
    ];
    let col = Collection::in_memory("datas");
    let docs = rows
        .iter()
        .filter_map(|v| v.as_object().map(|o| Document::new(record_from_json(o))))
        .collect();
    col.insert_many(docs).unwrap();
    col
}
