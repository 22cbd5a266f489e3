use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder,
};

lazy_static! {
    pub static ref SOURCE_SYMBOLS_ENCODED: IntCounter =
        register_int_counter!("fountain_source_symbols_encoded_total", "Systematic symbols emitted").unwrap();
    pub static ref REPAIR_SYMBOLS_ENCODED: IntCounter =
        register_int_counter!("fountain_repair_symbols_encoded_total", "Repair symbols generated").unwrap();
    pub static ref SYMBOLS_RECEIVED: IntCounter =
        register_int_counter!("fountain_symbols_received_total", "Symbols accepted by decoders").unwrap();
    pub static ref DUPLICATE_SYMBOLS: IntCounter =
        register_int_counter!("fountain_duplicate_symbols_total", "Symbols ignored as duplicates").unwrap();
    pub static ref REJECTED_SYMBOLS: IntCounter =
        register_int_counter!("fountain_rejected_symbols_total", "Symbols rejected for mismatched parameters").unwrap();
    pub static ref DECODE_ATTEMPTS: IntCounter =
        register_int_counter!("fountain_decode_attempts_total", "Elimination attempts").unwrap();
    pub static ref DECODE_SUCCESS: IntCounter =
        register_int_counter!("fountain_decode_success_total", "Blocks recovered").unwrap();
    pub static ref INACTIVATED_COLUMNS: IntCounter =
        register_int_counter!("fountain_inactivated_columns_total", "Columns solved by dense elimination").unwrap();
    pub static ref SOLVE_SECONDS: Histogram =
        register_histogram!("fountain_solve_seconds", "Intermediate symbol solve time").unwrap();
}

/// Renders all registered metrics in the Prometheus text format.
pub fn gather() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
