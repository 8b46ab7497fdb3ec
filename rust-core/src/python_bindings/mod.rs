//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod filter_bindings;
mod scan_bindings;

/// Python module definition
#[pymodule]
fn band_scan(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<filter_bindings::PyWindowType>()?;
    m.add_class::<scan_bindings::PyBandScanner>()?;
    m.add_function(wrap_pyfunction!(filter_bindings::band_power, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::design_band_pass, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::band_response_db, m)?)?;

    Ok(())
}
