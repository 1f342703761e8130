#![no_main]

use libfuzzer_sys::fuzz_target;

use bass_diffusion_forecaster::{
    analysis::{fit_bass, forecast, normalize},
    config::FitConfig,
    io::read_csv_from_bytes,
};

fuzz_target!(|data: &[u8]| {
    let Ok(table) = read_csv_from_bytes(data, "fuzz", None) else {
        return;
    };
    let Some(category) = table.categories().into_iter().next() else {
        return;
    };
    let Ok(series) = normalize(&table, &category) else {
        return;
    };
    assert!(series.years().windows(2).all(|w| w[0] < w[1]));
    assert!(series.sales().iter().all(|s| s.is_finite() && *s >= 0.0));

    let config = FitConfig {
        max_evaluations: 200,
        ..FitConfig::default()
    };
    if let Ok(fit) = fit_bass(&series, &config) {
        assert_eq!(fit.fitted_sales.len(), series.len());
        if let Ok(fc) = forecast(&fit.params, series.base_year(), series.last_year()) {
            assert!(fc.len() >= series.len());
            assert!(fc.predicted_sales().iter().all(|s| s.is_finite() && *s >= 0.0));
        }
    }
});
