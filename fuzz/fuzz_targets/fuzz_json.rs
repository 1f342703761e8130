#![no_main]

use libfuzzer_sys::fuzz_target;

use bass_diffusion_forecaster::{
    io::report_from_json,
    visualization::{format_comparison_chart, format_fit_table},
};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(report) = report_from_json(content) else {
        return;
    };
    let series = &report.series;
    assert!(!series.is_empty());
    assert!(series.years().windows(2).all(|w| w[0] < w[1]));
    assert!(series.sales().iter().all(|s| s.is_finite() && *s >= 0.0));
    assert!(series.elapsed().iter().all(|t| *t >= 0.0));
    let _ = report.forecast.at(series.base_year());
    let _ = report.forecast.at(series.last_year());
    let _ = format_comparison_chart(&report.comparison);
    let _ = format_fit_table(&report.comparison);
});
