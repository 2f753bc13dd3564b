#![no_main]

use abplan::planner::{compute_mde_or_sample_size, CalculationRequest, PlannerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|request: CalculationRequest| {
    let result = compute_mde_or_sample_size(&request, &PlannerConfig::default());

    if let Some(mde) = result.minimum_detectable_effect {
        assert!(mde.is_finite());
    }
    if let Some(exposure) = result.exposure_needed_percentage {
        assert!(exposure.is_finite());
    }
    if !result.is_computed() {
        assert!(!result.warnings.is_empty());
    }
});
