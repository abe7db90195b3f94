use crate::domain::deployment::dto::kpi::{Kpi, TimeUnit};

/// Returns a copy of `kpis` with every frequency-tolerance unit carrying its
/// display `label` and `abbreviation`. Absent alerts, tolerances and units are left absent.
pub fn normalize_kpis(kpis: &[Kpi]) -> Vec<Kpi> {
    kpis.iter().cloned().map(normalize_kpi).collect()
}

fn normalize_kpi(mut kpi: Kpi) -> Kpi {
    if let Some(unit) = kpi
        .alert
        .as_mut()
        .and_then(|alert| alert.frequency_tolerance.as_mut())
        .and_then(|tolerance| tolerance.unit.as_mut())
    {
        label_unit(unit);
    }
    kpi
}

fn label_unit(unit: &mut TimeUnit) {
    let code = unit.id.as_code();
    unit.label = Some(capitalize(code));
    unit.abbreviation = code.chars().next().map(|c| c.to_lowercase().collect());
}

fn capitalize(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
