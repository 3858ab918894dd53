use rfprofilecore::profile::{Band, BandFamily, BandLimits, ToleranceProfile, ToleranceWindow};

/// Nominal TX power, RX level and window width per band.
const NOMINAL: [(Band, f64, f64, ToleranceWindow); Band::COUNT] = [
    (Band::Gsm900, 32.0, -60.0, ToleranceWindow::Narrow),
    (Band::Gsm1800, 29.0, -60.0, ToleranceWindow::Narrow),
    (Band::Wcdma1, 23.0, -60.0, ToleranceWindow::Wide),
    (Band::Wcdma8, 23.0, -60.0, ToleranceWindow::Wide),
    (Band::Lte1, 23.0, -65.0, ToleranceWindow::Wide),
    (Band::Lte3, 23.0, -65.0, ToleranceWindow::Wide),
    (Band::Lte7, 23.0, -65.0, ToleranceWindow::Narrow),
    (Band::Lte20, 23.0, -65.0, ToleranceWindow::Unmarked),
];

/// Limits used for generated sessions.
pub fn default_limits(family: BandFamily) -> ToleranceProfile {
    NOMINAL
        .iter()
        .filter(|(band, ..)| family.contains(*band))
        .fold(ToleranceProfile::new(family), |profile, &(band, tx, rx, window)| {
            profile.with_band(band, BandLimits::new(tx, rx, window))
        })
}
